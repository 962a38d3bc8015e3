//! The `performance-noexcept-destructor` check.
//!
//! Flags destructors that may throw: those without a specifier whose
//! implicit specification is throwing (with a fix-it adding `noexcept`),
//! and those whose `noexcept(expr)` operand folds to `false`. A literal
//! `noexcept(false)` is left alone.

use tracing::{debug, warn};

use crate::analyzer::{ExceptionSpecAnalyzer, ExceptionState};
use crate::diagnostic::{Diagnostic, DiagnosticSink, FixIt, Severity};
use crate::locator::SpecifierInsertionLocator;
use crate::model::{Declaration, ExplicitSpec};
use crate::source::SourceFile;
use crate::span::{SourceSpan, TextRange};

pub const CHECK_NAME: &str = "performance-noexcept-destructor";
pub const FALSE_EXPRESSION_MESSAGE: &str = "noexcept specifier on the destructor evaluates to 'false'";
pub const MISSING_SPECIFIER_MESSAGE: &str = "destructors should be marked noexcept";
/// Inserted by the fix-it; the surrounding spaces keep it apart from
/// neighbouring tokens.
pub const NOEXCEPT_FIX: &str = " noexcept ";

#[derive(Debug, Clone, Copy)]
pub struct NoexceptDestructorCheck {
    severity: Severity,
}

impl Default for NoexceptDestructorCheck {
    fn default() -> Self {
        Self {
            severity: Severity::Warning,
        }
    }
}

impl NoexceptDestructorCheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_severity(severity: Severity) -> Self {
        Self { severity }
    }

    /// Declarations the check accepts: every destructor that is not deleted.
    pub fn matches(decl: &Declaration) -> bool {
        !decl.deleted
    }

    /// Classify `decl` and report at most one diagnostic for it.
    pub fn check(
        &self,
        analyzer: &mut ExceptionSpecAnalyzer<'_>,
        decl: &Declaration,
        source: &SourceFile,
        sink: &mut impl DiagnosticSink,
    ) -> ExceptionState {
        let state = analyzer.analyze(decl);
        if state != ExceptionState::Throwing {
            return state;
        }

        match &decl.explicit_spec {
            ExplicitSpec::NoexceptLiteral { .. } => {}
            ExplicitSpec::NoexceptExpression { range, .. } => {
                debug!(decl = %decl.name, "noexcept operand evaluates to false");
                sink.report(self.diagnostic(source, *range, FALSE_EXPRESSION_MESSAGE, None));
            }
            ExplicitSpec::DynamicThrow { .. } => {
                debug!(decl = %decl.name, "Dynamic exception specification may throw");
                sink.report(self.diagnostic(source, name_range(decl), MISSING_SPECIFIER_MESSAGE, None));
            }
            ExplicitSpec::Absent => {
                let fix = self.fix_for(decl, source);
                debug!(decl = %decl.name, fixable = fix.is_some(), "Destructor is missing noexcept");
                sink.report(self.diagnostic(source, name_range(decl), MISSING_SPECIFIER_MESSAGE, fix));
            }
        }
        state
    }

    fn fix_for(&self, decl: &Declaration, source: &SourceFile) -> Option<FixIt> {
        let tokens = match source.tokens_in(decl.range) {
            Ok(tokens) => tokens,
            Err(err) => {
                warn!(decl = %decl.name, error = %err, "Cannot tokenize destructor; no fix-it");
                return None;
            }
        };

        let point = SpecifierInsertionLocator::locate(decl, &tokens);
        point.valid.then(|| FixIt {
            offset: point.offset,
            text: NOEXCEPT_FIX.to_string(),
        })
    }

    fn diagnostic(
        &self,
        source: &SourceFile,
        range: TextRange,
        message: &str,
        fix: Option<FixIt>,
    ) -> Diagnostic {
        Diagnostic {
            check: CHECK_NAME.to_string(),
            severity: self.severity,
            location: SourceSpan::from_range(source.path(), range),
            message: message.to_string(),
            fix,
        }
    }
}

/// The declarator name, `~Widget`.
fn name_range(decl: &Declaration) -> TextRange {
    TextRange::new(decl.location, decl.location + decl.name.len() as u32)
}
