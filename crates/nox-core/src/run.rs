//! Analysis runs over whole translation units.
//!
//! A run plays the role of the matcher: it walks every destructor of a
//! unit, skips deleted ones and hands the rest to the check. Each run owns
//! its analyzer, so independent units can be checked in parallel without
//! sharing state.

use std::path::PathBuf;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

use crate::analyzer::{AnalyzerOptions, ExceptionSpecAnalyzer, ExceptionState};
use crate::check::NoexceptDestructorCheck;
use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::model::TranslationUnit;
use crate::source::{SourceFile, resolve_specifiers};

/// Counters collected while checking one or more units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    /// Destructors handed to the check.
    pub declarations: usize,
    pub deleted_skipped: usize,
    pub throwing: usize,
    pub not_throwing: usize,
    pub unknown: usize,
    pub diagnostics: usize,
    pub fixes: usize,
}

impl RunStats {
    pub fn merge(&mut self, other: &RunStats) {
        self.declarations += other.declarations;
        self.deleted_skipped += other.deleted_skipped;
        self.throwing += other.throwing;
        self.not_throwing += other.not_throwing;
        self.unknown += other.unknown;
        self.diagnostics += other.diagnostics;
        self.fixes += other.fixes;
    }

    fn record(&mut self, state: ExceptionState) {
        self.declarations += 1;
        match state {
            ExceptionState::Throwing => self.throwing += 1,
            ExceptionState::NotThrowing => self.not_throwing += 1,
            ExceptionState::Unknown => self.unknown += 1,
        }
    }
}

/// One pass of the check over one translation unit.
pub struct AnalysisRun<'u> {
    unit: &'u TranslationUnit,
    source: &'u SourceFile,
    options: AnalyzerOptions,
    check: NoexceptDestructorCheck,
}

impl<'u> AnalysisRun<'u> {
    pub fn new(unit: &'u TranslationUnit, source: &'u SourceFile) -> Self {
        Self {
            unit,
            source,
            options: AnalyzerOptions::default(),
            check: NoexceptDestructorCheck::default(),
        }
    }

    pub fn options(mut self, options: AnalyzerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn check(mut self, check: NoexceptDestructorCheck) -> Self {
        self.check = check;
        self
    }

    /// Check every destructor in the unit, in declaration order.
    pub fn run(&self, sink: &mut impl DiagnosticSink) -> RunStats {
        let mut analyzer = ExceptionSpecAnalyzer::with_options(self.unit, self.options);
        let mut stats = RunStats::default();
        let mut counting = CountingSink {
            inner: sink,
            diagnostics: 0,
            fixes: 0,
        };

        for decl in &self.unit.destructors {
            if !NoexceptDestructorCheck::matches(decl) {
                stats.deleted_skipped += 1;
                continue;
            }
            let state = self.check.check(&mut analyzer, decl, self.source, &mut counting);
            stats.record(state);
        }

        stats.diagnostics = counting.diagnostics;
        stats.fixes = counting.fixes;
        debug!(
            file = %self.unit.file.display(),
            declarations = stats.declarations,
            diagnostics = stats.diagnostics,
            cached = analyzer.cached(),
            "Finished unit"
        );
        stats
    }
}

struct CountingSink<'s, S: DiagnosticSink> {
    inner: &'s mut S,
    diagnostics: usize,
    fixes: usize,
}

impl<S: DiagnosticSink> DiagnosticSink for CountingSink<'_, S> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics += 1;
        if diagnostic.fix.is_some() {
            self.fixes += 1;
        }
        self.inner.report(diagnostic);
    }
}

/// A translation unit paired with the text of its file.
#[derive(Debug, Clone)]
pub struct UnitInput {
    pub unit: TranslationUnit,
    pub source: SourceFile,
}

impl UnitInput {
    /// Pair `unit` with `text` and recover specifiers the front-end left
    /// absent.
    pub fn prepare(mut unit: TranslationUnit, text: impl Into<String>) -> Self {
        let source = SourceFile::from_unit(&unit, text);
        let resolved = resolve_specifiers(&mut unit, &source);
        if resolved > 0 {
            debug!(file = %unit.file.display(), resolved, "Recovered specifiers from source");
        }
        Self { unit, source }
    }
}

/// Outcome of checking one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitReport {
    pub file: PathBuf,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: RunStats,
}

pub fn check_unit(
    input: &UnitInput,
    options: AnalyzerOptions,
    check: NoexceptDestructorCheck,
) -> UnitReport {
    let _span = info_span!("unit", file = %input.unit.file.display()).entered();
    let mut diagnostics = Vec::new();
    let stats = AnalysisRun::new(&input.unit, &input.source)
        .options(options)
        .check(check)
        .run(&mut diagnostics);
    UnitReport {
        file: input.unit.file.clone(),
        diagnostics,
        stats,
    }
}

/// Check independent units in parallel; reports keep the input order.
pub fn check_units(
    inputs: &[UnitInput],
    options: AnalyzerOptions,
    check: NoexceptDestructorCheck,
) -> Vec<UnitReport> {
    inputs
        .par_iter()
        .map(|input| check_unit(input, options, check))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExplicitSpec;
    use crate::tests::test_helpers::{UnitBuilder, decl_range, throwing_member};

    fn throwing_unit(text: &str) -> TranslationUnit {
        let mut builder = UnitBuilder::new();
        let holder = throwing_member(&mut builder, "Holder");
        builder.destructor_in(holder, decl_range(text, 0), ExplicitSpec::Absent);
        builder.build()
    }

    #[test]
    fn run_counts_states_and_fixes() {
        let text = "struct Holder { ~Holder(); };";
        let input = UnitInput::prepare(throwing_unit(text), text);
        let report = check_unit(&input, AnalyzerOptions::default(), NoexceptDestructorCheck::new());

        // `Bad`'s explicit noexcept(false) is throwing but not reported.
        assert_eq!(report.stats.declarations, 2);
        assert_eq!(report.stats.throwing, 2);
        assert_eq!(report.stats.diagnostics, 1);
        assert_eq!(report.stats.fixes, 1);
        assert_eq!(report.diagnostics.len(), 1);
    }

    #[test]
    fn deleted_destructors_are_skipped() {
        let text = "struct Holder { ~Holder() = delete; };";
        let mut unit = throwing_unit(text);
        unit.destructors[1].deleted = true;
        let input = UnitInput::prepare(unit, text);

        let report = check_unit(&input, AnalyzerOptions::default(), NoexceptDestructorCheck::new());
        assert_eq!(report.stats.deleted_skipped, 1);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn parallel_reports_keep_input_order() {
        let inputs: Vec<_> = (0..8)
            .map(|index| {
                let text = "struct Holder { ~Holder(); };";
                let mut unit = throwing_unit(text);
                unit.file = format!("unit{index}.hpp").into();
                UnitInput::prepare(unit, text)
            })
            .collect();

        let reports = check_units(&inputs, AnalyzerOptions::default(), NoexceptDestructorCheck::new());
        let files: Vec<_> = reports.iter().map(|r| r.file.clone()).collect();
        let expected: Vec<PathBuf> = (0..8).map(|i| format!("unit{i}.hpp").into()).collect();
        assert_eq!(files, expected);

        let mut total = RunStats::default();
        for report in &reports {
            total.merge(&report.stats);
        }
        assert_eq!(total.diagnostics, 8);
    }
}
