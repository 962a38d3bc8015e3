//! Output of check results: miette-rendered text and JSON reports.

use miette::{GraphicalReportHandler, GraphicalTheme, LabeledSpan, NamedSource, Severity};
use nox_core::{FALSE_EXPRESSION_MESSAGE, SourceFile, SourceSpan, UnitReport};
use std::fmt;

use crate::error::Result;

/// A `nox_core::Diagnostic` paired with the text it points into.
#[derive(Debug)]
pub struct RenderedDiagnostic<'a> {
    diagnostic: &'a nox_core::Diagnostic,
    source: NamedSource<String>,
    text: &'a str,
}

impl<'a> RenderedDiagnostic<'a> {
    pub fn new(diagnostic: &'a nox_core::Diagnostic, source: &'a SourceFile) -> Self {
        Self {
            diagnostic,
            source: NamedSource::new(
                diagnostic.location.file.display().to_string(),
                source.text().to_string(),
            )
            .with_language("C++"),
            text: source.text(),
        }
    }

    fn label(&self) -> &'static str {
        if self.diagnostic.message == FALSE_EXPRESSION_MESSAGE {
            "evaluates to false"
        } else {
            "may throw"
        }
    }
}

impl fmt::Display for RenderedDiagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.diagnostic.message)
    }
}

impl std::error::Error for RenderedDiagnostic<'_> {}

impl miette::Diagnostic for RenderedDiagnostic<'_> {
    fn code(&self) -> Option<Box<dyn fmt::Display + '_>> {
        Some(Box::new(&self.diagnostic.check))
    }

    fn severity(&self) -> Option<Severity> {
        Some(match self.diagnostic.severity {
            nox_core::Severity::Error => Severity::Error,
            nox_core::Severity::Warning => Severity::Warning,
        })
    }

    fn help(&self) -> Option<Box<dyn fmt::Display + '_>> {
        let fix = self.diagnostic.fix.as_ref()?;
        let (line, col) = SourceSpan::new(&self.diagnostic.location.file, fix.offset, fix.offset)
            .to_line_col(self.text);
        Some(Box::new(format!(
            "insert `{}` at {}:{}",
            fix.text.trim(),
            line,
            col
        )))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.source)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let location = &self.diagnostic.location;
        let mut labels = vec![LabeledSpan::new(
            Some(self.label().to_string()),
            location.start as usize,
            location.len() as usize,
        )];
        if let Some(fix) = &self.diagnostic.fix {
            labels.push(LabeledSpan::new(
                Some("noexcept goes here".to_string()),
                fix.offset as usize,
                0,
            ));
        }
        Some(Box::new(labels.into_iter()))
    }
}

/// Render every diagnostic of one unit with source snippets.
pub fn render_text(source: &SourceFile, report: &UnitReport, color: bool) -> String {
    let theme = if color {
        GraphicalTheme::unicode()
    } else {
        GraphicalTheme::unicode_nocolor()
    };
    let handler = GraphicalReportHandler::new_themed(theme);

    let mut out = String::new();
    for diagnostic in &report.diagnostics {
        let rendered = RenderedDiagnostic::new(diagnostic, source);
        if handler.render_report(&mut out, &rendered).is_err() {
            // Fall back to the one-line form.
            out.push_str(&diagnostic.to_string());
            out.push('\n');
        }
    }
    out
}

/// All reports as one pretty-printed JSON array.
pub fn render_json(reports: &[UnitReport]) -> Result<String> {
    Ok(serde_json::to_string_pretty(reports)?)
}
