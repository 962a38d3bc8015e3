//! Diagnostics produced by the check and the sink that receives them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::span::SourceSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// A text insertion that resolves a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixIt {
    /// Byte offset in the file the diagnostic points into.
    pub offset: u32,
    pub text: String,
}

/// One finding about one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Name of the check that produced it.
    pub check: String,
    pub severity: Severity,
    pub location: SourceSpan,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixIt>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {} [{}]",
            self.location, self.severity, self.message, self.check
        )
    }
}

/// Receives diagnostics as the check produces them.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_location_and_check() {
        let diagnostic = Diagnostic {
            check: "performance-noexcept-destructor".into(),
            severity: Severity::Warning,
            location: SourceSpan::new("a.hpp", 3, 5),
            message: "destructors should be marked noexcept".into(),
            fix: None,
        };
        assert_eq!(
            diagnostic.to_string(),
            "a.hpp:3-5: warning: destructors should be marked noexcept [performance-noexcept-destructor]"
        );
    }

    #[test]
    fn fix_is_omitted_from_json_when_absent() {
        let diagnostic = Diagnostic {
            check: "c".into(),
            severity: Severity::Error,
            location: SourceSpan::new("a.hpp", 0, 1),
            message: "m".into(),
            fix: None,
        };
        let json = serde_json::to_value(&diagnostic).unwrap();
        assert!(json.get("fix").is_none());
        assert_eq!(json["severity"], "error");
    }
}
