//! # nox-core
//!
//! Static analysis of C++ destructor exception specifications.
//!
//! The crate answers one question per destructor: can it be proven not to
//! throw? It then reports destructors that may throw and, where the source
//! allows a clean edit, attaches a fix-it inserting `noexcept`.
//!
//! ## Overview
//!
//! - [`model`]: the translation unit document handed over by a front-end
//! - [`source`]: raw source text, tokens and specifier recovery
//! - [`ExceptionSpecAnalyzer`]: memoized throwing / not throwing / unknown
//!   classification
//! - [`SpecifierInsertionLocator`]: the byte offset where `noexcept` goes
//! - [`NoexceptDestructorCheck`]: decides which diagnostic, if any, to emit
//! - [`AnalysisRun`] and [`check_units`]: per-unit runs, in parallel across
//!   units
//! - [`apply_fixes`]: writes fix-its back into source text
//!
//! ```text
//!  TranslationUnit ──► AnalysisRun ──► NoexceptDestructorCheck ──► DiagnosticSink
//!                          │                 │         │
//!                          ▼                 ▼         ▼
//!                 ExceptionSpecAnalyzer   analyze   SpecifierInsertionLocator
//!                   (one per run)                        (tokens of SourceFile)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use nox_core::{AnalyzerOptions, NoexceptDestructorCheck, TranslationUnit, UnitInput, check_units};
//!
//! # fn main() -> nox_core::Result<()> {
//! let json = r#"{
//!     "file": "widget.hpp",
//!     "records": [
//!         { "id": 0, "name": "Bad", "destructor": 0 },
//!         { "id": 1, "name": "Widget",
//!           "fields": [{ "name": "bad", "ty": { "kind": "record", "id": 0 } }],
//!           "destructor": 1 }
//!     ],
//!     "destructors": [
//!         { "id": 0, "name": "~Bad", "owner": 0, "location": 13,
//!           "range": { "start": 13, "end": 36 } },
//!         { "id": 1, "name": "~Widget", "owner": 1, "location": 56,
//!           "range": { "start": 56, "end": 66 } }
//!     ]
//! }"#;
//! let text = "struct Bad { ~Bad() noexcept(false); };\nstruct Widget { ~Widget(); Bad bad; };";
//!
//! let unit = TranslationUnit::from_json(json)?;
//! let input = UnitInput::prepare(unit, text);
//! let reports = check_units(&[input], AnalyzerOptions::default(), NoexceptDestructorCheck::new());
//!
//! assert_eq!(reports[0].diagnostics.len(), 1);
//! assert!(reports[0].diagnostics[0].fix.is_some());
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod check;
pub mod diagnostic;
pub mod error;
pub mod fixes;
pub mod locator;
pub mod model;
pub mod run;
pub mod source;
pub mod span;

#[cfg(test)]
mod tests;

pub use analyzer::{AnalyzerOptions, ExceptionSpecAnalyzer, ExceptionState};
pub use check::{
    CHECK_NAME, FALSE_EXPRESSION_MESSAGE, MISSING_SPECIFIER_MESSAGE, NOEXCEPT_FIX,
    NoexceptDestructorCheck,
};
pub use diagnostic::{Diagnostic, DiagnosticSink, FixIt, Severity};
pub use error::{NoxError, Result};
pub use fixes::apply_fixes;
pub use locator::{InsertionPoint, SpecifierInsertionLocator};
pub use model::{Declaration, ExplicitSpec, TranslationUnit};
pub use run::{AnalysisRun, RunStats, UnitInput, UnitReport, check_unit, check_units};
pub use source::SourceFile;
pub use span::{SourceSpan, TextRange};
