//! Error types for the nox core library

use miette::Diagnostic;
use thiserror::Error;

use crate::model::{DeclId, RecordId};
use crate::span::TextRange;

/// Errors raised while preparing or post-processing an analysis run.
///
/// The analysis itself never fails: anything it cannot resolve becomes
/// [`ExceptionState::Unknown`](crate::ExceptionState::Unknown).
#[derive(Error, Debug, Diagnostic)]
pub enum NoxError {
    /// Source text could not be tokenized
    #[error("Lex error at {range}: {message}")]
    #[diagnostic(code(nox::core::lex))]
    Lex { message: String, range: TextRange },

    /// A declaration range lies outside the source text
    #[error("Range {range} is outside of the source text ({len} bytes)")]
    #[diagnostic(code(nox::core::range_out_of_bounds))]
    RangeOutOfBounds { range: TextRange, len: usize },

    /// A translation unit refers to a declaration it does not contain
    #[error("Unknown declaration id {0}")]
    #[diagnostic(code(nox::core::unknown_decl))]
    UnknownDeclaration(DeclId),

    /// A translation unit refers to a record it does not contain
    #[error("Unknown record id {0}")]
    #[diagnostic(code(nox::core::unknown_record))]
    UnknownRecord(RecordId),

    /// A fix-it cannot be applied to the given text
    #[error("Fix-it offset {offset} is not a valid insertion point ({len} bytes of source)")]
    #[diagnostic(
        code(nox::core::invalid_fix_offset),
        help("the source changed since it was analyzed; re-run the check")
    )]
    InvalidFixOffset { offset: u32, len: usize },

    /// Translation unit document could not be decoded
    #[error("Invalid translation unit: {0}")]
    #[diagnostic(code(nox::core::invalid_unit))]
    InvalidUnit(#[from] serde_json::Error),
}

impl NoxError {
    /// Create a Lex error
    pub fn lex(message: impl Into<String>, range: TextRange) -> Self {
        Self::Lex {
            message: message.into(),
            range,
        }
    }
}

/// Result type for nox core operations
pub type Result<T> = std::result::Result<T, NoxError>;
