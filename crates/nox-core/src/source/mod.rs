//! Source text and the token streams derived from it.

mod lexer;
mod spec_parser;
mod token;

use std::path::{Path, PathBuf};

use crate::error::{NoxError, Result};
use crate::model::TranslationUnit;
use crate::span::TextRange;

pub use lexer::Lexer;
pub use spec_parser::{parse_explicit_spec, resolve_specifiers};
pub use token::{Token, TokenKind, ends_declarator, matching_close, parameter_list_close};

/// Raw text of one file plus the byte ranges produced by macro expansion.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    text: String,
    macro_expansions: Vec<TextRange>,
}

impl SourceFile {
    pub fn new(path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            text: text.into(),
            macro_expansions: Vec::new(),
        }
    }

    /// Pair `text` with the path and macro ranges recorded in `unit`.
    pub fn from_unit(unit: &TranslationUnit, text: impl Into<String>) -> Self {
        Self::new(&unit.file, text).with_macro_expansions(unit.macro_expansions.clone())
    }

    pub fn with_macro_expansions(mut self, ranges: Vec<TextRange>) -> Self {
        self.macro_expansions = ranges;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn macro_expansions(&self) -> &[TextRange] {
        &self.macro_expansions
    }

    /// Source text covered by `range`, if it lies on char boundaries.
    pub fn slice(&self, range: TextRange) -> Option<&str> {
        self.text.get(range.as_usize_range())
    }

    /// True when any byte of `range` came from a macro expansion.
    pub fn in_macro(&self, range: TextRange) -> bool {
        self.macro_expansions
            .iter()
            .any(|expansion| expansion.intersects(&range))
    }

    /// Tokenize the bytes of `range`, tagging tokens spelled inside macro
    /// expansions.
    pub fn tokens_in(&self, range: TextRange) -> Result<Vec<Token>> {
        let len = self.text.len();
        if range.end as usize > len || range.start > range.end {
            return Err(NoxError::RangeOutOfBounds { range, len });
        }

        let mut tokens =
            Lexer::with_range(&self.text, range.start as usize, range.end as usize).tokenize()?;
        for token in &mut tokens {
            token.from_macro = self.in_macro(token.span);
        }
        Ok(tokens)
    }
}
