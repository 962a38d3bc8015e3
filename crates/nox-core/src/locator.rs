//! Finds where a `noexcept` specifier can be inserted into a destructor.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::model::Declaration;
use crate::source::{Token, ends_declarator, matching_close, parameter_list_close};

/// A byte offset where a specifier may be inserted.
///
/// Callers must not emit an edit when `valid` is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertionPoint {
    pub offset: u32,
    pub valid: bool,
}

impl InsertionPoint {
    pub fn at(offset: u32) -> Self {
        Self {
            offset,
            valid: true,
        }
    }

    pub fn invalid() -> Self {
        Self {
            offset: 0,
            valid: false,
        }
    }
}

/// Token scanner for the exception-specifier slot of a declarator.
///
/// The slot follows the parameter list and any cv/ref qualifiers, and
/// precedes attributes, virt-specifiers, the body, `= default`,
/// `= delete`, `= 0` and the terminating `;`.
pub struct SpecifierInsertionLocator;

impl SpecifierInsertionLocator {
    /// Locate the slot for `decl` in `tokens`, the tokens of its source
    /// range.
    pub fn locate(decl: &Declaration, tokens: &[Token]) -> InsertionPoint {
        if tokens
            .iter()
            .find(|t| t.span.start >= decl.location)
            .is_some_and(|t| t.from_macro)
        {
            trace!(decl = %decl.name, "Declarator is spelled by a macro");
            return InsertionPoint::invalid();
        }

        let Some(close) = parameter_list_close(tokens, decl.location) else {
            trace!(decl = %decl.name, "No parameter list");
            return InsertionPoint::invalid();
        };

        let mut anchor = close;
        let mut index = close + 1;
        while tokens.get(index).is_some_and(is_qualifier) {
            anchor = index;
            index += 1;
        }

        loop {
            let Some(token) = tokens.get(index) else {
                trace!(decl = %decl.name, "Declaration ends before a body or terminator");
                return InsertionPoint::invalid();
            };
            if token.is_ident("noexcept") || token.is_ident("throw") {
                return InsertionPoint::invalid();
            }
            if ends_declarator(token) {
                break;
            }
            index = if token.opens_group() {
                match matching_close(tokens, index) {
                    Some(end) => end + 1,
                    None => return InsertionPoint::invalid(),
                }
            } else {
                index + 1
            };
        }

        let anchor = &tokens[anchor];
        if anchor.from_macro {
            trace!(decl = %decl.name, "Insertion point is inside a macro expansion");
            return InsertionPoint::invalid();
        }
        InsertionPoint::at(anchor.span.end)
    }
}

fn is_qualifier(token: &Token) -> bool {
    use crate::source::TokenKind;
    matches!(token.kind, TokenKind::Amp | TokenKind::AmpAmp)
        || token.is_ident("const")
        || token.is_ident("volatile")
}
