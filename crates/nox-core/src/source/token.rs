use serde::{Deserialize, Serialize};

use crate::span::TextRange;

/// Lexical category of a token.
///
/// Keywords are not separated from identifiers; callers compare the
/// spelling with [`Token::is_ident`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    Ident(String),
    IntLiteral(i64),
    /// Integer literal too large for `i64`, or a floating literal.
    NumberLiteral,
    StringLiteral,
    CharLiteral,

    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Semi,
    Colon,
    ColonColon,
    Comma,
    Tilde,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Bang,
    BangEq,
    Eq,
    EqEq,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Arrow,
    Dot,
    Question,
    Hash,
    /// Any other punctuator; the rule never needs to look inside it.
    Other(char),
}

/// A token paired with its location in the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: TextRange,
    /// The token's spelling lies inside a macro expansion.
    #[serde(default)]
    pub from_macro: bool,
}

impl Token {
    pub fn new(kind: TokenKind, start: u32, end: u32) -> Self {
        Self {
            kind,
            span: TextRange::new(start, end),
            from_macro: false,
        }
    }

    /// True when the token is the identifier or keyword `text`.
    pub fn is_ident(&self, text: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(ident) if ident == text)
    }

    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(ident) => Some(ident),
            _ => None,
        }
    }

    pub fn opens_group(&self) -> bool {
        matches!(self.kind, TokenKind::LParen | TokenKind::LBracket)
    }

    pub fn closes_group(&self) -> bool {
        matches!(self.kind, TokenKind::RParen | TokenKind::RBracket)
    }
}

/// Index of the token closing the group opened at `open`.
///
/// Parentheses and brackets nest; a mismatched closer ends the search.
pub fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut stack = Vec::new();
    for (index, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::LParen => stack.push(TokenKind::RParen),
            TokenKind::LBracket => stack.push(TokenKind::RBracket),
            TokenKind::RParen | TokenKind::RBracket => {
                if stack.pop().as_ref() != Some(&token.kind) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(index);
                }
            }
            _ => {}
        }
        if stack.is_empty() {
            return None;
        }
    }
    None
}

/// Index of the `)` closing the parameter list of the declarator that
/// starts at byte `location`.
pub fn parameter_list_close(tokens: &[Token], location: u32) -> Option<usize> {
    let name = tokens.iter().position(|t| t.span.start >= location)?;
    let open = name
        + tokens[name..]
            .iter()
            .position(|t| t.kind == TokenKind::LParen || ends_declarator(t))?;
    // A body or terminator before any `(` means the parameter list is not
    // spelled in these tokens, e.g. a declarator produced by a macro.
    if tokens[open].kind != TokenKind::LParen {
        return None;
    }
    matching_close(tokens, open)
}

/// Tokens that end the declarator: a body, an initializer-like marker or
/// the end of the declaration.
pub fn ends_declarator(token: &Token) -> bool {
    matches!(
        token.kind,
        TokenKind::LBrace | TokenKind::Eq | TokenKind::Semi | TokenKind::Colon
    ) || token.is_ident("try")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Lexer;

    fn lex(text: &str) -> Vec<Token> {
        Lexer::new(text).tokenize().unwrap()
    }

    #[test]
    fn matching_close_skips_nested_groups() {
        let tokens = lex("( a [ ( ) ] ) b");
        assert_eq!(matching_close(&tokens, 0), Some(6));
        assert_eq!(matching_close(&tokens, 2), Some(5));
    }

    #[test]
    fn matching_close_rejects_mismatched_delimiters() {
        assert_eq!(matching_close(&lex("( ]"), 0), None);
        assert_eq!(matching_close(&lex("( a"), 0), None);
        assert_eq!(matching_close(&lex("a ( )"), 0), None);
    }

    #[test]
    fn parameter_list_close_starts_at_the_declarator() {
        let text = "virtual ~A(int (*)(int)) const;";
        let tokens = lex(text);
        let close = parameter_list_close(&tokens, 8).unwrap();
        assert_eq!(tokens[close].span.end as usize, text.find(") const").unwrap() + 1);
    }

    #[test]
    fn parameter_list_is_not_searched_past_the_body() {
        assert_eq!(parameter_list_close(&lex("DTOR { reset(); }"), 0), None);
        assert_eq!(parameter_list_close(&lex("DTOR;"), 0), None);
        assert_eq!(parameter_list_close(&lex("DTOR = default;"), 0), None);
    }

    #[test]
    fn try_and_braces_end_the_declarator() {
        let tokens = lex("try { } ; = :");
        assert!(tokens.iter().all(|t| ends_declarator(t) || t.kind == TokenKind::RBrace));
        assert!(!ends_declarator(&tokens[2]));
    }
}
