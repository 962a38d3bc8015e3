//! Recovers exception specifiers from a declaration's tokens.
//!
//! Front-ends that do not record the specifier leave it `absent`; the
//! parser fills it in from the text so that a fixed file re-checks as
//! non-throwing.

use tracing::{trace, warn};

use crate::model::{BinaryOp, ExplicitSpec, SpecExpr, TranslationUnit, UnaryOp};
use crate::span::TextRange;

use super::SourceFile;
use super::token::{Token, TokenKind, ends_declarator, matching_close, parameter_list_close};

/// Fill in every `absent` specifier in `unit` from the source text.
///
/// Returns how many declarations gained a specifier. Declarations whose
/// range cannot be tokenized keep `absent`.
pub fn resolve_specifiers(unit: &mut TranslationUnit, source: &SourceFile) -> usize {
    let mut resolved = 0;
    for decl in unit.destructors.iter_mut().filter(|d| d.explicit_spec.is_absent()) {
        let tokens = match source.tokens_in(decl.range) {
            Ok(tokens) => tokens,
            Err(err) => {
                warn!(decl = %decl.name, error = %err, "Cannot tokenize destructor");
                continue;
            }
        };

        let spec = parse_explicit_spec(&tokens, decl.location, source.text());
        if !spec.is_absent() {
            trace!(decl = %decl.name, ?spec, "Recovered exception specifier");
            decl.explicit_spec = spec;
            resolved += 1;
        }
    }
    resolved
}

/// Parse the exception specifier following the declarator at `location`.
pub fn parse_explicit_spec(tokens: &[Token], location: u32, text: &str) -> ExplicitSpec {
    let Some(close) = parameter_list_close(tokens, location) else {
        return ExplicitSpec::Absent;
    };

    let mut index = close + 1;
    while let Some(token) = tokens.get(index) {
        if ends_declarator(token) {
            break;
        }
        if token.is_ident("noexcept") {
            return parse_noexcept(tokens, index, text);
        }
        if token.is_ident("throw") {
            return parse_dynamic_throw(tokens, index, text);
        }
        index = if token.opens_group() {
            match matching_close(tokens, index) {
                Some(end) => end + 1,
                None => break,
            }
        } else {
            index + 1
        };
    }
    ExplicitSpec::Absent
}

fn parse_noexcept(tokens: &[Token], keyword: usize, text: &str) -> ExplicitSpec {
    let open = keyword + 1;
    if tokens.get(open).map(|t| &t.kind) != Some(&TokenKind::LParen) {
        return ExplicitSpec::NoexceptLiteral { value: true };
    }
    let Some(close) = matching_close(tokens, open) else {
        return ExplicitSpec::NoexceptLiteral { value: true };
    };

    let operand = &tokens[open + 1..close];
    if let [single] = operand {
        if single.is_ident("true") {
            return ExplicitSpec::NoexceptLiteral { value: true };
        }
        if single.is_ident("false") {
            return ExplicitSpec::NoexceptLiteral { value: false };
        }
    }

    let range = match (operand.first(), operand.last()) {
        (Some(first), Some(last)) => first.span.cover(&last.span),
        _ => TextRange::empty(tokens[close].span.start),
    };
    let expr = ExprParser::new(operand, text).parse();
    ExplicitSpec::NoexceptExpression { expr, range }
}

fn parse_dynamic_throw(tokens: &[Token], keyword: usize, text: &str) -> ExplicitSpec {
    let open = keyword + 1;
    let close = match tokens.get(open) {
        Some(token) if token.kind == TokenKind::LParen => matching_close(tokens, open),
        _ => None,
    };
    let Some(close) = close else {
        return ExplicitSpec::DynamicThrow { types: Vec::new() };
    };

    let mut types = Vec::new();
    let mut start = open + 1;
    let mut depth = 0i32;
    for index in open + 1..=close {
        let token = &tokens[index];
        match token.kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::Lt => depth += 1,
            TokenKind::RParen | TokenKind::RBracket | TokenKind::Gt if index != close => depth -= 1,
            _ => {}
        }
        let at_separator = depth == 0 && token.kind == TokenKind::Comma;
        if index == close || at_separator {
            if start < index {
                let range = tokens[start].span.cover(&tokens[index - 1].span);
                types.push(slice(text, range));
            }
            start = index + 1;
        }
    }
    ExplicitSpec::DynamicThrow { types }
}

fn slice(text: &str, range: TextRange) -> String {
    text.get(range.as_usize_range()).unwrap_or_default().to_string()
}

/// Precedence-climbing parser for `noexcept` operands.
///
/// Template-ids, calls and `sizeof`-like operators become
/// [`SpecExpr::Dependent`] pieces; an operand that does not parse at all is
/// dependent as a whole.
struct ExprParser<'t> {
    tokens: &'t [Token],
    text: &'t str,
    pos: usize,
}

impl<'t> ExprParser<'t> {
    fn new(tokens: &'t [Token], text: &'t str) -> Self {
        Self { tokens, text, pos: 0 }
    }

    fn parse(mut self) -> SpecExpr {
        match self.conditional() {
            Some(expr) if self.pos == self.tokens.len() => expr,
            _ => SpecExpr::dependent(self.whole_text()),
        }
    }

    fn whole_text(&self) -> String {
        match (self.tokens.first(), self.tokens.last()) {
            (Some(first), Some(last)) => slice(self.text, first.span.cover(&last.span)),
            _ => String::new(),
        }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek().map(|t| &t.kind) == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_ident(&mut self, text: &str) -> bool {
        if self.peek().is_some_and(|t| t.is_ident(text)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn conditional(&mut self) -> Option<SpecExpr> {
        let condition = self.logical_or()?;
        if !self.eat(&TokenKind::Question) {
            return Some(condition);
        }
        let then = self.conditional()?;
        if !self.eat(&TokenKind::Colon) {
            return None;
        }
        let otherwise = self.conditional()?;
        Some(SpecExpr::Conditional {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn logical_or(&mut self) -> Option<SpecExpr> {
        let mut lhs = self.logical_and()?;
        while self.eat(&TokenKind::PipePipe) || self.eat_ident("or") {
            let rhs = self.logical_and()?;
            lhs = SpecExpr::binary(BinaryOp::Or, lhs, rhs);
        }
        Some(lhs)
    }

    fn logical_and(&mut self) -> Option<SpecExpr> {
        let mut lhs = self.equality()?;
        while self.eat(&TokenKind::AmpAmp) || self.eat_ident("and") {
            let rhs = self.equality()?;
            lhs = SpecExpr::binary(BinaryOp::And, lhs, rhs);
        }
        Some(lhs)
    }

    fn equality(&mut self) -> Option<SpecExpr> {
        self.binary_level(Self::relational, |kind| match kind {
            TokenKind::EqEq => Some(BinaryOp::Eq),
            TokenKind::BangEq => Some(BinaryOp::Ne),
            _ => None,
        })
    }

    fn relational(&mut self) -> Option<SpecExpr> {
        self.binary_level(Self::additive, |kind| match kind {
            TokenKind::Lt => Some(BinaryOp::Lt),
            TokenKind::Le => Some(BinaryOp::Le),
            TokenKind::Gt => Some(BinaryOp::Gt),
            TokenKind::Ge => Some(BinaryOp::Ge),
            _ => None,
        })
    }

    fn additive(&mut self) -> Option<SpecExpr> {
        self.binary_level(Self::multiplicative, |kind| match kind {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn multiplicative(&mut self) -> Option<SpecExpr> {
        self.binary_level(Self::unary, |kind| match kind {
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::Percent => Some(BinaryOp::Rem),
            _ => None,
        })
    }

    fn binary_level(
        &mut self,
        operand: fn(&mut Self) -> Option<SpecExpr>,
        operator: fn(&TokenKind) -> Option<BinaryOp>,
    ) -> Option<SpecExpr> {
        let mut lhs = operand(self)?;
        while let Some(op) = self.peek().and_then(|t| operator(&t.kind)) {
            self.pos += 1;
            let rhs = operand(self)?;
            lhs = SpecExpr::binary(op, lhs, rhs);
        }
        Some(lhs)
    }

    fn unary(&mut self) -> Option<SpecExpr> {
        if self.eat(&TokenKind::Bang) || self.eat_ident("not") {
            return Some(SpecExpr::not(self.unary()?));
        }
        if self.eat(&TokenKind::Minus) {
            return Some(SpecExpr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(self.unary()?),
            });
        }
        if self.eat(&TokenKind::Plus) {
            return self.unary();
        }
        self.primary()
    }

    fn primary(&mut self) -> Option<SpecExpr> {
        let token = self.peek()?;
        match &token.kind {
            TokenKind::IntLiteral(value) => {
                self.pos += 1;
                Some(SpecExpr::Int { value: *value })
            }
            TokenKind::LParen => {
                self.pos += 1;
                let inner = self.conditional()?;
                self.eat(&TokenKind::RParen).then_some(inner)
            }
            TokenKind::Ident(ident) if ident == "true" || ident == "false" => {
                self.pos += 1;
                Some(SpecExpr::boolean(ident == "true"))
            }
            TokenKind::Ident(_) | TokenKind::ColonColon => self.name(),
            _ => None,
        }
    }

    /// `::a::b`, optionally continued by template arguments, calls or
    /// further qualification, which make it dependent.
    fn name(&mut self) -> Option<SpecExpr> {
        let start = self.pos;
        self.eat(&TokenKind::ColonColon);
        let mut qualified = String::new();
        loop {
            let ident = self.peek()?.ident()?.to_string();
            self.pos += 1;
            qualified.push_str(&ident);
            if !self.eat(&TokenKind::ColonColon) {
                break;
            }
            qualified.push_str("::");
        }

        let mut dependent = false;
        loop {
            match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Lt) => match self.template_args_end() {
                    Some(end) => self.pos = end + 1,
                    None => break,
                },
                Some(TokenKind::LParen) => self.pos = matching_close(self.tokens, self.pos)? + 1,
                Some(TokenKind::ColonColon) if dependent => {
                    self.pos += 1;
                    self.peek()?.ident()?;
                    self.pos += 1;
                    continue;
                }
                _ => break,
            }
            dependent = true;
        }

        if dependent {
            let range = self.tokens[start].span.cover(&self.tokens[self.pos - 1].span);
            return Some(SpecExpr::dependent(slice(self.text, range)));
        }
        Some(SpecExpr::name(qualified))
    }

    /// Index of the `>` closing a template argument list opened at the
    /// current position, if the `<` reads as one.
    fn template_args_end(&self) -> Option<usize> {
        let mut angle = 0usize;
        let mut index = self.pos;
        while let Some(token) = self.tokens.get(index) {
            match token.kind {
                TokenKind::Lt => angle += 1,
                TokenKind::Gt => {
                    angle -= 1;
                    if angle == 0 {
                        return Some(index);
                    }
                }
                TokenKind::LParen | TokenKind::LBracket => {
                    index = matching_close(self.tokens, index)?;
                }
                TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::AmpAmp
                | TokenKind::PipePipe
                | TokenKind::Question
                | TokenKind::Semi => return None,
                _ => {}
            }
            index += 1;
        }
        None
    }
}
