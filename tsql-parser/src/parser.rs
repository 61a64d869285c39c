//! Recursive descent parsers for the naming-rule and CONTAINS grammars.
//!
//! Both parsers are single pass with one token of lookahead. The first error aborts parsing;
//! there is no recovery and no partial tree.

use std::mem;

use tracing::{debug, trace};
use tsql_source::{Span, SyntaxError};

use crate::ast::contains::Term;
use crate::ast::naming::Expr;
use crate::lexer::{tokenize, Lexer, Token, TokenKind};

mod contains;
mod naming;

/// Parses a naming-rule expression. Empty input is [`SyntaxError::EmptyInput`].
pub fn parse_naming_rule(text: &str) -> Result<Expr, SyntaxError> {
    debug!(len = text.len(), "parsing naming rule");
    let expr = Parser::new(text)?.parse_naming_rule()?;
    debug!(tree = %expr.dump(), "parsed naming rule");
    Ok(expr)
}

/// Parses a CONTAINS search condition. Empty input is [`SyntaxError::EmptyInput`].
pub fn parse_contains(text: &str) -> Result<Term, SyntaxError> {
    debug!(len = text.len(), "parsing contains predicate");
    let term = Parser::new(text)?.parse_search_condition()?;
    debug!(tree = %term.dump(), "parsed contains predicate");
    Ok(term)
}

pub type ParseResult<T> = Result<T, SyntaxError>;

/// Maximum nesting of the parser recursion and maximum height of a parsed tree.
pub const MAX_NESTING: usize = 256;

pub struct Parser<'a> {
    /// Cached token for peeking.
    current_token: Token,
    lexer: Lexer<'a>,
    /// Current recursion depth of `parse_expr_bp` / `parse_term_bp`.
    depth: usize,
    /// Height of the node parsed last.
    height: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> ParseResult<Self> {
        let mut lexer = tokenize(source);
        let current_token = Self::pull(&mut lexer)?;
        Ok(Self {
            current_token,
            lexer,
            depth: 0,
            height: 0,
        })
    }

    /// Parses a whole naming rule: an expression followed by end of input.
    pub fn parse_naming_rule(&mut self) -> ParseResult<Expr> {
        self.reject_empty()?;
        let expr = self.parse_expr()?;
        self.expect_eof()?;
        Ok(expr)
    }

    /// Parses a whole CONTAINS search condition followed by end of input.
    pub fn parse_search_condition(&mut self) -> ParseResult<Term> {
        self.reject_empty()?;
        let term = self.parse_term()?;
        self.expect_eof()?;
        Ok(term)
    }
}

/// Parse utilities
impl<'a> Parser<'a> {
    fn pull(lexer: &mut Lexer<'a>) -> ParseResult<Token> {
        match lexer.next() {
            Some(token) => token,
            None => {
                let len = lexer.source().len();
                Ok(Token {
                    kind: TokenKind::Eof,
                    span: Span::at(len),
                })
            }
        }
    }

    /// Advances to the next token and returns the consumed one.
    fn next(&mut self) -> ParseResult<Token> {
        let token = Self::pull(&mut self.lexer)?;
        trace!(token = %self.current_token.kind, span = %self.current_token.span, "consumed");
        Ok(mem::replace(&mut self.current_token, token))
    }

    /// Tests whether the current token has the same discriminant as `tok`.
    fn at(&self, tok: &TokenKind) -> bool {
        mem::discriminant(&self.current_token.kind) == mem::discriminant(tok)
    }

    /// Predicate that tests whether the current token has the same discriminant and eats it if yes as a side effect.
    fn eat(&mut self, tok: TokenKind) -> ParseResult<Option<Token>> {
        if self.at(&tok) {
            self.next().map(Some)
        } else {
            Ok(None)
        }
    }

    fn expect(&mut self, tok: TokenKind) -> ParseResult<Token> {
        match self.eat(tok.clone())? {
            Some(token) => Ok(token),
            None => self.unexpected(tok),
        }
    }

    fn expect_eof(&self) -> ParseResult<()> {
        if self.at(&TokenKind::Eof) {
            Ok(())
        } else {
            self.unexpected("end of input")
        }
    }

    fn reject_empty(&self) -> ParseResult<()> {
        if self.at(&TokenKind::Eof) {
            Err(SyntaxError::EmptyInput)
        } else {
            Ok(())
        }
    }

    /// Enters one level of recursion. Fails past [`MAX_NESTING`] levels.
    fn enter(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            Err(SyntaxError::NestingTooDeep {
                offset: self.current_token.span.start,
            })
        } else {
            Ok(())
        }
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Height of a node whose tallest child is `child` high. `offset` locates the node.
    fn node_height(&self, child: usize, offset: usize) -> ParseResult<usize> {
        let height = child + 1;
        if height > MAX_NESTING {
            Err(SyntaxError::NestingTooDeep { offset })
        } else {
            Ok(height)
        }
    }

    /// Raises an unexpected token error at the current token.
    fn unexpected<T>(&self, expected: impl ToString) -> ParseResult<T> {
        Err(SyntaxError::unexpected(
            expected,
            &self.current_token.kind,
            self.current_token.span.start,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_naming_rule(""), Err(SyntaxError::EmptyInput));
        assert_eq!(parse_naming_rule("  -- nothing\n"), Err(SyntaxError::EmptyInput));
        assert_eq!(parse_contains(""), Err(SyntaxError::EmptyInput));
        assert_eq!(parse_contains("\t"), Err(SyntaxError::EmptyInput));
    }

    #[test]
    fn test_lex_error_on_first_token() {
        assert_eq!(
            parse_naming_rule("'abc").unwrap_err(),
            SyntaxError::UnterminatedString { offset: 0 }
        );
    }

    #[test]
    fn test_eof_token_is_at_end() {
        let mut parser = Parser::new("a ").unwrap();
        parser.next().unwrap();
        assert_eq!(parser.current_token.span, Span::at(2));
        assert!(parser.at(&TokenKind::Eof));
    }
}
