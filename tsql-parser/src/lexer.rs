//! Tokens shared by the naming-rule and CONTAINS grammars.

use std::fmt;

use logos::Logos;
use tsql_source::{Span, SyntaxError};

/// Why the logos lexer rejected a slice. Converted into a [`SyntaxError`] by [`Lexer`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LexErrorKind {
    #[default]
    UnexpectedCharacter,
    UnterminatedString,
    IntegerOverflow,
}

/// A quoted string literal. `text` excludes the quotes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quoted {
    pub text: String,
    pub quote: char,
}

#[derive(Debug, Logos, Clone, PartialEq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum TokenKind {
    // literals
    #[regex("[0-9]+", |lex| lex.slice().parse::<u64>().map_err(|_| LexErrorKind::IntegerOverflow))]
    Integer(u64),
    #[regex(r"[0-9]*\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Decimal(f64),
    #[regex(r"'[^']*'?", |lex| quoted(lex.slice(), '\''))]
    #[regex(r#""[^"]*"?"#, |lex| quoted(lex.slice(), '"'))]
    String(Quoted),

    // identifiers
    #[regex("[A-Za-z_#@][A-Za-z0-9_#@$]*", |lex| lex.slice().to_string())]
    #[regex(r"\[[^\]]*\]", |lex| { let s = lex.slice(); s[1..s.len() - 1].to_string() })]
    Identifier(String),

    // keywords
    #[token("and", ignore(ascii_case))]
    And,
    #[token("or", ignore(ascii_case))]
    Or,
    #[token("not", ignore(ascii_case))]
    Not,
    #[token("like", ignore(ascii_case))]
    Like,
    #[token("near", ignore(ascii_case))]
    Near,
    #[token("isabout", ignore(ascii_case))]
    IsAbout,
    #[token("weight", ignore(ascii_case))]
    Weight,
    #[token("formsof", ignore(ascii_case))]
    FormsOf,

    // operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus, // NOTE: can also be unary
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Equals,
    #[token("==")]
    EqualsEquals,
    #[token("!=")]
    NotEquals,
    #[token("<>")]
    LessGreater,
    #[token("<")]
    LessThan,
    #[token("<=")]
    LessThanEquals,
    #[token(">")]
    GreaterThan,
    #[token(">=")]
    GreaterThanEquals,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,

    // punctuation
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token(",")]
    Comma,

    // misc
    #[regex(r"--[^\n]*", logos::skip)] // single line comments
    Comment,

    /// Only generated in parse phase when the lexer runs out of tokens.
    Eof,
}

fn quoted(slice: &str, quote: char) -> Result<Quoted, LexErrorKind> {
    if slice.len() >= 2 && slice.ends_with(quote) {
        Ok(Quoted {
            text: slice[1..slice.len() - 1].to_string(),
            quote,
        })
    } else {
        Err(LexErrorKind::UnterminatedString)
    }
}

impl TokenKind {
    /// Returns the binary binding power of a naming-rule operator, or `None` if the token
    /// does not continue a naming-rule expression.
    /// Binding power `0` is reserved for accepting any expression.
    pub fn binop_bp(&self) -> Option<(u8, u8)> {
        match self {
            /* Logical */
            TokenKind::Or | TokenKind::PipePipe => Some((1, 2)),
            TokenKind::And | TokenKind::AmpAmp => Some((3, 4)),
            /* Comparison */
            TokenKind::Equals
            | TokenKind::EqualsEquals
            | TokenKind::NotEquals
            | TokenKind::LessGreater
            | TokenKind::LessThan
            | TokenKind::LessThanEquals
            | TokenKind::GreaterThan
            | TokenKind::GreaterThanEquals
            | TokenKind::Like => Some((6, 7)),
            /* Additive */
            TokenKind::Plus | TokenKind::Minus => Some((8, 9)),
            /* Multiplicative */
            TokenKind::Asterisk | TokenKind::Slash | TokenKind::Percent => Some((10, 11)),
            _ => None,
        }
    }

    /// Binding power of a CONTAINS connective. `NOT` binds tighter than `AND`, `AND` tighter
    /// than `OR`, and `NEAR` tighter than all of them.
    pub fn connective_bp(&self) -> Option<(u8, u8)> {
        match self {
            TokenKind::Or | TokenKind::Pipe => Some((1, 2)),
            TokenKind::And | TokenKind::Amp => Some((3, 4)),
            TokenKind::Near | TokenKind::Tilde => Some((6, 7)),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    /// Human readable description, used in "expected X, found Y" messages.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            TokenKind::Integer(value) => return write!(f, "integer `{}`", value),
            TokenKind::Decimal(value) => return write!(f, "number `{}`", value),
            TokenKind::String(s) => return write!(f, "string {q}{}{q}", s.text, q = s.quote),
            TokenKind::Identifier(ident) => return write!(f, "identifier `{}`", ident),
            TokenKind::Eof => return f.write_str("end of input"),
            TokenKind::Comment => return f.write_str("comment"),
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::Like => "LIKE",
            TokenKind::Near => "NEAR",
            TokenKind::IsAbout => "ISABOUT",
            TokenKind::Weight => "WEIGHT",
            TokenKind::FormsOf => "FORMSOF",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Equals => "=",
            TokenKind::EqualsEquals => "==",
            TokenKind::NotEquals => "!=",
            TokenKind::LessGreater => "<>",
            TokenKind::LessThan => "<",
            TokenKind::LessThanEquals => "<=",
            TokenKind::GreaterThan => ">",
            TokenKind::GreaterThanEquals => ">=",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Bang => "!",
            TokenKind::Tilde => "~",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::Comma => ",",
        };
        write!(f, "`{}`", symbol)
    }
}

/// A token together with its location. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Lazy token stream over a source string.
///
/// Cloning a `Lexer` yields an independent cursor at the same position, so a stream can be
/// restarted from any point. The stream ends after the first error.
#[derive(Clone)]
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    failed: bool,
}

/// Tokenizes `text`. Whitespace and `--` comments are skipped.
pub fn tokenize(text: &str) -> Lexer<'_> {
    Lexer {
        inner: TokenKind::lexer(text),
        failed: false,
    }
}

impl<'a> Lexer<'a> {
    /// Source text being tokenized.
    pub fn source(&self) -> &'a str {
        self.inner.source()
    }

    fn error(&self, kind: LexErrorKind) -> SyntaxError {
        let span = self.inner.span();
        let slice = self.inner.slice();
        match kind {
            LexErrorKind::UnterminatedString => SyntaxError::UnterminatedString { offset: span.start },
            LexErrorKind::IntegerOverflow => SyntaxError::IntegerOverflow {
                offset: span.start,
                text: slice.to_string(),
            },
            LexErrorKind::UnexpectedCharacter => SyntaxError::UnexpectedCharacter {
                offset: span.start,
                found: slice.chars().next().unwrap_or('\0'),
            },
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.inner.next()? {
            Ok(kind) => Some(Ok(Token {
                kind,
                span: self.inner.span().into(),
            })),
            Err(kind) => {
                self.failed = true;
                Some(Err(self.error(kind)))
            }
        }
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text)
            .map(|token| token.map(|token| token.kind))
            .collect::<Result<_, _>>()
            .unwrap()
    }

    fn lex_error(text: &str) -> SyntaxError {
        tokenize(text).find_map(Result::err).unwrap()
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            kinds("42 0.5 .25 'tbl_' \"a b\""),
            vec![
                TokenKind::Integer(42),
                TokenKind::Decimal(0.5),
                TokenKind::Decimal(0.25),
                TokenKind::String(Quoted {
                    text: "tbl_".to_string(),
                    quote: '\''
                }),
                TokenKind::String(Quoted {
                    text: "a b".to_string(),
                    quote: '"'
                }),
            ]
        );
    }

    #[test]
    fn test_keywords_ignore_case() {
        assert_eq!(
            kinds("and Or NOT isAbout android"),
            vec![
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Not,
                TokenKind::IsAbout,
                TokenKind::Identifier("android".to_string()),
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            kinds("name #tmp @var [my table]"),
            vec![
                TokenKind::Identifier("name".to_string()),
                TokenKind::Identifier("#tmp".to_string()),
                TokenKind::Identifier("@var".to_string()),
                TokenKind::Identifier("my table".to_string()),
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("<= <> < == = || | && & ! != ~"),
            vec![
                TokenKind::LessThanEquals,
                TokenKind::LessGreater,
                TokenKind::LessThan,
                TokenKind::EqualsEquals,
                TokenKind::Equals,
                TokenKind::PipePipe,
                TokenKind::Pipe,
                TokenKind::AmpAmp,
                TokenKind::Amp,
                TokenKind::Bang,
                TokenKind::NotEquals,
                TokenKind::Tilde,
            ]
        );
    }

    #[test]
    fn test_spans_and_comments() {
        let tokens: Vec<Token> = tokenize("len(name) -- trailing\n> 3")
            .collect::<Result<_, _>>()
            .unwrap();
        let spans: Vec<Span> = tokens.iter().map(|token| token.span).collect();
        assert_eq!(
            spans,
            vec![
                Span::new(0, 3),
                Span::new(3, 4),
                Span::new(4, 8),
                Span::new(8, 9),
                Span::new(22, 23),
                Span::new(24, 25),
            ]
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            lex_error("name ? 1"),
            SyntaxError::UnexpectedCharacter {
                offset: 5,
                found: '?'
            }
        );
        assert_eq!(
            lex_error("starts_with(name, 'tbl"),
            SyntaxError::UnterminatedString { offset: 18 }
        );
        assert_eq!(lex_error("\""), SyntaxError::UnterminatedString { offset: 0 });
        assert_eq!(
            lex_error("99999999999999999999"),
            SyntaxError::IntegerOverflow {
                offset: 0,
                text: "99999999999999999999".to_string()
            }
        );
    }

    #[test]
    fn test_stops_after_error() {
        let mut lexer = tokenize("1 ? 2");
        assert!(lexer.next().unwrap().is_ok());
        assert!(lexer.next().unwrap().is_err());
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_restartable() {
        let mut lexer = tokenize("a b c");
        lexer.next();
        let rest: Vec<_> = lexer.clone().collect();
        assert_eq!(rest.len(), 2);
        assert_eq!(lexer.collect::<Vec<_>>(), rest);
    }

    proptest! {
        /// Every character is covered by exactly one token, skipped as whitespace/comment, or
        /// lexing fails.
        #[test]
        fn lexing_is_total(text in r#"[a-z0-9 ()',"<>=!&|~+*/%.\-\n]{0,40}"#) {
            let mut covered = vec![false; text.len()];
            let mut failed = false;
            for token in tokenize(&text) {
                match token {
                    Ok(token) => {
                        for slot in &mut covered[token.span.start..token.span.end] {
                            prop_assert!(!*slot, "overlapping tokens");
                            *slot = true;
                        }
                    }
                    Err(_) => failed = true,
                }
            }
            if !failed {
                let mut in_comment = false;
                for (i, c) in text.char_indices() {
                    if c == '\n' {
                        in_comment = false;
                    } else if !covered[i] && text[i..].starts_with("--") {
                        in_comment = true;
                    }
                    prop_assert!(covered[i] || in_comment || c.is_whitespace(), "dropped {:?} at {}", c, i);
                }
            }
        }
    }
}
