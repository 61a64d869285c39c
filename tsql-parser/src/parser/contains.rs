use super::*;
use crate::ast::contains::{
    BooleanOp, BooleanTerm, GenerationForm, GenerationTerm, GroupTerm, Literal, NotTerm,
    ProximityTerm, SimpleTerm, WeightedItem, WeightedTerm,
};

/// Right binding power of prefix `NOT`: tighter than `AND`, looser than `NEAR`.
const NOT_BP: u8 = 5;

impl<'a> Parser<'a> {
    /// Parses any search condition.
    pub fn parse_term(&mut self) -> ParseResult<Term> {
        self.parse_term_bp(0)
    }

    fn parse_term_bp(&mut self, min_bp: u8) -> ParseResult<Term> {
        self.enter()?;
        let mut lhs = self.parse_primary_term()?;
        let mut height = self.height;

        loop {
            let (l_bp, r_bp) = match self.current_token.kind.connective_bp() {
                Some(bp) => bp,
                None => break,
            };
            if l_bp < min_bp {
                break;
            }

            let connective = self.next()?;
            let rhs = self.parse_term_bp(r_bp)?;
            height = self.node_height(height.max(self.height), connective.span.start)?;
            let span = lhs.span().cover(rhs.span());
            let (lhs_box, rhs_box) = (Box::new(lhs), Box::new(rhs));

            lhs = match connective.kind {
                TokenKind::Near | TokenKind::Tilde => Term::Proximity(ProximityTerm {
                    lhs: lhs_box,
                    rhs: rhs_box,
                    span,
                }),
                TokenKind::And | TokenKind::Amp => Term::Boolean(BooleanTerm {
                    lhs: lhs_box,
                    op: BooleanOp::And,
                    rhs: rhs_box,
                    span,
                }),
                // connective_bp admits nothing else
                _ => Term::Boolean(BooleanTerm {
                    lhs: lhs_box,
                    op: BooleanOp::Or,
                    rhs: rhs_box,
                    span,
                }),
            };
        }

        self.height = height;
        self.leave();
        Ok(lhs)
    }

    fn parse_primary_term(&mut self) -> ParseResult<Term> {
        match self.current_token.kind {
            TokenKind::String(_) | TokenKind::Identifier(_) => {
                self.parse_simple_term().map(Term::Simple)
            }
            TokenKind::OpenParen => {
                let open = self.next()?;
                let term = self.parse_term()?;
                self.height = self.node_height(self.height, open.span.start)?;
                let close = self.expect(TokenKind::CloseParen)?;
                Ok(Term::Group(GroupTerm {
                    term: Box::new(term),
                    span: open.span.cover(close.span),
                }))
            }
            TokenKind::Not | TokenKind::Bang => {
                let not = self.next()?;
                let term = self.parse_term_bp(NOT_BP)?;
                self.height = self.node_height(self.height, not.span.start)?;
                Ok(Term::Not(NotTerm {
                    span: not.span.cover(term.span()),
                    term: Box::new(term),
                }))
            }
            TokenKind::IsAbout => self.parse_weighted_term(),
            TokenKind::FormsOf => self.parse_generation_term(),
            _ => self.unexpected("search term"),
        }
    }

    /// Parses a quoted phrase or a bare word.
    fn parse_simple_term(&mut self) -> ParseResult<SimpleTerm> {
        let literal = match &self.current_token.kind {
            TokenKind::String(quoted) => Literal::Phrase(quoted.clone()),
            TokenKind::Identifier(word) => Literal::Word(word.clone()),
            _ => return self.unexpected("word or phrase"),
        };
        let token = self.next()?;
        self.height = 1;
        Ok(SimpleTerm {
            literal,
            span: token.span,
        })
    }

    /// `ISABOUT ( item [WEIGHT ( n )], ... )`
    fn parse_weighted_term(&mut self) -> ParseResult<Term> {
        let keyword = self.expect(TokenKind::IsAbout)?;
        self.expect(TokenKind::OpenParen)?;

        let mut items = Vec::new();
        let close = loop {
            items.push(self.parse_weighted_item()?);

            if let Some(close) = self.eat(TokenKind::CloseParen)? {
                break close;
            } else if self.eat(TokenKind::Comma)?.is_none() {
                return self.unexpected("`,` or `)`");
            }
        };

        // term, item, simple term
        self.height = 3;
        Ok(Term::Weighted(WeightedTerm {
            items,
            span: keyword.span.cover(close.span),
        }))
    }

    fn parse_weighted_item(&mut self) -> ParseResult<WeightedItem> {
        let term = self.parse_simple_term()?;
        let mut span = term.span;

        let weight = if self.eat(TokenKind::Weight)?.is_some() {
            self.expect(TokenKind::OpenParen)?;
            let value = self.parse_weight()?;
            span = span.cover(self.expect(TokenKind::CloseParen)?.span);
            Some(value)
        } else {
            None
        };

        Ok(WeightedItem { term, weight, span })
    }

    fn parse_weight(&mut self) -> ParseResult<f64> {
        let value = match self.current_token.kind {
            TokenKind::Decimal(value) => value,
            TokenKind::Integer(value) => value as f64,
            _ => return self.unexpected("weight"),
        };
        if !(0.0..=1.0).contains(&value) {
            return Err(SyntaxError::WeightOutOfRange {
                offset: self.current_token.span.start,
                value,
            });
        }
        self.next()?;
        Ok(value)
    }

    /// `FORMSOF ( INFLECTIONAL | THESAURUS , term, ... )`
    fn parse_generation_term(&mut self) -> ParseResult<Term> {
        let keyword = self.expect(TokenKind::FormsOf)?;
        self.expect(TokenKind::OpenParen)?;

        let form = match &self.current_token.kind {
            TokenKind::Identifier(name) => GenerationForm::from_name(name),
            _ => None,
        };
        let form = match form {
            Some(form) => form,
            None => return self.unexpected("`INFLECTIONAL` or `THESAURUS`"),
        };
        self.next()?;

        let mut terms = Vec::new();
        let close = loop {
            self.expect(TokenKind::Comma)?;
            terms.push(self.parse_simple_term()?);

            if let Some(close) = self.eat(TokenKind::CloseParen)? {
                break close;
            }
        };

        self.height = 2;
        Ok(Term::Generation(GenerationTerm {
            form,
            terms,
            span: keyword.span.cover(close.span),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    fn term(source: &str) -> String {
        parse_contains(source).unwrap().dump()
    }

    fn error(source: &str) -> SyntaxError {
        parse_contains(source).unwrap_err()
    }

    #[test]
    fn test_simple_term() {
        assert_snapshot!(term("sql"), @"sql");
        assert_snapshot!(term(r#""sql server""#), @r#""sql server""#);
        assert_snapshot!(term(r#""data*""#), @r#""data*""#);
    }

    #[test]
    fn test_boolean_precedence() {
        assert_snapshot!(term("a AND b OR c"), @"(OR (AND a b) c)");
        assert_snapshot!(term("a OR b AND c"), @"(OR a (AND b c))");
        assert_snapshot!(term("a & b | c"), @"(OR (AND a b) c)");
        assert_snapshot!(term("a AND NOT b"), @"(AND a (NOT b))");
        assert_snapshot!(term("NOT a AND b"), @"(AND (NOT a) b)");
        assert_snapshot!(term("a &! b"), @"(AND a (NOT b))");
    }

    #[test]
    fn test_proximity() {
        assert_snapshot!(term("a NEAR b AND c"), @"(AND (NEAR a b) c)");
        assert_snapshot!(term("NOT a ~ b"), @"(NOT (NEAR a b))");
        assert_snapshot!(term("a NEAR b NEAR c"), @"(NEAR (NEAR a b) c)");
    }

    #[test]
    fn test_group() {
        assert_snapshot!(term("a AND (b OR c)"), @"(AND a (group (OR b c)))");
    }

    #[test]
    fn test_weighted_term() {
        assert_snapshot!(
            term(r#"ISABOUT(performance WEIGHT(.8), "sql server" WEIGHT(1), tuning)"#),
            @r#"(ISABOUT (WEIGHT performance 0.8) (WEIGHT "sql server" 1) tuning)"#
        );
        assert_snapshot!(term("isabout(a) OR b"), @"(OR (ISABOUT a) b)");
    }

    #[test]
    fn test_generation_term() {
        assert_snapshot!(
            term("FORMSOF(INFLECTIONAL, run, \"ran\")"),
            @r#"(FORMSOF INFLECTIONAL run "ran")"#
        );
        assert_snapshot!(term("formsof(thesaurus, car)"), @"(FORMSOF THESAURUS car)");
    }

    #[test]
    fn test_spans() {
        let parsed = parse_contains("ISABOUT(a WEIGHT(0.5)) OR b").unwrap();
        assert_eq!(parsed.span(), Span::new(0, 27));
        match parsed {
            Term::Boolean(boolean) => match *boolean.lhs {
                Term::Weighted(weighted) => {
                    assert_eq!(weighted.span, Span::new(0, 22));
                    assert_eq!(weighted.items[0].span, Span::new(8, 21));
                }
                other => panic!("expected weighted term, got {:?}", other),
            },
            other => panic!("expected boolean term, got {:?}", other),
        }
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            error("a AND"),
            SyntaxError::unexpected("search term", "end of input", 5)
        );
        assert_eq!(
            error("(a OR b"),
            SyntaxError::unexpected("`)`", "end of input", 7)
        );
        assert_eq!(
            error("ISABOUT(a WEIGHT(1.5))"),
            SyntaxError::WeightOutOfRange {
                offset: 17,
                value: 1.5
            }
        );
        assert_eq!(
            error("ISABOUT()"),
            SyntaxError::unexpected("word or phrase", "`)`", 8)
        );
        assert_eq!(
            error("FORMSOF(PLURAL, x)"),
            SyntaxError::unexpected("`INFLECTIONAL` or `THESAURUS`", "identifier `PLURAL`", 8)
        );
        assert_eq!(
            error("FORMSOF(INFLECTIONAL)"),
            SyntaxError::unexpected("`,`", "`)`", 20)
        );
        assert_eq!(
            error("1 AND a"),
            SyntaxError::unexpected("search term", "integer `1`", 0)
        );
        assert_eq!(
            error("a b"),
            SyntaxError::unexpected("end of input", "identifier `b`", 2)
        );
    }

    #[test]
    fn test_nesting_limit() {
        assert_eq!(
            error(&format!("{}a", "NOT ".repeat(10_000))),
            SyntaxError::NestingTooDeep { offset: 1024 }
        );
        assert_eq!(
            error(&format!("a{}", " AND a".repeat(300))),
            SyntaxError::NestingTooDeep { offset: 1532 }
        );
        assert!(parse_contains(&format!("a{}", " OR a".repeat(255))).is_ok());
    }
}
