use super::*;
use crate::ast::naming::{
    ArgList, BinaryExpr, BinaryOp, Ident, IntegerLiteralExpr, ParenExpr, ReferenceExpr,
    StringLiteralExpr, UnaryExpr, UnaryOp,
};

/// Right binding power of prefix `NOT`: looser than comparisons, tighter than `AND`.
const NOT_BP: u8 = 5;
/// Right binding power of prefix `-`: tighter than every binary operator.
const NEG_BP: u8 = 12;

impl<'a> Parser<'a> {
    /* Expressions */
    /// Parses any expression.
    /// This is equivalent to calling [`Self::parse_expr_bp`] with `min_bp = 0`.
    pub fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_expr_bp(0) // 0 to accept any expression
    }

    /// Parses a primary (atom) expression.
    fn parse_primary_expr(&mut self) -> ParseResult<Expr> {
        // NOTE: prefix operators are handled here
        match self.current_token.kind {
            TokenKind::Integer(_) | TokenKind::String(_) => self.parse_literal_expr(),
            TokenKind::Identifier(_) => self.parse_reference_expr(),
            TokenKind::OpenParen => self.parse_paren_expr(),
            TokenKind::Not | TokenKind::Bang => self.parse_unary_expr(UnaryOp::Not, NOT_BP),
            TokenKind::Minus => self.parse_unary_expr(UnaryOp::Neg, NEG_BP),
            _ => self.unexpected("expression"),
        }
    }

    /// Parses an expression with the specified `min_bp`.
    /// To parse any expression use, [`Self::parse_expr`].
    fn parse_expr_bp(&mut self, min_bp: u8) -> ParseResult<Expr> {
        self.enter()?;
        let mut lhs = self.parse_primary_expr()?;
        let mut height = self.height;

        loop {
            let kind = &self.current_token.kind;
            let (op, (l_bp, r_bp)) = match (BinaryOp::from_token(kind), kind.binop_bp()) {
                (Some(op), Some(bp)) => (op, bp),
                _ => break, // not a valid binop, stop parsing
            };
            if l_bp < min_bp {
                break; // less than the min_bp, stop parsing
            }

            // self.current_token is a valid binop
            let op_token = self.next()?;

            let rhs = self.parse_expr_bp(r_bp)?;
            height = self.node_height(height.max(self.height), op_token.span.start)?;

            lhs = Expr::Binary(BinaryExpr {
                span: lhs.span().cover(rhs.span()),
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            });
        }

        self.height = height;
        self.leave();
        Ok(lhs)
    }

    fn parse_unary_expr(&mut self, op: UnaryOp, r_bp: u8) -> ParseResult<Expr> {
        let op_token = self.next()?;
        let operand = self.parse_expr_bp(r_bp)?;
        self.height = self.node_height(self.height, op_token.span.start)?;
        Ok(Expr::Unary(UnaryExpr {
            span: op_token.span.cover(operand.span()),
            op,
            operand: Box::new(operand),
        }))
    }

    /* Expressions.Literals */
    /// Parses a literal expression.
    /// A literal can be either an integer literal or a string literal.
    fn parse_literal_expr(&mut self) -> ParseResult<Expr> {
        let span = self.current_token.span;
        let expr = match &self.current_token.kind {
            TokenKind::Integer(value) => Expr::IntegerLiteral(IntegerLiteralExpr {
                value: *value,
                span,
            }),
            TokenKind::String(value) => Expr::StringLiteral(StringLiteralExpr {
                value: value.clone(),
                span,
            }),
            _ => return self.unexpected("literal"),
        };
        self.next()?; // eat parsed token
        self.height = 1;
        Ok(expr)
    }

    fn parse_paren_expr(&mut self) -> ParseResult<Expr> {
        let open = self.expect(TokenKind::OpenParen)?;
        let expr = self.parse_expr()?;
        self.height = self.node_height(self.height, open.span.start)?;
        let close = self.expect(TokenKind::CloseParen)?;
        Ok(Expr::Paren(ParenExpr {
            expr: Box::new(expr),
            span: open.span.cover(close.span),
        }))
    }

    /* Expressions.Reference */
    /// Parses an identifier or a call expression.
    fn parse_reference_expr(&mut self) -> ParseResult<Expr> {
        let ident = match &self.current_token.kind {
            TokenKind::Identifier(name) => Ident {
                name: name.clone(),
                span: self.current_token.span,
            },
            _ => return self.unexpected("identifier"),
        };
        self.next()?;

        let args = if self.at(&TokenKind::OpenParen) {
            let args = self.parse_arg_list()?;
            self.height = self.node_height(self.height, ident.span.start)?;
            Some(args)
        } else {
            self.height = 1;
            None
        };

        Ok(Expr::Reference(ReferenceExpr {
            span: args
                .as_ref()
                .map_or(ident.span, |args| ident.span.cover(args.span)),
            ident,
            args,
        }))
    }

    /// Parses `( expr, ... )`. The list may be empty.
    fn parse_arg_list(&mut self) -> ParseResult<ArgList> {
        let open = self.expect(TokenKind::OpenParen)?;
        let mut exprs = Vec::new();
        let mut tallest = 0;

        let close = match self.eat(TokenKind::CloseParen)? {
            Some(close) => close,
            None => loop {
                exprs.push(self.parse_expr()?);
                tallest = tallest.max(self.height);

                if let Some(close) = self.eat(TokenKind::CloseParen)? {
                    break close;
                } else if self.eat(TokenKind::Comma)?.is_none() {
                    return self.unexpected("`,` or `)`");
                }
            },
        };

        self.height = self.node_height(tallest, open.span.start)?;
        Ok(ArgList {
            exprs,
            span: open.span.cover(close.span),
        })
    }
}
