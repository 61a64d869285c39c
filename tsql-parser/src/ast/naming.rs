//! Syntax tree of the naming-rule expression language.

use std::fmt;

use tsql_source::Span;

use super::{write_ident, NodeRef};
use crate::lexer::{Quoted, TokenKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// An integer literal (e.g. `30`).
    IntegerLiteral(IntegerLiteralExpr),
    /// A string literal (e.g. `'tbl_'`).
    StringLiteral(StringLiteralExpr),
    /// A variable (e.g. `name`) or a function call (e.g. `len(name)`).
    Reference(ReferenceExpr),
    /// A parenthesized expression.
    Paren(ParenExpr),
    /// A prefix expression (e.g. `NOT x`).
    Unary(UnaryExpr),
    /// A binary expression (e.g. `1 + 1`).
    Binary(BinaryExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::IntegerLiteral(expr) => expr.span,
            Expr::StringLiteral(expr) => expr.span,
            Expr::Reference(expr) => expr.span,
            Expr::Paren(expr) => expr.span,
            Expr::Unary(expr) => expr.span,
            Expr::Binary(expr) => expr.span,
        }
    }

    pub fn as_node(&self) -> NodeRef<'_> {
        NodeRef::Expr(self)
    }

    /// S-expression of the tree structure, without spans.
    pub fn dump(&self) -> String {
        self.as_node().dump()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntegerLiteralExpr {
    pub value: u64,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteralExpr {
    pub value: Quoted,
    pub span: Span,
}

impl StringLiteralExpr {
    pub fn text(&self) -> &str {
        &self.value.text
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceExpr {
    pub ident: Ident,
    /// Present when the reference is a function call.
    pub args: Option<ArgList>,
    pub span: Span,
}

impl ReferenceExpr {
    pub fn is_call(&self) -> bool {
        self.args.is_some()
    }
}

/// Parenthesized, comma separated call arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgList {
    pub exprs: Vec<Expr>,
    pub span: Span,
}

impl ArgList {
    pub fn expr_list(&self) -> &[Expr] {
        &self.exprs
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpr {
    pub expr: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub lhs: Box<Expr>,
    pub op: BinaryOp,
    pub rhs: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Like,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    /// Maps an operator token to its operator. Alternative spellings (`&&`, `==`, `!=`...)
    /// collapse onto the same operator.
    pub fn from_token(kind: &TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Or | TokenKind::PipePipe => BinaryOp::Or,
            TokenKind::And | TokenKind::AmpAmp => BinaryOp::And,
            TokenKind::Equals | TokenKind::EqualsEquals => BinaryOp::Eq,
            TokenKind::NotEquals | TokenKind::LessGreater => BinaryOp::NotEq,
            TokenKind::LessThan => BinaryOp::Lt,
            TokenKind::LessThanEquals => BinaryOp::LtEq,
            TokenKind::GreaterThan => BinaryOp::Gt,
            TokenKind::GreaterThanEquals => BinaryOp::GtEq,
            TokenKind::Like => BinaryOp::Like,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Asterisk => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Rem,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Or => "OR",
            BinaryOp::And => "AND",
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Like => "LIKE",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Not => "NOT",
            UnaryOp::Neg => "-",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/* Unparsing */

impl fmt::Display for Expr {
    /// Writes the canonical text of the expression. The token sequence is preserved, so
    /// parsing the output yields the same tree shape.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::IntegerLiteral(lit) => write!(f, "{}", lit.value),
            Expr::StringLiteral(lit) => write!(f, "{q}{}{q}", lit.value.text, q = lit.value.quote),
            Expr::Reference(reference) => {
                write_ident(f, &reference.ident.name)?;
                match &reference.args {
                    Some(args) => write!(f, "{}", args),
                    None => Ok(()),
                }
            }
            Expr::Paren(paren) => write!(f, "({})", paren.expr),
            Expr::Unary(unary) => match unary.op {
                UnaryOp::Not => write!(f, "NOT {}", unary.operand),
                // `--` would start a comment
                UnaryOp::Neg if matches!(*unary.operand, Expr::Unary(_)) => {
                    write!(f, "- {}", unary.operand)
                }
                UnaryOp::Neg => write!(f, "-{}", unary.operand),
            },
            Expr::Binary(binary) => write!(f, "{} {} {}", binary.lhs, binary.op, binary.rhs),
        }
    }
}

impl fmt::Display for ArgList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, expr) in self.exprs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", expr)?;
        }
        f.write_str(")")
    }
}
