//! Typed syntax trees.
//!
//! Every node owns its children and records the [`Span`] of source text it was parsed from.
//! Trees are built bottom-up by the parser and never mutated afterwards.
//! [`NodeRef`] gives a uniform, tagged view over the nodes of both grammars.

pub mod contains;
pub mod naming;

use std::fmt::{self, Write};

use tsql_source::Span;

use contains::{SimpleTerm, Term, WeightedItem};
use naming::{ArgList, Expr, UnaryOp};

/// Tag of every node variant of both grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    IntegerLiteralExpr,
    StringLiteralExpr,
    ReferenceExpr,
    ArgList,
    ParenExpr,
    UnaryExpr,
    BinaryExpr,
    SimpleTerm,
    WeightedTerm,
    WeightedItem,
    GenerationTerm,
    GroupTerm,
    NotTerm,
    BooleanTerm,
    ProximityTerm,
}

/// A borrowed reference to any syntax node.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Expr(&'a Expr),
    ArgList(&'a ArgList),
    Term(&'a Term),
    SimpleTerm(&'a SimpleTerm),
    WeightedItem(&'a WeightedItem),
}

impl<'a> NodeRef<'a> {
    pub fn kind(self) -> SyntaxKind {
        match self {
            NodeRef::Expr(expr) => match expr {
                Expr::IntegerLiteral(_) => SyntaxKind::IntegerLiteralExpr,
                Expr::StringLiteral(_) => SyntaxKind::StringLiteralExpr,
                Expr::Reference(_) => SyntaxKind::ReferenceExpr,
                Expr::Paren(_) => SyntaxKind::ParenExpr,
                Expr::Unary(_) => SyntaxKind::UnaryExpr,
                Expr::Binary(_) => SyntaxKind::BinaryExpr,
            },
            NodeRef::ArgList(_) => SyntaxKind::ArgList,
            NodeRef::Term(term) => match term {
                Term::Simple(_) => SyntaxKind::SimpleTerm,
                Term::Weighted(_) => SyntaxKind::WeightedTerm,
                Term::Generation(_) => SyntaxKind::GenerationTerm,
                Term::Group(_) => SyntaxKind::GroupTerm,
                Term::Not(_) => SyntaxKind::NotTerm,
                Term::Boolean(_) => SyntaxKind::BooleanTerm,
                Term::Proximity(_) => SyntaxKind::ProximityTerm,
            },
            NodeRef::SimpleTerm(_) => SyntaxKind::SimpleTerm,
            NodeRef::WeightedItem(_) => SyntaxKind::WeightedItem,
        }
    }

    pub fn span(self) -> Span {
        match self {
            NodeRef::Expr(expr) => expr.span(),
            NodeRef::ArgList(args) => args.span,
            NodeRef::Term(term) => term.span(),
            NodeRef::SimpleTerm(term) => term.span,
            NodeRef::WeightedItem(item) => item.span,
        }
    }

    /// Direct children, in source order. Leaves have none.
    pub fn children(self) -> Vec<NodeRef<'a>> {
        match self {
            NodeRef::Expr(expr) => match expr {
                Expr::IntegerLiteral(_) | Expr::StringLiteral(_) => Vec::new(),
                Expr::Reference(reference) => {
                    reference.args.iter().map(NodeRef::ArgList).collect()
                }
                Expr::Paren(paren) => vec![NodeRef::Expr(&paren.expr)],
                Expr::Unary(unary) => vec![NodeRef::Expr(&unary.operand)],
                Expr::Binary(binary) => vec![NodeRef::Expr(&binary.lhs), NodeRef::Expr(&binary.rhs)],
            },
            NodeRef::ArgList(args) => args.exprs.iter().map(NodeRef::Expr).collect(),
            NodeRef::Term(term) => match term {
                Term::Simple(_) => Vec::new(),
                Term::Weighted(weighted) => {
                    weighted.items.iter().map(NodeRef::WeightedItem).collect()
                }
                Term::Generation(generation) => {
                    generation.terms.iter().map(NodeRef::SimpleTerm).collect()
                }
                Term::Group(group) => vec![NodeRef::Term(&group.term)],
                Term::Not(not) => vec![NodeRef::Term(&not.term)],
                Term::Boolean(boolean) => {
                    vec![NodeRef::Term(&boolean.lhs), NodeRef::Term(&boolean.rhs)]
                }
                Term::Proximity(proximity) => {
                    vec![NodeRef::Term(&proximity.lhs), NodeRef::Term(&proximity.rhs)]
                }
            },
            NodeRef::SimpleTerm(_) => Vec::new(),
            NodeRef::WeightedItem(item) => vec![NodeRef::SimpleTerm(&item.term)],
        }
    }

    /// Pre-order walk over this node and everything below it.
    pub fn descendants(self) -> Descendants<'a> {
        Descendants { stack: vec![self] }
    }

    /// S-expression of the structure below this node, without spans.
    pub fn dump(self) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = write_dump(&mut out, self);
        out
    }
}

pub struct Descendants<'a> {
    stack: Vec<NodeRef<'a>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().into_iter().rev());
        Some(node)
    }
}

fn write_dump(out: &mut String, node: NodeRef<'_>) -> fmt::Result {
    /// Writes `(head child...)`.
    fn list(out: &mut String, head: &str, children: Vec<NodeRef<'_>>) -> fmt::Result {
        write!(out, "({}", head)?;
        for child in children {
            out.push(' ');
            write_dump(out, child)?;
        }
        out.push(')');
        Ok(())
    }

    match node {
        NodeRef::Expr(expr) => match expr {
            Expr::IntegerLiteral(_) | Expr::StringLiteral(_) => write!(out, "{}", expr),
            Expr::Reference(reference) => match &reference.args {
                Some(args) => {
                    let mut head = String::from("call ");
                    write_ident(&mut head, &reference.ident.name)?;
                    list(out, &head, args.exprs.iter().map(NodeRef::Expr).collect())
                }
                None => write!(out, "{}", expr),
            },
            Expr::Paren(_) => list(out, "paren", node.children()),
            Expr::Unary(unary) => match unary.op {
                UnaryOp::Not => list(out, "NOT", node.children()),
                UnaryOp::Neg => list(out, "neg", node.children()),
            },
            Expr::Binary(binary) => list(out, binary.op.as_str(), node.children()),
        },
        NodeRef::ArgList(_) => list(out, "args", node.children()),
        NodeRef::Term(term) => match term {
            Term::Simple(simple) => write!(out, "{}", simple),
            Term::Weighted(_) => list(out, "ISABOUT", node.children()),
            Term::Generation(generation) => list(
                out,
                &format!("FORMSOF {}", generation.form.as_str()),
                node.children(),
            ),
            Term::Group(_) => list(out, "group", node.children()),
            Term::Not(_) => list(out, "NOT", node.children()),
            Term::Boolean(boolean) => list(out, boolean.op.as_str(), node.children()),
            Term::Proximity(_) => list(out, "NEAR", node.children()),
        },
        NodeRef::SimpleTerm(simple) => write!(out, "{}", simple),
        NodeRef::WeightedItem(item) => match item.weight {
            Some(weight) => write!(out, "(WEIGHT {} {})", item.term, weight),
            None => write!(out, "{}", item.term),
        },
    }
}

const KEYWORDS: &[&str] = &[
    "and", "or", "not", "like", "near", "isabout", "weight", "formsof",
];

/// Writes an identifier, bracket-quoting it when it would not lex back as the same identifier.
pub(crate) fn write_ident(f: &mut impl Write, name: &str) -> fmt::Result {
    let mut chars = name.chars();
    let plain = chars
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || matches!(c, '_' | '#' | '@'))
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '#' | '@' | '$'))
        && !KEYWORDS.iter().any(|keyword| keyword.eq_ignore_ascii_case(name));
    if plain {
        f.write_str(name)
    } else {
        write!(f, "[{}]", name)
    }
}
