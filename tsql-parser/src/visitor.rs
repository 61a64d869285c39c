//! Visitor pattern for syntax tree nodes.
//!
//! Each method is a hook for one node variant. The default implementation of every method
//! calls the matching `walk_*` function, which visits the node's children, so a visitor
//! overriding only a few methods still reaches every node. An overriding method that wants
//! to keep descending calls the `walk_*` function itself.

use crate::ast::contains::{
    BooleanTerm, GenerationTerm, GroupTerm, NotTerm, ProximityTerm, SimpleTerm, Term,
    WeightedItem, WeightedTerm,
};
use crate::ast::naming::{
    ArgList, BinaryExpr, Expr, IntegerLiteralExpr, ParenExpr, ReferenceExpr, StringLiteralExpr,
    UnaryExpr,
};

pub trait ExprVisitor<'ast>: Sized {
    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }
    fn visit_integer_literal_expr(&mut self, _expr: &'ast IntegerLiteralExpr) {}
    fn visit_string_literal_expr(&mut self, _expr: &'ast StringLiteralExpr) {}
    fn visit_reference_expr(&mut self, expr: &'ast ReferenceExpr) {
        walk_reference_expr(self, expr);
    }
    fn visit_arg_list(&mut self, args: &'ast ArgList) {
        walk_arg_list(self, args);
    }
    fn visit_paren_expr(&mut self, expr: &'ast ParenExpr) {
        walk_paren_expr(self, expr);
    }
    fn visit_unary_expr(&mut self, expr: &'ast UnaryExpr) {
        walk_unary_expr(self, expr);
    }
    fn visit_binary_expr(&mut self, expr: &'ast BinaryExpr) {
        walk_binary_expr(self, expr);
    }
}

/// Dispatches `expr` to the visitor method of its variant.
pub fn walk_expr<'ast>(visitor: &mut impl ExprVisitor<'ast>, expr: &'ast Expr) {
    match expr {
        Expr::IntegerLiteral(lit) => visitor.visit_integer_literal_expr(lit),
        Expr::StringLiteral(lit) => visitor.visit_string_literal_expr(lit),
        Expr::Reference(reference) => visitor.visit_reference_expr(reference),
        Expr::Paren(paren) => visitor.visit_paren_expr(paren),
        Expr::Unary(unary) => visitor.visit_unary_expr(unary),
        Expr::Binary(binary) => visitor.visit_binary_expr(binary),
    }
}

pub fn walk_reference_expr<'ast>(visitor: &mut impl ExprVisitor<'ast>, expr: &'ast ReferenceExpr) {
    if let Some(args) = &expr.args {
        visitor.visit_arg_list(args);
    }
}

pub fn walk_arg_list<'ast>(visitor: &mut impl ExprVisitor<'ast>, args: &'ast ArgList) {
    for arg in &args.exprs {
        visitor.visit_expr(arg);
    }
}

pub fn walk_paren_expr<'ast>(visitor: &mut impl ExprVisitor<'ast>, expr: &'ast ParenExpr) {
    visitor.visit_expr(&expr.expr);
}

pub fn walk_unary_expr<'ast>(visitor: &mut impl ExprVisitor<'ast>, expr: &'ast UnaryExpr) {
    visitor.visit_expr(&expr.operand);
}

pub fn walk_binary_expr<'ast>(visitor: &mut impl ExprVisitor<'ast>, expr: &'ast BinaryExpr) {
    visitor.visit_expr(&expr.lhs);
    visitor.visit_expr(&expr.rhs);
}

pub trait TermVisitor<'ast>: Sized {
    fn visit_term(&mut self, term: &'ast Term) {
        walk_term(self, term);
    }
    fn visit_simple_term(&mut self, _term: &'ast SimpleTerm) {}
    fn visit_weighted_term(&mut self, term: &'ast WeightedTerm) {
        walk_weighted_term(self, term);
    }
    fn visit_weighted_item(&mut self, item: &'ast WeightedItem) {
        walk_weighted_item(self, item);
    }
    fn visit_generation_term(&mut self, term: &'ast GenerationTerm) {
        walk_generation_term(self, term);
    }
    fn visit_group_term(&mut self, term: &'ast GroupTerm) {
        walk_group_term(self, term);
    }
    fn visit_not_term(&mut self, term: &'ast NotTerm) {
        walk_not_term(self, term);
    }
    fn visit_boolean_term(&mut self, term: &'ast BooleanTerm) {
        walk_boolean_term(self, term);
    }
    fn visit_proximity_term(&mut self, term: &'ast ProximityTerm) {
        walk_proximity_term(self, term);
    }
}

/// Dispatches `term` to the visitor method of its variant.
pub fn walk_term<'ast>(visitor: &mut impl TermVisitor<'ast>, term: &'ast Term) {
    match term {
        Term::Simple(simple) => visitor.visit_simple_term(simple),
        Term::Weighted(weighted) => visitor.visit_weighted_term(weighted),
        Term::Generation(generation) => visitor.visit_generation_term(generation),
        Term::Group(group) => visitor.visit_group_term(group),
        Term::Not(not) => visitor.visit_not_term(not),
        Term::Boolean(boolean) => visitor.visit_boolean_term(boolean),
        Term::Proximity(proximity) => visitor.visit_proximity_term(proximity),
    }
}

pub fn walk_weighted_term<'ast>(visitor: &mut impl TermVisitor<'ast>, term: &'ast WeightedTerm) {
    for item in &term.items {
        visitor.visit_weighted_item(item);
    }
}

pub fn walk_weighted_item<'ast>(visitor: &mut impl TermVisitor<'ast>, item: &'ast WeightedItem) {
    visitor.visit_simple_term(&item.term);
}

pub fn walk_generation_term<'ast>(
    visitor: &mut impl TermVisitor<'ast>,
    term: &'ast GenerationTerm,
) {
    for simple in &term.terms {
        visitor.visit_simple_term(simple);
    }
}

pub fn walk_group_term<'ast>(visitor: &mut impl TermVisitor<'ast>, term: &'ast GroupTerm) {
    visitor.visit_term(&term.term);
}

pub fn walk_not_term<'ast>(visitor: &mut impl TermVisitor<'ast>, term: &'ast NotTerm) {
    visitor.visit_term(&term.term);
}

pub fn walk_boolean_term<'ast>(visitor: &mut impl TermVisitor<'ast>, term: &'ast BooleanTerm) {
    visitor.visit_term(&term.lhs);
    visitor.visit_term(&term.rhs);
}

pub fn walk_proximity_term<'ast>(visitor: &mut impl TermVisitor<'ast>, term: &'ast ProximityTerm) {
    visitor.visit_term(&term.lhs);
    visitor.visit_term(&term.rhs);
}
