//! Syntax tree of the CONTAINS full-text predicate language.

use std::fmt;

use tsql_source::Span;

use super::{write_ident, NodeRef};
use crate::lexer::Quoted;

#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// A word or a quoted phrase.
    Simple(SimpleTerm),
    /// `ISABOUT(a WEIGHT(0.8), b)`.
    Weighted(WeightedTerm),
    /// `FORMSOF(INFLECTIONAL, run)`.
    Generation(GenerationTerm),
    /// A parenthesized term.
    Group(GroupTerm),
    /// `NOT a`.
    Not(NotTerm),
    /// `a AND b`, `a OR b`.
    Boolean(BooleanTerm),
    /// `a NEAR b`.
    Proximity(ProximityTerm),
}

impl Term {
    pub fn span(&self) -> Span {
        match self {
            Term::Simple(term) => term.span,
            Term::Weighted(term) => term.span,
            Term::Generation(term) => term.span,
            Term::Group(term) => term.span,
            Term::Not(term) => term.span,
            Term::Boolean(term) => term.span,
            Term::Proximity(term) => term.span,
        }
    }

    pub fn as_node(&self) -> NodeRef<'_> {
        NodeRef::Term(self)
    }

    /// S-expression of the tree structure, without spans.
    pub fn dump(&self) -> String {
        self.as_node().dump()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// A quoted phrase, `"sql server"`.
    Phrase(Quoted),
    /// A bare word.
    Word(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimpleTerm {
    pub literal: Literal,
    pub span: Span,
}

impl SimpleTerm {
    /// Text of the term without quotes.
    pub fn text(&self) -> &str {
        match &self.literal {
            Literal::Phrase(quoted) => &quoted.text,
            Literal::Word(word) => word,
        }
    }

    /// A prefix term is a phrase whose last word ends with `*`, e.g. `"data*"`.
    pub fn is_prefix(&self) -> bool {
        matches!(self.literal, Literal::Phrase(_)) && self.text().trim_end().ends_with('*')
    }

    /// Words of the term, lowercased, with a trailing prefix marker removed.
    pub fn words(&self) -> Vec<String> {
        self.text()
            .split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|word| !word.is_empty())
            .map(str::to_lowercase)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTerm {
    pub items: Vec<WeightedItem>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedItem {
    pub term: SimpleTerm,
    /// Between `0.0` and `1.0`.
    pub weight: Option<f64>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationForm {
    Inflectional,
    Thesaurus,
}

impl GenerationForm {
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("inflectional") {
            Some(GenerationForm::Inflectional)
        } else if name.eq_ignore_ascii_case("thesaurus") {
            Some(GenerationForm::Thesaurus)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GenerationForm::Inflectional => "INFLECTIONAL",
            GenerationForm::Thesaurus => "THESAURUS",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationTerm {
    pub form: GenerationForm,
    pub terms: Vec<SimpleTerm>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupTerm {
    pub term: Box<Term>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotTerm {
    pub term: Box<Term>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    And,
    Or,
}

impl BooleanOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BooleanOp::And => "AND",
            BooleanOp::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanTerm {
    pub lhs: Box<Term>,
    pub op: BooleanOp,
    pub rhs: Box<Term>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProximityTerm {
    pub lhs: Box<Term>,
    pub rhs: Box<Term>,
    pub span: Span,
}

/* Unparsing */

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Simple(term) => write!(f, "{}", term),
            Term::Weighted(weighted) => {
                f.write_str("ISABOUT(")?;
                for (i, item) in weighted.items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item.term)?;
                    if let Some(weight) = item.weight {
                        write!(f, " WEIGHT({})", weight)?;
                    }
                }
                f.write_str(")")
            }
            Term::Generation(generation) => {
                write!(f, "FORMSOF({}", generation.form.as_str())?;
                for term in &generation.terms {
                    write!(f, ", {}", term)?;
                }
                f.write_str(")")
            }
            Term::Group(group) => write!(f, "({})", group.term),
            Term::Not(not) => write!(f, "NOT {}", not.term),
            Term::Boolean(boolean) => {
                write!(f, "{} {} {}", boolean.lhs, boolean.op.as_str(), boolean.rhs)
            }
            Term::Proximity(proximity) => write!(f, "{} NEAR {}", proximity.lhs, proximity.rhs),
        }
    }
}

impl fmt::Display for SimpleTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.literal {
            Literal::Phrase(quoted) => write!(f, "{q}{}{q}", quoted.text, q = quoted.quote),
            Literal::Word(word) => write_ident(f, word),
        }
    }
}
