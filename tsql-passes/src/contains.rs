//! Evaluation of CONTAINS predicates against plain-text documents.
//!
//! Documents are split into lowercase words. A simple term matches at every position where
//! its words occur in sequence. There is no stemming or thesaurus: `FORMSOF` matches any of the
//! listed forms literally.

use tracing::debug;
use tsql_parser::ast::contains::{BooleanOp, SimpleTerm, Term};
use tsql_parser::visitor::TermVisitor;

/// Maximum number of words between the two sides of a `NEAR`.
pub const DEFAULT_NEAR_DISTANCE: usize = 50;

struct TermCollector<'a> {
    terms: Vec<&'a SimpleTerm>,
}

impl<'a> TermVisitor<'a> for TermCollector<'a> {
    fn visit_simple_term(&mut self, term: &'a SimpleTerm) {
        self.terms.push(term);
    }
}

/// Lists every word and phrase searched for by `term`, in source order.
pub fn collect_terms(term: &Term) -> Vec<&SimpleTerm> {
    let mut collector = TermCollector { terms: Vec::new() };
    collector.visit_term(term);
    collector.terms
}

#[derive(Debug, Default)]
struct Hits {
    matched: bool,
    /// Word positions of the matches. Negated terms match without a position.
    positions: Vec<usize>,
}

impl Hits {
    fn at(positions: Vec<usize>) -> Self {
        Self {
            matched: !positions.is_empty(),
            positions,
        }
    }

    fn union(mut self, other: Hits) -> Self {
        self.matched |= other.matched;
        self.positions.extend(other.positions);
        self.positions.sort_unstable();
        self.positions.dedup();
        self
    }
}

/// A document prepared for matching.
#[derive(Debug, Clone)]
pub struct Matcher {
    words: Vec<String>,
    near_distance: usize,
}

impl Matcher {
    pub fn new(document: &str) -> Self {
        let words = document
            .split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|word| !word.is_empty())
            .map(str::to_lowercase)
            .collect();
        Self {
            words,
            near_distance: DEFAULT_NEAR_DISTANCE,
        }
    }

    pub fn with_near_distance(mut self, near_distance: usize) -> Self {
        self.near_distance = near_distance;
        self
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Returns whether the document satisfies `term`.
    pub fn matches(&self, term: &Term) -> bool {
        let hits = self.eval(term);
        debug!(words = self.words.len(), matched = hits.matched, "matched search condition");
        hits.matched
    }

    fn eval(&self, term: &Term) -> Hits {
        match term {
            Term::Simple(simple) => Hits::at(self.positions(simple)),
            Term::Weighted(weighted) => weighted
                .items
                .iter()
                .map(|item| Hits::at(self.positions(&item.term)))
                .fold(Hits::default(), Hits::union),
            Term::Generation(generation) => generation
                .terms
                .iter()
                .map(|simple| Hits::at(self.positions(simple)))
                .fold(Hits::default(), Hits::union),
            Term::Group(group) => self.eval(&group.term),
            Term::Not(not) => Hits {
                matched: !self.eval(&not.term).matched,
                positions: Vec::new(),
            },
            Term::Boolean(boolean) => {
                let lhs = self.eval(&boolean.lhs);
                let rhs = self.eval(&boolean.rhs);
                match boolean.op {
                    BooleanOp::And if lhs.matched && rhs.matched => lhs.union(rhs),
                    BooleanOp::And => Hits::default(),
                    BooleanOp::Or => lhs.union(rhs),
                }
            }
            Term::Proximity(proximity) => {
                let lhs = self.eval(&proximity.lhs).positions;
                let rhs = self.eval(&proximity.rhs).positions;
                let mut positions = Vec::new();
                for &l in &lhs {
                    for &r in &rhs {
                        if l.abs_diff(r) <= self.near_distance {
                            positions.push(l);
                            positions.push(r);
                        }
                    }
                }
                positions.sort_unstable();
                positions.dedup();
                Hits::at(positions)
            }
        }
    }

    /// Word positions where `term` starts.
    fn positions(&self, term: &SimpleTerm) -> Vec<usize> {
        let needle = term.words();
        if needle.is_empty() || needle.len() > self.words.len() {
            return Vec::new();
        }
        let prefix = term.is_prefix();
        self.words
            .windows(needle.len())
            .enumerate()
            .filter(|(_, window)| {
                window.iter().zip(&needle).all(|(word, wanted)| {
                    if prefix {
                        word.starts_with(wanted.as_str())
                    } else {
                        word == wanted
                    }
                })
            })
            .map(|(position, _)| position)
            .collect()
    }
}
