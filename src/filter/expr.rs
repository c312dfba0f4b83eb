//! Predicate expressions over admission records
//!
//! A filter selection compiles to an [`Expr`] tree. Only the shapes the
//! dashboard needs exist: set membership, equality and conjunction.

use std::collections::BTreeSet;

use smallvec::SmallVec;

use super::{Column, Filterable};

/// Represents a filter expression over categorical record columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Column equals a literal value
    Eq(Column, String),

    /// Column is in a set of values
    In(Column, BTreeSet<String>),

    /// Logical AND of expressions
    And(Vec<Expr>),

    /// Always evaluates to true
    AlwaysTrue,

    /// Always evaluates to false
    AlwaysFalse,
}

impl Expr {
    /// Conjunction of `exprs`, collapsing the trivial cases
    #[must_use]
    pub fn and(exprs: impl IntoIterator<Item = Self>) -> Self {
        let mut children: SmallVec<[Self; 8]> = SmallVec::new();
        for expr in exprs {
            match expr {
                Self::AlwaysTrue => {}
                Self::AlwaysFalse => return Self::AlwaysFalse,
                Self::And(inner) => children.extend(inner),
                other => children.push(other),
            }
        }

        match children.len() {
            0 => Self::AlwaysTrue,
            1 => children.pop().unwrap_or(Self::AlwaysTrue),
            _ => Self::And(children.into_vec()),
        }
    }

    /// Evaluate against a single record
    ///
    /// A record with no value in the column matches nothing.
    pub fn evaluate<R: Filterable + ?Sized>(&self, record: &R) -> bool {
        match self {
            Self::Eq(column, expected) => record.value(*column) == Some(expected.as_str()),
            Self::In(column, values) => record
                .value(*column)
                .is_some_and(|value| values.contains(value)),
            Self::And(exprs) => exprs.iter().all(|e| e.evaluate(record)),
            Self::AlwaysTrue => true,
            Self::AlwaysFalse => false,
        }
    }
}
