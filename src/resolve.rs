use std::collections::HashSet;

use crate::formula::{Clause, ClauseIdx, Literal, Variable};
use crate::store::{Error, Formula};

/// Outcome of resolving two literal sets on a pivot variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Sorted, duplicate-free literals of the resolvent.
    Resolvent(Vec<Literal>),
    /// The union holds a variable with both polarities.
    Tautology,
    /// The union has more literals than allowed.
    TooLong,
}

/// Resolves two sorted literal slices on `pivot`.
///
/// Both polarities of the pivot are dropped from the union; shared literals
/// appear once.
pub fn resolve_literals(
    first: &[Literal],
    second: &[Literal],
    pivot: Variable,
    max_length: usize,
) -> Resolution {
    let mut merged: Vec<Literal> = Vec::with_capacity(first.len() + second.len());
    let (mut i, mut j) = (0, 0);

    while i < first.len() || j < second.len() {
        let next = if j == second.len() || (i < first.len() && first[i] <= second[j]) {
            i += 1;
            first[i - 1]
        } else {
            j += 1;
            second[j - 1]
        };

        if next.variable() == pivot {
            continue;
        }

        match merged.last().copied() {
            Some(last) if last == next => continue,
            // sorted order puts complementary literals next to each other
            Some(last) if last.variable() == next.variable() => return Resolution::Tautology,
            _ => merged.push(next),
        }
    }

    if merged.len() > max_length {
        Resolution::TooLong
    } else {
        Resolution::Resolvent(merged)
    }
}

/// A clause store that can run one resolution round.
pub trait Resolver {
    /// Returns the clause store the resolver works on.
    fn formula(&self) -> &Formula;

    /// Runs one resolution round over every clause pair whose larger index is
    /// at least `min_index`, returning the resolvents with at most
    /// `max_length` literals. Nothing is added to the store.
    fn resolve_all(&mut self, min_index: ClauseIdx, max_length: usize)
        -> Result<Vec<Clause>, Error>;

    /// Like `resolve_all`, but keeps only the first resolvent of every
    /// signature.
    fn distinct_resolvents(
        &mut self,
        min_index: ClauseIdx,
        max_length: usize,
    ) -> Result<Vec<Clause>, Error> {
        let mut seen = HashSet::new();
        Ok(self
            .resolve_all(min_index, max_length)?
            .into_iter()
            .filter(|clause| seen.insert(clause.signature().clone()))
            .collect())
    }
}
