use std::collections::HashMap;

use crate::combinations::combinations;
use crate::formula::{Clause, ClauseIdx, ClauseSet, Literal};
use crate::store::Formula;

/// Largest number of shared literals (besides the pivot) the round algorithm
/// ever has to look up for the given bound, or -1 if it never needs one.
///
/// Two clauses of lengths `i <= j` resolve to at most `max_length` literals
/// only if they share at least `i + j - 2 - max_length` literals, and they can
/// share at most `i - 1`.
pub fn needed_intersect(current_max_length: usize, max_length: usize) -> isize {
    let longest = current_max_length as isize;
    let max_length = max_length as isize;

    if max_length >= longest {
        return max_length - 2;
    }

    let needed = 2 * longest - max_length - 2;
    if needed < longest {
        return needed;
    }

    let mut needed = -1;
    for i in 1..=longest {
        for j in i..=longest {
            let intersect = i + j - 2 - max_length;
            if intersect < i {
                needed = needed.max(intersect);
            }
        }
    }
    needed
}

/// Literal subset -> registered clauses containing it, for every subset size
/// from 1 to `needed_intersect`.
#[derive(Debug, Clone)]
pub struct OccurrenceIndex {
    /// Bound the index was built for, `None` before the first bounded round.
    max_length: Option<usize>,
    needed_intersect: isize,
    /// `levels[l - 1]` holds the subsets of size `l`.
    levels: Vec<HashMap<Vec<Literal>, ClauseSet>>,
}

impl Default for OccurrenceIndex {
    fn default() -> Self {
        OccurrenceIndex {
            max_length: None,
            needed_intersect: -1,
            levels: Vec::new(),
        }
    }
}

impl OccurrenceIndex {
    pub fn build(formula: &Formula, max_length: usize) -> Self {
        let needed_intersect = needed_intersect(formula.current_max_length(), max_length);
        let num_levels = needed_intersect.max(0) as usize;

        let mut index = OccurrenceIndex {
            max_length: Some(max_length),
            needed_intersect,
            levels: vec![HashMap::new(); num_levels],
        };

        for clause_idx in formula.registered() {
            if let Some(clause) = formula.clause(clause_idx) {
                index.insert(clause_idx, clause);
            }
        }

        debug!(
            "Built occurrence index for max length {} with {} levels",
            max_length, num_levels
        );
        index
    }

    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    pub fn needed_intersect(&self) -> isize {
        self.needed_intersect
    }

    pub fn insert(&mut self, index: ClauseIdx, clause: &Clause) {
        for (level, subsets) in self.levels.iter_mut().enumerate() {
            for subset in combinations(clause.literals(), level + 1) {
                subsets.entry(subset).or_default().insert(index);
            }
        }
    }

    pub fn remove(&mut self, index: ClauseIdx, clause: &Clause) {
        for (level, subsets) in self.levels.iter_mut().enumerate() {
            for subset in combinations(clause.literals(), level + 1) {
                if let Some(set) = subsets.get_mut(&subset) {
                    set.remove(&index);
                    if set.is_empty() {
                        subsets.remove(&subset);
                    }
                }
            }
        }
    }

    /// Registered clauses containing every literal of the sorted `subset`.
    pub fn get(&self, subset: &[Literal]) -> Option<&ClauseSet> {
        let level = subset.len().checked_sub(1)?;
        self.levels.get(level)?.get(subset)
    }
}
