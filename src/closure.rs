/*!
Multi-round resolution up to a clause length bound.

[`ClosureFormula`] wraps a [`Formula`] and repeats resolution rounds over the
clauses added by the previous round until a round count is reached or nothing
new is found. Candidate pairs are pruned by length: two clauses can only yield
a short enough resolvent if they share enough literals, and the
[`OccurrenceIndex`] finds partners sharing a given literal subset directly.
*/

use std::collections::{BTreeMap, HashSet};

use crate::combinations::combinations;
use crate::formula::{Clause, ClauseIdx, ClauseSet, Literal, Variable};
use crate::resolve::Resolver;
use crate::store::{Error, Formula};

mod occurrence;

pub use occurrence::{needed_intersect, OccurrenceIndex};

/// How the engine remembers which clause pairs it has resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairPolicy {
    /// An unordered clause pair is resolved at most once, on the first pivot
    /// found.
    OncePerPair,
    /// An unordered clause pair is resolved at most once per pivot variable.
    OncePerPivot,
}

impl Default for PairPolicy {
    fn default() -> Self {
        PairPolicy::OncePerPair
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClosureOptions {
    pub pair_policy: PairPolicy,
    /// Records the parents of every resolvent.
    pub provenance: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PairKey {
    low: ClauseIdx,
    high: ClauseIdx,
    pivot: Option<Variable>,
}

impl PairKey {
    fn new(a: ClauseIdx, b: ClauseIdx, pivot: Variable, policy: PairPolicy) -> Self {
        PairKey {
            low: a.min(b),
            high: a.max(b),
            pivot: match policy {
                PairPolicy::OncePerPair => None,
                PairPolicy::OncePerPivot => Some(pivot),
            },
        }
    }
}

/// Round number (starting at 1) -> clauses accepted in that round.
pub type Rounds = BTreeMap<usize, Vec<ClauseIdx>>;

/// Borrowed state of a single round.
struct Round<'a> {
    formula: &'a Formula,
    resolved_pairs: &'a mut HashSet<PairKey>,
    policy: PairPolicy,
    max_length: usize,
    resolvents: Vec<Clause>,
}

impl<'a> Round<'a> {
    fn visit(&mut self, left: ClauseIdx, right: ClauseIdx, literal: Literal) -> Result<(), Error> {
        let key = PairKey::new(left, right, literal.variable(), self.policy);
        if !self.resolved_pairs.insert(key) {
            return Ok(());
        }

        if let Some(resolvent) =
            self.formula
                .resolve_on_variable(left, right, literal.variable(), self.max_length)?
        {
            self.resolvents.push(resolvent);
        }
        Ok(())
    }

    fn visit_all<'s, I>(&mut self, left: ClauseIdx, rights: I, literal: Literal) -> Result<(), Error>
    where
        I: IntoIterator<Item = &'s ClauseIdx>,
    {
        for &right in rights {
            self.visit(left, right, literal)?;
        }
        Ok(())
    }
}

pub struct ClosureFormula {
    formula: Formula,
    options: ClosureOptions,
    occurrences: OccurrenceIndex,
    resolved_pairs: HashSet<PairKey>,
    /// Set when clauses were added since the last subsumption sweep.
    subsumption_pending: bool,
    refuted: bool,
}

impl ClosureFormula {
    pub fn new(formula: Formula, options: ClosureOptions) -> Self {
        ClosureFormula {
            formula: formula.with_provenance(options.provenance),
            options,
            occurrences: OccurrenceIndex::default(),
            resolved_pairs: HashSet::new(),
            subsumption_pending: true,
            refuted: false,
        }
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    pub fn into_formula(self) -> Formula {
        self.formula
    }

    pub fn options(&self) -> ClosureOptions {
        self.options
    }

    /// Returns true once an empty resolvent has been derived.
    pub fn is_refuted(&self) -> bool {
        self.refuted
    }

    pub fn num_resolved_pairs(&self) -> usize {
        self.resolved_pairs.len()
    }

    pub fn occurrences(&self) -> &OccurrenceIndex {
        &self.occurrences
    }

    pub fn add_clause(&mut self, clause: Clause) -> Result<ClauseIdx, Error> {
        let index = self.formula.add_clause(clause)?;
        if let Some(clause) = self.formula.clause(index) {
            self.occurrences.insert(index, clause);
        }
        self.subsumption_pending = true;
        Ok(index)
    }

    pub fn remove_clause(&mut self, index: ClauseIdx) -> Result<Clause, Error> {
        let registered = self.formula.is_registered(index);
        let clause = self.formula.remove_clause(index)?;
        if registered {
            self.occurrences.remove(index, &clause);
        }
        Ok(clause)
    }

    /// Withdraws a clause from every resolution source, the occurrence index
    /// included. The clause stays retrievable through [`Formula::clause`].
    pub fn deregister_clause(&mut self, index: ClauseIdx) -> Result<bool, Error> {
        if !self.formula.deregister_clause(index)? {
            return Ok(false);
        }
        if let Some(clause) = self.formula.clause(index) {
            self.occurrences.remove(index, clause);
        }
        Ok(true)
    }

    /// (Re)builds the occurrence index when the length bound or the pruning
    /// bound derived from the longest clause changed since it was built.
    fn prepare_occurrences(&mut self, max_length: usize) {
        let previous = self.occurrences.max_length();
        let needed = needed_intersect(self.formula.current_max_length(), max_length);
        if previous == Some(max_length) && needed == self.occurrences.needed_intersect() {
            return;
        }

        if previous.map_or(false, |previous| previous != max_length) {
            // pairs rejected as too long may fit under the new bound
            self.resolved_pairs.clear();
        }
        self.occurrences = OccurrenceIndex::build(&self.formula, max_length);
    }

    /// One pruned resolution round. Left clauses have an index of at least
    /// `min_index`; right clauses may be any registered clause.
    pub fn resolve_all(&mut self, min_index: ClauseIdx, max_length: usize) -> Result<Vec<Clause>, Error> {
        self.prepare_occurrences(max_length);

        let occurrences = &self.occurrences;
        let needed = occurrences.needed_intersect();
        let mut round = Round {
            formula: &self.formula,
            resolved_pairs: &mut self.resolved_pairs,
            policy: self.options.pair_policy,
            max_length,
            resolvents: Vec::new(),
        };
        let formula = round.formula;
        let lengths = formula.lengths().collect::<Vec<_>>();

        for &left_length in &lengths {
            let lefts_by_literal = match formula.literal_buckets(left_length) {
                Some(buckets) => buckets,
                None => continue,
            };

            for &right_length in &lengths {
                let min_intersect =
                    left_length as isize + right_length as isize - 2 - max_length as isize;
                if min_intersect > needed {
                    continue;
                }

                for (&literal, lefts) in lefts_by_literal {
                    let rights = match formula.clauses_with_length_and_literal(right_length, !literal) {
                        Some(rights) => rights,
                        None => continue,
                    };

                    for &left in lefts.range(min_index..) {
                        if min_intersect <= 0 {
                            round.visit_all(left, rights, literal)?;
                            continue;
                        }

                        let clause = formula.live_clause(left)?;
                        for subset in combinations(clause.literals(), min_intersect as usize) {
                            if let Some(bucket) = occurrences.get(&subset) {
                                round.visit_all(left, intersection(bucket, rights), literal)?;
                            }
                        }
                    }
                }
            }
        }

        Ok(round.resolvents)
    }

    /// Stores every resolvent whose signature is new, then deregisters the
    /// clauses subsumed by what is stored. Returns the indices of the stored
    /// resolvents.
    pub fn add_all_clauses(&mut self, clauses: Vec<Clause>) -> Result<Vec<ClauseIdx>, Error> {
        let mut accepted = Vec::new();

        for clause in clauses {
            if clause.is_empty() {
                if !self.refuted {
                    info!("Derived the empty clause, the formula is unsatisfiable");
                }
                self.refuted = true;
                continue;
            }
            if self.formula.contains_signature(clause.signature()) {
                continue;
            }
            accepted.push(self.add_clause(clause)?);
        }

        if self.subsumption_pending {
            self.deregister_subsumed()?;
        }

        Ok(accepted)
    }

    /// Deregisters every registered clause that has a proper subset stored.
    fn deregister_subsumed(&mut self) -> Result<usize, Error> {
        let formula = &self.formula;
        let signer = formula.signer();
        let subsumed = formula
            .registered()
            .filter(|&index| {
                formula.clause(index).map_or(false, |clause| {
                    signer.any_proper_subset(clause.literals(), |signature| {
                        formula.contains_signature(signature)
                    })
                })
            })
            .collect::<Vec<_>>();

        for &index in &subsumed {
            trace!("Clause {} is subsumed", index);
            self.deregister_clause(index)?;
        }

        self.subsumption_pending = false;
        Ok(subsumed.len())
    }

    /// Runs one round and adds its resolvents to the formula.
    pub fn resolve_all_add_to_formula(
        &mut self,
        min_index: ClauseIdx,
        max_length: usize,
    ) -> Result<Vec<ClauseIdx>, Error> {
        let resolvents = self.resolve_all(min_index, max_length)?;
        self.add_all_clauses(resolvents)
    }

    /// Runs up to `rounds` rounds. Each round after the first only resolves
    /// pairs involving a clause accepted in the round before. Stops early at a
    /// fixed point.
    pub fn resolve_multiple_times(&mut self, rounds: usize, max_length: usize) -> Result<Rounds, Error> {
        let mut result = Rounds::new();
        let mut min_index = ClauseIdx::from(0);

        for round in 1..=rounds {
            let first_new = self.formula.next_index();
            let accepted = self.resolve_all_add_to_formula(min_index, max_length)?;
            self.log_round(round, &accepted);

            if accepted.is_empty() {
                debug!("Fixed point reached in round {}", round);
                break;
            }

            result.insert(round, accepted);
            min_index = first_new;
        }

        Ok(result)
    }

    pub fn resolve_to_convergence(&mut self, max_length: usize) -> Result<Rounds, Error> {
        self.resolve_multiple_times(usize::MAX, max_length)
    }

    fn log_round(&self, round: usize, accepted: &[ClauseIdx]) {
        let mut by_length = BTreeMap::new();
        for clause in accepted.iter().filter_map(|&index| self.formula.clause(index)) {
            *by_length.entry(clause.len()).or_insert(0usize) += 1;
        }
        let by_length = by_length
            .iter()
            .map(|(length, count)| format!("{} of length {}", count, length))
            .collect::<Vec<_>>()
            .join(", ");

        info!(
            "Level {} complete, learnt {} clauses ({}). In total {} clauses and {} subsumed clauses",
            round,
            accepted.len(),
            if by_length.is_empty() { "none" } else { by_length.as_str() },
            self.formula.num_clauses(),
            self.formula.num_deregistered(),
        );
    }
}

impl Resolver for ClosureFormula {
    fn formula(&self) -> &Formula {
        &self.formula
    }

    fn resolve_all(
        &mut self,
        min_index: ClauseIdx,
        max_length: usize,
    ) -> Result<Vec<Clause>, Error> {
        ClosureFormula::resolve_all(self, min_index, max_length)
    }
}

/// Iterates over the smaller set, probing the larger one.
fn intersection<'s>(a: &'s ClauseSet, b: &'s ClauseSet) -> impl Iterator<Item = &'s ClauseIdx> {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().filter(move |index| large.contains(index))
}
