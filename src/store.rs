/*!
Indexed clause store.

A [`Formula`] owns every clause under a stable [`ClauseIdx`] and keeps lookup
tables by literal, by length, and by length and literal in sync with the stored
clauses. Removed slots are tombstoned and their indices are never reused.
*/

use std::collections::{BTreeMap, HashMap};

use typed_index_collections::TiVec;

use crate::formula::{Clause, ClauseError, ClauseIdx, ClauseSet, Literal, Variable};
use crate::prelude::*;
use crate::resolve::{resolve_literals, Resolution, Resolver};
use crate::signature::{Signature, SignatureScheme, Signer};

use self::inner::Tables;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display(
        "Clause was built for {} variables, but the formula declares {} variables \
         (or uses another signature scheme)",
        found,
        expected
    ))]
    InvalidStore { expected: usize, found: usize },
    #[snafu(display("Clause {} is inconsistent with the formula: {}", index, reason))]
    InternalInconsistency {
        index: ClauseIdx,
        reason: &'static str,
    },
    #[snafu(display("Invalid clause"))]
    InvalidLiterals { source: ClauseError },
}

/// Lookup tables that only hold clause indices.
mod inner {
    use std::{
        collections::BTreeMap,
        ops::{Index, IndexMut},
    };

    use crate::formula::{Clause, ClauseIdx, ClauseSet, Literal};

    #[derive(Debug, Clone)]
    pub struct LiteralMap<T> {
        positive: Vec<T>,
        negative: Vec<T>,
    }

    impl<T: Clone + Default> LiteralMap<T> {
        pub fn new(num_variables: usize) -> Self {
            LiteralMap {
                positive: vec![T::default(); num_variables],
                negative: vec![T::default(); num_variables],
            }
        }
    }

    impl<T> Index<Literal> for LiteralMap<T> {
        type Output = T;

        fn index(&self, literal: Literal) -> &Self::Output {
            if literal.positive() {
                &self.positive[literal.variable().as_index()]
            } else {
                &self.negative[literal.variable().as_index()]
            }
        }
    }

    impl<T> IndexMut<Literal> for LiteralMap<T> {
        fn index_mut(&mut self, literal: Literal) -> &mut Self::Output {
            if literal.positive() {
                &mut self.positive[literal.variable().as_index()]
            } else {
                &mut self.negative[literal.variable().as_index()]
            }
        }
    }

    #[derive(Debug, Clone)]
    pub struct Tables {
        pub by_literal: LiteralMap<ClauseSet>,
        /// Only non-empty buckets are kept.
        pub by_length: BTreeMap<usize, ClauseSet>,
        /// Only non-empty buckets are kept.
        pub by_length_and_literal: BTreeMap<usize, BTreeMap<Literal, ClauseSet>>,
    }

    impl Tables {
        pub fn new(num_variables: usize) -> Self {
            Tables {
                by_literal: LiteralMap::new(num_variables),
                by_length: BTreeMap::new(),
                by_length_and_literal: BTreeMap::new(),
            }
        }

        pub fn insert(&mut self, index: ClauseIdx, clause: &Clause) {
            let length = clause.len();
            let buckets = self.by_length_and_literal.entry(length).or_default();
            for literal in clause.iter() {
                self.by_literal[literal].insert(index);
                buckets.entry(literal).or_default().insert(index);
            }
            self.by_length.entry(length).or_default().insert(index);
        }

        pub fn remove(&mut self, index: ClauseIdx, clause: &Clause) {
            let length = clause.len();
            for literal in clause.iter() {
                self.by_literal[literal].remove(&index);
            }

            if let Some(buckets) = self.by_length_and_literal.get_mut(&length) {
                for literal in clause.iter() {
                    remove_from(buckets, literal, index);
                }
                if buckets.is_empty() {
                    self.by_length_and_literal.remove(&length);
                }
            }
            remove_from(&mut self.by_length, length, index);
        }
    }

    fn remove_from<K: Ord>(map: &mut BTreeMap<K, ClauseSet>, key: K, index: ClauseIdx) {
        if let Some(set) = map.get_mut(&key) {
            set.remove(&index);
            if set.is_empty() {
                map.remove(&key);
            }
        }
    }
}

/// Formula in conjunctive normal form, stored as an arena of clause slots.
///
/// A stored clause is either registered (present in every lookup table) or
/// deregistered (kept in its slot and in the signature set, but invisible to
/// lookups and therefore never used as a resolution source).
#[derive(Debug, Clone)]
pub struct Formula {
    signer: Signer,
    /// Records the parents of resolvents.
    provenance: bool,
    clauses: TiVec<ClauseIdx, Option<Clause>>,
    /// Number of occupied slots in `clauses`.
    num_stored: usize,
    deregistered: ClauseSet,
    /// Longest clause length ever added.
    current_max_length: usize,
    tables: Tables,
    /// Signature -> number of stored clauses with that signature.
    signatures: HashMap<Signature, usize>,
}

impl Formula {
    pub fn new(num_variables: usize) -> Self {
        Formula::with_scheme(num_variables, SignatureScheme::default())
    }

    /// # Panics
    ///
    /// Panics if `num_variables` exceeds [`Variable::MAX_VARIABLE_ID`].
    /// [`parse_str`](crate::parser::parse_str) rejects such counts before
    /// reaching this point.
    pub fn with_scheme(num_variables: usize, scheme: SignatureScheme) -> Self {
        assert!(num_variables <= Variable::MAX_VARIABLE_ID);

        Formula {
            signer: Signer::new(num_variables, scheme),
            provenance: false,
            clauses: TiVec::new(),
            num_stored: 0,
            deregistered: ClauseSet::new(),
            current_max_length: 0,
            tables: Tables::new(num_variables),
            signatures: HashMap::new(),
        }
    }

    pub fn with_provenance(mut self, provenance: bool) -> Self {
        self.provenance = provenance;
        self
    }

    pub fn provenance(&self) -> bool {
        self.provenance
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    pub fn num_variables(&self) -> usize {
        self.signer.num_variables()
    }

    /// The index the next added clause will receive.
    pub fn next_index(&self) -> ClauseIdx {
        self.clauses.next_key()
    }

    /// Number of stored clauses, deregistered ones included.
    pub fn num_clauses(&self) -> usize {
        self.num_stored
    }

    pub fn num_deregistered(&self) -> usize {
        self.deregistered.len()
    }

    pub fn current_max_length(&self) -> usize {
        self.current_max_length
    }

    /// Returns the clause stored at `index`, registered or not.
    pub fn clause(&self, index: ClauseIdx) -> Option<&Clause> {
        self.clauses.get(index).and_then(Option::as_ref)
    }

    pub(crate) fn live_clause(&self, index: ClauseIdx) -> Result<&Clause, Error> {
        self.clause(index).context(InternalInconsistency {
            index,
            reason: "no clause is stored at this index",
        })
    }

    pub fn is_registered(&self, index: ClauseIdx) -> bool {
        self.clause(index).is_some() && !self.deregistered.contains(&index)
    }

    pub fn is_deregistered(&self, index: ClauseIdx) -> bool {
        self.deregistered.contains(&index)
    }

    /// Iterates over every stored clause, deregistered ones included.
    pub fn clauses(&self) -> impl Iterator<Item = (ClauseIdx, &Clause)> + '_ {
        self.clauses
            .iter_enumerated()
            .filter_map(|(index, slot)| slot.as_ref().map(|clause| (index, clause)))
    }

    /// Iterates over the indices of registered clauses.
    pub fn registered(&self) -> impl Iterator<Item = ClauseIdx> + '_ {
        self.clauses()
            .map(|(index, _)| index)
            .filter(move |index| !self.deregistered.contains(index))
    }

    pub fn contains_signature(&self, signature: &Signature) -> bool {
        self.signatures.contains_key(signature)
    }

    /// Number of distinct signatures among stored clauses.
    pub fn num_signatures(&self) -> usize {
        self.signatures.len()
    }

    pub fn clauses_with_literal(&self, literal: Literal) -> &ClauseSet {
        &self.tables.by_literal[literal]
    }

    /// Lengths with at least one registered clause, in increasing order.
    pub fn lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.tables.by_length.keys().copied()
    }

    pub fn clauses_with_length(&self, length: usize) -> Option<&ClauseSet> {
        self.tables.by_length.get(&length)
    }

    /// Literal -> registered clauses of the given length holding it.
    pub fn literal_buckets(&self, length: usize) -> Option<&BTreeMap<Literal, ClauseSet>> {
        self.tables.by_length_and_literal.get(&length)
    }

    pub fn clauses_with_length_and_literal(
        &self,
        length: usize,
        literal: Literal,
    ) -> Option<&ClauseSet> {
        self.literal_buckets(length)
            .and_then(|buckets| buckets.get(&literal))
    }

    /// Builds a clause against this formula's variable count and signatures.
    pub fn build_clause<I>(&self, literals: I) -> Result<Clause, Error>
    where
        I: IntoIterator<Item = Literal>,
    {
        Clause::build(literals, &self.signer).context(InvalidLiterals)
    }

    /// Stores `clause` under the next free index and registers it.
    pub fn add_clause(&mut self, clause: Clause) -> Result<ClauseIdx, Error> {
        ensure!(
            clause.signer_key() == self.signer.key(),
            InvalidStore {
                expected: self.signer.num_variables(),
                found: clause.signer_key().num_variables,
            }
        );

        let index = self.clauses.next_key();
        self.tables.insert(index, &clause);
        self.retain_signature(clause.signature());
        self.current_max_length = self.current_max_length.max(clause.len());

        trace!("Added clause {} as {}", clause, index);
        self.clauses.push(Some(clause));
        self.num_stored += 1;

        Ok(index)
    }

    /// Tombstones slot `index` and drops the clause from every table.
    pub fn remove_clause(&mut self, index: ClauseIdx) -> Result<Clause, Error> {
        let clause = self.take_clause(index)?;

        if !self.deregistered.remove(&index) {
            self.tables.remove(index, &clause);
        }
        self.release_signature(clause.signature());
        self.num_stored -= 1;

        trace!("Removed clause {} at {}", clause, index);
        Ok(clause)
    }

    /// Removes `literal` from the clause at `index` and returns the new
    /// length. A clause that becomes empty is tombstoned and 0 is returned.
    pub fn remove_literal(&mut self, index: ClauseIdx, literal: Literal) -> Result<usize, Error> {
        ensure!(
            self.live_clause(index)?.contains(literal),
            InternalInconsistency {
                index,
                reason: "the clause does not contain the literal",
            }
        );

        let mut clause = self.take_clause(index)?;
        let registered = !self.deregistered.contains(&index);

        if registered {
            self.tables.remove(index, &clause);
        }
        self.release_signature(clause.signature());

        let length = clause
            .remove_literal(literal, &self.signer)
            .context(InvalidLiterals)?;
        if length == 0 {
            debug!("Clause {} became empty after removing {}", index, literal);
            self.deregistered.remove(&index);
            self.num_stored -= 1;
            return Ok(0);
        }

        if registered {
            self.tables.insert(index, &clause);
        }
        self.retain_signature(clause.signature());
        self.clauses[index] = Some(clause);

        Ok(length)
    }

    /// Withdraws the clause at `index` from the lookup tables. It stays
    /// stored and its signature keeps counting as present.
    /// Returns false if it was already deregistered.
    pub fn deregister_clause(&mut self, index: ClauseIdx) -> Result<bool, Error> {
        if self.deregistered.contains(&index) {
            return Ok(false);
        }

        let clause = self
            .clauses
            .get(index)
            .and_then(Option::as_ref)
            .context(InternalInconsistency {
                index,
                reason: "no clause is stored at this index",
            })?;
        self.tables.remove(index, clause);
        self.deregistered.insert(index);

        Ok(true)
    }

    fn take_clause(&mut self, index: ClauseIdx) -> Result<Clause, Error> {
        self.clauses
            .get_mut(index)
            .and_then(Option::take)
            .context(InternalInconsistency {
                index,
                reason: "no clause is stored at this index",
            })
    }

    fn retain_signature(&mut self, signature: &Signature) {
        *self.signatures.entry(signature.clone()).or_insert(0) += 1;
    }

    fn release_signature(&mut self, signature: &Signature) {
        if let Some(count) = self.signatures.get_mut(signature) {
            *count -= 1;
            if *count == 0 {
                self.signatures.remove(signature);
            }
        }
    }

    /// Resolves the clauses at `first` and `second` on `pivot`.
    ///
    /// Returns `None` when the resolvent is a tautology, longer than
    /// `max_length`, or already stored.
    pub fn resolve_on_variable(
        &self,
        first: ClauseIdx,
        second: ClauseIdx,
        pivot: Variable,
        max_length: usize,
    ) -> Result<Option<Clause>, Error> {
        let a = self.live_clause(first)?;
        let b = self.live_clause(second)?;

        let literals = match resolve_literals(a.literals(), b.literals(), pivot, max_length) {
            Resolution::Resolvent(literals) => literals,
            Resolution::Tautology | Resolution::TooLong => return Ok(None),
        };

        let mut resolvent = Clause::from_sorted(literals, &self.signer);
        if self.contains_signature(resolvent.signature()) {
            return Ok(None);
        }
        if self.provenance {
            resolvent.set_parents(first, second);
        }

        Ok(Some(resolvent))
    }

    /// Returns the registered clauses holding `!literal`.
    ///
    /// Only indices at or above `min_index` are returned; with
    /// `only_index_at_least` the floor is raised to `index` as well, so that a
    /// sweep over all clauses visits every unordered pair once.
    pub fn find_partners(
        &self,
        index: ClauseIdx,
        literal: Literal,
        only_index_at_least: bool,
        min_index: ClauseIdx,
    ) -> Result<Vec<ClauseIdx>, Error> {
        self.live_clause(index)?;

        let floor = if only_index_at_least {
            index.max(min_index)
        } else {
            min_index
        };

        Ok(self.tables.by_literal[!literal]
            .range(floor..)
            .copied()
            .collect())
    }

    pub fn resolve_all_with_clause_on_variable(
        &self,
        index: ClauseIdx,
        literal: Literal,
        only_index_at_least: bool,
        min_index: ClauseIdx,
        max_length: usize,
    ) -> Result<Vec<Clause>, Error> {
        let mut resolvents = Vec::new();
        for partner in self.find_partners(index, literal, only_index_at_least, min_index)? {
            if let Some(resolvent) =
                self.resolve_on_variable(index, partner, literal.variable(), max_length)?
            {
                resolvents.push(resolvent);
            }
        }
        Ok(resolvents)
    }

    pub fn resolve_all_with_clause(
        &self,
        index: ClauseIdx,
        only_index_at_least: bool,
        min_index: ClauseIdx,
        max_length: usize,
    ) -> Result<Vec<Clause>, Error> {
        let mut resolvents = Vec::new();
        for literal in self.live_clause(index)?.iter() {
            resolvents.extend(self.resolve_all_with_clause_on_variable(
                index,
                literal,
                only_index_at_least,
                min_index,
                max_length,
            )?);
        }
        Ok(resolvents)
    }

    /// One resolution round by pairwise partner lookup.
    ///
    /// Every registered clause is paired with each registered partner at or
    /// above both its own index and `min_index`. Resolvents may repeat; none of
    /// them is added to the formula.
    pub fn resolve_all(&self, min_index: ClauseIdx, max_length: usize) -> Result<Vec<Clause>, Error> {
        let mut resolvents = Vec::new();
        for index in self.registered() {
            resolvents.extend(self.resolve_all_with_clause(index, true, min_index, max_length)?);
        }
        Ok(resolvents)
    }
}

impl Resolver for Formula {
    fn formula(&self) -> &Formula {
        self
    }

    fn resolve_all(
        &mut self,
        min_index: ClauseIdx,
        max_length: usize,
    ) -> Result<Vec<Clause>, Error> {
        Formula::resolve_all(self, min_index, max_length)
    }
}
