/*!
A module to represent the clauses of a conjunctive normal form formula.
*/

use std::{
    collections::BTreeSet,
    convert::TryFrom,
    fmt::Display,
    num::NonZeroU32,
    str::FromStr,
};

use crate::prelude::*;
use crate::signature::{Signature, Signer, SignerKey};

#[derive(Debug, Snafu)]
pub enum VariableParseError {
    #[snafu(display("Failed to parse Variable ID"))]
    ParseIntError { source: std::num::ParseIntError },
    #[snafu(display("Variable ID must be non-zero"))]
    ZeroError,
    #[snafu(display(
        "Variable ID {} is out of range (must be within 1 to {})",
        num,
        Variable::MAX_VARIABLE_ID
    ))]
    RangeError { num: u64 },
}

#[derive(Debug, Snafu)]
pub enum ClauseError {
    #[snafu(display("Clause contains both {} and its negation", literal))]
    InvalidClause { literal: Literal },
    #[snafu(display("Literal {} is not in the clause", literal))]
    LiteralNotFound { literal: Literal },
    #[snafu(display(
        "Variable {} is out of range (the formula declares {} variables)",
        variable,
        num_variables
    ))]
    VariableOutOfRange {
        variable: Variable,
        num_variables: usize,
    },
    #[snafu(display("Clause was signed with another salt table"))]
    SignerMismatch,
}

/// Newtype wrapper for variable ID.
/// Invariant: 0 < ID <= MAX_VARIABLE_ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(NonZeroU32);

impl Variable {
    pub const MAX_VARIABLE_ID: usize = std::u32::MAX as usize;
}

impl Variable {
    /// Returns the DIMACS id of the variable.
    pub fn get(&self) -> usize {
        self.0.get() as usize
    }

    pub fn as_index(&self) -> usize {
        (self.0.get() - 1) as usize
    }

    /// Creates a variable from a raw index.
    /// Returns `None` if the index is invalid.
    pub fn from_index(index: usize) -> Option<Self> {
        let id = index.checked_add(1)?;
        Variable::from_id(u64::try_from(id).ok()?)
    }

    /// Creates a variable from its DIMACS id.
    pub fn from_id(id: u64) -> Option<Self> {
        let id = u32::try_from(id).ok()?;
        Some(Variable(NonZeroU32::new(id)?))
    }
}

impl FromStr for Variable {
    type Err = VariableParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let num = s.parse::<u64>().context(ParseIntError)?;
        ensure!(num != 0, ZeroError);
        Variable::from_id(num).context(RangeError { num })
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// A variable with a polarity.
///
/// Literals order by variable first and put the negative literal before the
/// positive one, so complementary literals are adjacent in a sorted clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    id: Variable,
    positive: bool,
}

impl Literal {
    pub fn new(id: Variable, positive: bool) -> Self {
        Literal { id, positive }
    }

    /// Converts a signed DIMACS integer into a literal.
    /// Returns `None` for zero and for ids that do not fit a variable.
    pub fn from_dimacs(value: i64) -> Option<Self> {
        let id = Variable::from_id(value.unsigned_abs())?;
        Some(Literal::new(id, value > 0))
    }

    pub fn to_dimacs(&self) -> i64 {
        let id = self.id.get() as i64;
        if self.positive {
            id
        } else {
            -id
        }
    }

    pub fn variable(&self) -> Variable {
        self.id
    }

    pub fn positive(&self) -> bool {
        self.positive
    }

    /// Dense index over both polarities: `2 * variable_index + negated`.
    pub fn code(&self) -> usize {
        2 * self.id.as_index() + (!self.positive) as usize
    }
}

impl FromStr for Literal {
    type Err = VariableParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (positive, id) = if let Some(stripped) = s.strip_prefix('-') {
            (false, stripped.parse()?)
        } else {
            (true, s.parse()?)
        };

        Ok(Literal { id, positive })
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

impl std::ops::Not for Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        Literal {
            id: self.id,
            positive: !self.positive,
        }
    }
}

/// Stable handle of a clause inside a [`Formula`](crate::store::Formula).
/// Indices are handed out in increasing order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClauseIdx(usize);

impl From<usize> for ClauseIdx {
    fn from(index: usize) -> Self {
        ClauseIdx(index)
    }
}

impl From<ClauseIdx> for usize {
    fn from(index: ClauseIdx) -> Self {
        index.0
    }
}

impl Display for ClauseIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub type ClauseSet = BTreeSet<ClauseIdx>;

/// Disjunction of literals.
///
/// Literals are kept sorted and free of duplicates. The signature is derived
/// from the literals and recomputed whenever they change.
#[derive(Debug, Clone)]
pub struct Clause {
    literals: Vec<Literal>,
    signature: Signature,
    signer: SignerKey,
    parents: Option<(ClauseIdx, ClauseIdx)>,
}

impl Clause {
    /// Builds a clause from literals in any order.
    ///
    /// Repeated literals are merged. Fails if a variable occurs with both
    /// polarities or lies outside the signer's variable range.
    pub fn build<I>(literals: I, signer: &Signer) -> Result<Self, ClauseError>
    where
        I: IntoIterator<Item = Literal>,
    {
        let mut literals = literals.into_iter().collect::<Vec<_>>();
        literals.sort_unstable();
        literals.dedup();

        for literal in &literals {
            ensure!(
                literal.variable().get() <= signer.num_variables(),
                VariableOutOfRange {
                    variable: literal.variable(),
                    num_variables: signer.num_variables(),
                }
            );
        }

        for pair in literals.windows(2) {
            ensure!(
                pair[0].variable() != pair[1].variable(),
                InvalidClause { literal: pair[1] }
            );
        }

        Ok(Clause::from_sorted(literals, signer))
    }

    /// Caller guarantees the literals are sorted, unique, in range and
    /// tautology-free.
    pub(crate) fn from_sorted(literals: Vec<Literal>, signer: &Signer) -> Self {
        let signature = signer.sign(&literals);
        Clause {
            literals,
            signature,
            signer: signer.key(),
            parents: None,
        }
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn iter(&self) -> impl Iterator<Item = Literal> + '_ {
        self.literals.iter().copied()
    }

    pub fn contains(&self, literal: Literal) -> bool {
        self.literals.binary_search(&literal).is_ok()
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Key of the signer the signature was computed with.
    pub fn signer_key(&self) -> SignerKey {
        self.signer
    }

    /// The two clauses this clause was resolved from, if provenance was
    /// recorded.
    pub fn parents(&self) -> Option<(ClauseIdx, ClauseIdx)> {
        self.parents
    }

    pub(crate) fn set_parents(&mut self, first: ClauseIdx, second: ClauseIdx) {
        self.parents = Some((first, second));
    }

    /// Removes `literal`, re-signs the clause with `signer` and returns the
    /// new length. A return value of 0 means the clause became empty.
    pub fn remove_literal(&mut self, literal: Literal, signer: &Signer) -> Result<usize, ClauseError> {
        ensure!(signer.key() == self.signer, SignerMismatch);
        let position = self
            .literals
            .binary_search(&literal)
            .ok()
            .context(LiteralNotFound { literal })?;

        self.literals.remove(position);
        self.signature = signer.sign(&self.literals);

        Ok(self.literals.len())
    }

    pub fn to_dimacs(&self) -> Vec<i64> {
        self.iter().map(|literal| literal.to_dimacs()).collect()
    }

    /// DIMACS clause line, terminated by `" 0\n"`.
    pub fn to_text(&self) -> String {
        format!("{}\n", self)
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for literal in &self.literals {
            write!(f, "{} ", literal)?;
        }
        write!(f, "0")
    }
}
