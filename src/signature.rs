/*!
Duplicate-detection signatures of clauses.

Two schemes are available. The salted scheme maps every literal to a
pseudorandom 64-bit salt, drawn once from a seeded generator when the formula
declares its variable count, and adds the salts of a clause's literals. It is
cheap and position independent, but two different literal sets collide with
probability about `2^-64` per pair. The canonical scheme uses the sorted
literal sequence itself and never collides, at the cost of storing a copy of
every clause's literals in the signature set.
*/

use std::{fmt, sync::Arc};

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::combinations::combinations;
use crate::formula::Literal;

pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureScheme {
    Salted { seed: u64 },
    Canonical,
}

impl Default for SignatureScheme {
    fn default() -> Self {
        SignatureScheme::Salted { seed: DEFAULT_SEED }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Signature {
    Salted(u64),
    Canonical(Box<[Literal]>),
}

/// Identifies the salt table of a [`Signer`]. Signers with equal keys compute
/// equal signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignerKey {
    pub num_variables: usize,
    pub scheme: SignatureScheme,
}

/// Computes signatures for clauses over a fixed number of variables.
///
/// Cloning is cheap, the salt table is shared.
#[derive(Clone)]
pub struct Signer {
    num_variables: usize,
    scheme: SignatureScheme,
    /// Literal code -> salt. Empty for the canonical scheme.
    salts: Arc<[u64]>,
}

impl Signer {
    pub fn new(num_variables: usize, scheme: SignatureScheme) -> Self {
        let salts: Arc<[u64]> = match scheme {
            SignatureScheme::Salted { seed } => {
                let mut rng = StdRng::seed_from_u64(seed);
                (0..2 * num_variables).map(|_| rng.gen::<u64>()).collect()
            }
            SignatureScheme::Canonical => Arc::from(Vec::new()),
        };

        Signer {
            num_variables,
            scheme,
            salts,
        }
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn scheme(&self) -> SignatureScheme {
        self.scheme
    }

    pub fn key(&self) -> SignerKey {
        SignerKey {
            num_variables: self.num_variables,
            scheme: self.scheme,
        }
    }

    /// Returns true if clauses signed by `other` can live in the same formula.
    pub fn is_compatible(&self, other: &Signer) -> bool {
        self.key() == other.key()
    }

    /// Signs a sorted, duplicate-free literal slice.
    pub fn sign(&self, literals: &[Literal]) -> Signature {
        match self.scheme {
            SignatureScheme::Salted { .. } => Signature::Salted(
                literals
                    .iter()
                    .fold(0u64, |acc, literal| acc.wrapping_add(self.salts[literal.code()])),
            ),
            SignatureScheme::Canonical => Signature::Canonical(literals.into()),
        }
    }

    /// Returns true if `predicate` holds for the signature of some proper,
    /// non-empty subset of `literals`. Exponential in `literals.len()`.
    pub fn any_proper_subset<F>(&self, literals: &[Literal], mut predicate: F) -> bool
    where
        F: FnMut(&Signature) -> bool,
    {
        (1..literals.len()).any(|size| {
            combinations(literals, size).any(|subset| predicate(&self.sign(&subset)))
        })
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("num_variables", &self.num_variables)
            .field("scheme", &self.scheme)
            .finish()
    }
}
