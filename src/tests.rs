use std::collections::BTreeSet;

use paste::paste;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::{
    closure::{ClosureFormula, ClosureOptions, PairPolicy, Rounds},
    formula::{ClauseIdx, Literal, Variable},
    parser::parse_file,
    signature::SignatureScheme,
    store::Formula,
};

mod clause;
mod listing;
mod parser;

pub fn lits(values: &[i64]) -> Vec<Literal> {
    values
        .iter()
        .map(|&value| Literal::from_dimacs(value).unwrap())
        .collect()
}

pub fn add(formula: &mut Formula, values: &[i64]) -> ClauseIdx {
    let clause = formula.build_clause(lits(values)).unwrap();
    formula.add_clause(clause).unwrap()
}

pub fn salted() -> SignatureScheme {
    SignatureScheme::default()
}

pub fn canonical() -> SignatureScheme {
    SignatureScheme::Canonical
}

/// Clauses over distinct variables with random polarities, 2 to 4 literals
/// each.
pub fn random_formula(
    seed: u64,
    num_variables: usize,
    num_clauses: usize,
    scheme: SignatureScheme,
) -> Formula {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut formula = Formula::with_scheme(num_variables, scheme);
    let variables = (0..num_variables)
        .map(|index| Variable::from_index(index).unwrap())
        .collect::<Vec<_>>();

    for _ in 0..num_clauses {
        let length = rng.gen_range(2..=4);
        let chosen = variables
            .choose_multiple(&mut rng, length)
            .copied()
            .collect::<Vec<_>>();
        let literals = chosen
            .into_iter()
            .map(|variable| Literal::new(variable, rng.gen()))
            .collect::<Vec<_>>();
        let clause = formula.build_clause(literals).unwrap();
        formula.add_clause(clause).unwrap();
    }

    formula
}

/// DIMACS literals of every clause accepted in `rounds`.
pub fn accepted_clauses(formula: &Formula, rounds: &Rounds) -> BTreeSet<Vec<i64>> {
    rounds
        .values()
        .flatten()
        .map(|&index| formula.clause(index).unwrap().to_dimacs())
        .collect()
}

/// Every subset of {1, ..., n} except the empty and the full one.
fn proper_positive_subsets(n: usize) -> BTreeSet<Vec<i64>> {
    (1..(1usize << n) - 1)
        .map(|mask| {
            (0..n)
                .filter(|bit| mask & (1 << bit) != 0)
                .map(|bit| bit as i64 + 1)
                .collect()
        })
        .collect()
}

macro_rules! convergence_testcase {
    ($policy:ident, $scheme:ident, $name:ident) => {
        paste! {
            #[test]
            fn [< convergence_ $scheme _ $name _ $policy:snake >]() {
                let parsed = parse_file(
                    concat!("testcases/closure/", stringify!($name), ".cnf"),
                    $scheme(),
                ).unwrap();
                let n = parsed.num_variables;

                let mut closure = ClosureFormula::new(
                    parsed.formula,
                    ClosureOptions {
                        pair_policy: PairPolicy::$policy,
                        provenance: false,
                    },
                );
                let rounds = closure.resolve_to_convergence(n).unwrap();

                let expected = proper_positive_subsets(n);
                assert_eq!(rounds.values().map(Vec::len).sum::<usize>(), expected.len());
                assert_eq!(accepted_clauses(closure.formula(), &rounds), expected);
                assert_eq!(rounds.len(), n - 1);
                assert!(closure.is_refuted());
            }
        }
    };
}

macro_rules! convergence_testcases {
    ($name:ident) => {
        convergence_testcase!(OncePerPair, salted, $name);
        convergence_testcase!(OncePerPivot, salted, $name);
        convergence_testcase!(OncePerPair, canonical, $name);
        convergence_testcase!(OncePerPivot, canonical, $name);
    };
}

convergence_testcases!(input_res_4);
convergence_testcases!(input_res_6);
convergence_testcases!(input_res_10);
