use crate::{
    combinations::combinations,
    formula::{Clause, ClauseError, Literal, Variable, VariableParseError},
    resolve::{resolve_literals, Resolution},
    signature::{SignatureScheme, Signer},
};

use super::lits;

fn variable(id: u64) -> Variable {
    Variable::from_id(id).unwrap()
}

#[test]
fn literal_parsing() {
    let literal = "-5".parse::<Literal>().unwrap();
    assert_eq!(literal.to_dimacs(), -5);
    assert!(!literal.positive());
    assert_eq!(literal.variable(), variable(5));
    assert_eq!((!literal).to_dimacs(), 5);

    assert!(matches!(
        "0".parse::<Literal>(),
        Err(VariableParseError::ZeroError)
    ));
    assert!(matches!(
        "x1".parse::<Literal>(),
        Err(VariableParseError::ParseIntError { .. })
    ));
    assert!(matches!(
        "8589934592".parse::<Literal>(),
        Err(VariableParseError::RangeError { num: 8589934592 })
    ));
}

#[test]
fn literal_order_puts_complements_together() {
    let mut literals = lits(&[3, -1, 2, 1, -3]);
    literals.sort();
    let values = literals.iter().map(Literal::to_dimacs).collect::<Vec<_>>();
    assert_eq!(values, vec![-1, 1, 2, -3, 3]);
}

#[test]
fn build_sorts_and_merges() {
    let signer = Signer::new(5, SignatureScheme::default());
    let clause = Clause::build(lits(&[4, -2, 4, 1]), &signer).unwrap();

    assert_eq!(clause.to_dimacs(), vec![1, -2, 4]);
    assert_eq!(clause.len(), 3);
    assert!(clause.contains(Literal::from_dimacs(-2).unwrap()));
    assert!(!clause.contains(Literal::from_dimacs(2).unwrap()));
    assert_eq!(clause.parents(), None);
}

#[test]
fn build_rejects_tautology_and_unknown_variables() {
    let signer = Signer::new(5, SignatureScheme::default());

    assert!(matches!(
        Clause::build(lits(&[1, 3, -1]), &signer),
        Err(ClauseError::InvalidClause { .. })
    ));
    assert!(matches!(
        Clause::build(lits(&[1, 6]), &signer),
        Err(ClauseError::VariableOutOfRange {
            num_variables: 5,
            ..
        })
    ));
}

#[test]
fn clause_text() {
    let signer = Signer::new(3, SignatureScheme::default());
    let clause = Clause::build(lits(&[-3, 2, 1]), &signer).unwrap();
    assert_eq!(clause.to_string(), "1 2 -3 0");
    assert_eq!(clause.to_text(), "1 2 -3 0\n");

    let empty = Clause::build(Vec::new(), &signer).unwrap();
    assert_eq!(empty.to_text(), "0\n");
}

#[test]
fn remove_literal_updates_signature() {
    let signer = Signer::new(4, SignatureScheme::default());
    let mut clause = Clause::build(lits(&[1, -2, 3]), &signer).unwrap();
    let expected = Clause::build(lits(&[1, 3]), &signer).unwrap();

    assert_eq!(
        clause
            .remove_literal(Literal::from_dimacs(-2).unwrap(), &signer)
            .unwrap(),
        2
    );
    assert_eq!(clause.signature(), expected.signature());
    assert!(matches!(
        clause.remove_literal(Literal::from_dimacs(4).unwrap(), &signer),
        Err(ClauseError::LiteralNotFound { .. })
    ));
}

#[test]
fn clauses_keep_only_the_signer_key() {
    let signer = Signer::new(4, SignatureScheme::Salted { seed: 7 });
    let mut clause = Clause::build(lits(&[1, 2]), &signer).unwrap();
    assert_eq!(clause.signer_key(), signer.key());
    assert_eq!(clause.signer_key().num_variables, 4);

    let other = Signer::new(4, SignatureScheme::Salted { seed: 8 });
    assert!(matches!(
        clause.remove_literal(Literal::from_dimacs(1).unwrap(), &other),
        Err(ClauseError::SignerMismatch)
    ));
    assert_eq!(clause.len(), 2);
}

#[test]
fn signatures_ignore_literal_order() {
    for &scheme in &[SignatureScheme::default(), SignatureScheme::Canonical] {
        let signer = Signer::new(6, scheme);
        let a = Clause::build(lits(&[5, -1, 3]), &signer).unwrap();
        let b = Clause::build(lits(&[3, 5, -1, 3]), &signer).unwrap();
        let c = Clause::build(lits(&[5, 1, 3]), &signer).unwrap();

        assert_eq!(a.signature(), b.signature());
        assert_ne!(a.signature(), c.signature());
    }
}

#[test]
fn salts_depend_on_seed() {
    let literals = lits(&[1, -2]);
    let a = Signer::new(2, SignatureScheme::Salted { seed: 1 });
    let b = Signer::new(2, SignatureScheme::Salted { seed: 1 });
    let c = Signer::new(2, SignatureScheme::Salted { seed: 2 });

    assert_eq!(a.sign(&literals), b.sign(&literals));
    assert_ne!(a.sign(&literals), c.sign(&literals));
    assert!(a.is_compatible(&b));
    assert!(!a.is_compatible(&c));
}

#[test]
fn proper_subsets_are_checked() {
    let signer = Signer::new(4, SignatureScheme::Canonical);
    let subset = signer.sign(&lits(&[1, 3]));
    let whole = signer.sign(&lits(&[1, 2, 3]));

    assert!(signer.any_proper_subset(&lits(&[1, 2, 3]), |signature| *signature == subset));
    assert!(!signer.any_proper_subset(&lits(&[1, 2, 3]), |signature| *signature == whole));
    assert!(!signer.any_proper_subset(&lits(&[1]), |_| true));
}

#[test]
fn combinations_in_order() {
    let pool = [1, 2, 3, 4];
    assert_eq!(
        combinations(&pool, 2).collect::<Vec<_>>(),
        vec![
            vec![1, 2],
            vec![1, 3],
            vec![1, 4],
            vec![2, 3],
            vec![2, 4],
            vec![3, 4]
        ]
    );
    assert_eq!(combinations(&pool, 4).count(), 1);
    assert_eq!(combinations(&pool, 0).collect::<Vec<_>>(), vec![Vec::<i32>::new()]);
    assert_eq!(combinations(&pool, 5).count(), 0);
}

#[test]
fn resolution_on_pivot() {
    let resolution = resolve_literals(&lits(&[1, 38, -210]), &lits(&[-1, 87, -98]), variable(1), 10);
    let mut expected = lits(&[-210, -98, 38, 87]);
    expected.sort();
    assert_eq!(resolution, Resolution::Resolvent(expected));
}

#[test]
fn resolution_rejects_tautology_and_length() {
    let mut first = lits(&[1, 2, 3]);
    let mut second = lits(&[-1, -2, 4]);
    first.sort();
    second.sort();

    assert_eq!(
        resolve_literals(&first, &second, variable(1), 10),
        Resolution::Tautology
    );
    assert_eq!(
        resolve_literals(&first, &second, variable(2), 10),
        Resolution::Tautology
    );

    let mut third = lits(&[-1, 4, 5]);
    third.sort();
    assert_eq!(
        resolve_literals(&first, &third, variable(1), 3),
        Resolution::TooLong
    );
    assert!(matches!(
        resolve_literals(&first, &third, variable(1), 4),
        Resolution::Resolvent(literals) if literals.len() == 4
    ));
}
