use crate::{
    parser::{parse_file, parse_str, Error},
    signature::SignatureScheme,
};

use super::{canonical, salted};

#[test]
fn parse_simple_file() {
    let parsed = parse_file("testcases/parser/simple.cnf", salted()).unwrap();
    assert_eq!(parsed.num_variables, 5);
    assert_eq!(parsed.num_clauses, 4);

    let formula = parsed.formula;
    assert_eq!(formula.num_variables(), 5);
    assert_eq!(formula.num_clauses(), 4);
    assert_eq!(formula.current_max_length(), 4);

    let clauses = formula
        .clauses()
        .map(|(_, clause)| clause.to_dimacs())
        .collect::<Vec<_>>();
    assert_eq!(
        clauses,
        vec![
            vec![1, -2],
            vec![2, 3, -5],
            vec![-1, -3],
            vec![1, -2, 4, 5]
        ]
    );
}

#[test]
fn parse_satlib_trailer() {
    let parsed = parse_file("testcases/parser/satlib.cnf", canonical()).unwrap();
    assert_eq!(parsed.formula.num_clauses(), 2);
    assert_eq!(parsed.formula.signer().scheme(), SignatureScheme::Canonical);
}

#[test]
fn missing_problem_line() {
    assert!(matches!(
        parse_file("testcases/parser/no_problem_line.cnf", salted()),
        Err(Error::MalformedProblemDefinition)
    ));
    assert!(matches!(
        parse_str("p dnf 3 2\n1 2 0\n", salted()),
        Err(Error::MalformedProblemDefinition)
    ));
    assert!(matches!(
        parse_str("p cnf three 2\n", salted()),
        Err(Error::MalformedProblemDefinition)
    ));
}

#[test]
fn missing_file() {
    assert!(matches!(
        parse_file("testcases/parser/does_not_exist.cnf", salted()),
        Err(Error::IoError { .. })
    ));
}

#[test]
fn malformed_clauses() {
    assert!(matches!(
        parse_str("p cnf 3 1\n1 2\n", salted()),
        Err(Error::MalformedClause { line: 2, .. })
    ));
    assert!(matches!(
        parse_str("c header\np cnf 3 1\n1 a 0\n", salted()),
        Err(Error::MalformedLiteral { line: 3, .. })
    ));
    assert!(matches!(
        parse_str("p cnf 3 1\n1 -1 0\n", salted()),
        Err(Error::InvalidClause { line: 2, .. })
    ));
    assert!(matches!(
        parse_str("p cnf 3 1\n1 4 0\n", salted()),
        Err(Error::InvalidClause { line: 2, .. })
    ));
}

#[test]
fn lenient_clause_lines() {
    let text = "p cnf 3 5\n\n1 2 2 0\nc inner comment\n0\n-3 0\n";
    let parsed = parse_str(text, salted()).unwrap();

    // the empty clause is skipped and the declared count is only advisory
    assert_eq!(parsed.num_clauses, 5);
    let clauses = parsed
        .formula
        .clauses()
        .map(|(_, clause)| clause.to_dimacs())
        .collect::<Vec<_>>();
    assert_eq!(clauses, vec![vec![1, 2], vec![-3]]);
}

#[test]
fn variable_count_out_of_range() {
    assert!(matches!(
        parse_str("p cnf 4294967296 0\n", salted()),
        Err(Error::TooManyVariables {
            num_variables: 4294967296
        })
    ));
    assert!(matches!(
        parse_str("p cnf 18446744073709551616 0\n", salted()),
        Err(Error::MalformedProblemDefinition)
    ));

    let parsed = parse_str("p cnf 0 0\n", salted()).unwrap();
    assert_eq!(parsed.num_variables, 0);
    assert_eq!(parsed.formula.num_clauses(), 0);
}
