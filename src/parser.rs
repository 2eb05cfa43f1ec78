use std::path::{Path, PathBuf};

use crate::formula::{Literal, Variable, VariableParseError};
use crate::prelude::*;
use crate::signature::SignatureScheme;
use crate::store::{self, Formula};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("I/O error occurred while reading CNF file '{}'", path.display()))]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to parse line {} '{}' as clause", line, clause))]
    MalformedClause { line: usize, clause: String },
    #[snafu(display("Invalid literal found on line {} '{}'", line, clause))]
    MalformedLiteral {
        line: usize,
        clause: String,
        source: VariableParseError,
    },
    #[snafu(display("Problem line 'p cnf <num_variables> <num_clauses>' is not found"))]
    MalformedProblemDefinition,
    #[snafu(display(
        "Problem line declares {} variables (must be at most {})",
        num_variables,
        Variable::MAX_VARIABLE_ID
    ))]
    TooManyVariables { num_variables: u64 },
    #[snafu(display("Clause on line {} '{}' is rejected", line, clause))]
    InvalidClause {
        line: usize,
        clause: String,
        source: store::Error,
    },
}

/// A parsed DIMACS file together with the counts its problem line declares.
#[derive(Debug)]
pub struct ParsedFormula {
    pub formula: Formula,
    pub num_variables: usize,
    pub num_clauses: usize,
}

/// Parse a line to the literals of a clause
fn parse_line(number: usize, line: &str) -> Result<Vec<Literal>, Error> {
    let splitted = line.split_whitespace().collect::<Vec<_>>();

    ensure!(
        splitted.last() == Some(&"0"),
        MalformedClause {
            line: number,
            clause: line.to_owned(),
        }
    );

    splitted[..splitted.len() - 1]
        .iter()
        .map(|s| {
            s.parse::<Literal>().with_context(|| MalformedLiteral {
                line: number,
                clause: line.to_owned(),
            })
        })
        .collect()
}

fn parse_problem_line(line: &str) -> Result<(usize, usize), Error> {
    let splitted = line.split_whitespace().collect::<Vec<_>>();

    // We only support CNF DIMACS format
    ensure!(
        splitted.len() == 4 && splitted[0] == "p" && splitted[1] == "cnf",
        MalformedProblemDefinition
    );

    let (num_variables, num_clauses) =
        match (splitted[2].parse::<u64>(), splitted[3].parse::<usize>()) {
            (Ok(num_variables), Ok(num_clauses)) => (num_variables, num_clauses),
            _ => return MalformedProblemDefinition.fail(),
        };

    ensure!(
        num_variables <= Variable::MAX_VARIABLE_ID as u64,
        TooManyVariables { num_variables }
    );

    Ok((num_variables as usize, num_clauses))
}

/// Parses a CNF formula from DIMACS text
pub fn parse_str(text: &str, scheme: SignatureScheme) -> Result<ParsedFormula, Error> {
    // skip until we find the problem definition
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .skip_while(|(_, line)| !line.starts_with('p'));

    let (_, prob_line) = lines
        .next()
        .ok_or_else(|| MalformedProblemDefinition.build())?;
    let (num_variables, num_clauses) = parse_problem_line(prob_line)?;

    let mut formula = Formula::with_scheme(num_variables, scheme);
    let mut found = 0;

    for (number, line) in lines {
        if line.is_empty() || line.starts_with('c') {
            // empty line, comment
            continue;
        }
        if line.starts_with('%') {
            // SATLIB end marker
            break;
        }

        let literals = parse_line(number, line)?;
        found += 1;
        if literals.is_empty() {
            warn!("Skipping empty clause on line {}", number);
            continue;
        }

        let clause = formula
            .build_clause(literals)
            .with_context(|| InvalidClause {
                line: number,
                clause: line.to_owned(),
            })?;
        formula.add_clause(clause).with_context(|| InvalidClause {
            line: number,
            clause: line.to_owned(),
        })?;
    }

    if found != num_clauses {
        warn!(
            "The number of clauses ({}) does not match the clauses number in the problem definition ({})",
            found, num_clauses
        );
    }

    Ok(ParsedFormula {
        formula,
        num_variables,
        num_clauses,
    })
}

/// Parses a CNF formula from a file
pub fn parse_file(path: impl AsRef<Path>, scheme: SignatureScheme) -> Result<ParsedFormula, Error> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).context(IoError {
        path: path.to_owned(),
    })?;

    debug!("Parsing CNF file '{}'", path.display());
    parse_str(&text, scheme)
}
