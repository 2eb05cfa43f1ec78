/*!
Resolvent files: a short `c` header followed by one DIMACS line per clause.
*/

use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use crate::closure::Rounds;
use crate::formula::Clause;
use crate::prelude::*;
use crate::store::Formula;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to write resolvents to '{}'", path.display()))]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// How far resolution was carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    Level(usize),
    Convergence,
}

impl Display for Depth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Depth::Level(level) => write!(f, "To level {}", level),
            Depth::Convergence => write!(f, "To convergence"),
        }
    }
}

pub struct ResolventListing<'a> {
    max_length: usize,
    depth: Depth,
    clauses: Vec<&'a Clause>,
}

impl<'a> ResolventListing<'a> {
    pub fn new(max_length: usize, depth: Depth) -> Self {
        ResolventListing {
            max_length,
            depth,
            clauses: Vec::new(),
        }
    }

    /// Lists the clauses accepted in `rounds`, in round order.
    pub fn from_rounds(formula: &'a Formula, rounds: &Rounds, max_length: usize, depth: Depth) -> Self {
        let mut listing = ResolventListing::new(max_length, depth);
        listing.extend(
            rounds
                .values()
                .flatten()
                .filter_map(|&index| formula.clause(index)),
        );
        listing
    }

    pub fn push(&mut self, clause: &'a Clause) {
        self.clauses.push(clause);
    }

    pub fn extend(&mut self, clauses: impl IntoIterator<Item = &'a Clause>) {
        self.clauses.extend(clauses);
    }

    pub fn clauses(&self) -> &[&'a Clause] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Writes the listing to `output`, or into `<output>/<stem>.resolvents`
    /// when `output` is a directory. Returns the path written.
    pub fn write_to(&self, output: &Path, formula_path: &Path) -> Result<PathBuf, Error> {
        let path = output_path(output, formula_path);
        std::fs::write(&path, self.to_string()).context(WriteError { path: path.clone() })?;

        info!("Wrote {} resolvents to '{}'", self.len(), path.display());
        Ok(path)
    }
}

impl<'a> Display for ResolventListing<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "c Max length {}", self.max_length)?;
        writeln!(f, "c {}", self.depth)?;
        for clause in &self.clauses {
            writeln!(f, "{}", clause)?;
        }
        Ok(())
    }
}

pub fn output_path(output: &Path, formula_path: &Path) -> PathBuf {
    if !output.is_dir() {
        return output.to_owned();
    }

    let stem = formula_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "formula".to_owned());
    output.join(format!("{}.resolvents", stem))
}
