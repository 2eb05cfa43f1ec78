use std::{fs, path::Path};

use crate::{
    closure::{ClosureFormula, ClosureOptions},
    listing::{output_path, Depth, ResolventListing},
    store::Formula,
};

use super::add;

#[test]
fn depth_headers() {
    assert_eq!(Depth::Level(1).to_string(), "To level 1");
    assert_eq!(Depth::Level(3).to_string(), "To level 3");
    assert_eq!(Depth::Convergence.to_string(), "To convergence");
}

#[test]
fn listing_text() {
    let mut formula = Formula::new(3);
    add(&mut formula, &[1, 2]);
    add(&mut formula, &[-1, 3]);
    add(&mut formula, &[-2, -3]);
    let mut closure = ClosureFormula::new(formula, ClosureOptions::default());
    let rounds = closure.resolve_multiple_times(1, 4).unwrap();

    let listing = ResolventListing::from_rounds(closure.formula(), &rounds, 4, Depth::Level(1));
    assert_eq!(listing.len(), 3);
    assert_eq!(
        listing.to_string(),
        "c Max length 4\nc To level 1\n2 3 0\n1 -3 0\n-1 -2 0\n"
    );

    let empty = ResolventListing::new(2, Depth::Convergence);
    assert!(empty.is_empty());
    assert_eq!(empty.to_string(), "c Max length 2\nc To convergence\n");
}

#[test]
fn listing_from_clauses() {
    let mut formula = Formula::new(3);
    let a = add(&mut formula, &[3, -1]);
    let b = add(&mut formula, &[2]);

    let mut listing = ResolventListing::new(3, Depth::Level(2));
    listing.push(formula.clause(a).unwrap());
    listing.extend(formula.clause(b));
    assert_eq!(listing.clauses().len(), 2);
    assert_eq!(listing.to_string(), "c Max length 3\nc To level 2\n-1 3 0\n2 0\n");
}

#[test]
fn output_paths() {
    let formula_path = Path::new("benchmarks/uf20-01.cnf");
    let file = Path::new("out.txt");
    assert_eq!(output_path(file, formula_path), file.to_owned());

    let dir = std::env::temp_dir();
    assert_eq!(output_path(&dir, formula_path), dir.join("uf20-01.resolvents"));
}

#[test]
fn write_listing_into_directory() {
    let dir = std::env::temp_dir().join(format!("resolvent-listing-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();

    let mut formula = Formula::new(2);
    let a = add(&mut formula, &[1, -2]);
    let mut listing = ResolventListing::new(4, Depth::Convergence);
    listing.push(formula.clause(a).unwrap());

    let path = listing.write_to(&dir, Path::new("input.cnf")).unwrap();
    assert_eq!(path, dir.join("input.resolvents"));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "c Max length 4\nc To convergence\n1 -2 0\n"
    );

    fs::remove_dir_all(&dir).unwrap();
}
