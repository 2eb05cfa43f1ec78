#[macro_use]
extern crate log;

use std::{
    env::args,
    num::ParseIntError,
    path::{Path, PathBuf},
    str::FromStr,
};

use pretty_env_logger::formatted_builder;
use resolvent::{
    closure::{ClosureFormula, ClosureOptions, PairPolicy},
    formula::ClauseIdx,
    listing::{self, Depth, ResolventListing},
    parser::{self, parse_file},
    prelude::*,
    report::Report,
    resolve::Resolver,
    signature::{SignatureScheme, DEFAULT_SEED},
    store::{self, Formula},
};

fn usage_string() -> String {
    format!(
        "Usage: {} <command> <file_name> [options]

command:
    level <file_name>    - compute the level 1 resolvents
    more <file_name>     - resolve for `--times` levels, dropping subsumed clauses
    converge <file_name> - resolve until no new clause is found

options:
    --max-length <n>     - maximal resolvent length (default 4)
    --times <n>          - number of levels for `more` (default 2)
    --output <path>      - write the resolvents to a file or directory
    --parents            - record and log the parents of each resolvent
    --per-pivot          - resolve a clause pair once per pivot variable
    --canonical          - use collision-free canonical clause signatures
    --seed <n>           - seed of the salted clause signatures (default {})",
        args().next().unwrap_or_else(|| "resolvent".to_owned()),
        DEFAULT_SEED,
    )
}

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Unknown command '{}'\n\n{}", name, usage_string()))]
    UnknownCommand { name: String },
    #[snafu(display("Unknown option '{}'\n\n{}", name, usage_string()))]
    UnknownOption { name: String },
    #[snafu(display("Option '{}' expects a number, found '{}'", option, value))]
    InvalidNumber {
        option: String,
        value: String,
        source: ParseIntError,
    },
    #[snafu(display("Failed to parse CNF"))]
    ParserError { source: parser::Error },
    #[snafu(display("Resolution failed"))]
    ResolutionError { source: store::Error },
    #[snafu(display("Failed to write the resolvents"))]
    ListingError { source: listing::Error },
    #[snafu(display("Required argument does not exist\n\n{}", usage_string()))]
    MissingArgument,
}

struct Options {
    max_length: usize,
    times: usize,
    output: Option<PathBuf>,
    parents: bool,
    pair_policy: PairPolicy,
    scheme: SignatureScheme,
}

fn number_argument<T>(option: &str, value: Option<&String>) -> Result<T, Error>
where
    T: FromStr<Err = ParseIntError>,
{
    let value = value.context(MissingArgument)?;
    value.parse().context(InvalidNumber {
        option: option.to_owned(),
        value: value.to_owned(),
    })
}

impl Options {
    fn parse(args: &[String]) -> Result<Self, Error> {
        let mut options = Options {
            max_length: 4,
            times: 2,
            output: None,
            parents: false,
            pair_policy: PairPolicy::OncePerPair,
            scheme: SignatureScheme::default(),
        };
        let mut seed = DEFAULT_SEED;
        let mut canonical = false;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--max-length" => options.max_length = number_argument(arg, iter.next())?,
                "--times" => options.times = number_argument(arg, iter.next())?,
                "--seed" => seed = number_argument(arg, iter.next())?,
                "--output" => options.output = Some(iter.next().context(MissingArgument)?.into()),
                "--parents" => options.parents = true,
                "--per-pivot" => options.pair_policy = PairPolicy::OncePerPivot,
                "--canonical" => canonical = true,
                name => UnknownOption {
                    name: name.to_owned(),
                }
                .fail()?,
            }
        }

        options.scheme = if canonical {
            SignatureScheme::Canonical
        } else {
            SignatureScheme::Salted { seed }
        };

        Ok(options)
    }
}

fn emit(
    path: &Path,
    options: &Options,
    formula: &Formula,
    listing: &ResolventListing<'_>,
) -> Result<(), Error> {
    if options.parents {
        let describe = |index| {
            formula
                .clause(index)
                .map(|clause| clause.to_string())
                .unwrap_or_default()
        };
        for clause in listing.clauses() {
            if let Some((first, second)) = clause.parents() {
                debug!("{} <- ({}) ({})", clause, describe(first), describe(second));
            }
        }
    }

    match &options.output {
        Some(output) => {
            listing.write_to(output, path).context(ListingError)?;
        }
        None => print!("{}", listing),
    }

    Ok(())
}

fn first_level(path: &Path, options: &Options) -> Result<(), Error> {
    let parsed = parse_file(path, options.scheme).context(ParserError)?;
    let mut formula = parsed.formula.with_provenance(options.parents);

    let resolvents = formula
        .distinct_resolvents(ClauseIdx::from(0), options.max_length)
        .context(ResolutionError)?;

    let mut listing = ResolventListing::new(options.max_length, Depth::Level(1));
    listing.extend(&resolvents);
    emit(path, options, &formula, &listing)
}

fn closure(path: &Path, options: &Options, depth: Depth) -> Result<(), Error> {
    let parsed = parse_file(path, options.scheme).context(ParserError)?;
    let mut closure = ClosureFormula::new(
        parsed.formula,
        ClosureOptions {
            pair_policy: options.pair_policy,
            provenance: options.parents,
        },
    );

    let rounds = match depth {
        Depth::Level(times) => closure.resolve_multiple_times(times, options.max_length),
        Depth::Convergence => closure.resolve_to_convergence(options.max_length),
    }
    .context(ResolutionError)?;

    let listing = ResolventListing::from_rounds(closure.formula(), &rounds, options.max_length, depth);
    emit(path, options, closure.formula(), &listing)
}

fn path_and_options(args: &[String]) -> Result<(&Path, Options), Error> {
    let path = args.get(1).context(MissingArgument)?;
    Ok((path.as_ref(), Options::parse(&args[2..])?))
}

fn dispatch_command(args: Vec<String>) -> Result<(), Error> {
    match args.get(0).map(|s| s.as_str()) {
        Some("level") => {
            let (path, options) = path_and_options(&args)?;
            first_level(path, &options)?;
        }
        Some("more") => {
            let (path, options) = path_and_options(&args)?;
            closure(path, &options, Depth::Level(options.times))?;
        }
        Some("converge") => {
            let (path, options) = path_and_options(&args)?;
            closure(path, &options, Depth::Convergence)?;
        }
        Some(name) => UnknownCommand {
            name: name.to_owned(),
        }
        .fail()?,
        None => MissingArgument.fail()?,
    }

    Ok(())
}

fn init_logger() {
    let mut builder = formatted_builder();

    if let Ok(s) = ::std::env::var("RUST_LOG") {
        builder.parse_filters(&s);
    } else if cfg!(debug_assertions) {
        builder.parse_filters("resolvent=debug");
    } else {
        builder.parse_filters("resolvent=info");
    }

    builder.try_init().expect("Failed to initialize the logger");
}

fn main() -> Result<(), Report> {
    init_logger();

    let mut args = args();

    // drop arg[0]
    args.next();

    let remaining: Vec<_> = args.collect();
    if remaining.is_empty() {
        println!("{}", usage_string());
        return Ok(());
    }

    dispatch_command(remaining)?;

    Ok(())
}
