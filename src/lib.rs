#[macro_use]
extern crate log;

pub mod closure;
pub mod combinations;
pub mod formula;
pub mod listing;
pub mod parser;
pub mod prelude;
pub mod report;
pub mod resolve;
pub mod signature;
pub mod store;

#[cfg(test)]
mod tests;
