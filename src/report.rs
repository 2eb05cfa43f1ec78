/*!
Error printer for the command line binary.
*/

use std::error::Error as StdError;

/// Wraps the top level error so that `main` prints the whole `source()` chain
/// instead of the `Debug` representation.
pub struct Report(Box<dyn StdError>);

impl std::fmt::Debug for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.0)?;

        let mut cause = self.0.source();
        if cause.is_some() {
            writeln!(f, "\nCaused by:")?;
        }

        let mut depth = 0;
        while let Some(error) = cause {
            writeln!(f, "  {}: {}", depth, error)?;
            depth += 1;
            cause = error.source();
        }

        Ok(())
    }
}

impl<E: Into<Box<dyn StdError>>> From<E> for Report {
    fn from(e: E) -> Self {
        Report(e.into())
    }
}
