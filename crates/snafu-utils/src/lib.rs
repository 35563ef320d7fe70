//! Shared error plumbing: caller locations, a catch-all error and a report
//! formatter that walks the source chain.

use std::{error::Error, fmt};

use ansi_term::{Color, WithFg};
use snafu::{GenerateImplicitData, Snafu};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Location(&'static core::panic::Location<'static>);

impl Default for Location {
    #[track_caller]
    fn default() -> Self {
        Self(core::panic::Location::caller())
    }
}

impl GenerateImplicitData for Location {
    #[track_caller]
    fn generate() -> Self {
        Self::default()
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Snafu)]
#[snafu(whatever, display("{message}"))]
pub struct GenericError {
    message: String,
    #[snafu(implicit)]
    location: Location,
    #[snafu(source(from(Box<dyn Error>, Some)))]
    source: Option<Box<dyn Error>>,
}

impl GenericError {
    #[must_use]
    pub fn location(&self) -> Location {
        self.location
    }
}

fn location_of(error: &(dyn Error + 'static)) -> Option<Location> {
    error.downcast_ref::<GenericError>().map(GenericError::location)
}

pub struct Report<E> {
    error: E,
}

impl<E> fmt::Debug for Report<E>
where
    E: Error + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl<E> fmt::Display for Report<E>
where
    E: Error + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Error: {}", WithFg::new(Color::Red, &self.error))?;
        if let Some(loc) = location_of(&self.error) {
            writeln!(f, "  at {}", WithFg::new(Color::DarkGray, loc))?;
        }
        let mut source = self.error.source();
        if source.is_some() {
            writeln!(f)?;
            writeln!(f, "Caused by:")?;
        }
        let mut index = 0;
        while let Some(s) = source {
            writeln!(f, "{index:4}: {}", WithFg::new(Color::Red, s))?;
            if let Some(loc) = location_of(s) {
                writeln!(f, "      at {}", WithFg::new(Color::DarkGray, loc))?;
            }
            source = s.source();
            index += 1;
        }
        Ok(())
    }
}

impl<E> Report<E> {
    pub fn new(error: E) -> Self {
        Self { error }
    }
}

#[cfg(test)]
mod tests {
    use snafu::{ResultExt as _, whatever};

    use super::*;

    fn inner() -> Result<(), GenericError> {
        whatever!("disk on fire")
    }

    fn outer() -> Result<(), GenericError> {
        inner().whatever_context("failed to run workload")
    }

    #[test]
    fn test_report_lists_causes() {
        ansi_term::set_enabled(false);
        let err = outer().unwrap_err();
        let report = Report::new(err).to_string();
        assert!(report.starts_with("Error: failed to run workload\n"));
        assert!(report.contains("Caused by:\n"));
        assert!(report.contains("   0: disk on fire\n"));
    }
}
