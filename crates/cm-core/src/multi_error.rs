//! Aggregate of independent failures.
//!
//! Scanning a scripts directory and executing the statements of one script
//! both keep going after an individual failure. [`MultiError`] collects those
//! failures so they can be reported together.

use std::fmt;

/// An ordered collection of errors that renders as one message.
///
/// A single error displays as itself. Several errors display as
/// `Multiple Errors:` followed by each message on its own line, indented by
/// two spaces.
#[derive(Debug)]
pub struct MultiError<E> {
    errors: Vec<E>,
}

impl<E> MultiError<E> {
    /// Create an empty aggregate.
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Append an error.
    pub fn push(&mut self, err: E) {
        self.errors.push(err);
    }

    /// Number of collected errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// `true` when nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate the collected errors in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.errors.iter()
    }

    /// Consume the aggregate and return the underlying errors.
    pub fn into_inner(self) -> Vec<E> {
        self.errors
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl<E> Default for MultiError<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> From<Vec<E>> for MultiError<E> {
    fn from(errors: Vec<E>) -> Self {
        Self { errors }
    }
}

impl<E> FromIterator<E> for MultiError<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl<E> IntoIterator for MultiError<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a MultiError<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl<E: fmt::Display> fmt::Display for MultiError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => Ok(()),
            [only] => write!(f, "{only}"),
            many => {
                f.write_str("Multiple Errors:")?;
                for err in many {
                    write!(f, "\n  {err}")?;
                }
                Ok(())
            }
        }
    }
}

impl<E: std::error::Error> std::error::Error for MultiError<E> {}

#[cfg(test)]
#[path = "multi_error_test.rs"]
mod tests;
