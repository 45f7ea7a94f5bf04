//! Strongly-typed migration version.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, TimeZone};
use std::fmt;
use std::ops::Deref;

/// `chrono` format for a version: year, month, day, hour, minute.
pub const VERSION_FORMAT: &str = "%Y%m%d%H%M";

/// Number of digits in a version string.
pub const VERSION_LEN: usize = 12;

/// A 12-digit `YYYYMMDDhhmm` timestamp used as the migration ordering key.
///
/// The fixed width makes the derived lexicographic `Ord` agree with
/// chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version(String);

impl Version {
    /// Parse a version, rejecting anything that is not exactly 12 ASCII digits.
    pub fn parse(value: impl Into<String>) -> CoreResult<Self> {
        let s = value.into();
        if s.len() == VERSION_LEN && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s))
        } else {
            Err(CoreError::InvalidVersion { value: s })
        }
    }

    /// Format a point in time as a version.
    pub fn from_datetime<Tz: TimeZone>(at: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self(at.format(VERSION_FORMAT).to_string())
    }

    /// Version for the current local time.
    pub fn now() -> Self {
        Self::from_datetime(&chrono::Local::now())
    }

    /// Return the underlying version as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for Version {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Version {
    type Error = CoreError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Version {
    type Error = CoreError;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl PartialEq<str> for Version {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Version {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
