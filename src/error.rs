//! Error handling for the crate.
//!
//! Internally everything is an `anyhow::Error` with `.context(...)` added at each I/O boundary.
//! Public command functions tag their errors with an `ErrorType` so callers can tell a bad input
//! from a broken database without string matching.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The broad category of a failure surfaced by a command.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The home directory or `config.json` is missing or invalid.
    Config,
    /// The SQLite store could not be read or written.
    Database,
    /// The user supplied input that cannot be used, e.g. a missing amount.
    Validation,
    /// A call to the AI service failed.
    Request,
    /// A file could not be read or written.
    Io,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// An error that carries its `ErrorType`. Displays the full context chain of the inner error.
pub struct TaggedError {
    error_type: ErrorType,
    inner: Error,
}

impl TaggedError {
    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }
}

impl Debug for TaggedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.inner)
    }
}

impl Display for TaggedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.inner)
    }
}

impl std::error::Error for TaggedError {}

/// Returns the `ErrorType` of `e` if it was tagged with `pub_result`.
pub fn error_type(e: &Error) -> Option<ErrorType> {
    e.downcast_ref::<TaggedError>().map(TaggedError::error_type)
}

/// Converts an internal result into a public, tagged one.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| {
            let inner: Error = e.into();
            if inner.is::<TaggedError>() {
                return inner;
            }
            Error::new(TaggedError { error_type, inner })
        })
    }
}
