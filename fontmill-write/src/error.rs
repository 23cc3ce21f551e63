//! Errors that occur during writing

use types::Tag;

/// An error occured while writing a table
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A value does not fit in the field that stores it.
    ValueOutOfRange(&'static str),
    /// A table or record is structurally invalid.
    InvalidTable(&'static str),
    /// A field was patched in a table too short to hold it.
    TableTooShort { expected: usize, found: usize },
}

/// An error returned when attempting to add a table to the builder.
///
/// This wraps a compilation error, adding the tag of the table where it was
/// encountered.
#[derive(Clone, Debug)]
pub struct BuilderError {
    /// The tag of the root table where the error occurred
    pub tag: Tag,
    /// The underlying error
    pub inner: Error,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ValueOutOfRange(what) => write!(f, "value out of range: {what}"),
            Error::InvalidTable(what) => write!(f, "invalid table: {what}"),
            Error::TableTooShort { expected, found } => {
                write!(f, "table too short: expected {expected} bytes, found {found}")
            }
        }
    }
}

impl std::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to build '{}' table: '{}'", self.tag, self.inner)
    }
}

impl std::error::Error for Error {}

impl std::error::Error for BuilderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.inner)
    }
}
