//! Errors and recoverable diagnostics

use std::{fmt, path::PathBuf};

use fontmill_read::ReadError;
use fontmill_types::Tag;
use fontmill_write::BuilderError;
use thiserror::Error;

/// An error that stops an operation without producing a result.
#[derive(Debug, Error)]
pub enum Error {
    #[error("axis '{tag}' has min {min}, default {default}, max {max}")]
    DegenerateAxis {
        tag: Tag,
        min: f64,
        default: f64,
        max: f64,
    },

    #[error("the font has no axis '{0}'")]
    UnknownAxis(Tag),

    #[error("corrupt variation data in '{tag}': {reason}")]
    CorruptVariationData { tag: Tag, reason: String },

    #[error("the instance would be stored over its source font {}", .0.display())]
    InstanceIsSource(PathBuf),

    #[error("error reading font data: {0}")]
    Read(#[from] ReadError),

    #[error("error writing font data: {0}")]
    Write(#[from] BuilderError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn corrupt(tag: Tag, reason: impl fmt::Display) -> Self {
        Error::CorruptVariationData {
            tag,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// A problem found while extracting kerning.
///
/// The affected lookup or subtable is skipped and extraction continues.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// A kerning lookup that is not pair adjustment, such as contextual
    /// positioning.
    UnsupportedLookup { lookup_index: u16, lookup_type: u16 },
    /// A pair adjustment subtable whose first value format is not one of
    /// 0, 4 or 5.
    UnsupportedValueFormat { lookup_index: u16, value_format: u16 },
    /// A pair adjustment subtable in neither of the two known formats.
    CoverageFormat { lookup_index: u16, format: u16 },
    /// A lookup or subtable that could not be decoded.
    MalformedSubtable { lookup_index: u16, error: ReadError },
}

impl Diagnostic {
    pub fn lookup_index(&self) -> u16 {
        match self {
            Diagnostic::UnsupportedLookup { lookup_index, .. }
            | Diagnostic::UnsupportedValueFormat { lookup_index, .. }
            | Diagnostic::CoverageFormat { lookup_index, .. }
            | Diagnostic::MalformedSubtable { lookup_index, .. } => *lookup_index,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnsupportedLookup {
                lookup_index,
                lookup_type,
            } => write!(
                f,
                "lookup {lookup_index}: lookup type {lookup_type} is not pair adjustment"
            ),
            Diagnostic::UnsupportedValueFormat {
                lookup_index,
                value_format,
            } => write!(
                f,
                "lookup {lookup_index}: value format {value_format} is not supported"
            ),
            Diagnostic::CoverageFormat {
                lookup_index,
                format,
            } => write!(
                f,
                "lookup {lookup_index}: pair adjustment format {format} is not supported"
            ),
            Diagnostic::MalformedSubtable {
                lookup_index,
                error,
            } => write!(f, "lookup {lookup_index}: {error}"),
        }
    }
}
