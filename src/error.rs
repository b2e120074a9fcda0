use std::fmt;

use crate::types::FileType;

pub type Result<T> = std::result::Result<T, Error>;

/// Where in an input a problem was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    /// 1-based number of the line held when the problem was detected.
    pub line: u64,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.line)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("couldn't read file ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("couldn't open file ({path}): {source}")]
    Decompress {
        path: String,
        #[source]
        source: niffler::Error,
    },

    #[error("file is empty ({path})")]
    EmptyFile { path: String },

    #[error("unrecognised line ({0})")]
    UnrecognisedLine(Location),

    #[error("couldn't determine file type ({0})")]
    UnknownFormat(Location),

    #[error("malformed record: {reason} ({location})")]
    MalformedRecord { location: Location, reason: String },

    #[error("file ended prematurely while reading {context} ({location})")]
    PrematureEof {
        location: Location,
        context: &'static str,
    },

    #[error("expected {expected} coverage values but found {found} ({location})")]
    CoverageWidthMismatch {
        location: Location,
        expected: usize,
        found: usize,
    },

    #[error("cannot read {expected} records from a {found} file ({location})")]
    WrongFileType {
        location: Location,
        expected: FileType,
        found: FileType,
    },
}

impl Error {
    /// Returns `true` if the error was raised while classifying the input rather than
    /// while reading a record.
    pub fn is_sniffing_failure(&self) -> bool {
        matches!(
            self,
            Error::EmptyFile { .. } | Error::UnrecognisedLine(_) | Error::UnknownFormat(_)
        )
    }
}
