//! Table I/O errors.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use fishpass_core::DataError;

/// Failure reading or writing a table.
#[derive(Debug)]
pub enum TableError {
    /// A table file could not be opened or created.
    Open {
        /// The file.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// An I/O error while writing.
    Io(io::Error),
    /// Malformed CSV.
    Csv(csv::Error),
    /// Well-formed CSV with missing columns or bad values.
    Data(DataError),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => write!(f, "cannot open {}: {source}", path.display()),
            Self::Io(e) => write!(f, "i/o error: {e}"),
            Self::Csv(e) => write!(f, "csv error: {e}"),
            Self::Data(e) => write!(f, "{e}"),
        }
    }
}

impl Error for TableError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Io(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::Data(e) => Some(e),
        }
    }
}

impl From<io::Error> for TableError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<csv::Error> for TableError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<DataError> for TableError {
    fn from(e: DataError) -> Self {
        Self::Data(e)
    }
}

impl TableError {
    /// The data error, if this is one.
    pub fn as_data(&self) -> Option<&DataError> {
        match self {
            Self::Data(e) => Some(e),
            _ => None,
        }
    }
}
