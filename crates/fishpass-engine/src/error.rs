//! Errors that abort a whole run.

use std::error::Error;
use std::fmt;

use fishpass_core::{ClassificationError, ConfigurationError, DataError, ValidationError};

/// A structural or setup error. No partial report is produced.
///
/// Per-origin problems never surface here; they become
/// [`OriginFailure`](fishpass_core::OriginFailure) entries in the report.
#[derive(Clone, Debug, PartialEq)]
pub enum RunError {
    /// The reach table does not form a valid network.
    Validation(ValidationError),
    /// Watershed topology could not be classified.
    Classification(ClassificationError),
    /// The run options are invalid.
    Configuration(ConfigurationError),
    /// Barrier or main-stem data is invalid.
    Data(DataError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "invalid network: {e}"),
            Self::Classification(e) => write!(f, "topology classification failed: {e}"),
            Self::Configuration(e) => write!(f, "invalid configuration: {e}"),
            Self::Data(e) => write!(f, "invalid data: {e}"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Classification(e) => Some(e),
            Self::Configuration(e) => Some(e),
            Self::Data(e) => Some(e),
        }
    }
}

impl From<ValidationError> for RunError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<ClassificationError> for RunError {
    fn from(e: ClassificationError) -> Self {
        Self::Classification(e)
    }
}

impl From<ConfigurationError> for RunError {
    fn from(e: ConfigurationError) -> Self {
        Self::Configuration(e)
    }
}

impl From<DataError> for RunError {
    fn from(e: DataError) -> Self {
        Self::Data(e)
    }
}
