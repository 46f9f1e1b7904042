use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::{error::ErrorClass, kinetics::error::KineticsError, params::ParameterSet};

/// Loads a parameter set from a JSON file.
///
/// Keys follow the physical notation (`PCO`, `T`, `E1f`, ...). Missing keys
/// take their baseline value, so a file may list only the parameters that
/// differ from the baseline. The loaded set is validated before it is
/// returned.
///
/// # Arguments
///
/// * `path` - Path to the JSON file
///
/// # Errors
///
/// * `IOError::FileNotFound` if the file cannot be opened
/// * `IOError::JsonParseError` if the contents are not a valid parameter set
/// * `IOError::InvalidParameters` if a value is physically invalid
pub fn load_parameters(path: impl Into<PathBuf>) -> Result<ParameterSet, IOError> {
    let path = path.into();
    let file = std::fs::File::open(path).map_err(IOError::FileNotFound)?;
    let params: ParameterSet = serde_json::from_reader(file).map_err(IOError::JsonParseError)?;
    params.validate()?;
    Ok(params)
}

/// Saves a parameter set to a JSON file.
pub fn save_parameters(path: impl Into<PathBuf>, params: &ParameterSet) -> Result<(), IOError> {
    save_json(path, params)
}

/// Writes any serializable result as pretty-printed JSON.
pub fn save_json<T: Serialize>(path: impl Into<PathBuf>, value: &T) -> Result<(), IOError> {
    let path = path.into();
    let file = std::fs::File::create(path).map_err(IOError::FileNotFound)?;
    serde_json::to_writer_pretty(file, value).map_err(IOError::JsonParseError)
}

/// Represents errors that can occur while reading or writing JSON files.
#[derive(Error, Debug)]
pub enum IOError {
    /// The file could not be found, opened or created.
    #[error("File not found: {0}")]
    FileNotFound(#[from] std::io::Error),

    /// The contents could not be parsed or serialized as JSON.
    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    /// The file was parsed but holds physically invalid values.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(#[from] KineticsError),
}

impl IOError {
    pub fn class(&self) -> ErrorClass {
        match self {
            IOError::InvalidParameters(err) => err.class(),
            IOError::FileNotFound(_) | IOError::JsonParseError(_) => ErrorClass::Configuration,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parameters_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        let params = ParameterSet::baseline().at_temperature(550.0);

        save_parameters(&path, &params).unwrap();
        let loaded = load_parameters(&path).unwrap();

        assert_eq!(loaded, params);
    }

    #[test]
    fn test_partial_file_uses_baseline() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"T": 700.0, "E2f": 0.5}}"#).unwrap();

        let params = load_parameters(file.path()).unwrap();

        assert_eq!(params.t, 700.0);
        assert_eq!(params.e2f, 0.5);
        assert_eq!(params.pco, ParameterSet::baseline().pco);
    }

    #[test]
    fn test_invalid_temperature_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"T": -5.0}}"#).unwrap();

        let err = load_parameters(file.path()).unwrap_err();

        assert!(matches!(err, IOError::InvalidParameters(_)));
        assert_eq!(err.class(), ErrorClass::InvalidPhysicalInput);
    }

    #[test]
    fn test_missing_file() {
        let err = load_parameters("does/not/exist.json").unwrap_err();
        assert_eq!(err.class(), ErrorClass::Configuration);
    }
}
