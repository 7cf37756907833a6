use std::fmt;

#[derive(Debug)]
pub enum UtilError {
    Regex,
    CreateDirectory,
    LogFile,
    GzipFinish,
    TempFile,
}

impl std::error::Error for UtilError {}

impl fmt::Display for UtilError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UtilError::Regex => write!(f, "Invalid regex provided"),
            UtilError::CreateDirectory => write!(f, "Could not create directory(ies)"),
            UtilError::LogFile => write!(f, "Could not create log file"),
            UtilError::GzipFinish => write!(f, "Could not complete gzip compression"),
            UtilError::TempFile => write!(f, "Could not write temporary file"),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum NormalizeError {
    InvalidEpoch,
    UnrecognizedFormat,
}

impl std::error::Error for NormalizeError {}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeError::InvalidEpoch => write!(f, "Value is not a valid epoch"),
            NormalizeError::UnrecognizedFormat => {
                write!(f, "Value does not match any supported time format")
            }
        }
    }
}
