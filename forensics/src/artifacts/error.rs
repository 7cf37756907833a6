use std::fmt;

#[derive(Debug, PartialEq)]
pub(crate) enum ExtractError {
    SourceUnavailable,
    Parse,
    DecodeFailure,
    QueryFailure,
}

impl std::error::Error for ExtractError {}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::SourceUnavailable => write!(f, "Source could not provide the artifact"),
            ExtractError::Parse => write!(f, "Artifact content did not match a known pattern"),
            ExtractError::DecodeFailure => write!(f, "Could not decode binary preference data"),
            ExtractError::QueryFailure => write!(f, "Database query failed"),
        }
    }
}
