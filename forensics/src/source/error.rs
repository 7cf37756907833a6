use std::fmt;

#[derive(Debug, PartialEq)]
pub enum SourceError {
    SourceUnavailable,
    NotFound,
    ReadFile,
    LargeFile,
    Timeout,
    Decode,
    Metadata,
}

impl std::error::Error for SourceError {}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::SourceUnavailable => write!(f, "Source could not be accessed"),
            SourceError::NotFound => write!(f, "File not found in source"),
            SourceError::ReadFile => write!(f, "Could not read file from source"),
            SourceError::LargeFile => write!(f, "File exceeds the maximum read size"),
            SourceError::Timeout => write!(f, "Remote access timed out"),
            SourceError::Decode => write!(f, "Could not decode file as text"),
            SourceError::Metadata => write!(f, "Could not get file metadata"),
        }
    }
}
