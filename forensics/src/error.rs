use std::fmt;

#[derive(Debug)]
pub enum TomlError {
    NoFile,
    BadToml,
    Source,
    Output,
    Extraction,
    Search,
}

impl std::error::Error for TomlError {}

impl fmt::Display for TomlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TomlError::NoFile => write!(f, "Failed to read TOML file"),
            TomlError::BadToml => write!(f, "Failed to parse TOML data"),
            TomlError::Source => write!(f, "Could not open the configured source"),
            TomlError::Output => write!(f, "Could not write analysis output"),
            TomlError::Extraction => write!(f, "Artifact extraction did not complete"),
            TomlError::Search => write!(f, "Deep search did not complete"),
        }
    }
}
