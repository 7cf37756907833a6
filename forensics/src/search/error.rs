use std::fmt;

#[derive(Debug, PartialEq)]
pub enum SearchError {
    Regex,
}

impl std::error::Error for SearchError {}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::Regex => write!(f, "Could not compile search pattern"),
        }
    }
}
