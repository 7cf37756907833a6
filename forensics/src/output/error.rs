use std::fmt;

#[derive(Debug, PartialEq)]
pub enum OutputError {
    Serialize,
    Compress,
    CreateDirectory,
    CreateFile,
    WriteFile,
    UnknownFormat,
}

impl std::error::Error for OutputError {}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputError::Serialize => write!(f, "Could not serialize report"),
            OutputError::Compress => write!(f, "Could not compress report"),
            OutputError::CreateDirectory => write!(f, "Could not create output directory"),
            OutputError::CreateFile => write!(f, "Could not create output file"),
            OutputError::WriteFile => write!(f, "Could not write output file"),
            OutputError::UnknownFormat => write!(f, "Unsupported output format"),
        }
    }
}
