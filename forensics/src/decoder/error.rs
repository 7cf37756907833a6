use std::fmt;

#[derive(Debug, PartialEq)]
pub enum DecoderError {
    TempFile,
    Spawn,
    ExitStatus,
    EmptyOutput,
}

impl std::error::Error for DecoderError {}

impl fmt::Display for DecoderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecoderError::TempFile => write!(f, "Could not stage data for the decoder"),
            DecoderError::Spawn => write!(f, "Could not execute the decoder"),
            DecoderError::ExitStatus => write!(f, "Decoder exited with an error"),
            DecoderError::EmptyOutput => write!(f, "Decoder returned no output"),
        }
    }
}
