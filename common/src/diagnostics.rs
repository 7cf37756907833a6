use crate::android::ArtifactKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// File is not present in the source
    Missing,
    /// File exists but nothing time related was found
    NoTimeInformation,
    ParseFailure,
    DecodeFailure,
    QueryFailure,
    SourceUnavailable,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Diagnostic {
    pub artifact: ArtifactKind,
    pub path: String,
    pub kind: DiagnosticKind,
    pub message: String,
    /// Small slice of the content for parse failures
    pub preview: Option<String>,
}
