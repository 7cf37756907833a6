use crate::utils::strings::content_preview;
use common::{
    android::ArtifactKind,
    diagnostics::{Diagnostic, DiagnosticKind},
};
use log::{debug, warn};

/// Characters of content kept with a parse failure
const PREVIEW_LIMIT: usize = 200;

/// Append only collector for extraction problems. Each extractor gets its own sink
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics::default()
    }

    pub fn missing(&mut self, artifact: ArtifactKind, path: &str) {
        debug!("[diagnostics] {} not present at {path}", artifact.name());
        self.push(
            artifact,
            path,
            DiagnosticKind::Missing,
            "File not found",
            None,
        );
    }

    /// File exists but carries nothing time related
    pub fn no_time(&mut self, artifact: ArtifactKind, path: &str, data: &[u8]) {
        debug!("[diagnostics] {} at {path} has no time information", artifact.name());
        self.push(
            artifact,
            path,
            DiagnosticKind::NoTimeInformation,
            "File exists, no time information",
            Some(content_preview(data, PREVIEW_LIMIT)),
        );
    }

    pub fn parse_failure(
        &mut self,
        artifact: ArtifactKind,
        path: &str,
        message: &str,
        data: &[u8],
    ) {
        warn!("[diagnostics] {} at {path} failed to parse: {message}", artifact.name());
        self.push(
            artifact,
            path,
            DiagnosticKind::ParseFailure,
            message,
            Some(content_preview(data, PREVIEW_LIMIT)),
        );
    }

    pub fn decode_failure(&mut self, artifact: ArtifactKind, path: &str, message: &str) {
        warn!("[diagnostics] {} at {path} could not be decoded: {message}", artifact.name());
        self.push(artifact, path, DiagnosticKind::DecodeFailure, message, None);
    }

    pub fn query_failure(&mut self, artifact: ArtifactKind, path: &str, message: &str) {
        warn!("[diagnostics] {} query at {path} failed: {message}", artifact.name());
        self.push(artifact, path, DiagnosticKind::QueryFailure, message, None);
    }

    pub fn unavailable(&mut self, artifact: ArtifactKind, path: &str, message: &str) {
        warn!("[diagnostics] {} at {path} unavailable: {message}", artifact.name());
        self.push(artifact, path, DiagnosticKind::SourceUnavailable, message, None);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }

    fn push(
        &mut self,
        artifact: ArtifactKind,
        path: &str,
        kind: DiagnosticKind,
        message: &str,
        preview: Option<String>,
    ) {
        self.entries.push(Diagnostic {
            artifact,
            path: path.to_string(),
            kind,
            message: message.to_string(),
            preview,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::Diagnostics;
    use common::{android::ArtifactKind, diagnostics::DiagnosticKind};

    #[test]
    fn test_diagnostics_kinds() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.missing(ArtifactKind::RecoveryLastLog, "cache/recovery/last_log");
        diagnostics.parse_failure(
            ArtifactKind::PersistentProperties,
            "data/property/persistent_properties",
            "No factory_reset marker",
            "x".repeat(500).as_bytes(),
        );

        let entries = diagnostics.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, DiagnosticKind::Missing);
        assert!(entries[0].preview.is_none());
        assert_eq!(entries[1].kind, DiagnosticKind::ParseFailure);
        assert_eq!(entries[1].preview.as_ref().unwrap().len(), 200);
    }

    #[test]
    fn test_diagnostics_merge() {
        let mut first = Diagnostics::new();
        let mut second = Diagnostics::new();
        second.query_failure(
            ArtifactKind::AccountsDatabase,
            "data/system_de/0/accounts_de.db",
            "no such table: accounts",
        );
        second.unavailable(ArtifactKind::Dropbox, "data/system/dropbox/", "timeout");
        first.merge(second);

        assert!(!first.is_empty());
        let entries = first.into_entries();
        assert_eq!(entries[0].kind, DiagnosticKind::QueryFailure);
        assert_eq!(entries[1].kind, DiagnosticKind::SourceUnavailable);
    }
}
