pub(crate) mod json;
pub(crate) mod jsonl;

use super::{error::OutputError, local::local_output};
use crate::{structs::toml::Output, utils::compression::compress_gzip_bytes};
use log::error;

/// Optionally gzip the serialized report and write it next to the log file
fn finish(
    data: &[u8],
    output: &Output,
    uuid: &str,
    extension: &str,
) -> Result<String, OutputError> {
    if !output.compress {
        return local_output(data, output, uuid, extension);
    }

    let compressed = match compress_gzip_bytes(data) {
        Ok(result) => result,
        Err(err) => {
            error!("[output] Failed to compress report: {err:?}");
            return Err(OutputError::Compress);
        }
    };
    local_output(&compressed, output, uuid, &format!("{extension}.gz"))
}

#[cfg(test)]
pub(crate) fn sample_report(uuid: &str) -> common::report::AnalysisReport {
    use chrono::DateTime;
    use common::{
        android::{ArtifactKind, Confidence, TimestampCandidate},
        report::{AnalysisReport, ReportMetadata},
    };

    let instant = DateTime::from_timestamp(1689128778, 0).unwrap();
    let candidates = vec![TimestampCandidate {
        instant,
        artifact: ArtifactKind::PersistentProperties,
        path: String::from("data/property/persistent_properties"),
        label: String::from("factory reset reboot"),
        already_local: false,
        original: String::from("reboot,factory_reset,1689128778"),
        confidence: Confidence::High,
        offset: None,
    }];
    AnalysisReport {
        metadata: ReportMetadata {
            uuid: uuid.to_string(),
            source: String::from("folder:/tmp/device"),
            start_time: instant,
            complete_time: instant,
            device_offset: 0,
            deep_search_cancelled: false,
            version: String::from("0.1.0"),
        },
        correlation: timeline::timeline::correlate(&candidates),
        consistency: timeline::timeline::consistency(&candidates, &instant),
        summary: timeline::timeline::summary(&candidates),
        candidates,
        diagnostics: Vec::new(),
        files: Vec::new(),
        patterns: Vec::new(),
        deep_search: Vec::new(),
    }
}
