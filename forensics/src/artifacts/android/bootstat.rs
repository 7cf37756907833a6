use crate::{
    artifacts::{
        collection::{ExtractContext, new_candidate},
        diagnostics::Diagnostics,
    },
    source::error::SourceError,
    utils::time::{RawTime, normalize},
};
use common::android::{ArtifactKind, TimestampCandidate};
use log::debug;

pub(crate) const FACTORY_RESET_PATH: &str = "data/misc/bootstat/factory_reset";
pub(crate) const LAST_BOOT_TIME_PATH: &str = "data/misc/bootstat/last_boot_time_utc";

/// Modification time of the bootstat reset marker
pub(crate) fn bootstat_factory_reset(
    context: &ExtractContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<TimestampCandidate> {
    property_mtime(
        context,
        ArtifactKind::BootstatFactoryReset,
        FACTORY_RESET_PATH,
        "factory reset marker",
        diagnostics,
    )
}

pub(crate) fn bootstat_last_boot_time(
    context: &ExtractContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<TimestampCandidate> {
    property_mtime(
        context,
        ArtifactKind::BootstatLastBootTime,
        LAST_BOOT_TIME_PATH,
        "last boot time",
        diagnostics,
    )
}

/// Use the file modification time as the timestamp.
/// The source decides whether the time is local (archive DOS time) or UTC unless the artifact is overridden
fn property_mtime(
    context: &ExtractContext<'_>,
    kind: ArtifactKind,
    path: &str,
    label: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<TimestampCandidate> {
    if !context.source.exists(path) {
        diagnostics.missing(kind, path);
        return Vec::new();
    }

    let modified = match context.source.mod_time(path) {
        Ok(result) => result,
        Err(SourceError::NotFound) => {
            diagnostics.missing(kind, path);
            return Vec::new();
        }
        Err(err) => {
            diagnostics.unavailable(kind, path, &err.to_string());
            return Vec::new();
        }
    };

    let hint = context.override_for(kind).unwrap_or(modified.convention);
    let time = match normalize(&RawTime::Structured(modified.instant), hint) {
        Ok(result) => result,
        Err(err) => {
            diagnostics.parse_failure(kind, path, &err.to_string(), &[]);
            return Vec::new();
        }
    };
    let original = modified.instant.format("%Y-%m-%d %H:%M:%S").to_string();
    let mut candidates = vec![new_candidate(kind, path, label, &time, &original)];

    // bootstat also writes the epoch seconds into the file
    let data = match context.source.read_bytes(path) {
        Ok(result) => result,
        Err(err) => {
            debug!("[bootstat] Could not read {path}: {err:?}");
            return candidates;
        }
    };
    let value = String::from_utf8_lossy(&data).trim().to_string();
    if value.len() < 10 || !value.chars().all(|c| c.is_ascii_digit()) {
        return candidates;
    }
    match normalize(&RawTime::Text(value.clone()), context.convention(kind)) {
        Ok(result) => candidates.push(new_candidate(
            kind,
            path,
            &format!("{label} value"),
            &result,
            &value,
        )),
        Err(err) => diagnostics.parse_failure(kind, path, &err.to_string(), &data),
    }

    candidates
}
