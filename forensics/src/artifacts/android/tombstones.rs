use crate::{
    artifacts::{
        collection::{ExtractContext, new_candidate},
        diagnostics::Diagnostics,
    },
    utils::{
        regex_options::create_regex_ignore_case,
        time::{RawTime, normalize},
    },
};
use common::android::{ArtifactKind, TimestampCandidate};
use log::error;

pub(crate) const TOMBSTONES_DIR: &str = "data/tombstones/";

/// Native crash dumps carry `Timestamp: 2024-11-20 08:45:03.123456789+0900` after the ABI line
const CRASH_TIME: &str = r"timestamp: (\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})";

/// Crash time recorded in each native tombstone
pub(crate) fn tombstones(
    context: &ExtractContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<TimestampCandidate> {
    let kind = ArtifactKind::Tombstones;
    let files = context.list(kind, TOMBSTONES_DIR, diagnostics);
    if files.is_empty() {
        diagnostics.missing(kind, TOMBSTONES_DIR);
        return Vec::new();
    }

    let regex = match create_regex_ignore_case(CRASH_TIME) {
        Ok(result) => result,
        Err(err) => {
            error!("[tombstones] Could not compile crash time regex: {err:?}");
            return Vec::new();
        }
    };

    let mut candidates = Vec::new();
    for path in files {
        let (text, data) = match context.read_text(kind, &path, diagnostics) {
            Some(result) => result,
            None => continue,
        };
        let captures = match regex.captures(&text) {
            Some(result) => result,
            None => {
                diagnostics.no_time(kind, &path, &data);
                continue;
            }
        };
        let (full, value) = match (captures.get(0), captures.get(1)) {
            (Some(full), Some(value)) => (full.as_str(), value.as_str()),
            _ => continue,
        };

        match normalize(&RawTime::Text(value.to_string()), context.convention(kind)) {
            Ok(time) => candidates.push(new_candidate(kind, &path, "tombstone crash", &time, full)),
            Err(err) => diagnostics.parse_failure(kind, &path, &err.to_string(), full.as_bytes()),
        }
    }
    candidates
}
