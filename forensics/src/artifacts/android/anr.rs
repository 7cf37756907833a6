use crate::{
    artifacts::{
        collection::{ExtractContext, new_candidate},
        diagnostics::Diagnostics,
    },
    utils::{
        regex_options::create_regex,
        time::{RawTime, normalize},
    },
};
use common::android::{ArtifactKind, TimestampCandidate};
use log::{error, warn};
use std::collections::BTreeSet;

pub(crate) const ANR_DIR: &str = "data/anr/";

/// Trace headers look like `----- pid 1820 at 2024-11-20 08:45:03.123456789+0900 -----`
const TRACE_TIME: &str = r"(\d{4}-\d{2}-\d{2}[ T]\d{2}:\d{2}:\d{2})";

/// Large trace dumps repeat the same stamp for every thread block
const MAX_PER_FILE: usize = 64;

/// Application Not Responding traces under `data/anr/`
pub(crate) fn anr_logs(
    context: &ExtractContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<TimestampCandidate> {
    let kind = ArtifactKind::AnrLogs;
    let files = context.list(kind, ANR_DIR, diagnostics);
    if files.is_empty() {
        diagnostics.missing(kind, ANR_DIR);
        return Vec::new();
    }

    let regex = match create_regex(TRACE_TIME) {
        Ok(result) => result,
        Err(err) => {
            error!("[anr] Could not compile trace time regex: {err:?}");
            return Vec::new();
        }
    };

    let mut candidates = Vec::new();
    for path in files {
        let (text, data) = match context.read_text(kind, &path, diagnostics) {
            Some(result) => result,
            None => continue,
        };

        let mut seen = BTreeSet::new();
        for found in regex.find_iter(&text) {
            let value = found.as_str();
            if !seen.insert(value) {
                continue;
            }
            if seen.len() > MAX_PER_FILE {
                warn!("[anr] Too many stamps in {path}. Keeping the first {MAX_PER_FILE}");
                break;
            }

            match normalize(&RawTime::Text(value.to_string()), context.convention(kind)) {
                Ok(time) => candidates.push(new_candidate(kind, &path, "anr trace", &time, value)),
                Err(err) => {
                    diagnostics.parse_failure(kind, &path, &err.to_string(), value.as_bytes());
                }
            }
        }

        if seen.is_empty() {
            diagnostics.no_time(kind, &path, &data);
        }
    }
    candidates
}
