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
use log::{debug, error};
use regex::Regex;

pub(crate) const DROPBOX_DIR: &str = "data/system/dropbox/";

/// File name stamps. Checked in order, first match wins
const NAME_PATTERNS: [&str; 4] = [
    r"\d{8}_\d{6}",
    r"\d{4}-\d{2}-\d{2}_\d{2}-\d{2}-\d{2}",
    r"\d{13}",
    r"\d{10}",
];

/// DropBoxManager entries are named `<tag>@<epoch ms>.<ext>`, ex: `system_server_wtf@1732092131000.txt`
pub(crate) fn dropbox(
    context: &ExtractContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<TimestampCandidate> {
    let kind = ArtifactKind::Dropbox;
    let files = context.list(kind, DROPBOX_DIR, diagnostics);
    if files.is_empty() {
        diagnostics.missing(kind, DROPBOX_DIR);
        return Vec::new();
    }

    let mut patterns = Vec::new();
    for pattern in NAME_PATTERNS {
        match create_regex(pattern) {
            Ok(result) => patterns.push(result),
            Err(err) => error!("[dropbox] Could not compile {pattern}: {err:?}"),
        }
    }

    let mut candidates = Vec::new();
    for path in files {
        let name = path.rsplit('/').next().unwrap_or(&path);
        let stamp = match name_stamp(name, &patterns) {
            Some(result) => result,
            None => {
                debug!("[dropbox] No time in file name {name}");
                continue;
            }
        };

        let label = format!("dropbox entry ({})", entry_tag(name));
        match normalize(&RawTime::Text(stamp), context.convention(kind)) {
            Ok(time) => candidates.push(new_candidate(kind, &path, &label, &time, name)),
            Err(err) => diagnostics.parse_failure(kind, &path, &err.to_string(), name.as_bytes()),
        }
    }

    if candidates.is_empty() {
        diagnostics.no_time(kind, DROPBOX_DIR, &[]);
    }
    candidates
}

fn name_stamp(name: &str, patterns: &[Regex]) -> Option<String> {
    patterns
        .iter()
        .find_map(|regex| regex.find(name))
        .map(|stamp| stamp.as_str().to_string())
}

/// Tag before the `@`, otherwise the file name without extensions
fn entry_tag(name: &str) -> &str {
    match name.split_once('@') {
        Some((tag, _)) => tag,
        None => name.split('.').next().unwrap_or(name),
    }
}

#[cfg(test)]
mod tests {
    use super::{DROPBOX_DIR, dropbox, entry_tag};
    use crate::{
        artifacts::{collection::ExtractContext, diagnostics::Diagnostics},
        decoder::StaticDecoder,
        source::MemorySource,
        structs::toml::Timezone,
    };
    use chrono::DateTime;
    use common::diagnostics::DiagnosticKind;

    #[test]
    fn test_entry_tag() {
        assert_eq!(entry_tag("system_server_wtf@1732092131000.txt"), "system_server_wtf");
        assert_eq!(entry_tag("event_20241120_084211.log.gz"), "event_20241120_084211");
    }

    #[test]
    fn test_dropbox() {
        let mut source = MemorySource::default();
        let modified = DateTime::from_timestamp(1732092131, 0).unwrap();
        source.insert(
            &format!("{DROPBOX_DIR}system_server_wtf@1732092131000.txt"),
            b"Process: system_server",
            modified,
        );
        source.insert(
            &format!("{DROPBOX_DIR}event_20241120_084211.log.gz"),
            b"",
            modified,
        );
        source.insert(&format!("{DROPBOX_DIR}dropbox.lock"), b"", modified);
        let timezone = Timezone::default();
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        let mut diagnostics = Diagnostics::new();
        let mut results = dropbox(&context, &mut diagnostics);
        results.sort_by(|a, b| a.label.cmp(&b.label));
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].label, "dropbox entry (event_20241120_084211)");
        assert_eq!(results[0].instant.to_rfc3339(), "2024-11-20T08:42:11+00:00");
        assert_eq!(results[1].label, "dropbox entry (system_server_wtf)");
        assert_eq!(
            results[1].instant,
            DateTime::from_timestamp(1732092131, 0).unwrap()
        );
        assert_eq!(results[1].original, "system_server_wtf@1732092131000.txt");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_dropbox_no_stamps() {
        let mut source = MemorySource::default();
        let modified = DateTime::from_timestamp(1732092131, 0).unwrap();
        source.insert(&format!("{DROPBOX_DIR}dropbox.lock"), b"", modified);
        let timezone = Timezone::default();
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        let mut diagnostics = Diagnostics::new();
        assert!(dropbox(&context, &mut diagnostics).is_empty());
        assert_eq!(
            diagnostics.entries()[0].kind,
            DiagnosticKind::NoTimeInformation
        );
    }
}
