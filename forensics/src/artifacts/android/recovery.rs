/**
 * Recovery writes `cache/recovery/last_log` while wiping a device.
 * Each line starts with a kernel style counter `[   15.500000]` (seconds since recovery started).
 * A line that also carries a wall clock stamp anchors the counters to real time
 */
use crate::{
    artifacts::{
        collection::{ExtractContext, new_candidate},
        diagnostics::Diagnostics,
        error::ExtractError,
    },
    utils::{
        error::UtilError,
        regex_options::create_regex,
        time::{NormalizedTime, RawTime, ZoneConvention, normalize},
    },
};
use chrono::TimeDelta;
use common::android::{ArtifactKind, TimestampCandidate};
use log::{error, warn};
use regex::Regex;

pub(crate) const LAST_LOG_PATH: &str = "cache/recovery/last_log";
pub(crate) const LAST_LOG_ARCHIVE_PATH: &str = "cache/recovery/last_log.1";

const COUNTER: &str = r"^\[\s*(\d+\.\d+)\]";
const SYSTEM_TIME: &str = r"get_system_time=(\d{4}-\d{2}-\d{2}-\d{2}:\d{2}:\d{2})";
const START_MARKER: &str =
    r"Starting recovery \(pid \d+\) on ([A-Za-z]{3} [A-Za-z]{3}\s+\d{1,2} \d{2}:\d{2}:\d{2} \d{4})";

/// Keyword in a recovery line and the label used for it. Checked in order
const LIFECYCLE: [(&str, &str); 4] = [
    ("wiping data", "wipe started"),
    ("wipe complete", "wipe complete"),
    ("format successful", "format successful"),
    ("formatting", "format started"),
];

#[derive(Debug, PartialEq)]
pub(crate) struct RecoveryEvent {
    pub(crate) label: String,
    pub(crate) time: NormalizedTime,
    pub(crate) original: String,
}

pub(crate) fn recovery_last_log(
    context: &ExtractContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<TimestampCandidate> {
    recovery_log(context, ArtifactKind::RecoveryLastLog, LAST_LOG_PATH, diagnostics)
}

pub(crate) fn recovery_last_log_archive(
    context: &ExtractContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<TimestampCandidate> {
    recovery_log(
        context,
        ArtifactKind::RecoveryLastLogArchive,
        LAST_LOG_ARCHIVE_PATH,
        diagnostics,
    )
}

fn recovery_log(
    context: &ExtractContext<'_>,
    kind: ArtifactKind,
    path: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<TimestampCandidate> {
    let (text, data) = match context.read_text(kind, path, diagnostics) {
        Some(result) => result,
        None => return Vec::new(),
    };

    let events = match parse_last_log(&text, context.convention(kind)) {
        Ok(result) => result,
        Err(err) => {
            diagnostics.parse_failure(kind, path, &err.to_string(), &data);
            return Vec::new();
        }
    };
    if events.is_empty() {
        diagnostics.no_time(kind, path, &data);
    }

    events
        .iter()
        .map(|event| new_candidate(kind, path, &event.label, &event.time, &event.original))
        .collect()
}

/// Convert lifecycle lines into absolute times. Falls back to the recovery start stamp
pub(crate) fn parse_last_log(
    text: &str,
    hint: ZoneConvention,
) -> Result<Vec<RecoveryEvent>, ExtractError> {
    let (counter, stamps) = match compile() {
        Ok(result) => result,
        Err(err) => {
            error!("[recovery] Could not compile recovery regexes: {err:?}");
            return Err(ExtractError::Parse);
        }
    };
    let lines: Vec<&str> = text.lines().collect();

    // get_system_time is preferred over the start marker
    let mut anchor = None;
    'stamps: for stamp_regex in &stamps {
        for (index, line) in lines.iter().enumerate() {
            let relative = match relative_seconds(&counter, line) {
                Some(result) => result,
                None => continue,
            };
            if let Some(stamp) = wall_clock(stamp_regex, line) {
                anchor = Some((index, relative, normalize_stamp(&stamp, hint)?));
                break 'stamps;
            }
        }
    }

    let mut events = Vec::new();
    if let Some((anchor_index, anchor_relative, anchor_time)) = anchor {
        for line in lines.iter().skip(anchor_index + 1) {
            let relative = match relative_seconds(&counter, line) {
                Some(result) => result,
                None => continue,
            };
            let label = match lifecycle_label(line) {
                Some(result) => result,
                None => continue,
            };

            let millis = ((relative - anchor_relative) * 1000.0).round() as i64;
            events.push(RecoveryEvent {
                label: label.to_string(),
                time: NormalizedTime {
                    instant: anchor_time.instant + TimeDelta::milliseconds(millis),
                    convention: anchor_time.convention,
                },
                original: line.trim().to_string(),
            });
        }
    }

    if !events.is_empty() {
        return Ok(events);
    }

    // No lifecycle lines. Use the first absolute stamp in the log
    for stamp_regex in &stamps {
        for line in &lines {
            if let Some(stamp) = wall_clock(stamp_regex, line) {
                return Ok(vec![RecoveryEvent {
                    label: String::from("recovery start"),
                    time: normalize_stamp(&stamp, hint)?,
                    original: line.trim().to_string(),
                }]);
            }
        }
    }
    Ok(events)
}

fn compile() -> Result<(Regex, [Regex; 2]), UtilError> {
    Ok((
        create_regex(COUNTER)?,
        [create_regex(SYSTEM_TIME)?, create_regex(START_MARKER)?],
    ))
}

fn relative_seconds(counter: &Regex, line: &str) -> Option<f64> {
    let captures = counter.captures(line.trim_start())?;
    captures.get(1)?.as_str().parse::<f64>().ok()
}

fn wall_clock(stamp: &Regex, line: &str) -> Option<String> {
    let captures = stamp.captures(line)?;
    Some(captures.get(1)?.as_str().to_string())
}

fn lifecycle_label(line: &str) -> Option<&'static str> {
    let lower = line.to_lowercase();
    LIFECYCLE
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, label)| *label)
}

fn normalize_stamp(stamp: &str, hint: ZoneConvention) -> Result<NormalizedTime, ExtractError> {
    match normalize(&RawTime::Text(stamp.to_string()), hint) {
        Ok(result) => Ok(result),
        Err(err) => {
            warn!("[recovery] Could not normalize recovery stamp {stamp}: {err:?}");
            Err(ExtractError::Parse)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        LAST_LOG_ARCHIVE_PATH, LAST_LOG_PATH, parse_last_log, recovery_last_log,
        recovery_last_log_archive,
    };
    use crate::{
        artifacts::{collection::ExtractContext, diagnostics::Diagnostics},
        decoder::StaticDecoder,
        source::MemorySource,
        structs::toml::Timezone,
        utils::time::ZoneConvention,
    };
    use chrono::DateTime;
    use common::diagnostics::DiagnosticKind;

    const LOG: &str = "[    0.000244] Starting recovery (pid 461) on Wed Nov 20 08:42:05 2024
[    0.001012] recovery filesystem table
[   12.000000] get_system_time=2024-11-20-08:42:11
[   15.500000] -- Wiping data...
[   16.250000] Formatting /data...
[   18.000000] Format successful
[   19.000000] Data wipe complete.
";

    #[test]
    fn test_parse_last_log() {
        let results = parse_last_log(LOG, ZoneConvention::Local).unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].label, "wipe started");
        assert_eq!(
            results[0].time.instant.to_rfc3339(),
            "2024-11-20T08:42:14.500+00:00"
        );
        assert_eq!(results[0].time.convention, ZoneConvention::Local);
        assert_eq!(results[0].original, "[   15.500000] -- Wiping data...");
        assert_eq!(results[1].label, "format started");
        assert_eq!(results[2].label, "format successful");
        assert_eq!(results[3].label, "wipe complete");
        assert_eq!(
            results[3].time.instant.to_rfc3339(),
            "2024-11-20T08:42:18+00:00"
        );
    }

    #[test]
    fn test_parse_last_log_anchor_scenario() {
        let test =
            "[   12.000000] get_system_time=2024-11-20-08:42:11\n[   15.500000] -- Wiping data\n";
        let results = parse_last_log(test, ZoneConvention::Local).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].time.instant.naive_utc().to_string(),
            "2024-11-20 08:42:14.500"
        );
    }

    #[test]
    fn test_parse_last_log_start_fallback() {
        let test = "Starting recovery (pid 12) on Tue Jan  2 03:04:05 2024\nrecovery done\n";
        let results = parse_last_log(test, ZoneConvention::Utc).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].label, "recovery start");
        assert_eq!(
            results[0].time.instant.to_rfc3339(),
            "2024-01-02T03:04:05+00:00"
        );
    }

    #[test]
    fn test_parse_last_log_nothing() {
        let results =
            parse_last_log("I:Boot command: boot-recovery\n", ZoneConvention::Utc).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_recovery_extractors() {
        let mut source = MemorySource::default();
        let modified = DateTime::from_timestamp(1732092131, 0).unwrap();
        source.insert(LAST_LOG_PATH, LOG.as_bytes(), modified);
        source.insert(LAST_LOG_ARCHIVE_PATH, b"I:Boot command: boot-recovery\n", modified);
        let timezone = Timezone::default();
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        let mut diagnostics = Diagnostics::new();
        let results = recovery_last_log(&context, &mut diagnostics);
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|entry| entry.already_local));

        let results = recovery_last_log_archive(&context, &mut diagnostics);
        assert!(results.is_empty());
        assert_eq!(diagnostics.entries()[0].kind, DiagnosticKind::NoTimeInformation);
        assert_eq!(
            diagnostics.entries()[0].preview.as_deref(),
            Some("I:Boot command: boot-recovery\n")
        );
    }
}
