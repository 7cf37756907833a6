use crate::{
    artifacts::{
        collection::{ExtractContext, new_candidate},
        diagnostics::Diagnostics,
        error::ExtractError,
    },
    utils::time::{RawTime, normalize},
};
use common::android::{ArtifactKind, TimestampCandidate};
use log::{debug, warn};
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use std::collections::HashMap;

pub(crate) const USAGESTATS_DIR: &str = "data/system/usagestats/";

/// Smaller values are offsets from the interval start encoded in the file name
const RELATIVE_LIMIT: i64 = 1_000_000_000_000;

struct UsageEntry {
    label: String,
    value: i64,
    original: String,
}

/// Package and event times from XML usage stats.
/// Older interval files (`usagestats/0/daily/<start ms>`) store times relative to the interval start
pub(crate) fn usage_stats(
    context: &ExtractContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<TimestampCandidate> {
    let kind = ArtifactKind::UsageStats;
    let files: Vec<String> = context
        .list(kind, USAGESTATS_DIR, diagnostics)
        .into_iter()
        .filter(|path| path.ends_with(".xml") || interval_start(path).is_some())
        .collect();
    if files.is_empty() {
        diagnostics.missing(kind, USAGESTATS_DIR);
        return Vec::new();
    }

    let mut candidates = Vec::new();
    for path in files {
        let (text, data) = match context.read_text(kind, &path, diagnostics) {
            Some(result) => result,
            None => continue,
        };
        if !text.trim_start().starts_with('<') {
            // Android 9+ writes protobuf interval files
            debug!("[usagestats] {path} is not XML. Skipping");
            continue;
        }

        let entries = match usage_entries(&text) {
            Ok(result) => result,
            Err(err) => {
                diagnostics.parse_failure(kind, &path, &err.to_string(), &data);
                continue;
            }
        };

        let base = interval_start(&path);
        let mut found = false;
        for entry in entries {
            let value = match absolute_millis(entry.value, base) {
                Some(result) => result,
                None => {
                    debug!(
                        "[usagestats] Relative time {} in {path} without interval start",
                        entry.value
                    );
                    continue;
                }
            };
            match normalize(&RawTime::Integer(value), context.convention(kind)) {
                Ok(time) => {
                    found = true;
                    candidates.push(new_candidate(
                        kind,
                        &path,
                        &entry.label,
                        &time,
                        &entry.original,
                    ));
                }
                Err(err) => diagnostics.parse_failure(
                    kind,
                    &path,
                    &err.to_string(),
                    entry.original.as_bytes(),
                ),
            }
        }
        if !found {
            diagnostics.no_time(kind, &path, &data);
        }
    }
    candidates
}

/// Interval files are named after their start time in milliseconds
fn interval_start(path: &str) -> Option<i64> {
    let name = path.rsplit('/').next().unwrap_or(path);
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    name.parse::<i64>().ok()
}

fn absolute_millis(value: i64, base: Option<i64>) -> Option<i64> {
    if value.abs() >= RELATIVE_LIMIT {
        return Some(value);
    }
    base.map(|start| start + value)
}

fn usage_entries(xml: &str) -> Result<Vec<UsageEntry>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    loop {
        match reader.read_event() {
            Err(err) => {
                warn!("[usagestats] Could not read usage stats xml: {err:?}");
                return Err(ExtractError::Parse);
            }
            Ok(Event::Eof) => break,
            Ok(Event::Start(tag)) | Ok(Event::Empty(tag)) => match tag.name().as_ref() {
                b"package" => {
                    let values = attributes(&tag);
                    let package = first_of(&values, &["name", "package"])
                        .map(|(_, name)| name)
                        .unwrap_or_default();
                    if let Some(entry) = usage_entry(
                        &values,
                        &["lastTimeUsed", "lastTimeActive"],
                        format!("usage stats last used ({package})"),
                    ) {
                        entries.push(entry);
                    }
                }
                b"event" => {
                    let values = attributes(&tag);
                    let package = first_of(&values, &["package"])
                        .map(|(_, name)| name)
                        .unwrap_or_default();
                    let event_type = first_of(&values, &["type"])
                        .map(|(_, value)| value)
                        .unwrap_or_default();
                    if let Some(entry) = usage_entry(
                        &values,
                        &["time"],
                        format!("usage stats event {event_type} ({package})"),
                    ) {
                        entries.push(entry);
                    }
                }
                _ => continue,
            },
            _ => (),
        }
    }
    Ok(entries)
}

fn attributes(tag: &BytesStart<'_>) -> HashMap<String, String> {
    let mut values = HashMap::new();
    for attribute in tag.attributes().flatten() {
        let value = match attribute.unescape_value() {
            Ok(result) => result.to_string(),
            Err(_err) => continue,
        };
        values.insert(
            String::from_utf8_lossy(attribute.key.as_ref()).to_string(),
            value,
        );
    }
    values
}

fn first_of<'a>(
    values: &'a HashMap<String, String>,
    keys: &[&'a str],
) -> Option<(&'a str, &'a str)> {
    keys.iter()
        .find_map(|key| values.get(*key).map(|value| (*key, value.as_str())))
}

fn usage_entry(
    values: &HashMap<String, String>,
    keys: &[&str],
    label: String,
) -> Option<UsageEntry> {
    let (key, text) = first_of(values, keys)?;
    let value = text.parse::<i64>().ok()?;
    Some(UsageEntry {
        label,
        value,
        original: format!("{key}=\"{text}\""),
    })
}
