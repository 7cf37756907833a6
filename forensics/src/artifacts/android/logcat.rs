use crate::{
    artifacts::{
        collection::{ExtractContext, new_candidate},
        diagnostics::Diagnostics,
    },
    utils::{
        error::UtilError,
        regex_options::{create_regex, create_regex_ignore_case},
        time::{NormalizedTime, RawTime, ZoneConvention, normalize},
    },
};
use chrono::{Datelike, TimeDelta};
use common::android::{ArtifactKind, TimestampCandidate};
use log::{error, warn};
use regex::Regex;
use std::collections::BTreeSet;

pub(crate) const LOGCAT_DIRS: [&str; 3] = ["data/misc/logd/", "cache/", "data/log/"];

/// Only files whose path mentions one of these buffers are read
const BUFFER_NAMES: [&str; 4] = ["logcat", "main", "system", "events"];

const SETUP_LINE: &str = r"setupwizard|factory.*reset|first.*boot|oobe";
const FULL_STAMP: &str = r"(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}(?:\.\d{1,9})?)";
/// Default `threadtime` format has no year: `11-20 08:42:11.123`
const SHORT_STAMP: &str = r"(\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d{3})";

const MAX_PER_FILE: usize = 256;

struct LogcatRegex {
    setup: Regex,
    full: Regex,
    short: Regex,
}

/// Setup wizard, first boot and factory reset lines from saved logcat buffers
pub(crate) fn logcat_archives(
    context: &ExtractContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<TimestampCandidate> {
    let kind = ArtifactKind::LogcatArchives;
    let mut files = BTreeSet::new();
    for dir in LOGCAT_DIRS {
        for path in context.list(kind, dir, diagnostics) {
            let lower = path.to_lowercase();
            if BUFFER_NAMES.iter().any(|name| lower.contains(name)) {
                files.insert(path);
            }
        }
    }
    if files.is_empty() {
        diagnostics.missing(kind, LOGCAT_DIRS[0]);
        return Vec::new();
    }

    let regex = match compile() {
        Ok(result) => result,
        Err(err) => {
            error!("[logcat] Could not compile logcat regexes: {err:?}");
            return Vec::new();
        }
    };

    let hint = context.convention(kind);
    let mut candidates = Vec::new();
    for path in files {
        let (text, data) = match context.read_text(kind, &path, diagnostics) {
            Some(result) => result,
            None => continue,
        };
        let modified = match context.source.mod_time(&path) {
            Ok(result) => Some(result),
            Err(err) => {
                warn!("[logcat] No modification time for {path}: {err:?}");
                None
            }
        };

        let before = candidates.len();
        for line in text.lines().filter(|line| regex.setup.is_match(line)) {
            if candidates.len() - before >= MAX_PER_FILE {
                warn!("[logcat] Too many setup lines in {path}. Keeping the first {MAX_PER_FILE}");
                break;
            }
            let line = line.trim();

            let time = if let Some(stamp) = capture(&regex.full, line) {
                match normalize(&RawTime::Text(stamp.to_string()), hint) {
                    Ok(result) => result,
                    Err(err) => {
                        diagnostics.parse_failure(kind, &path, &err.to_string(), line.as_bytes());
                        continue;
                    }
                }
            } else if let Some(stamp) = capture(&regex.short, line) {
                match with_year(stamp, modified.as_ref(), hint) {
                    Some(result) => result,
                    None => {
                        diagnostics.parse_failure(
                            kind,
                            &path,
                            "Could not infer year of logcat stamp",
                            line.as_bytes(),
                        );
                        continue;
                    }
                }
            } else {
                continue;
            };
            candidates.push(new_candidate(kind, &path, "logcat setup event", &time, line));
        }

        if candidates.len() == before {
            diagnostics.no_time(kind, &path, &data);
        }
    }
    candidates
}

fn compile() -> Result<LogcatRegex, UtilError> {
    Ok(LogcatRegex {
        setup: create_regex_ignore_case(SETUP_LINE)?,
        full: create_regex(FULL_STAMP)?,
        short: create_regex(SHORT_STAMP)?,
    })
}

fn capture<'a>(regex: &Regex, line: &'a str) -> Option<&'a str> {
    Some(regex.captures(line)?.get(1)?.as_str())
}

/// Borrow the year from the file modification time. A stamp more than a day past the
/// modification time belongs to the previous year
fn with_year(
    stamp: &str,
    modified: Option<&NormalizedTime>,
    hint: ZoneConvention,
) -> Option<NormalizedTime> {
    let modified = modified?;
    let year = modified.instant.year();
    let time = normalize(&RawTime::Text(format!("{year}-{stamp}")), hint).ok()?;
    if time.instant <= modified.instant + TimeDelta::days(1) {
        return Some(time);
    }
    normalize(&RawTime::Text(format!("{}-{stamp}", year - 1)), hint).ok()
}
