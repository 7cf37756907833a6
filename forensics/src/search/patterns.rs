use super::{deep::is_media, error::SearchError};
use crate::{
    artifacts::{android::bytescan::is_binary_file, collection::searchable_files},
    source::SourceAccessor,
    utils::{
        regex_options::create_regex_ignore_case,
        strings::{context_window, lossy_text},
    },
};
use common::search::PatternMatch;
use log::{debug, error, warn};
use regex::Regex;

/// Timestamp shapes and reset vocabulary searched across text files
pub const PATTERN_CATALOG: [(&str, &str); 13] = [
    (
        "iso_datetime",
        r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:\d{2})?",
    ),
    ("standard_datetime", r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}"),
    ("epoch_10", r"\b1[5-7]\d{8}\b"),
    ("epoch_13", r"\b1[5-7]\d{11}\b"),
    ("android_log_time", r"\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d{3}"),
    (
        "recovery_log_time",
        r"[A-Za-z]{3} [A-Za-z]{3} \d{1,2} \d{2}:\d{2}:\d{2} \d{4}",
    ),
    ("bootstat_time", r"boot_complete_\d+"),
    (
        "xml_timestamp",
        r#"(?:time|Time|timestamp|Timestamp)="(\d+)""#,
    ),
    ("xml_epoch", r#"value="(\d{10,13})""#),
    (
        "xml_datetime",
        r#"(?:date|Date|datetime|DateTime)="([^"]+)""#,
    ),
    (
        "factory_reset",
        r"factory.*reset|reset.*factory|wipe.*data|format.*userdata",
    ),
    (
        "setup_wizard",
        r"setup.*wizard|wizard.*setup|first.*boot|initial.*setup",
    ),
    (
        "oobe",
        r"out.*of.*box|oobe|welcome.*screen|setup.*complete",
    ),
];

/// Characters of context kept on each side of a match
const CONTEXT_PADDING: usize = 50;
/// Matches kept per pattern per file
const MAX_FILE_MATCHES: usize = 200;

/// Apply the pattern catalog to every text file below `roots`
pub fn pattern_scan(
    source: &dyn SourceAccessor,
    roots: &[String],
    max_size: u64,
) -> Result<Vec<PatternMatch>, SearchError> {
    let catalog = compile_catalog()?;

    let mut matches = Vec::new();
    for path in searchable_files(source, roots) {
        if is_media(&path) || is_binary_file(&path) {
            continue;
        }
        match source.size(&path) {
            Ok(size) if size > max_size => {
                debug!("[patterns] Skipping {path}, {size} bytes");
                continue;
            }
            _ => {}
        }
        let data = match source.read_bytes(&path) {
            Ok(result) => result,
            Err(err) => {
                debug!("[patterns] Could not read {path}: {err:?}");
                continue;
            }
        };
        matches.append(&mut scan_text(&path, &lossy_text(&data), &catalog));
    }
    Ok(matches)
}

fn compile_catalog() -> Result<Vec<(&'static str, Regex)>, SearchError> {
    let mut catalog = Vec::new();
    for (name, pattern) in PATTERN_CATALOG {
        match create_regex_ignore_case(pattern) {
            Ok(result) => catalog.push((name, result)),
            Err(err) => {
                error!("[patterns] Could not compile {name}: {err:?}");
                return Err(SearchError::Regex);
            }
        }
    }
    Ok(catalog)
}

fn scan_text(path: &str, text: &str, catalog: &[(&'static str, Regex)]) -> Vec<PatternMatch> {
    let mut matches = Vec::new();
    for (name, regex) in catalog {
        for (count, hit) in regex.find_iter(text).enumerate() {
            if count == MAX_FILE_MATCHES {
                warn!("[patterns] {name} matched more than {MAX_FILE_MATCHES} times in {path}");
                break;
            }
            matches.push(PatternMatch {
                path: path.to_string(),
                pattern: name.to_string(),
                value: hit.as_str().to_string(),
                start: hit.start(),
                end: hit.end(),
                context: context_window(text, hit.start(), hit.end(), CONTEXT_PADDING),
            });
        }
    }
    matches
}
