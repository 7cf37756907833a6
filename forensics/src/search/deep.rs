use super::{
    cancel::CancelToken,
    error::SearchError,
    representations::{Anchor, Encoded},
};
use crate::{
    artifacts::collection::{default_roots, searchable_files},
    source::SourceAccessor,
    structs::toml::{DeepSearch, Timezone},
    utils::{
        regex_options::create_regex_ignore_case,
        strings::{context_window, lossy_text},
    },
};
use chrono::TimeDelta;
use common::search::{DeepSearchMatch, RepresentationKind};
use log::{debug, error, info};
use regex::Regex;
use std::sync::Arc;
use tokio::{
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
    task::JoinHandle,
};

/// Never read for content
pub const MEDIA_EXTENSIONS: [&str; 18] = [
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "heic", "mp4", "mkv", "avi", "mov", "3gp", "mp3",
    "wav", "ogg", "m4a", "aac", "flac",
];

const PROGRESS_INTERVAL: usize = 10;
/// A bare date directly followed by a time belongs to a longer timestamp.
/// Case-insensitive like the text matchers, so `2024-11-20t08:42` is covered
const TIME_FOLLOWS: &str = r"^[ T]\d{2}:\d{2}";

#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    Match(DeepSearchMatch),
    Progress {
        processed: usize,
        total: usize,
    },
    Finished {
        processed: usize,
        matches: usize,
        cancelled: bool,
    },
}

/// Receives deep search events as they happen
pub trait SearchSink {
    fn emit(&mut self, event: SearchEvent);
}

impl SearchSink for Vec<SearchEvent> {
    fn emit(&mut self, event: SearchEvent) {
        self.push(event);
    }
}

impl SearchSink for UnboundedSender<SearchEvent> {
    fn emit(&mut self, event: SearchEvent) {
        if self.send(event).is_err() {
            debug!("[deep-search] Receiver dropped. Event discarded");
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Inclusive seconds between modification time and anchor
    pub tolerance: i64,
    /// Larger files are only compared by modification time
    pub max_size: u64,
    /// Device offset used to bring local modification times back to UTC
    pub device_offset: TimeDelta,
}

impl SearchOptions {
    pub fn from_config(config: &DeepSearch, timezone: &Timezone) -> SearchOptions {
        SearchOptions {
            tolerance: config.tolerance,
            max_size: config.max_size,
            device_offset: TimeDelta::minutes(timezone.device_offset),
        }
    }
}

/// Text representation compiled once before the scan
struct TextMatcher {
    anchor: usize,
    kind: RepresentationKind,
    regex: Regex,
}

/// Files under the configured prefixes (or the searchable roots) without media files
pub fn search_corpus(source: &dyn SourceAccessor, prefixes: &Option<Vec<String>>) -> Vec<String> {
    let roots = match prefixes {
        Some(result) => result.clone(),
        None => default_roots(),
    };
    searchable_files(source, &roots)
        .into_iter()
        .filter(|path| !is_media(path))
        .collect()
}

pub(crate) fn is_media(path: &str) -> bool {
    let lower = path.to_lowercase();
    match lower.rsplit_once('.') {
        Some((_, extension)) => MEDIA_EXTENSIONS.contains(&extension),
        None => false,
    }
}

/// Scan `files` for every representation of every anchor.
/// Cancellation is checked before each file. Events are streamed to `sink`
pub fn deep_search(
    source: &dyn SourceAccessor,
    anchors: &[Anchor],
    files: &[String],
    options: &SearchOptions,
    cancel: &CancelToken,
    sink: &mut dyn SearchSink,
) -> Result<(), SearchError> {
    let matchers = text_matchers(anchors)?;
    let time_follows = match create_regex_ignore_case(TIME_FOLLOWS) {
        Ok(result) => result,
        Err(_err) => return Err(SearchError::Regex),
    };

    let total = files.len();
    let mut processed = 0;
    let mut matches = 0;
    let mut cancelled = false;

    if total == 0 {
        sink.emit(SearchEvent::Progress { processed, total });
    }

    for path in files {
        if cancel.is_cancelled() {
            info!("[deep-search] Cancelled after {processed} of {total} files");
            cancelled = true;
            break;
        }

        let mut found = modification_matches(source, anchors, path, options);
        found.append(&mut content_matches(
            source,
            anchors,
            &matchers,
            &time_follows,
            path,
            options,
        ));
        for entry in found {
            matches += 1;
            sink.emit(SearchEvent::Match(entry));
        }

        processed += 1;
        if processed % PROGRESS_INTERVAL == 0 || processed == total {
            sink.emit(SearchEvent::Progress { processed, total });
        }
    }

    sink.emit(SearchEvent::Finished {
        processed,
        matches,
        cancelled,
    });
    Ok(())
}

/// Run the deep search on the blocking pool and stream events back
pub fn spawn_deep_search(
    source: Arc<dyn SourceAccessor>,
    anchors: Vec<Anchor>,
    files: Vec<String>,
    options: SearchOptions,
    cancel: CancelToken,
) -> (
    JoinHandle<Result<(), SearchError>>,
    UnboundedReceiver<SearchEvent>,
) {
    let (mut sender, receiver) = unbounded_channel();
    let handle = tokio::task::spawn_blocking(move || {
        deep_search(
            source.as_ref(),
            &anchors,
            &files,
            &options,
            &cancel,
            &mut sender,
        )
    });
    (handle, receiver)
}

fn text_matchers(anchors: &[Anchor]) -> Result<Vec<TextMatcher>, SearchError> {
    let mut matchers = Vec::new();
    for (index, anchor) in anchors.iter().enumerate() {
        for representation in &anchor.representations {
            let text = match &representation.value {
                Encoded::Text(result) => result,
                Encoded::Bytes(_) => continue,
            };
            let regex = match create_regex_ignore_case(&regex::escape(text)) {
                Ok(result) => result,
                Err(err) => {
                    error!("[deep-search] Could not compile matcher for {text}: {err:?}");
                    return Err(SearchError::Regex);
                }
            };
            matchers.push(TextMatcher {
                anchor: index,
                kind: representation.kind,
                regex,
            });
        }
    }
    Ok(matchers)
}

fn modification_matches(
    source: &dyn SourceAccessor,
    anchors: &[Anchor],
    path: &str,
    options: &SearchOptions,
) -> Vec<DeepSearchMatch> {
    let modified = match source.mod_time(path) {
        Ok(result) => result,
        Err(err) => {
            debug!("[deep-search] No modification time for {path}: {err:?}");
            return Vec::new();
        }
    };
    let instant = if modified.convention.is_local() {
        modified.instant - options.device_offset
    } else {
        modified.instant
    };

    let mut matches = Vec::new();
    for anchor in anchors {
        let delta = (instant - anchor.instant).num_seconds().abs();
        if delta > options.tolerance {
            continue;
        }
        matches.push(DeepSearchMatch {
            anchor: anchor.display.clone(),
            path: path.to_string(),
            kind: RepresentationKind::FileModificationTime,
            value: String::new(),
            offset: None,
            delta_seconds: Some(delta),
            detail: delta_detail(delta),
        });
    }
    matches
}

fn delta_detail(delta: i64) -> String {
    if delta < 60 {
        return format!("{delta} seconds");
    }
    format!("{} minutes", delta / 60)
}

fn content_matches(
    source: &dyn SourceAccessor,
    anchors: &[Anchor],
    matchers: &[TextMatcher],
    time_follows: &Regex,
    path: &str,
    options: &SearchOptions,
) -> Vec<DeepSearchMatch> {
    match source.size(path) {
        Ok(size) if size > options.max_size => {
            debug!("[deep-search] {path} is {size} bytes. Comparing modification time only");
            return Vec::new();
        }
        _ => {}
    }
    let data = match source.read_bytes(path) {
        Ok(result) => result,
        Err(err) => {
            debug!("[deep-search] Could not read {path}: {err:?}");
            return Vec::new();
        }
    };

    let mut matches = Vec::new();
    let text = lossy_text(&data);
    for matcher in matchers {
        let hit = matcher.regex.find_iter(&text).find(|hit| {
            matcher.kind != RepresentationKind::DateOnly
                || !time_follows.is_match(&text[hit.end()..])
        });
        let hit = match hit {
            Some(result) => result,
            None => continue,
        };
        matches.push(DeepSearchMatch {
            anchor: anchors[matcher.anchor].display.clone(),
            path: path.to_string(),
            kind: matcher.kind,
            value: hit.as_str().to_string(),
            offset: None,
            delta_seconds: None,
            detail: context_window(&text, hit.start(), hit.end(), 20),
        });
    }

    for anchor in anchors {
        for representation in &anchor.representations {
            let bytes = match &representation.value {
                Encoded::Bytes(result) => result,
                Encoded::Text(_) => continue,
            };
            let position = match data
                .windows(bytes.len())
                .position(|window| window == bytes.as_slice())
            {
                Some(result) => result,
                None => continue,
            };
            matches.push(DeepSearchMatch {
                anchor: anchor.display.clone(),
                path: path.to_string(),
                kind: representation.kind,
                value: String::new(),
                offset: Some(position as u64),
                delta_seconds: None,
                detail: format!("offset 0x{position:x}"),
            });
        }
    }
    matches
}
