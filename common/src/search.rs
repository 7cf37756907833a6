use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How an anchor timestamp was encoded when it was found
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RepresentationKind {
    EpochSeconds,
    EpochMillis,
    DateTime,
    IsoDateTime,
    CompactDateTime,
    DateOnly,
    Seconds32Le,
    Seconds32Be,
    Seconds64Le,
    Seconds64Be,
    Millis64Le,
    Millis64Be,
    FileModificationTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DeepSearchMatch {
    /// Display string of the anchor that matched
    pub anchor: String,
    pub path: String,
    pub kind: RepresentationKind,
    /// Literal text that matched. Empty for binary and modification time matches
    pub value: String,
    pub offset: Option<u64>,
    /// Absolute seconds between file modification time and the anchor
    pub delta_seconds: Option<i64>,
    pub detail: String,
}

/// Hit from the fixed regex catalog scan
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PatternMatch {
    pub path: String,
    pub pattern: String,
    pub value: String,
    pub start: usize,
    pub end: usize,
    pub context: String,
}

/// File under the searchable roots whose name suggests reset activity
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FileRecord {
    pub path: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    pub factory_reset_related: bool,
}
