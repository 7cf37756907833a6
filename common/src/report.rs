use crate::{
    android::TimestampCandidate,
    diagnostics::Diagnostic,
    search::{DeepSearchMatch, FileRecord, PatternMatch},
    timeline::{AnalysisSummary, ConsistencyReport, CorrelationResult},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything produced by one analysis run
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnalysisReport {
    pub metadata: ReportMetadata,
    pub candidates: Vec<TimestampCandidate>,
    pub correlation: CorrelationResult,
    pub consistency: ConsistencyReport,
    pub summary: AnalysisSummary,
    pub diagnostics: Vec<Diagnostic>,
    pub files: Vec<FileRecord>,
    pub patterns: Vec<PatternMatch>,
    pub deep_search: Vec<DeepSearchMatch>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReportMetadata {
    pub uuid: String,
    /// Source kind and path, ex: `zip:/cases/device.zip`
    pub source: String,
    pub start_time: DateTime<Utc>,
    pub complete_time: DateTime<Utc>,
    /// Device offset from UTC in minutes
    pub device_offset: i64,
    /// Set when the deep search was stopped before every file was read
    pub deep_search_cancelled: bool,
    pub version: String,
}
