use crate::android::TimestampCandidate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Cluster {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub count: usize,
    pub timestamps: Vec<TimestampCandidate>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Outlier {
    pub timestamp: TimestampCandidate,
    /// Seconds since the previous candidate
    pub interval: f64,
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GapKind {
    SystemOff,
    ProlongedIdle,
    UserInactive,
    TransientInterruption,
}

impl GapKind {
    pub fn description(&self) -> &'static str {
        match self {
            GapKind::SystemOff => "system-off period",
            GapKind::ProlongedIdle => "prolonged idle",
            GapKind::UserInactive => "user-inactive period",
            GapKind::TransientInterruption => "transient log interruption",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Gap {
    pub start: TimestampCandidate,
    pub end: TimestampCandidate,
    pub duration_hours: f64,
    pub kind: GapKind,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Reconstruction {
    pub reset_time: DateTime<Utc>,
    pub pre_reset: Vec<TimestampCandidate>,
    pub reset_process: Vec<TimestampCandidate>,
    pub post_reset: Vec<TimestampCandidate>,
    pub reconstruction_confidence: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CorrelationResult {
    pub timeline: Vec<TimestampCandidate>,
    pub clusters: Vec<Cluster>,
    pub outliers: Vec<Outlier>,
    pub gaps: Vec<Gap>,
    pub reconstruction: Option<Reconstruction>,
    pub confidence: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    UnrealisticYear,
    FutureTimestamp,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConsistencyIssue {
    pub timestamp: TimestampCandidate,
    pub issue: IssueKind,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConsistencyReport {
    pub total_count: usize,
    pub valid_count: usize,
    pub logical_issues: Vec<ConsistencyIssue>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnalysisSummary {
    pub total_artifacts_found: usize,
    pub new_timestamp_sources: usize,
    pub confidence_level: ConfidenceLevel,
    pub recommendations: Vec<String>,
    pub key_findings: Vec<String>,
}
