use crate::analysis::{
    chronological,
    clusters::find_clusters,
    consistency::check_consistency,
    gaps::identify_gaps,
    outliers::detect_outliers,
    reconstruct::{estimate_reset_time, reconstruct_timeline},
    summary::generate_summary,
};
use chrono::{DateTime, TimeDelta, Utc};
use common::{
    android::TimestampCandidate,
    timeline::{
        AnalysisSummary, Cluster, ConsistencyReport, CorrelationResult, Gap, Outlier,
        Reconstruction,
    },
};
use log::info;

/// Neighbours closer than this belong to the same cluster
pub const CLUSTER_THRESHOLD: TimeDelta = TimeDelta::hours(1);
/// Neighbours further apart than this are reported as a gap
pub const GAP_THRESHOLD: TimeDelta = TimeDelta::hours(1);
/// Half width of the "during reset" segment
pub const RESET_WINDOW: TimeDelta = TimeDelta::hours(1);

/// Correlate every candidate into one timeline. Must be called after extraction has finished
pub fn correlate(candidates: &[TimestampCandidate]) -> CorrelationResult {
    let timeline = chronological(candidates);
    let clusters = find_clusters(&timeline, &CLUSTER_THRESHOLD);
    let outliers = detect_outliers(&timeline);
    let gaps = identify_gaps(&timeline, &GAP_THRESHOLD);
    let reconstruction = reconstruct_timeline(&timeline, &RESET_WINDOW);
    let confidence = reconstruction
        .as_ref()
        .map(|value| value.reconstruction_confidence)
        .unwrap_or_default();

    info!(
        "[timeline] Correlated {} candidates: {} clusters, {} outliers, {} gaps",
        timeline.len(),
        clusters.len(),
        outliers.len(),
        gaps.len()
    );

    CorrelationResult {
        timeline,
        clusters,
        outliers,
        gaps,
        reconstruction,
        confidence,
    }
}

/// Candidates in chronological order
pub fn sort_candidates(candidates: &[TimestampCandidate]) -> Vec<TimestampCandidate> {
    chronological(candidates)
}

/// Runs of candidates no more than one hour apart
pub fn clusters(candidates: &[TimestampCandidate]) -> Vec<Cluster> {
    find_clusters(candidates, &CLUSTER_THRESHOLD)
}

/// Statistically unusual gaps between neighbouring candidates
pub fn outliers(candidates: &[TimestampCandidate]) -> Vec<Outlier> {
    detect_outliers(candidates)
}

/// Periods longer than an hour with no timestamps
pub fn gaps(candidates: &[TimestampCandidate]) -> Vec<Gap> {
    identify_gaps(candidates, &GAP_THRESHOLD)
}

/// Best guess of the factory reset instant
pub fn reset_time(candidates: &[TimestampCandidate]) -> Option<DateTime<Utc>> {
    estimate_reset_time(candidates)
}

/// Segment the timeline around the estimated reset
pub fn reconstruct(candidates: &[TimestampCandidate]) -> Option<Reconstruction> {
    reconstruct_timeline(candidates, &RESET_WINDOW)
}

/// Check for implausible or future timestamps
pub fn consistency(candidates: &[TimestampCandidate], now: &DateTime<Utc>) -> ConsistencyReport {
    check_consistency(candidates, now)
}

pub fn summary(candidates: &[TimestampCandidate]) -> AnalysisSummary {
    generate_summary(candidates)
}
