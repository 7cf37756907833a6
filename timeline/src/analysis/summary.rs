use common::{
    android::{ArtifactKind, TimestampCandidate},
    timeline::{AnalysisSummary, ConfidenceLevel},
};
use std::collections::{BTreeMap, HashSet};

/// Summarize how many independent sources produced timestamps
pub(crate) fn generate_summary(candidates: &[TimestampCandidate]) -> AnalysisSummary {
    let mut per_artifact: BTreeMap<ArtifactKind, usize> = BTreeMap::new();
    let mut paths = HashSet::new();
    for entry in candidates {
        *per_artifact.entry(entry.artifact).or_insert(0) += 1;
        paths.insert(entry.path.as_str());
    }

    let mut summary = AnalysisSummary {
        total_artifacts_found: per_artifact.len(),
        new_timestamp_sources: paths.len(),
        confidence_level: ConfidenceLevel::Low,
        recommendations: Vec::new(),
        key_findings: Vec::new(),
    };

    for (artifact, count) in &per_artifact {
        summary
            .key_findings
            .push(format!("{}: {count} timestamps", artifact.name()));
    }

    let high = 10;
    let medium = 5;
    if summary.new_timestamp_sources > high {
        summary.confidence_level = ConfidenceLevel::High;
        summary
            .recommendations
            .push(String::from("Timeline reconstruction is well supported"));
    } else if summary.new_timestamp_sources > medium {
        summary.confidence_level = ConfidenceLevel::Medium;
        summary
            .recommendations
            .push(String::from("Results are moderately supported"));
    } else {
        summary
            .recommendations
            .push(String::from("Additional artifacts should be reviewed"));
    }

    summary
}
