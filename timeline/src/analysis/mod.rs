use chrono::{DateTime, Utc};
use common::android::TimestampCandidate;

pub(crate) mod clusters;
pub(crate) mod consistency;
pub(crate) mod gaps;
pub(crate) mod outliers;
pub(crate) mod reconstruct;
pub(crate) mod summary;

/// Candidates ordered by instant. Ties keep their input order
pub(crate) fn chronological(candidates: &[TimestampCandidate]) -> Vec<TimestampCandidate> {
    let mut timeline = candidates.to_vec();
    timeline.sort_by_key(|entry| entry.instant);
    timeline
}

/// Seconds from `earlier` to `later` with millisecond precision
pub(crate) fn seconds_between(earlier: &DateTime<Utc>, later: &DateTime<Utc>) -> f64 {
    (*later - *earlier).num_milliseconds() as f64 / 1000.0
}

#[cfg(test)]
pub(crate) fn test_candidate(datetime: &str, label: &str) -> TimestampCandidate {
    use chrono::NaiveDateTime;
    use common::android::{ArtifactKind, Confidence};

    let naive = NaiveDateTime::parse_from_str(datetime, "%Y-%m-%d %H:%M:%S").unwrap();
    TimestampCandidate {
        instant: naive.and_utc(),
        artifact: ArtifactKind::RecoveryLastLog,
        path: String::from("cache/recovery/last_log"),
        label: label.to_string(),
        already_local: false,
        original: datetime.to_string(),
        confidence: Confidence::High,
        offset: None,
    }
}
