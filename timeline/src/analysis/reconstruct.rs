use super::chronological;
use chrono::{DateTime, TimeDelta, Utc};
use common::{
    android::{Confidence, TimestampCandidate},
    timeline::Reconstruction,
};

const RESET_KEYWORDS: [&str; 5] = ["factory", "reset", "setup", "boot", "recovery"];

/// Earliest candidate whose label or path mentions reset activity.
/// Byte scan hits are low confidence and never pick the reset time
pub(crate) fn estimate_reset_time(candidates: &[TimestampCandidate]) -> Option<DateTime<Utc>> {
    candidates
        .iter()
        .filter(|entry| entry.confidence == Confidence::High && is_reset_related(entry))
        .map(|entry| entry.instant)
        .min()
}

fn is_reset_related(entry: &TimestampCandidate) -> bool {
    let text = format!("{}{}", entry.path, entry.label).to_lowercase();
    RESET_KEYWORDS.iter().any(|keyword| text.contains(keyword))
}

/// Split the timeline into before, during and after the estimated reset
pub(crate) fn reconstruct_timeline(
    candidates: &[TimestampCandidate],
    window: &TimeDelta,
) -> Option<Reconstruction> {
    let timeline = chronological(candidates);
    let reset_time = estimate_reset_time(&timeline)?;

    let mut reconstruction = Reconstruction {
        reset_time,
        pre_reset: Vec::new(),
        reset_process: Vec::new(),
        post_reset: Vec::new(),
        reconstruction_confidence: 0.0,
    };

    for entry in timeline {
        if entry.instant < reset_time - *window {
            reconstruction.pre_reset.push(entry);
        } else if entry.instant <= reset_time + *window {
            reconstruction.reset_process.push(entry);
        } else {
            reconstruction.post_reset.push(entry);
        }
    }

    reconstruction.reconstruction_confidence = timeline_confidence(&reconstruction);
    Some(reconstruction)
}

/// Score how well the segments support the reset estimate
pub(crate) fn timeline_confidence(reconstruction: &Reconstruction) -> f64 {
    let total = reconstruction.pre_reset.len()
        + reconstruction.reset_process.len()
        + reconstruction.post_reset.len();
    if total == 0 {
        return 0.0;
    }

    let mut confidence = f64::min(0.5, total as f64 * 0.1);
    if !reconstruction.reset_process.is_empty() {
        confidence += 0.3;
    }
    if !reconstruction.pre_reset.is_empty() && !reconstruction.post_reset.is_empty() {
        confidence += 0.2;
    }
    f64::min(1.0, confidence)
}
