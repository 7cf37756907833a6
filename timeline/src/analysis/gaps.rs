use super::{chronological, seconds_between};
use chrono::TimeDelta;
use common::{
    android::TimestampCandidate,
    timeline::{Gap, GapKind},
};
use log::debug;

/// Report neighbouring candidates further apart than `threshold`
pub(crate) fn identify_gaps(candidates: &[TimestampCandidate], threshold: &TimeDelta) -> Vec<Gap> {
    let timeline = chronological(candidates);
    let mut gaps = Vec::new();

    for pair in timeline.windows(2) {
        if pair[1].instant - pair[0].instant <= *threshold {
            continue;
        }
        let hour = 3600.0;
        let duration_hours = seconds_between(&pair[0].instant, &pair[1].instant) / hour;
        let kind = gap_kind(duration_hours);
        debug!(
            "[timeline] {duration_hours:.1} hour gap after {}, likely {}",
            pair[0].instant,
            kind.description()
        );
        gaps.push(Gap {
            start: pair[0].clone(),
            end: pair[1].clone(),
            duration_hours,
            kind,
        });
    }

    gaps
}

/// Guess what likely happened during a gap based on its length
pub(crate) fn gap_kind(hours: f64) -> GapKind {
    if hours > 24.0 {
        GapKind::SystemOff
    } else if hours > 8.0 {
        GapKind::ProlongedIdle
    } else if hours > 2.0 {
        GapKind::UserInactive
    } else {
        GapKind::TransientInterruption
    }
}
