use super::{chronological, seconds_between};
use common::{android::TimestampCandidate, timeline::Outlier};

/// Flag candidates whose gap to the previous entry falls outside the 1.5 * IQR fences.
/// Quartiles are picked by rank without interpolation
pub(crate) fn detect_outliers(candidates: &[TimestampCandidate]) -> Vec<Outlier> {
    let mut outliers = Vec::new();
    let min_size = 3;
    if candidates.len() < min_size {
        return outliers;
    }
    let timeline = chronological(candidates);

    let intervals: Vec<f64> = timeline
        .windows(2)
        .map(|pair| seconds_between(&pair[0].instant, &pair[1].instant))
        .collect();

    let mut sorted = intervals.clone();
    sorted.sort_by(f64::total_cmp);

    let q1 = sorted[sorted.len() / 4];
    let q3 = sorted[3 * sorted.len() / 4];
    let iqr = q3 - q1;
    let fence = 1.5;
    let lower_bound = q1 - fence * iqr;
    let upper_bound = q3 + fence * iqr;

    for (entry, interval) in timeline.iter().skip(1).zip(intervals) {
        if interval < lower_bound || interval > upper_bound {
            outliers.push(Outlier {
                timestamp: entry.clone(),
                interval,
                reason: String::from("statistical_outlier"),
            });
        }
    }

    outliers
}
