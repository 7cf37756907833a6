use chrono::{DateTime, Datelike, TimeDelta, Utc};
use common::{
    android::TimestampCandidate,
    timeline::{ConsistencyIssue, ConsistencyReport, IssueKind},
};

/// Flag timestamps outside the plausible device lifetime or in the future relative to `now`
pub(crate) fn check_consistency(
    candidates: &[TimestampCandidate],
    now: &DateTime<Utc>,
) -> ConsistencyReport {
    let mut report = ConsistencyReport {
        total_count: candidates.len(),
        valid_count: 0,
        logical_issues: Vec::new(),
    };

    let earliest_year = 2017;
    let latest_year = 2030;
    let future_limit = *now + TimeDelta::days(1);

    for entry in candidates {
        report.valid_count += 1;
        let year = entry.instant.year();
        if !(earliest_year..=latest_year).contains(&year) {
            report.logical_issues.push(ConsistencyIssue {
                timestamp: entry.clone(),
                issue: IssueKind::UnrealisticYear,
            });
        }
        if entry.instant > future_limit {
            report.logical_issues.push(ConsistencyIssue {
                timestamp: entry.clone(),
                issue: IssueKind::FutureTimestamp,
            });
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::check_consistency;
    use crate::analysis::test_candidate;
    use common::timeline::IssueKind;

    #[test]
    fn test_check_consistency() {
        let now = test_candidate("2024-06-01 00:00:00", "now").instant;
        let test = vec![
            test_candidate("2016-12-31 23:59:59", "too old"),
            test_candidate("2024-05-01 00:00:00", "fine"),
            test_candidate("2024-06-02 00:00:01", "tomorrow"),
            test_candidate("2031-01-01 00:00:00", "far future"),
        ];
        let result = check_consistency(&test, &now);
        assert_eq!(result.total_count, 4);
        assert_eq!(result.valid_count, 4);
        assert_eq!(result.logical_issues.len(), 4);
        assert_eq!(result.logical_issues[0].issue, IssueKind::UnrealisticYear);
        assert_eq!(result.logical_issues[1].timestamp.label, "tomorrow");
        assert_eq!(result.logical_issues[1].issue, IssueKind::FutureTimestamp);
        assert_eq!(result.logical_issues[2].issue, IssueKind::UnrealisticYear);
        assert_eq!(result.logical_issues[3].issue, IssueKind::FutureTimestamp);
    }
}
