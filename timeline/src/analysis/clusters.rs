use super::chronological;
use chrono::TimeDelta;
use common::{android::TimestampCandidate, timeline::Cluster};

/// Group candidates whose neighbours are no more than `threshold` apart. Runs with a single member are dropped
pub(crate) fn find_clusters(
    candidates: &[TimestampCandidate],
    threshold: &TimeDelta,
) -> Vec<Cluster> {
    let mut clusters = Vec::new();
    let timeline = chronological(candidates);
    let mut entries = timeline.into_iter();
    let mut current = match entries.next() {
        Some(first) => vec![first],
        None => return clusters,
    };

    for entry in entries {
        let previous = current.last().map(|value| value.instant);
        if let Some(previous) = previous {
            if entry.instant - previous <= *threshold {
                current.push(entry);
                continue;
            }
        }
        close_cluster(std::mem::replace(&mut current, vec![entry]), &mut clusters);
    }
    close_cluster(current, &mut clusters);

    clusters
}

fn close_cluster(members: Vec<TimestampCandidate>, clusters: &mut Vec<Cluster>) {
    let min_members = 2;
    if members.len() < min_members {
        return;
    }
    let (start_time, end_time) = match (members.first(), members.last()) {
        (Some(first), Some(last)) => (first.instant, last.instant),
        _ => return,
    };
    clusters.push(Cluster {
        start_time,
        end_time,
        count: members.len(),
        timestamps: members,
    });
}
