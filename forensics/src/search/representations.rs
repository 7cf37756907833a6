use crate::utils::time::{render_local, to_true_utc};
use chrono::{DateTime, TimeDelta, Utc};
use common::{
    android::{Confidence, TimestampCandidate},
    search::RepresentationKind,
};
use std::collections::BTreeMap;

/// Text forms rendered in device civil time
const TEXT_FORMATS: [(RepresentationKind, &str); 4] = [
    (RepresentationKind::DateTime, "%Y-%m-%d %H:%M:%S"),
    (RepresentationKind::IsoDateTime, "%Y-%m-%dT%H:%M:%S"),
    (RepresentationKind::CompactDateTime, "%Y%m%d%H%M%S"),
    (RepresentationKind::DateOnly, "%Y-%m-%d"),
];

#[derive(Debug, Clone, PartialEq)]
pub enum Encoded {
    Text(String),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Representation {
    pub kind: RepresentationKind,
    pub value: Encoded,
}

/// Extracted timestamp used as a deep search target
#[derive(Debug, Clone)]
pub struct Anchor {
    /// Device civil time, `%Y-%m-%d %H:%M:%S`
    pub display: String,
    pub instant: DateTime<Utc>,
    pub representations: Vec<Representation>,
}

/// One anchor per distinct instant. Low confidence byte scan hits are not searched for
pub fn build_anchors(candidates: &[TimestampCandidate], offset: &TimeDelta) -> Vec<Anchor> {
    let mut anchors = BTreeMap::new();
    for candidate in candidates {
        if candidate.confidence == Confidence::Low {
            continue;
        }
        let anchor = build_anchor(candidate, offset);
        anchors.entry(anchor.instant).or_insert(anchor);
    }
    anchors.into_values().collect()
}

pub fn build_anchor(candidate: &TimestampCandidate, offset: &TimeDelta) -> Anchor {
    let local = render_local(candidate, offset);
    let instant = to_true_utc(candidate, offset);
    let seconds = instant.timestamp();
    let millis = instant.timestamp_millis();

    let mut representations = vec![
        Representation {
            kind: RepresentationKind::EpochSeconds,
            value: Encoded::Text(seconds.to_string()),
        },
        Representation {
            kind: RepresentationKind::EpochMillis,
            value: Encoded::Text(millis.to_string()),
        },
    ];
    for (kind, format) in TEXT_FORMATS {
        representations.push(Representation {
            kind,
            value: Encoded::Text(local.format(format).to_string()),
        });
    }

    if let Ok(value) = u32::try_from(seconds) {
        representations.push(binary(RepresentationKind::Seconds32Le, value.to_le_bytes().to_vec()));
        representations.push(binary(RepresentationKind::Seconds32Be, value.to_be_bytes().to_vec()));
    }
    representations.push(binary(RepresentationKind::Seconds64Le, seconds.to_le_bytes().to_vec()));
    representations.push(binary(RepresentationKind::Seconds64Be, seconds.to_be_bytes().to_vec()));
    representations.push(binary(RepresentationKind::Millis64Le, millis.to_le_bytes().to_vec()));
    representations.push(binary(RepresentationKind::Millis64Be, millis.to_be_bytes().to_vec()));

    Anchor {
        display: local.format("%Y-%m-%d %H:%M:%S").to_string(),
        instant,
        representations,
    }
}

fn binary(kind: RepresentationKind, bytes: Vec<u8>) -> Representation {
    Representation {
        kind,
        value: Encoded::Bytes(bytes),
    }
}
