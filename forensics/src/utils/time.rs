use super::error::NormalizeError;
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use common::android::TimestampCandidate;
use log::debug;
use serde::{Deserialize, Serialize};

/// 9999-12-31T23:59:59Z. Larger epoch values are milliseconds
pub const MAX_EPOCH_SECONDS: i64 = 253_402_300_799;

/// Formats that carry their own UTC offset
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];

/// Formats without an offset. Entries ending in a literal `Z` are UTC
const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d-%H:%M:%S%.f",
    "%Y%m%d_%H%M%S",
    "%Y-%m-%d_%H-%M-%S",
];

/// `date` and recovery style: `Wed Nov 20 08:42:11 2024`
const POSIX_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Raw value pulled out of an artifact before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum RawTime {
    Integer(i64),
    Text(String),
    Structured(DateTime<Utc>),
}

/// Whether a value was recorded in UTC or in the device civil time
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ZoneConvention {
    Utc,
    Local,
}

impl ZoneConvention {
    pub fn is_local(&self) -> bool {
        self == &ZoneConvention::Local
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedTime {
    pub instant: DateTime<Utc>,
    pub convention: ZoneConvention,
}

/// Convert a raw value into a canonical instant.
/// Epochs and offset bearing strings are always UTC. Naive strings and structured values inherit `hint`
pub fn normalize(value: &RawTime, hint: ZoneConvention) -> Result<NormalizedTime, NormalizeError> {
    match value {
        RawTime::Structured(instant) => Ok(NormalizedTime {
            instant: *instant,
            convention: hint,
        }),
        RawTime::Integer(epoch) => Ok(NormalizedTime {
            instant: epoch_to_instant(*epoch)?,
            convention: ZoneConvention::Utc,
        }),
        RawTime::Text(text) => normalize_text(text, hint),
    }
}

/// Interpret an integer as seconds or milliseconds since the Unix epoch
pub fn epoch_to_instant(epoch: i64) -> Result<DateTime<Utc>, NormalizeError> {
    let instant = if epoch.unsigned_abs() > MAX_EPOCH_SECONDS as u64 {
        DateTime::from_timestamp_millis(epoch)
    } else {
        DateTime::from_timestamp(epoch, 0)
    };

    match instant {
        Some(result) => Ok(result),
        None => {
            debug!("[time] Epoch value {epoch} is out of range");
            Err(NormalizeError::InvalidEpoch)
        }
    }
}

fn normalize_text(text: &str, hint: ZoneConvention) -> Result<NormalizedTime, NormalizeError> {
    let value = text.trim();
    if is_integer_like(value) {
        let epoch = match value.parse::<i64>() {
            Ok(result) => result,
            Err(_err) => {
                debug!("[time] Epoch string {value} does not fit in 64 bits");
                return Err(NormalizeError::InvalidEpoch);
            }
        };
        return normalize(&RawTime::Integer(epoch), hint);
    }

    for format in OFFSET_FORMATS {
        if let Ok(result) = DateTime::parse_from_str(value, format) {
            return Ok(NormalizedTime {
                instant: result.with_timezone(&Utc),
                convention: ZoneConvention::Utc,
            });
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(result) = NaiveDateTime::parse_from_str(value, format) {
            let convention = if format.ends_with('Z') {
                ZoneConvention::Utc
            } else {
                hint
            };
            return Ok(NormalizedTime {
                instant: result.and_utc(),
                convention,
            });
        }
    }

    let collapsed = value.split_whitespace().collect::<Vec<&str>>().join(" ");
    if let Ok(result) = NaiveDateTime::parse_from_str(&collapsed, POSIX_FORMAT) {
        return Ok(NormalizedTime {
            instant: result.and_utc(),
            convention: hint,
        });
    }

    Err(NormalizeError::UnrecognizedFormat)
}

fn is_integer_like(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Civil time on the device. Adds the device offset only when the candidate is not already local
pub fn render_local(candidate: &TimestampCandidate, offset: &TimeDelta) -> NaiveDateTime {
    if candidate.already_local {
        return candidate.instant.naive_utc();
    }
    (candidate.instant + *offset).naive_utc()
}

/// True UTC instant. Removes the device offset from already local candidates
pub fn to_true_utc(candidate: &TimestampCandidate, offset: &TimeDelta) -> DateTime<Utc> {
    if candidate.already_local {
        return candidate.instant - *offset;
    }
    candidate.instant
}
