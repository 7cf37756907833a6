/**
 * Kernel ring buffer dumps. Lines carry a `[    5.123456]` counter (seconds since boot).
 * The RTC driver prints `setting system clock to 2024-11-20 08:42:11 UTC` during boot,
 * which anchors the counters of the lines around it
 */
use crate::{
    artifacts::{
        collection::{ExtractContext, new_candidate},
        diagnostics::Diagnostics,
    },
    utils::{
        error::UtilError,
        regex_options::{create_regex, create_regex_ignore_case},
        time::{NormalizedTime, RawTime, normalize},
    },
};
use chrono::TimeDelta;
use common::android::{ArtifactKind, TimestampCandidate};
use log::{error, warn};
use regex::Regex;

pub(crate) const KMSG_PATHS: [&str; 3] = ["proc/kmsg", "data/dmesg", "cache/recovery/last_kmsg"];

const COUNTER: &str = r"\[\s*(\d+\.\d+)\]";
const WALL_CLOCK: &str = r"(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})";
const RESET_LINE: &str = r"factory.*reset|reset.*factory|wipe.*data";

const MAX_PER_FILE: usize = 256;

struct KernelRegex {
    counter: Regex,
    wall_clock: Regex,
    reset: Regex,
}

/// Factory reset and wipe messages from the kernel log dumps
pub(crate) fn kernel_logs(
    context: &ExtractContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<TimestampCandidate> {
    let kind = ArtifactKind::KernelLogs;
    let regex = match compile() {
        Ok(result) => result,
        Err(err) => {
            error!("[kernel] Could not compile kernel log regexes: {err:?}");
            return Vec::new();
        }
    };

    let mut found = false;
    let mut candidates = Vec::new();
    for path in KMSG_PATHS {
        if !context.source.exists(path) {
            continue;
        }
        found = true;
        let (text, data) = match context.read_text(kind, path, diagnostics) {
            Some(result) => result,
            None => continue,
        };
        let hint = context.convention(kind);

        let lines: Vec<&str> = text.lines().collect();
        let mut anchors = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            let relative = match relative_seconds(&regex.counter, line) {
                Some(result) => result,
                None => continue,
            };
            let stamp = match regex.wall_clock.captures(line).and_then(|value| value.get(1)) {
                Some(result) => result.as_str(),
                None => continue,
            };
            match normalize(&RawTime::Text(stamp.to_string()), hint) {
                Ok(time) => anchors.push((index, relative, time)),
                Err(err) => warn!("[kernel] Could not normalize {stamp} in {path}: {err:?}"),
            }
        }

        let mut count = 0;
        for (index, line) in lines.iter().enumerate() {
            if !regex.reset.is_match(line) {
                continue;
            }
            count += 1;
            if count > MAX_PER_FILE {
                warn!("[kernel] Too many reset lines in {path}. Keeping the first {MAX_PER_FILE}");
                break;
            }

            let relative = relative_seconds(&regex.counter, line);
            match resolve(index, relative, &anchors) {
                Some(time) => candidates.push(new_candidate(
                    kind,
                    path,
                    "kernel reset message",
                    &time,
                    line.trim(),
                )),
                None => diagnostics.no_time(kind, path, line.trim().as_bytes()),
            }
        }

        if count == 0 {
            diagnostics.no_time(kind, path, &data);
        }
    }

    if !found {
        diagnostics.missing(kind, KMSG_PATHS[0]);
    }
    candidates
}

fn compile() -> Result<KernelRegex, UtilError> {
    Ok(KernelRegex {
        counter: create_regex(COUNTER)?,
        wall_clock: create_regex(WALL_CLOCK)?,
        reset: create_regex_ignore_case(RESET_LINE)?,
    })
}

fn relative_seconds(counter: &Regex, line: &str) -> Option<f64> {
    let captures = counter.captures(line)?;
    captures.get(1)?.as_str().parse::<f64>().ok()
}

/// Use the closest anchor printed before the line. Counters restart on every boot so
/// lines before the first anchor fall back to it
fn resolve(
    index: usize,
    relative: Option<f64>,
    anchors: &[(usize, f64, NormalizedTime)],
) -> Option<NormalizedTime> {
    let relative = relative?;
    let (anchor_index, anchor_relative, anchor_time) = anchors
        .iter()
        .rev()
        .find(|(anchor_index, _, _)| *anchor_index <= index)
        .or_else(|| anchors.first())?;
    if *anchor_index == index {
        return Some(*anchor_time);
    }

    let millis = ((relative - anchor_relative) * 1000.0).round() as i64;
    Some(NormalizedTime {
        instant: anchor_time.instant + TimeDelta::milliseconds(millis),
        convention: anchor_time.convention,
    })
}

#[cfg(test)]
mod tests {
    use super::kernel_logs;
    use crate::{
        artifacts::{collection::ExtractContext, diagnostics::Diagnostics},
        decoder::StaticDecoder,
        source::MemorySource,
        structs::toml::Timezone,
    };
    use chrono::DateTime;
    use common::diagnostics::DiagnosticKind;

    #[test]
    fn test_kernel_logs() {
        let mut source = MemorySource::default();
        let modified = DateTime::from_timestamp(1732092131, 0).unwrap();
        source.insert(
            "cache/recovery/last_kmsg",
            b"<6>[    0.000000] Booting Linux on physical CPU 0x0\n<6>[    3.250000] rtc-pm8xxx: setting system clock to 2024-11-20 08:42:11 UTC (1732092131)\n<5>[   15.750000] recovery: wipe_data: factory reset requested\n<6>[   20.000000] init: Service 'adbd' started\n",
            modified,
        );
        let timezone = Timezone::default();
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        let mut diagnostics = Diagnostics::new();
        let results = kernel_logs(&context, &mut diagnostics);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].label, "kernel reset message");
        assert_eq!(results[0].path, "cache/recovery/last_kmsg");
        assert_eq!(
            results[0].original,
            "<5>[   15.750000] recovery: wipe_data: factory reset requested"
        );
        assert_eq!(
            results[0].instant.to_rfc3339(),
            "2024-11-20T08:42:23.500+00:00"
        );
        assert!(!results[0].already_local);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_kernel_logs_reset_before_anchor() {
        let mut source = MemorySource::default();
        let modified = DateTime::from_timestamp(1732092131, 0).unwrap();
        source.insert(
            "data/dmesg",
            b"[    1.000000] Factory Reset Protection enabled\n[    2.000000] setting system clock to 2024-11-20 08:42:11 UTC\n",
            modified,
        );
        let timezone = Timezone::default();
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        let mut diagnostics = Diagnostics::new();
        let results = kernel_logs(&context, &mut diagnostics);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].instant.to_rfc3339(), "2024-11-20T08:42:10+00:00");
    }

    #[test]
    fn test_kernel_logs_no_anchor() {
        let mut source = MemorySource::default();
        let modified = DateTime::from_timestamp(1732092131, 0).unwrap();
        source.insert(
            "proc/kmsg",
            b"[   15.750500] wipe_data requested\n[   16.000000] reboot\n",
            modified,
        );
        let timezone = Timezone::default();
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        let mut diagnostics = Diagnostics::new();
        assert!(kernel_logs(&context, &mut diagnostics).is_empty());
        assert_eq!(diagnostics.entries().len(), 1);
        assert_eq!(
            diagnostics.entries()[0].kind,
            DiagnosticKind::NoTimeInformation
        );
        assert_eq!(
            diagnostics.entries()[0].preview.as_deref(),
            Some("[   15.750500] wipe_data requested")
        );
    }

    #[test]
    fn test_kernel_logs_missing() {
        let source = MemorySource::default();
        let timezone = Timezone::default();
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        let mut diagnostics = Diagnostics::new();
        assert!(kernel_logs(&context, &mut diagnostics).is_empty());
        assert_eq!(diagnostics.entries().len(), 1);
        assert_eq!(diagnostics.entries()[0].kind, DiagnosticKind::Missing);
        assert_eq!(diagnostics.entries()[0].path, "proc/kmsg");
    }
}
