use crate::{
    artifacts::{
        collection::{ExtractContext, new_candidate},
        diagnostics::Diagnostics,
    },
    utils::{
        regex_options::create_regex,
        time::{RawTime, normalize},
    },
};
use common::android::{ArtifactKind, TimestampCandidate};
use log::error;

pub(crate) const PERSISTENT_PROPERTIES_PATH: &str = "data/property/persistent_properties";

/// Tried in order. The first pattern with any match wins
const RESET_PATTERNS: [&str; 3] = [
    r"reboot,factory_reset,(\d{10,})",
    r"factory_reset[,:=\s]+(\d{10,})",
    r"(?s)factory_reset.*?(\d{10,})",
];

/// `persist.sys.boot.reason.history` keeps entries like `reboot,factory_reset,1689128778`
pub(crate) fn persistent_properties(
    context: &ExtractContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<TimestampCandidate> {
    let kind = ArtifactKind::PersistentProperties;
    let path = PERSISTENT_PROPERTIES_PATH;
    let (text, data) = match context.read_text(kind, path, diagnostics) {
        Some(result) => result,
        None => return Vec::new(),
    };

    let values = reset_values(&text);
    if values.is_empty() {
        diagnostics.parse_failure(kind, path, "No factory_reset entry found", &data);
        return Vec::new();
    }

    let mut candidates = Vec::new();
    for (original, epoch) in values {
        match normalize(&RawTime::Text(epoch), context.convention(kind)) {
            Ok(time) => candidates.push(new_candidate(
                kind,
                path,
                "factory reset reboot",
                &time,
                &original,
            )),
            Err(err) => {
                diagnostics.parse_failure(kind, path, &err.to_string(), original.as_bytes())
            }
        }
    }
    candidates
}

/// Full matched text and the epoch digits for each `factory_reset` entry
pub(crate) fn reset_values(text: &str) -> Vec<(String, String)> {
    for pattern in RESET_PATTERNS {
        let regex = match create_regex(pattern) {
            Ok(result) => result,
            Err(err) => {
                error!("[properties] Could not compile {pattern}: {err:?}");
                continue;
            }
        };

        let values: Vec<(String, String)> = regex
            .captures_iter(text)
            .filter_map(|captures| {
                let full = captures.get(0)?.as_str().to_string();
                let epoch = captures.get(1)?.as_str().to_string();
                Some((full, epoch))
            })
            .collect();
        if !values.is_empty() {
            return values;
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::{PERSISTENT_PROPERTIES_PATH, persistent_properties, reset_values};
    use crate::{
        artifacts::{collection::ExtractContext, diagnostics::Diagnostics},
        decoder::StaticDecoder,
        source::MemorySource,
        structs::toml::Timezone,
    };
    use chrono::DateTime;
    use common::diagnostics::DiagnosticKind;

    #[test]
    fn test_reset_values_order() {
        let results = reset_values("reboot,factory_reset,1689128778\nfactory_reset=1689128000");
        assert_eq!(
            results,
            vec![(
                String::from("reboot,factory_reset,1689128778"),
                String::from("1689128778")
            )]
        );

        let results = reset_values("factory_reset: 1689128000");
        assert_eq!(results[0].0, "factory_reset: 1689128000");

        let results = reset_values("factory_reset\u{0}\u{12}\nlast=1689128111");
        assert_eq!(results[0].1, "1689128111");

        assert!(reset_values("reboot,shell,1689128778").is_empty());
    }

    #[test]
    fn test_persistent_properties() {
        let mut source = MemorySource::default();
        let modified = DateTime::from_timestamp(1732092131, 0).unwrap();
        source.insert(
            PERSISTENT_PROPERTIES_PATH,
            b"\n\x1fpersist.sys.boot.reason.history\x12\x1freboot,factory_reset,1689128778\n",
            modified,
        );
        let timezone = Timezone::default();
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        let mut diagnostics = Diagnostics::new();
        let results = persistent_properties(&context, &mut diagnostics);
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].instant,
            DateTime::from_timestamp(1689128778, 0).unwrap()
        );
        assert_eq!(results[0].original, "reboot,factory_reset,1689128778");
        assert!(!results[0].already_local);
    }

    #[test]
    fn test_persistent_properties_no_marker() {
        let mut source = MemorySource::default();
        let modified = DateTime::from_timestamp(1732092131, 0).unwrap();
        source.insert(PERSISTENT_PROPERTIES_PATH, b"persist.sys.timezone=Asia/Seoul", modified);
        let timezone = Timezone::default();
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        let mut diagnostics = Diagnostics::new();
        assert!(persistent_properties(&context, &mut diagnostics).is_empty());
        assert_eq!(diagnostics.entries()[0].kind, DiagnosticKind::ParseFailure);
        assert_eq!(
            diagnostics.entries()[0].preview.as_deref(),
            Some("persist.sys.timezone=Asia/Seoul")
        );
    }
}
