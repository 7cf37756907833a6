use crate::{
    artifacts::{
        collection::{ExtractContext, new_candidate},
        diagnostics::Diagnostics,
    },
    utils::{
        regex_options::create_regex,
        time::{RawTime, ZoneConvention, normalize},
    },
};
use common::android::{ArtifactKind, TimestampCandidate};
use log::error;

pub(crate) const SETUP_WIZARD_PATH: &str =
    "data/data/com.google.android.setupwizard/shared_prefs/SetupWizardPrefs.xml";
pub(crate) const PROVISIONING_PREFS: &str =
    "data/data/com.android.managedprovisioning/shared_prefs/";

/// `<long name="setup_complete_time" value="1732092131000" />`
const SETUP_WIZARD_ATTRIBUTE: &str =
    r#"<long\s+name="([^"]*(?i:time|date)[^"]*)"\s+value="(\d{10,13})"\s*/?>"#;
/// Provisioning stores milliseconds only
const PROVISIONING_ATTRIBUTE: &str =
    r#"<long\s+name="([^"]*(?i:time|date)[^"]*)"\s+value="(\d{13})"\s*/?>"#;

struct PreferenceValue {
    name: String,
    value: i64,
    original: String,
}

/// Time attributes saved by the setup wizard
pub(crate) fn setup_wizard_prefs(
    context: &ExtractContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<TimestampCandidate> {
    let kind = ArtifactKind::SetupWizardPrefs;
    let (text, data) = match context.read_text(kind, SETUP_WIZARD_PATH, diagnostics) {
        Some(result) => result,
        None => return Vec::new(),
    };

    let values = preference_values(&text, SETUP_WIZARD_ATTRIBUTE);
    if values.is_empty() {
        diagnostics.no_time(kind, SETUP_WIZARD_PATH, &data);
        return Vec::new();
    }
    to_candidates(
        kind,
        SETUP_WIZARD_PATH,
        "setup wizard",
        &values,
        1,
        context.convention(kind),
        diagnostics,
    )
}

/// Managed provisioning preference files. Values are milliseconds and divided down to seconds
pub(crate) fn provisioning_prefs(
    context: &ExtractContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<TimestampCandidate> {
    let kind = ArtifactKind::ProvisioningPrefs;
    let files: Vec<String> = context
        .list(kind, PROVISIONING_PREFS, diagnostics)
        .into_iter()
        .filter(|path| path.ends_with(".xml"))
        .collect();
    if files.is_empty() {
        diagnostics.missing(kind, PROVISIONING_PREFS);
        return Vec::new();
    }

    let mut candidates = Vec::new();
    for path in files {
        let (text, data) = match context.read_text(kind, &path, diagnostics) {
            Some(result) => result,
            None => continue,
        };
        let values = preference_values(&text, PROVISIONING_ATTRIBUTE);
        if values.is_empty() {
            diagnostics.no_time(kind, &path, &data);
            continue;
        }
        candidates.append(&mut to_candidates(
            kind,
            &path,
            "provisioning",
            &values,
            1000,
            context.convention(kind),
            diagnostics,
        ));
    }
    candidates
}

fn preference_values(text: &str, pattern: &str) -> Vec<PreferenceValue> {
    let regex = match create_regex(pattern) {
        Ok(result) => result,
        Err(err) => {
            error!("[prefs] Could not compile preference regex: {err:?}");
            return Vec::new();
        }
    };

    let mut values = Vec::new();
    for captures in regex.captures_iter(text) {
        let (name, value) = match (captures.get(1), captures.get(2)) {
            (Some(name), Some(value)) => (name.as_str(), value.as_str()),
            _ => continue,
        };
        let value = match value.parse::<i64>() {
            Ok(result) => result,
            Err(_err) => continue,
        };
        values.push(PreferenceValue {
            name: name.to_string(),
            value,
            original: captures
                .get(0)
                .map(|full| full.as_str().to_string())
                .unwrap_or_default(),
        });
    }
    values
}

fn to_candidates(
    kind: ArtifactKind,
    path: &str,
    label: &str,
    values: &[PreferenceValue],
    divisor: i64,
    hint: ZoneConvention,
    diagnostics: &mut Diagnostics,
) -> Vec<TimestampCandidate> {
    let mut candidates = Vec::new();
    for entry in values {
        match normalize(&RawTime::Integer(entry.value / divisor), hint) {
            Ok(time) => candidates.push(new_candidate(
                kind,
                path,
                &format!("{label} {}", entry.name),
                &time,
                &entry.original,
            )),
            Err(err) => {
                diagnostics.parse_failure(kind, path, &err.to_string(), entry.original.as_bytes())
            }
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::{PROVISIONING_PREFS, SETUP_WIZARD_PATH, provisioning_prefs, setup_wizard_prefs};
    use crate::{
        artifacts::{collection::ExtractContext, diagnostics::Diagnostics},
        decoder::StaticDecoder,
        source::MemorySource,
        structs::toml::Timezone,
    };
    use chrono::DateTime;
    use common::diagnostics::DiagnosticKind;

    #[test]
    fn test_setup_wizard_prefs() {
        let mut source = MemorySource::default();
        let modified = DateTime::from_timestamp(1732092131, 0).unwrap();
        source.insert(
            SETUP_WIZARD_PATH,
            br#"<?xml version='1.0' encoding='utf-8' standalone='yes' ?>
<map>
    <boolean name="setup_complete" value="true" />
    <long name="setupCompleteTime" value="1732092731500" />
    <long name="deferred_count" value="1732092731500" />
</map>"#,
            modified,
        );
        let timezone = Timezone::default();
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        let mut diagnostics = Diagnostics::new();
        let results = setup_wizard_prefs(&context, &mut diagnostics);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].label, "setup wizard setupCompleteTime");
        assert_eq!(
            results[0].instant.to_rfc3339(),
            "2024-11-20T08:52:11.500+00:00"
        );
        assert!(!results[0].already_local);
        assert_eq!(
            results[0].original,
            r#"<long name="setupCompleteTime" value="1732092731500" />"#
        );
    }

    #[test]
    fn test_setup_wizard_no_attribute() {
        let mut source = MemorySource::default();
        let modified = DateTime::from_timestamp(1732092131, 0).unwrap();
        source.insert(SETUP_WIZARD_PATH, b"<map />", modified);
        let timezone = Timezone::default();
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        let mut diagnostics = Diagnostics::new();
        assert!(setup_wizard_prefs(&context, &mut diagnostics).is_empty());
        assert_eq!(
            diagnostics.entries()[0].kind,
            DiagnosticKind::NoTimeInformation
        );
        assert_eq!(diagnostics.entries()[0].preview.as_deref(), Some("<map />"));
    }

    #[test]
    fn test_provisioning_prefs() {
        let mut source = MemorySource::default();
        let modified = DateTime::from_timestamp(1732092131, 0).unwrap();
        source.insert(
            &format!("{PROVISIONING_PREFS}provisioning_preferences.xml"),
            br#"<map><long name="provisioning_start_time" value="1732092135999" /></map>"#,
            modified,
        );
        source.insert(
            &format!("{PROVISIONING_PREFS}other.xml"),
            b"<map />",
            modified,
        );
        let timezone = Timezone::default();
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        let mut diagnostics = Diagnostics::new();
        let results = provisioning_prefs(&context, &mut diagnostics);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].instant.to_rfc3339(), "2024-11-20T08:42:15+00:00");
        assert_eq!(results[0].label, "provisioning provisioning_start_time");
        assert_eq!(
            diagnostics.entries()[0].kind,
            DiagnosticKind::NoTimeInformation
        );
    }

    #[test]
    fn test_provisioning_missing() {
        let source = MemorySource::default();
        let timezone = Timezone::default();
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        let mut diagnostics = Diagnostics::new();
        assert!(provisioning_prefs(&context, &mut diagnostics).is_empty());
        assert_eq!(diagnostics.entries()[0].kind, DiagnosticKind::Missing);
    }
}
