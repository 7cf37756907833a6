use super::{
    android::{
        anr::anr_logs,
        bootstat::{bootstat_factory_reset, bootstat_last_boot_time},
        bytescan::binary_scan,
        databases::{accounts_database, settings_database, wellbeing_usage},
        dropbox::dropbox,
        kernel::kernel_logs,
        logcat::logcat_archives,
        packages::package_restrictions,
        prefs::{provisioning_prefs, setup_wizard_prefs},
        properties::persistent_properties,
        recovery::{recovery_last_log, recovery_last_log_archive},
        tombstones::tombstones,
        usagestats::usage_stats,
    },
    diagnostics::Diagnostics,
};
use crate::{
    decoder::PreferenceDecoder,
    source::{SourceAccessor, error::SourceError},
    structs::toml::Timezone,
    utils::{
        strings::lossy_text,
        time::{NormalizedTime, ZoneConvention},
    },
};
use common::android::{ArtifactKind, Confidence, TimestampCandidate};
use log::{error, info, warn};
use std::{collections::BTreeSet, thread};

/// Device directories that are listed for the byte scan, metadata listing, pattern scan and deep search
pub const SEARCHABLE_ROOTS: [&str; 23] = [
    "data/misc/bootstat/",
    "cache/recovery/",
    "data/log/",
    "data/system/",
    "data/property/",
    "data/anr/",
    "data/tombstones/",
    "data/system/dropbox/",
    "data/misc/logd/",
    "data/system/usagestats/",
    "data/data/com.android.providers.settings/",
    "data/data/com.google.android.setupwizard/",
    "data/data/com.android.managedprovisioning/",
    "system/recovery-resource.dat",
    "proc/",
    "data/system/users/",
    "data/misc/user/",
    "data/misc/wifi/",
    "data/misc/bluetooth/",
    "data/misc/systemkeys/",
    "data/data/*/databases/",
    "data/data/*/shared_prefs/",
    "data/data/*/files/",
];

/// Everything an extractor may touch
pub struct ExtractContext<'a> {
    pub source: &'a dyn SourceAccessor,
    pub decoder: &'a dyn PreferenceDecoder,
    pub timezone: &'a Timezone,
}

impl ExtractContext<'_> {
    /// Convention configured for an artifact in the TOML `[timezone.overrides]` table
    pub fn override_for(&self, kind: ArtifactKind) -> Option<ZoneConvention> {
        self.timezone.overrides.get(kind.name()).copied()
    }

    /// Convention used when normalizing naive values from an artifact
    pub fn convention(&self, kind: ArtifactKind) -> ZoneConvention {
        self.override_for(kind)
            .unwrap_or_else(|| default_convention(kind))
    }

    /// Read raw artifact bytes. Missing or unreadable files are recorded and return `None`
    pub(crate) fn read(
        &self,
        kind: ArtifactKind,
        path: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<Vec<u8>> {
        match self.source.read_bytes(path) {
            Ok(result) => Some(result),
            Err(SourceError::NotFound) => {
                diagnostics.missing(kind, path);
                None
            }
            Err(err) => {
                diagnostics.unavailable(kind, path, &err.to_string());
                None
            }
        }
    }

    /// Read an artifact as text using the multi encoding decoder
    pub(crate) fn read_text(
        &self,
        kind: ArtifactKind,
        path: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<(String, Vec<u8>)> {
        let data = self.read(kind, path, diagnostics)?;
        Some((lossy_text(&data), data))
    }

    /// List files for an artifact. A listing failure is recorded as unavailable
    pub(crate) fn list(
        &self,
        kind: ArtifactKind,
        prefix: &str,
        diagnostics: &mut Diagnostics,
    ) -> Vec<String> {
        match self.source.list(prefix) {
            Ok(result) => result,
            Err(err) => {
                diagnostics.unavailable(kind, prefix, &err.to_string());
                Vec::new()
            }
        }
    }
}

/// Conventions observed for each artifact family. Configurable through `[timezone.overrides]`
pub fn default_convention(kind: ArtifactKind) -> ZoneConvention {
    match kind {
        ArtifactKind::BootstatFactoryReset
        | ArtifactKind::BootstatLastBootTime
        | ArtifactKind::RecoveryLastLog
        | ArtifactKind::Tombstones
        | ArtifactKind::AnrLogs
        | ArtifactKind::LogcatArchives => ZoneConvention::Local,
        ArtifactKind::RecoveryLastLogArchive
        | ArtifactKind::SetupWizardPrefs
        | ArtifactKind::ProvisioningPrefs
        | ArtifactKind::PersistentProperties
        | ArtifactKind::PackageRestrictions
        | ArtifactKind::AccountsDatabase
        | ArtifactKind::WellbeingUsage
        | ArtifactKind::BinaryScan
        | ArtifactKind::Dropbox
        | ArtifactKind::UsageStats
        | ArtifactKind::KernelLogs
        | ArtifactKind::SettingsDatabase => ZoneConvention::Utc,
    }
}

pub type Extractor = fn(&ExtractContext<'_>, &mut Diagnostics) -> Vec<TimestampCandidate>;

/// Dispatch table from artifact kind to its extractor
pub fn extractor_for(kind: ArtifactKind) -> Extractor {
    match kind {
        ArtifactKind::BootstatFactoryReset => bootstat_factory_reset,
        ArtifactKind::BootstatLastBootTime => bootstat_last_boot_time,
        ArtifactKind::RecoveryLastLog => recovery_last_log,
        ArtifactKind::RecoveryLastLogArchive => recovery_last_log_archive,
        ArtifactKind::SetupWizardPrefs => setup_wizard_prefs,
        ArtifactKind::ProvisioningPrefs => provisioning_prefs,
        ArtifactKind::PersistentProperties => persistent_properties,
        ArtifactKind::PackageRestrictions => package_restrictions,
        ArtifactKind::AccountsDatabase => accounts_database,
        ArtifactKind::WellbeingUsage => wellbeing_usage,
        ArtifactKind::BinaryScan => binary_scan,
        ArtifactKind::Tombstones => tombstones,
        ArtifactKind::Dropbox => dropbox,
        ArtifactKind::UsageStats => usage_stats,
        ArtifactKind::AnrLogs => anr_logs,
        ArtifactKind::KernelLogs => kernel_logs,
        ArtifactKind::LogcatArchives => logcat_archives,
        ArtifactKind::SettingsDatabase => settings_database,
    }
}

/// Resolve the TOML `artifacts` list. Unknown names are logged and skipped
pub fn selected_artifacts(names: &Option<Vec<String>>) -> Vec<ArtifactKind> {
    let names = match names {
        Some(result) => result,
        None => return ArtifactKind::ALL.to_vec(),
    };

    let mut kinds = Vec::new();
    for name in names {
        match ArtifactKind::from_name(name) {
            Some(kind) if !kinds.contains(&kind) => kinds.push(kind),
            Some(_) => {}
            None => warn!("[wipetrace] Unknown artifact {name}. Skipping"),
        }
    }
    kinds
}

/// Run every selected extractor on its own thread and merge the results
pub fn extract_all(
    context: &ExtractContext<'_>,
    kinds: &[ArtifactKind],
) -> (Vec<TimestampCandidate>, Diagnostics) {
    let results: Vec<(ArtifactKind, Option<(Vec<TimestampCandidate>, Diagnostics)>)> =
        thread::scope(|scope| {
            let handles: Vec<_> = kinds
                .iter()
                .map(|kind| {
                    let kind = *kind;
                    let handle = scope.spawn(move || {
                        let mut diagnostics = Diagnostics::new();
                        let candidates = extractor_for(kind)(context, &mut diagnostics);
                        (candidates, diagnostics)
                    });
                    (kind, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(kind, handle)| (kind, handle.join().ok()))
                .collect()
        });

    let mut candidates = Vec::new();
    let mut diagnostics = Diagnostics::new();
    for (kind, result) in results {
        match result {
            Some((entries, sink)) => {
                info!("[wipetrace] {} produced {} timestamps", kind.name(), entries.len());
                candidates.extend(entries);
                diagnostics.merge(sink);
            }
            None => error!("[wipetrace] Extractor for {} panicked", kind.name()),
        }
    }
    (candidates, diagnostics)
}

/// Every file under the searchable roots, without duplicates
pub(crate) fn searchable_files(source: &dyn SourceAccessor, roots: &[String]) -> Vec<String> {
    let mut files = BTreeSet::new();
    for root in roots {
        match source.list(root) {
            Ok(result) => files.extend(result),
            Err(err) => warn!("[wipetrace] Could not list {root}: {err:?}"),
        }
    }
    files.into_iter().collect()
}

/// Default searchable roots as owned strings
pub(crate) fn default_roots() -> Vec<String> {
    SEARCHABLE_ROOTS.iter().map(|root| root.to_string()).collect()
}

/// Build a high confidence candidate from a normalized value
pub(crate) fn new_candidate(
    artifact: ArtifactKind,
    path: &str,
    label: &str,
    time: &NormalizedTime,
    original: &str,
) -> TimestampCandidate {
    TimestampCandidate {
        instant: time.instant,
        artifact,
        path: path.to_string(),
        label: label.to_string(),
        already_local: time.convention.is_local(),
        original: original.to_string(),
        confidence: Confidence::High,
        offset: None,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ExtractContext, default_convention, extract_all, searchable_files, selected_artifacts,
    };
    use crate::{
        decoder::StaticDecoder,
        source::MemorySource,
        structs::toml::Timezone,
        utils::time::ZoneConvention,
    };
    use chrono::DateTime;
    use common::{android::ArtifactKind, diagnostics::DiagnosticKind};

    #[test]
    fn test_convention_override() {
        let source = MemorySource::default();
        let mut timezone = Timezone::default();
        timezone.overrides.insert(
            String::from("recovery_last_log_archive"),
            ZoneConvention::Local,
        );
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        assert_eq!(
            context.convention(ArtifactKind::RecoveryLastLogArchive),
            ZoneConvention::Local
        );
        assert_eq!(
            context.convention(ArtifactKind::RecoveryLastLog),
            ZoneConvention::Local
        );
        assert_eq!(
            default_convention(ArtifactKind::RecoveryLastLogArchive),
            ZoneConvention::Utc
        );
        assert!(context.override_for(ArtifactKind::Dropbox).is_none());
    }

    #[test]
    fn test_selected_artifacts() {
        assert_eq!(selected_artifacts(&None).len(), 18);
        let names = Some(vec![
            String::from("dropbox"),
            String::from("prefetch"),
            String::from("DROPBOX"),
            String::from("tombstones"),
        ]);
        assert_eq!(
            selected_artifacts(&names),
            vec![ArtifactKind::Dropbox, ArtifactKind::Tombstones]
        );
    }

    #[test]
    fn test_extract_all() {
        let mut source = MemorySource::default();
        let modified = DateTime::from_timestamp(1732092131, 0).unwrap();
        source.insert(
            "data/property/persistent_properties",
            b"persist.sys.boot.reason.history\nreboot,factory_reset,1689128778\n",
            modified,
        );
        source.insert("data/misc/bootstat/factory_reset", b"", modified);
        let timezone = Timezone::default();
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        let (candidates, diagnostics) = extract_all(
            &context,
            &[
                ArtifactKind::PersistentProperties,
                ArtifactKind::BootstatFactoryReset,
                ArtifactKind::RecoveryLastLog,
            ],
        );
        assert_eq!(candidates.len(), 2);
        assert!(
            diagnostics
                .entries()
                .iter()
                .any(|entry| entry.artifact == ArtifactKind::RecoveryLastLog
                    && entry.kind == DiagnosticKind::Missing)
        );
    }

    #[test]
    fn test_searchable_files_dedup() {
        let mut source = MemorySource::default();
        let modified = DateTime::from_timestamp(1732092131, 0).unwrap();
        source.insert("data/system/dropbox/event_log@1732092131000.txt", b"", modified);
        source.insert("data/system/users/0/package-restrictions.xml", b"", modified);

        let roots = vec![
            String::from("data/system/"),
            String::from("data/system/dropbox/"),
        ];
        assert_eq!(searchable_files(&source, &roots).len(), 2);
    }
}
