use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed catalog of Android artifacts that carry factory reset evidence
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    BootstatFactoryReset,
    BootstatLastBootTime,
    RecoveryLastLog,
    RecoveryLastLogArchive,
    SetupWizardPrefs,
    ProvisioningPrefs,
    PersistentProperties,
    PackageRestrictions,
    AccountsDatabase,
    WellbeingUsage,
    BinaryScan,
    Tombstones,
    Dropbox,
    UsageStats,
    AnrLogs,
    KernelLogs,
    LogcatArchives,
    SettingsDatabase,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 18] = [
        ArtifactKind::BootstatFactoryReset,
        ArtifactKind::BootstatLastBootTime,
        ArtifactKind::RecoveryLastLog,
        ArtifactKind::RecoveryLastLogArchive,
        ArtifactKind::SetupWizardPrefs,
        ArtifactKind::ProvisioningPrefs,
        ArtifactKind::PersistentProperties,
        ArtifactKind::PackageRestrictions,
        ArtifactKind::AccountsDatabase,
        ArtifactKind::WellbeingUsage,
        ArtifactKind::BinaryScan,
        ArtifactKind::Tombstones,
        ArtifactKind::Dropbox,
        ArtifactKind::UsageStats,
        ArtifactKind::AnrLogs,
        ArtifactKind::KernelLogs,
        ArtifactKind::LogcatArchives,
        ArtifactKind::SettingsDatabase,
    ];

    /// Name used in TOML configs and output
    pub fn name(&self) -> &'static str {
        match self {
            ArtifactKind::BootstatFactoryReset => "bootstat_factory_reset",
            ArtifactKind::BootstatLastBootTime => "bootstat_last_boot_time",
            ArtifactKind::RecoveryLastLog => "recovery_last_log",
            ArtifactKind::RecoveryLastLogArchive => "recovery_last_log_archive",
            ArtifactKind::SetupWizardPrefs => "setup_wizard_prefs",
            ArtifactKind::ProvisioningPrefs => "provisioning_prefs",
            ArtifactKind::PersistentProperties => "persistent_properties",
            ArtifactKind::PackageRestrictions => "package_restrictions",
            ArtifactKind::AccountsDatabase => "accounts_database",
            ArtifactKind::WellbeingUsage => "wellbeing_usage",
            ArtifactKind::BinaryScan => "binary_scan",
            ArtifactKind::Tombstones => "tombstones",
            ArtifactKind::Dropbox => "dropbox",
            ArtifactKind::UsageStats => "usage_stats",
            ArtifactKind::AnrLogs => "anr_logs",
            ArtifactKind::KernelLogs => "kernel_logs",
            ArtifactKind::LogcatArchives => "logcat_archives",
            ArtifactKind::SettingsDatabase => "settings_database",
        }
    }

    /// Lookup an artifact by its config name
    pub fn from_name(name: &str) -> Option<ArtifactKind> {
        ArtifactKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name.trim().to_lowercase())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Low,
}

/// A single timestamp recovered from an artifact
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TimestampCandidate {
    /// Canonical instant. When `already_local` is set this holds device civil time
    pub instant: DateTime<Utc>,
    pub artifact: ArtifactKind,
    pub path: String,
    pub label: String,
    pub already_local: bool,
    /// Raw text before normalization
    pub original: String,
    pub confidence: Confidence,
    /// Byte offset for candidates found by scanning binary data
    pub offset: Option<u64>,
}
