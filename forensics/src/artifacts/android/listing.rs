use crate::{artifacts::collection::searchable_files, source::SourceAccessor};
use common::search::FileRecord;
use log::debug;

/// Path fragments that point at reset, setup or boot activity
const RESET_KEYWORDS: [&str; 8] = [
    "factory", "reset", "wipe", "setup", "boot", "recovery", "first", "initial",
];

/// Size and modification time of every reset related file below `roots`
pub(crate) fn reset_related_files(
    source: &dyn SourceAccessor,
    roots: &[String],
) -> Vec<FileRecord> {
    let mut records = Vec::new();
    for path in searchable_files(source, roots) {
        if !is_reset_related(&path) {
            continue;
        }

        let size = match source.size(&path) {
            Ok(result) => result,
            Err(err) => {
                debug!("[listing] Could not get size for {path}: {err:?}");
                0
            }
        };
        let modified = source.mod_time(&path).ok().map(|time| time.instant);
        records.push(FileRecord {
            path,
            size,
            modified,
            factory_reset_related: true,
        });
    }
    records
}

pub(crate) fn is_reset_related(path: &str) -> bool {
    let lower = path.to_lowercase();
    RESET_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::{is_reset_related, reset_related_files};
    use crate::{artifacts::collection::default_roots, source::MemorySource};
    use chrono::DateTime;

    #[test]
    fn test_is_reset_related() {
        assert!(is_reset_related("data/misc/bootstat/factory_reset"));
        assert!(is_reset_related("cache/recovery/last_log"));
        assert!(is_reset_related(
            "data/data/com.google.android.setupwizard/shared_prefs/SetupWizardPrefs.xml"
        ));
        assert!(!is_reset_related("data/system/dropbox/system_server_wtf@1732092131000.txt"));
    }

    #[test]
    fn test_reset_related_files() {
        let mut source = MemorySource::default();
        let modified = DateTime::from_timestamp(1732092131, 0).unwrap();
        source.insert("data/misc/bootstat/factory_reset", b"", modified);
        source.insert("data/system/packages.xml", b"<packages />", modified);
        source.insert("data/system/users/0/initial_settings.xml", b"<map />", modified);
        // Outside the searchable roots
        source.insert("sdcard/factory_reset_notes.txt", b"notes", modified);

        let records = reset_related_files(&source, &default_roots());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].path, "data/misc/bootstat/factory_reset");
        assert_eq!(records[0].modified, Some(modified));
        assert_eq!(records[1].path, "data/system/users/0/initial_settings.xml");
        assert_eq!(records[1].size, 7);
    }
}
