mod archive;
pub mod error;
mod folder;
mod memory;
mod shell;

pub use archive::ArchiveSource;
pub use folder::FolderSource;
pub use memory::MemorySource;
pub use shell::ShellSource;

use crate::{
    structs::toml::{Source, SourceKind},
    utils::{strings::decode_text, time::NormalizedTime},
};
use error::SourceError;
use glob::{MatchOptions, Pattern};
use log::error;
use std::{sync::Arc, time::Duration};

/// Default read limit of 2GB
pub const MAX_READ_SIZE: u64 = 2147483648;

/// Access to a device filesystem snapshot by logical path, ex: `data/misc/bootstat/factory_reset`
pub trait SourceAccessor: Send + Sync {
    fn exists(&self, path: &str) -> bool;
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, SourceError>;
    /// Modification time and whether the backend reports it in UTC or device local time
    fn mod_time(&self, path: &str) -> Result<NormalizedTime, SourceError>;
    fn size(&self, path: &str) -> Result<u64, SourceError>;
    /// Every file below `prefix`. The prefix may contain `*` wildcards, ex: `data/data/*/shared_prefs/`
    fn list(&self, prefix: &str) -> Result<Vec<String>, SourceError>;

    /// Read a file and decode it as text
    fn read_text(&self, path: &str) -> Result<String, SourceError> {
        let bytes = self.read_bytes(path)?;
        match decode_text(&bytes) {
            Some(result) => Ok(result),
            None => Err(SourceError::Decode),
        }
    }
}

/// Open the source described by the TOML config
pub fn open_source(config: &Source) -> Result<Arc<dyn SourceAccessor>, SourceError> {
    let source: Arc<dyn SourceAccessor> = match config.kind {
        SourceKind::Zip => Arc::new(ArchiveSource::open(&config.path, &config.prefix)?),
        SourceKind::Folder => Arc::new(FolderSource::open(&config.path)?),
        SourceKind::Adb => Arc::new(ShellSource::new(
            &config.adb,
            config.serial.clone(),
            Duration::from_secs(config.timeout),
        )),
    };
    Ok(source)
}

/// Check if a logical file path sits below `prefix`
pub(crate) fn prefix_matches(prefix: &str, path: &str) -> bool {
    if !prefix.contains('*') {
        return path.starts_with(prefix);
    }

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    let prefix_segments: Vec<&str> = prefix.trim_end_matches('/').split('/').collect();
    let path_segments: Vec<&str> = path.split('/').collect();

    // A directory prefix needs at least one more segment for the file name
    let needed = if prefix.ends_with('/') {
        prefix_segments.len() + 1
    } else {
        prefix_segments.len()
    };
    if path_segments.len() < needed {
        return false;
    }

    for (pattern, segment) in prefix_segments.iter().zip(path_segments.iter()) {
        let compiled = match Pattern::new(pattern) {
            Ok(result) => result,
            Err(err) => {
                error!("[source] Bad wildcard prefix {prefix}: {err:?}");
                return false;
            }
        };
        if !compiled.matches_with(segment, options) {
            return false;
        }
    }
    true
}

/// Portion of a prefix before the first wildcard segment
pub(crate) fn static_base(prefix: &str) -> String {
    let mut base = Vec::new();
    for segment in prefix.split('/') {
        if segment.contains('*') {
            break;
        }
        base.push(segment);
    }
    base.join("/")
}

#[cfg(test)]
mod tests {
    use super::{MemorySource, SourceAccessor, prefix_matches, static_base};
    use crate::source::error::SourceError;
    use chrono::DateTime;

    #[test]
    fn test_prefix_matches() {
        assert!(prefix_matches("data/system/", "data/system/users/0/package-restrictions.xml"));
        assert!(!prefix_matches("data/system/", "data/system_de/0/accounts_de.db"));
        assert!(prefix_matches(
            "data/data/*/shared_prefs/",
            "data/data/com.google.android.setupwizard/shared_prefs/SetupWizardPrefs.xml"
        ));
        assert!(!prefix_matches(
            "data/data/*/shared_prefs/",
            "data/data/com.google.android.setupwizard/databases/a.db"
        ));
        assert!(!prefix_matches("data/data/*/shared_prefs/", "data/data/x/shared_prefs"));
    }

    #[test]
    fn test_static_base() {
        assert_eq!(static_base("data/data/*/databases/"), "data/data");
        assert_eq!(static_base("cache/recovery/"), "cache/recovery/");
    }

    #[test]
    fn test_read_text_default() {
        let mut source = MemorySource::default();
        let modified = DateTime::from_timestamp(1700000000, 0).unwrap();
        source.insert("cache/recovery/last_log", b"\xef\xbb\xbfStarting recovery", modified);

        assert_eq!(
            source.read_text("cache/recovery/last_log").unwrap(),
            "Starting recovery"
        );
        assert_eq!(
            source.read_text("cache/recovery/last_log.1"),
            Err(SourceError::NotFound)
        );
    }
}
