use super::{MAX_READ_SIZE, SourceAccessor, error::SourceError, prefix_matches, static_base};
use crate::utils::time::{NormalizedTime, ZoneConvention};
use chrono::{DateTime, Utc};
use log::{error, warn};
use std::{
    fs::{Metadata, metadata, read},
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Device root extracted to a local directory
pub struct FolderSource {
    root: PathBuf,
}

impl FolderSource {
    pub fn open(path: &str) -> Result<FolderSource, SourceError> {
        let root = PathBuf::from(path);
        if !root.is_dir() {
            error!("[source] Folder source {path} is not a directory");
            return Err(SourceError::SourceUnavailable);
        }
        Ok(FolderSource { root })
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    fn file_metadata(&self, path: &str) -> Result<Metadata, SourceError> {
        let full_path = self.full_path(path);
        match metadata(&full_path) {
            Ok(result) if result.is_file() => Ok(result),
            Ok(_) => Err(SourceError::NotFound),
            Err(err) => {
                if err.kind() == std::io::ErrorKind::NotFound {
                    return Err(SourceError::NotFound);
                }
                warn!(
                    "[source] Failed to get metadata for {}: {err:?}",
                    full_path.display()
                );
                Err(SourceError::Metadata)
            }
        }
    }

    /// Logical path with forward slashes for a file below the root
    fn logical_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let segments: Vec<String> = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy().to_string())
            .collect();
        Some(segments.join("/"))
    }
}

impl SourceAccessor for FolderSource {
    fn exists(&self, path: &str) -> bool {
        self.full_path(path).is_file()
    }

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        let info = self.file_metadata(path)?;
        if info.len() > MAX_READ_SIZE {
            return Err(SourceError::LargeFile);
        }

        match read(self.full_path(path)) {
            Ok(result) => Ok(result),
            Err(err) => {
                error!("[source] Failed to read file {path}: {err:?}");
                Err(SourceError::ReadFile)
            }
        }
    }

    /// Filesystem timestamps are true UTC
    fn mod_time(&self, path: &str) -> Result<NormalizedTime, SourceError> {
        let info = self.file_metadata(path)?;
        match info.modified() {
            Ok(result) => Ok(NormalizedTime {
                instant: DateTime::<Utc>::from(result),
                convention: ZoneConvention::Utc,
            }),
            Err(err) => {
                warn!("[source] No modification time for {path}: {err:?}");
                Err(SourceError::Metadata)
            }
        }
    }

    fn size(&self, path: &str) -> Result<u64, SourceError> {
        Ok(self.file_metadata(path)?.len())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, SourceError> {
        let base = self.full_path(&static_base(prefix));
        if !base.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry_result in WalkDir::new(&base).follow_links(false) {
            let entry = match entry_result {
                Ok(result) => result,
                Err(err) => {
                    warn!("[source] Failed to walk {}: {err:?}", base.display());
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(path) = self.logical_path(entry.path()) {
                if prefix_matches(prefix, &path) {
                    files.push(path);
                }
            }
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::FolderSource;
    use crate::{
        source::{SourceAccessor, error::SourceError},
        utils::time::ZoneConvention,
    };
    use std::fs::{create_dir_all, remove_dir_all, write};

    #[test]
    fn test_folder_source() {
        let root = std::env::temp_dir().join("wipetrace_folder_test");
        let prefs = root.join("data/data/com.google.android.setupwizard/shared_prefs");
        create_dir_all(&prefs).unwrap();
        create_dir_all(root.join("cache/recovery")).unwrap();
        write(prefs.join("SetupWizardPrefs.xml"), "<map />").unwrap();
        write(root.join("cache/recovery/last_log"), "Starting recovery").unwrap();

        let source = FolderSource::open(&root.display().to_string()).unwrap();
        assert!(source.exists("cache/recovery/last_log"));
        assert!(!source.exists("cache/recovery"));
        assert_eq!(source.size("cache/recovery/last_log").unwrap(), 17);
        assert_eq!(
            source.read_bytes("cache/recovery"),
            Err(SourceError::NotFound)
        );
        assert_eq!(
            source.mod_time("cache/recovery/last_log").unwrap().convention,
            ZoneConvention::Utc
        );

        let files = source.list("data/data/*/shared_prefs/").unwrap();
        assert_eq!(
            files,
            vec!["data/data/com.google.android.setupwizard/shared_prefs/SetupWizardPrefs.xml"]
        );
        assert_eq!(source.list("data/anr/").unwrap().len(), 0);
        assert_eq!(source.list("").unwrap().len(), 2);

        let _ = remove_dir_all(root);
    }

    #[test]
    fn test_folder_missing() {
        assert!(FolderSource::open("/does/not/exist").is_err());
    }
}
