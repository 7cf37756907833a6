use super::{MAX_READ_SIZE, SourceAccessor, error::SourceError, prefix_matches};
use crate::utils::time::{NormalizedTime, ZoneConvention};
use chrono::NaiveDate;
use log::{error, warn};
use std::{
    fs::File,
    io::Read,
    sync::{Mutex, MutexGuard},
};
use zip::{ZipArchive, result::ZipError};

/// Zip archive of a device dump. Entries live below `prefix`, ex: `Dump/data/misc/bootstat/factory_reset`
pub struct ArchiveSource {
    archive: Mutex<ZipArchive<File>>,
    prefix: String,
    /// Logical paths of every file entry
    files: Vec<String>,
}

impl ArchiveSource {
    pub fn open(path: &str, prefix: &str) -> Result<ArchiveSource, SourceError> {
        let reader = match File::open(path) {
            Ok(result) => result,
            Err(err) => {
                error!("[source] Failed to open archive {path}: {err:?}");
                return Err(SourceError::SourceUnavailable);
            }
        };
        let archive = match ZipArchive::new(reader) {
            Ok(result) => result,
            Err(err) => {
                error!("[source] Failed to read archive {path}: {err:?}");
                return Err(SourceError::SourceUnavailable);
            }
        };

        let files = archive
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .filter_map(|name| name.strip_prefix(prefix))
            .map(str::to_string)
            .collect();

        Ok(ArchiveSource {
            archive: Mutex::new(archive),
            prefix: prefix.to_string(),
            files,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, ZipArchive<File>>, SourceError> {
        match self.archive.lock() {
            Ok(result) => Ok(result),
            Err(err) => {
                error!("[source] Archive lock poisoned: {err:?}");
                Err(SourceError::SourceUnavailable)
            }
        }
    }
}

fn entry_error(path: &str, err: ZipError) -> SourceError {
    if let ZipError::FileNotFound = err {
        return SourceError::NotFound;
    }
    warn!("[source] Failed to open archive entry {path}: {err:?}");
    SourceError::ReadFile
}

impl SourceAccessor for ArchiveSource {
    fn exists(&self, path: &str) -> bool {
        self.files.iter().any(|name| name == path)
    }

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        let mut archive = self.lock()?;
        let mut entry = match archive.by_name(&format!("{}{path}", self.prefix)) {
            Ok(result) => result,
            Err(err) => return Err(entry_error(path, err)),
        };
        if entry.size() > MAX_READ_SIZE {
            return Err(SourceError::LargeFile);
        }

        let mut data = Vec::with_capacity(entry.size() as usize);
        if let Err(err) = entry.read_to_end(&mut data) {
            error!("[source] Failed to decompress archive entry {path}: {err:?}");
            return Err(SourceError::ReadFile);
        }
        Ok(data)
    }

    /// Zip entries store DOS time which is the device civil time
    fn mod_time(&self, path: &str) -> Result<NormalizedTime, SourceError> {
        let mut archive = self.lock()?;
        let entry = match archive.by_name(&format!("{}{path}", self.prefix)) {
            Ok(result) => result,
            Err(err) => return Err(entry_error(path, err)),
        };
        let dos_time = match entry.last_modified() {
            Some(result) => result,
            None => return Err(SourceError::Metadata),
        };

        let instant = NaiveDate::from_ymd_opt(
            dos_time.year() as i32,
            dos_time.month() as u32,
            dos_time.day() as u32,
        )
        .and_then(|date| {
            date.and_hms_opt(
                dos_time.hour() as u32,
                dos_time.minute() as u32,
                dos_time.second() as u32,
            )
        });
        match instant {
            Some(result) => Ok(NormalizedTime {
                instant: result.and_utc(),
                convention: ZoneConvention::Local,
            }),
            None => {
                warn!("[source] Archive entry {path} has an invalid DOS time");
                Err(SourceError::Metadata)
            }
        }
    }

    fn size(&self, path: &str) -> Result<u64, SourceError> {
        let mut archive = self.lock()?;
        let size = match archive.by_name(&format!("{}{path}", self.prefix)) {
            Ok(entry) => entry.size(),
            Err(err) => return Err(entry_error(path, err)),
        };
        Ok(size)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, SourceError> {
        Ok(self
            .files
            .iter()
            .filter(|name| prefix_matches(prefix, name))
            .cloned()
            .collect())
    }
}
