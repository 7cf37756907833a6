use super::{error::UtilError, uuid::generate_uuid};
use log::{error, warn};
use std::{
    fs::{remove_file, write},
    path::{Path, PathBuf},
};

/// Copy of artifact bytes on local disk for tools that need a real file
pub(crate) struct TempFile {
    path: PathBuf,
}

impl TempFile {
    /// Write `data` to `<temp_dir>/<uuid>.<extension>`
    pub(crate) fn create(data: &[u8], extension: &str) -> Result<TempFile, UtilError> {
        let path = std::env::temp_dir().join(format!("{}.{extension}", generate_uuid()));
        if let Err(err) = write(&path, data) {
            error!(
                "[wipetrace] Could not write temporary file {}: {err:?}",
                path.display()
            );
            return Err(UtilError::TempFile);
        }
        Ok(TempFile { path })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if let Err(err) = remove_file(&self.path) {
            warn!(
                "[wipetrace] Could not remove temporary file {}: {err:?}",
                self.path.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TempFile;
    use std::fs::read;

    #[test]
    fn test_temp_file_removed() {
        let path = {
            let temp = TempFile::create(b"ABX\0", "abx").unwrap();
            assert_eq!(read(temp.path()).unwrap(), b"ABX\0");
            assert!(temp.path().display().to_string().ends_with(".abx"));
            temp.path().to_path_buf()
        };
        assert!(!path.exists());
    }
}
