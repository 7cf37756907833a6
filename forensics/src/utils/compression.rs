use super::error::UtilError;
use flate2::{Compression, write::GzEncoder};
use log::error;
use std::io::Write;

/// Compress provided bytes with GZIP
pub(crate) fn compress_gzip_bytes(data: &[u8]) -> Result<Vec<u8>, UtilError> {
    let mut gz = GzEncoder::new(Vec::new(), Compression::default());
    if let Err(err) = gz.write_all(data) {
        error!("[compression] Could not gzip compress data: {err:?}");
        return Err(UtilError::GzipFinish);
    }

    match gz.finish() {
        Ok(results) => Ok(results),
        Err(err) => {
            error!("[compression] Could not finish gzip compressing data: {err:?}");
            Err(UtilError::GzipFinish)
        }
    }
}
