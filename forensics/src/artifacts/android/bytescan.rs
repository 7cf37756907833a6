use crate::{
    artifacts::{
        collection::{ExtractContext, default_roots, new_candidate, searchable_files},
        diagnostics::Diagnostics,
    },
    utils::{
        nom_helper::{Endian, aligned_words},
        time::{RawTime, ZoneConvention, normalize},
    },
};
use common::android::{ArtifactKind, Confidence, TimestampCandidate};
use log::{debug, warn};

const BINARY_EXTENSIONS: [&str; 5] = [".db", ".dat", ".bin", ".so", ".apk"];

/// Epoch seconds between mid 2017 and early 2027
const MIN_EPOCH: u32 = 1_500_000_000;
const MAX_EPOCH: u32 = 1_800_000_000;

/// Hits kept per file. Dense tables can match thousands of times
const MAX_HITS: usize = 256;
/// Larger files are skipped
const SCAN_LIMIT: u64 = 256 * 1024 * 1024;

/// Plausible little endian epoch values at aligned offsets in binary files
pub(crate) fn binary_scan(
    context: &ExtractContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<TimestampCandidate> {
    let kind = ArtifactKind::BinaryScan;
    let files: Vec<String> = searchable_files(context.source, &default_roots())
        .into_iter()
        .filter(|path| is_binary_file(path))
        .collect();
    if files.is_empty() {
        diagnostics.missing(kind, &BINARY_EXTENSIONS.join("|"));
        return Vec::new();
    }

    let hint = context.convention(kind);
    let mut candidates = Vec::new();
    for path in files {
        if let Ok(size) = context.source.size(&path) {
            if size > SCAN_LIMIT {
                debug!("[bytescan] Skipping {path}, {size} bytes");
                continue;
            }
        }
        let data = match context.read(kind, &path, diagnostics) {
            Some(result) => result,
            None => continue,
        };
        candidates.append(&mut scan_bytes(&data, &path, hint));
    }
    candidates
}

pub(crate) fn is_binary_file(path: &str) -> bool {
    let lower = path.to_lowercase();
    BINARY_EXTENSIONS
        .iter()
        .any(|extension| lower.ends_with(extension))
}

pub(crate) fn scan_bytes(data: &[u8], path: &str, hint: ZoneConvention) -> Vec<TimestampCandidate> {
    let mut candidates = Vec::new();
    for (offset, value) in aligned_words(data, Endian::Le) {
        if value <= MIN_EPOCH || value >= MAX_EPOCH {
            continue;
        }
        if candidates.len() == MAX_HITS {
            warn!("[bytescan] Keeping the first {MAX_HITS} epoch like values in {path}");
            break;
        }

        let time = match normalize(&RawTime::Integer(value as i64), hint) {
            Ok(result) => result,
            Err(_err) => continue,
        };
        let mut candidate = new_candidate(
            ArtifactKind::BinaryScan,
            path,
            "binary epoch value",
            &time,
            &value.to_string(),
        );
        candidate.confidence = Confidence::Low;
        candidate.offset = Some(offset as u64);
        candidates.push(candidate);
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::{binary_scan, scan_bytes};
    use crate::{
        artifacts::{collection::ExtractContext, diagnostics::Diagnostics},
        decoder::StaticDecoder,
        source::MemorySource,
        structs::toml::Timezone,
        utils::time::ZoneConvention,
    };
    use chrono::DateTime;
    use common::{
        android::{ArtifactKind, Confidence},
        diagnostics::DiagnosticKind,
    };

    #[test]
    fn test_scan_bytes() {
        let mut data = vec![0u8; 16];
        data[4..8].copy_from_slice(&1700000000u32.to_le_bytes());
        // Unaligned value is ignored
        data[9..13].copy_from_slice(&1700000000u32.to_le_bytes());

        let results = scan_bytes(&data, "data/system/sync/accounts.db", ZoneConvention::Utc);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].offset, Some(4));
        assert_eq!(results[0].confidence, Confidence::Low);
        assert_eq!(results[0].original, "1700000000");
        assert_eq!(
            results[0].instant,
            DateTime::from_timestamp(1700000000, 0).unwrap()
        );
    }

    #[test]
    fn test_scan_bytes_cap() {
        let data: Vec<u8> = (0..300)
            .flat_map(|_| 1700000000u32.to_le_bytes())
            .collect();
        let results = scan_bytes(&data, "data/misc/wifi/blob.bin", ZoneConvention::Utc);
        assert_eq!(results.len(), 256);
    }

    #[test]
    fn test_binary_scan() {
        let mut source = MemorySource::default();
        let modified = DateTime::from_timestamp(1732092131, 0).unwrap();
        source.insert(
            "data/data/com.android.providers.settings/databases/settings.db",
            &1732092131u32.to_le_bytes(),
            modified,
        );
        source.insert(
            "data/data/com.android.providers.settings/databases/settings.xml",
            &1732092131u32.to_le_bytes(),
            modified,
        );
        let timezone = Timezone::default();
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        let mut diagnostics = Diagnostics::new();
        let results = binary_scan(&context, &mut diagnostics);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].artifact, ArtifactKind::BinaryScan);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_binary_scan_no_files() {
        let source = MemorySource::default();
        let timezone = Timezone::default();
        let context = ExtractContext {
            source: &source,
            decoder: &StaticDecoder(None),
            timezone: &timezone,
        };

        let mut diagnostics = Diagnostics::new();
        assert!(binary_scan(&context, &mut diagnostics).is_empty());
        assert_eq!(diagnostics.entries()[0].kind, DiagnosticKind::Missing);
    }
}
