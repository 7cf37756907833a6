use crate::{error::TomlError, structs::toml::WipetraceToml};
use log::error;
use std::str::from_utf8;

impl WipetraceToml {
    /// Parse the wipetrace TOML config
    pub fn parse_wipetrace_toml(toml_data: &[u8]) -> Result<WipetraceToml, TomlError> {
        let toml_results = toml::from_str(from_utf8(toml_data).unwrap_or_default());
        let mut config: WipetraceToml = match toml_results {
            Ok(results) => results,
            Err(err) => {
                error!("[wipetrace] Failed to parse TOML data. Error: {err:?}");
                return Err(TomlError::BadToml);
            }
        };

        // Format is always lowercase
        config.output.format = config.output.format.to_lowercase();
        if config.output.format != "json" && config.output.format != "jsonl" {
            error!(
                "[wipetrace] Unsupported output format {}",
                config.output.format
            );
            return Err(TomlError::BadToml);
        }
        if !config.source.prefix.is_empty() && !config.source.prefix.ends_with('/') {
            config.source.prefix.push('/');
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use crate::structs::toml::{SourceKind, WipetraceToml};
    use crate::utils::time::ZoneConvention;
    use std::{fs::read, path::PathBuf};

    #[test]
    fn test_parse_wipetrace_toml() {
        let mut test_location = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        test_location.push("tests/test_data/config/full.toml");

        let buffer = read(test_location).unwrap();
        let result = WipetraceToml::parse_wipetrace_toml(&buffer).unwrap();
        assert_eq!(result.source.kind, SourceKind::Zip);
        assert_eq!(result.source.path, "./evidence/SM-G991N.zip");
        assert_eq!(result.source.prefix, "Dump/");
        assert_eq!(result.output.name, "reset_case");
        assert_eq!(result.output.format, "jsonl");
        assert_eq!(result.output.compress, true);
        assert_eq!(result.timezone.device_offset, 540);
        assert_eq!(
            result.timezone.overrides.get("recovery_last_log_archive"),
            Some(&ZoneConvention::Local)
        );
        assert_eq!(result.decoder.program, "/opt/android/abx2xml");
        assert_eq!(result.deep_search.tolerance, 120);
        assert_eq!(result.artifacts.unwrap().len(), 3);
    }

    #[test]
    fn test_parse_wipetrace_toml_defaults() {
        let test = br#"
[source]
kind = "adb"

[output]
name = "live"
directory = "./tmp"
format = "JSON"
"#;
        let result = WipetraceToml::parse_wipetrace_toml(test).unwrap();
        assert_eq!(result.source.kind, SourceKind::Adb);
        assert_eq!(result.source.adb, "adb");
        assert_eq!(result.source.timeout, 30);
        assert_eq!(result.output.format, "json");
        assert_eq!(result.output.compress, false);
        assert_eq!(result.timezone.device_offset, 0);
        assert_eq!(result.decoder.program, "abx2xml");
        assert_eq!(result.decoder.args, vec!["{input}", "-"]);
        assert_eq!(result.deep_search.enabled, true);
        assert_eq!(result.deep_search.tolerance, 300);
        assert_eq!(result.deep_search.max_size, 52428800);
        assert!(result.artifacts.is_none());
    }

    #[test]
    #[should_panic(expected = "BadToml")]
    fn test_parse_wipetrace_bad_toml() {
        let test = b"[source]\nkind = \"sdcard\"\n";
        WipetraceToml::parse_wipetrace_toml(test).unwrap();
    }

    #[test]
    #[should_panic(expected = "BadToml")]
    fn test_parse_wipetrace_bad_format() {
        let test = br#"
[source]
kind = "folder"
path = "./dump"

[output]
name = "case"
directory = "./tmp"
format = "csv"
"#;
        WipetraceToml::parse_wipetrace_toml(test).unwrap();
    }
}
