use crate::utils::time::ZoneConvention;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone)]
pub struct WipetraceToml {
    pub source: Source,
    pub output: Output,
    #[serde(default)]
    pub timezone: Timezone,
    #[serde(default)]
    pub decoder: Decoder,
    #[serde(default)]
    pub deep_search: DeepSearch,
    /**Limit extraction to these artifact names. All artifacts run when not set */
    pub artifacts: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Zip,
    Folder,
    Adb,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Source {
    pub kind: SourceKind,
    /**Archive file or extracted folder. Unused for adb */
    #[serde(default)]
    pub path: String,
    /**Directory inside the archive that holds the device root */
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_adb")]
    pub adb: String,
    pub serial: Option<String>,
    /**Seconds allowed for each remote access */
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Output {
    pub name: String,
    pub directory: String,
    pub format: String,
    #[serde(default)]
    pub compress: bool,
    pub logging: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Timezone {
    /**Device offset from UTC in minutes */
    #[serde(default)]
    pub device_offset: i64,
    /**Artifact name to convention. Replaces the built in convention for that artifact */
    #[serde(default)]
    pub overrides: HashMap<String, ZoneConvention>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Decoder {
    #[serde(default = "default_decoder")]
    pub program: String,
    /**`{input}` is replaced with the temporary file path */
    #[serde(default = "default_decoder_args")]
    pub args: Vec<String>,
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder {
            program: default_decoder(),
            args: default_decoder_args(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeepSearch {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /**Seconds between a file modification time and an anchor that still count as a match */
    #[serde(default = "default_tolerance")]
    pub tolerance: i64,
    /**Files larger than this are only compared by modification time */
    #[serde(default = "default_max_size")]
    pub max_size: u64,
    pub prefixes: Option<Vec<String>>,
}

impl Default for DeepSearch {
    fn default() -> Self {
        DeepSearch {
            enabled: default_enabled(),
            tolerance: default_tolerance(),
            max_size: default_max_size(),
            prefixes: None,
        }
    }
}

fn default_prefix() -> String {
    String::from("Dump/")
}

fn default_adb() -> String {
    String::from("adb")
}

fn default_timeout() -> u64 {
    30
}

fn default_decoder() -> String {
    String::from("abx2xml")
}

fn default_decoder_args() -> Vec<String> {
    vec![String::from("{input}"), String::from("-")]
}

fn default_enabled() -> bool {
    true
}

fn default_tolerance() -> i64 {
    300
}

fn default_max_size() -> u64 {
    50 * 1024 * 1024
}
