pub(crate) mod error;
mod formats;
mod local;

use crate::structs::toml::Output;
use common::report::AnalysisReport;
use error::OutputError;
use formats::{json::json_format, jsonl::jsonl_format};
use log::error;

/// Write the report in the configured format. Returns the written file path
pub(crate) fn write_report(
    report: &AnalysisReport,
    output: &Output,
) -> Result<String, OutputError> {
    match output.format.to_lowercase().as_str() {
        "json" => json_format(report, output),
        "jsonl" => jsonl_format(report, output),
        _ => {
            error!("[output] Unknown output format {}", output.format);
            Err(OutputError::UnknownFormat)
        }
    }
}
