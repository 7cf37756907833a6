use super::finish;
use crate::{output::error::OutputError, structs::toml::Output};
use common::report::AnalysisReport;
use log::{error, info};

/// Output the whole report as one `json` document
pub(crate) fn json_format(report: &AnalysisReport, output: &Output) -> Result<String, OutputError> {
    let data = match serde_json::to_vec(report) {
        Ok(result) => result,
        Err(err) => {
            error!("[output] Failed to serialize report: {err:?}");
            return Err(OutputError::Serialize);
        }
    };

    let path = finish(&data, output, &report.metadata.uuid, "json")?;
    info!("[output] json output written to {path}");
    Ok(path)
}
