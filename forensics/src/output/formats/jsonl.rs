use super::finish;
use crate::{output::error::OutputError, structs::toml::Output};
use common::report::AnalysisReport;
use log::{error, info};
use serde::Serialize;
use serde_json::{Value, json};

/// Output the report as `jsonl`. Every line is `{"section": <name>, "data": <entry>}`
pub(crate) fn jsonl_format(
    report: &AnalysisReport,
    output: &Output,
) -> Result<String, OutputError> {
    let mut lines = vec![
        section_line("metadata", &report.metadata)?,
        section_line("consistency", &report.consistency)?,
        section_line("summary", &report.summary)?,
        section_line("correlation", &report.correlation)?,
    ];
    for entry in &report.candidates {
        lines.push(section_line("candidates", entry)?);
    }
    for entry in &report.diagnostics {
        lines.push(section_line("diagnostics", entry)?);
    }
    for entry in &report.files {
        lines.push(section_line("files", entry)?);
    }
    for entry in &report.patterns {
        lines.push(section_line("patterns", entry)?);
    }
    for entry in &report.deep_search {
        lines.push(section_line("deep_search", entry)?);
    }

    let mut data = lines.join("\n");
    data.push('\n');
    let path = finish(data.as_bytes(), output, &report.metadata.uuid, "jsonl")?;
    info!("[output] jsonl output written to {path}");
    Ok(path)
}

fn section_line<T: Serialize>(section: &str, entry: &T) -> Result<String, OutputError> {
    let value = match serde_json::to_value(entry) {
        Ok(result) => result,
        Err(err) => {
            error!("[output] Failed to serialize {section} entry: {err:?}");
            return Err(OutputError::Serialize);
        }
    };
    let line: Value = json!({
        "section": section,
        "data": value,
    });
    Ok(line.to_string())
}
