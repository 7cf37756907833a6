use super::error::OutputError;
use crate::structs::toml::Output;
use log::error;
use std::{
    fs::{File, create_dir_all},
    io::Write,
};

/// Write report bytes to `<directory>/<name>/<uuid>.<extension>`. Returns the file path
pub(crate) fn local_output(
    data: &[u8],
    output: &Output,
    uuid: &str,
    extension: &str,
) -> Result<String, OutputError> {
    let output_path = format!("{}/{}", output.directory, output.name);

    let result = create_dir_all(&output_path);
    match result {
        Ok(_) => {}
        Err(err) => {
            error!("[output] Failed to create output directory for {output_path}. Error: {err:?}");
            return Err(OutputError::CreateDirectory);
        }
    }

    let file_path = format!("{output_path}/{uuid}.{extension}");
    let mut report_file = match File::create(&file_path) {
        Ok(results) => results,
        Err(err) => {
            error!("[output] Failed to create output file {file_path}. Error: {err:?}");
            return Err(OutputError::CreateFile);
        }
    };

    let write_result = report_file.write_all(data);
    match write_result {
        Ok(_) => {}
        Err(err) => {
            error!("[output] Failed to write output to file {file_path}. Error: {err:?}");
            return Err(OutputError::WriteFile);
        }
    }
    Ok(file_path)
}
