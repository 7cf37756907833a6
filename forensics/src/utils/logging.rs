use super::{error::UtilError, uuid::generate_uuid};
use crate::structs::toml::Output;
use log::{LevelFilter, error};
use std::fs::{File, create_dir_all};

/// Create log output file and logging level based on TOML `Output` configuration
pub(crate) fn create_log_file(output: &Output) -> Result<(File, LevelFilter), UtilError> {
    let path = format!("{}/{}", output.directory, output.name);
    let result = create_dir_all(&path);
    match result {
        Ok(_) => {}
        Err(err) => {
            error!(
                "[wipetrace] Failed to create logging output directory for {path}. Error: {err:?}"
            );
            return Err(UtilError::CreateDirectory);
        }
    }

    let output_result = File::create(format!("{path}/{}.log", generate_uuid()));
    let log_file = match output_result {
        Ok(result) => result,
        Err(err) => {
            error!("[wipetrace] Failed to create log file at {path}. Error: {err:?}");
            return Err(UtilError::LogFile);
        }
    };

    Ok((log_file, log_level(&output.logging)))
}

/// Map the TOML logging string to a level. Defaults to warn
pub(crate) fn log_level(logging: &Option<String>) -> LevelFilter {
    let log_level = match logging {
        Some(result) => result.to_lowercase(),
        None => return LevelFilter::Warn,
    };
    match log_level.as_str() {
        "error" => LevelFilter::Error,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        _ => LevelFilter::Warn,
    }
}
