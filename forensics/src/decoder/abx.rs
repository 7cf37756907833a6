use super::{PreferenceDecoder, error::DecoderError};
use crate::{structs::toml::Decoder, utils::temp::TempFile};
use log::{error, warn};
use std::process::Command;

/// Runs an external ABX to XML converter. The blob is written to a temporary file and the XML is read from stdout
pub struct Abx2XmlDecoder {
    program: String,
    args: Vec<String>,
}

impl Abx2XmlDecoder {
    pub fn new(config: &Decoder) -> Abx2XmlDecoder {
        Abx2XmlDecoder {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }
}

impl PreferenceDecoder for Abx2XmlDecoder {
    fn decode(&self, data: &[u8]) -> Result<String, DecoderError> {
        let temp = match TempFile::create(data, "abx") {
            Ok(result) => result,
            Err(err) => {
                error!("[decoder] Could not stage ABX data: {err:?}");
                return Err(DecoderError::TempFile);
            }
        };
        let input = temp.path().display().to_string();
        let args: Vec<String> = self
            .args
            .iter()
            .map(|arg| arg.replace("{input}", &input))
            .collect();

        let output = match Command::new(&self.program).args(&args).output() {
            Ok(result) => result,
            Err(err) => {
                warn!("[decoder] Could not execute {}: {err:?}", self.program);
                return Err(DecoderError::Spawn);
            }
        };
        if !output.status.success() {
            warn!(
                "[decoder] {} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Err(DecoderError::ExitStatus);
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        if text.trim().is_empty() {
            return Err(DecoderError::EmptyOutput);
        }
        Ok(text)
    }
}
