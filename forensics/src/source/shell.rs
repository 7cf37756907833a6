use super::{SourceAccessor, error::SourceError, prefix_matches, static_base};
use crate::utils::time::{NormalizedTime, ZoneConvention};
use chrono::DateTime;
use log::{error, warn};
use std::{
    io::Read,
    process::{Command, ExitStatus, Stdio},
    thread::{sleep, spawn},
    time::{Duration, Instant},
};

/// Live device reached through `adb`. Every access runs one command and is bounded by `timeout`
pub struct ShellSource {
    program: String,
    serial: Option<String>,
    timeout: Duration,
}

impl ShellSource {
    pub fn new(program: &str, serial: Option<String>, timeout: Duration) -> ShellSource {
        ShellSource {
            program: program.to_string(),
            serial,
            timeout,
        }
    }

    /// Run adb with `args`. Returns the exit status and everything written to stdout
    fn run(&self, args: &[&str]) -> Result<(ExitStatus, Vec<u8>), SourceError> {
        let mut command = Command::new(&self.program);
        if let Some(serial) = &self.serial {
            command.args(["-s", serial]);
        }
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        let mut child = match command.spawn() {
            Ok(result) => result,
            Err(err) => {
                error!("[source] Failed to execute {}: {err:?}", self.program);
                return Err(SourceError::SourceUnavailable);
            }
        };

        // Drain stdout on another thread so a full pipe never blocks the child
        let mut stdout = match child.stdout.take() {
            Some(result) => result,
            None => return Err(SourceError::SourceUnavailable),
        };
        let reader = spawn(move || {
            let mut data = Vec::new();
            let _ = stdout.read_to_end(&mut data);
            data
        });

        let start = Instant::now();
        let poll = Duration::from_millis(25);
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if start.elapsed() > self.timeout {
                        warn!("[source] adb {args:?} timed out after {:?}", self.timeout);
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(SourceError::Timeout);
                    }
                    sleep(poll);
                }
                Err(err) => {
                    error!("[source] Failed to wait for adb {args:?}: {err:?}");
                    let _ = child.kill();
                    return Err(SourceError::SourceUnavailable);
                }
            }
        };

        match reader.join() {
            Ok(data) => Ok((status, data)),
            Err(_err) => {
                error!("[source] Failed to collect adb output for {args:?}");
                Err(SourceError::ReadFile)
            }
        }
    }

    /// Run a shell command on the device and return stdout as text
    fn shell(&self, script: &str) -> Result<(ExitStatus, String), SourceError> {
        let (status, output) = self.run(&["shell", script])?;
        Ok((status, String::from_utf8_lossy(&output).to_string()))
    }

    fn stat(&self, path: &str, format: &str) -> Result<i64, SourceError> {
        let (status, output) =
            self.shell(&format!("stat -c {format} {}", quote(&device_path(path))))?;
        if !status.success() {
            return Err(SourceError::NotFound);
        }
        match output.trim().parse::<i64>() {
            Ok(result) => Ok(result),
            Err(err) => {
                warn!("[source] Unexpected stat output for {path}: {err:?}");
                Err(SourceError::Metadata)
            }
        }
    }
}

/// Absolute path on the device for a logical path
fn device_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

/// Single quote a value for the device shell
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

impl SourceAccessor for ShellSource {
    fn exists(&self, path: &str) -> bool {
        let script = format!("test -f {} && echo found", quote(&device_path(path)));
        match self.shell(&script) {
            Ok((_, output)) => output.trim() == "found",
            Err(_err) => false,
        }
    }

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        let target = device_path(path);
        let (status, data) = self.run(&["exec-out", "cat", &target])?;
        if !status.success() {
            return Err(SourceError::NotFound);
        }
        Ok(data)
    }

    /// `stat` reports seconds since the epoch so the value is true UTC
    fn mod_time(&self, path: &str) -> Result<NormalizedTime, SourceError> {
        let seconds = self.stat(path, "%Y")?;
        match DateTime::from_timestamp(seconds, 0) {
            Some(instant) => Ok(NormalizedTime {
                instant,
                convention: ZoneConvention::Utc,
            }),
            None => Err(SourceError::Metadata),
        }
    }

    fn size(&self, path: &str) -> Result<u64, SourceError> {
        Ok(self.stat(path, "%s")?.max(0) as u64)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, SourceError> {
        let base = device_path(&static_base(prefix));
        let (_, output) = self.shell(&format!("find {} -type f 2>/dev/null", quote(&base)))?;

        let mut files: Vec<String> = output
            .lines()
            .map(|line| line.trim().trim_start_matches('/').to_string())
            .filter(|line| !line.is_empty() && prefix_matches(prefix, line))
            .collect();
        files.sort();
        Ok(files)
    }
}
