//! Load a converted script into SQL Server through the container runtime.
//!
//! Two processes run in order:
//! 1. `docker cp <file> <container>:/tmp/<name>` places the script in the container
//! 2. `docker exec -i <container> sqlcmd ... -i /tmp/<name>` runs it
//!
//! Neither step is retried and neither has a timeout.

use crate::config::ImportConfig;
use crate::error::{MigrateError, Result};
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

const REDACTED: &str = "********";

pub struct ImportRunner {
    config: ImportConfig,
}

impl ImportRunner {
    pub fn new(config: ImportConfig) -> Self {
        Self { config }
    }

    /// Path the script is copied to inside the container
    pub fn remote_path(&self, file: &Path) -> String {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.to_string_lossy().into_owned());
        format!("{}/{}", self.config.remote_dir.trim_end_matches('/'), name)
    }

    /// Runtime arguments for copying the script into the container
    pub fn copy_args(&self, file: &Path) -> Vec<String> {
        vec![
            "cp".to_string(),
            file.to_string_lossy().into_owned(),
            format!("{}:{}", self.config.container_name, self.remote_path(file)),
        ]
    }

    /// Runtime arguments for running sqlcmd against the copied script
    pub fn exec_args(&self, file: &Path) -> Vec<String> {
        let c = &self.config;
        let mut args = vec![
            "exec".to_string(),
            "-i".to_string(),
            c.container_name.clone(),
            c.sqlcmd_path.clone(),
            "-S".to_string(),
            c.db_host.clone(),
            "-U".to_string(),
            c.db_user.clone(),
            "-P".to_string(),
            c.db_password.clone(),
            "-d".to_string(),
            c.db_name.clone(),
        ];
        if c.trust_cert {
            args.push("-C".to_string());
        }
        args.push("-i".to_string());
        args.push(self.remote_path(file));
        args
    }

    /// Copy `file` into the container and run it with sqlcmd
    pub fn import(&self, file: &Path) -> Result<()> {
        self.copy_into_container(file)?;
        self.execute_script(file)
    }

    fn copy_into_container(&self, file: &Path) -> Result<()> {
        let args = self.copy_args(file);
        debug!(runtime = %self.config.runtime, ?args, "copying script into container");

        let copy_failed = |message: String| MigrateError::CopyFailed {
            container: self.config.container_name.clone(),
            message,
        };

        let status = Command::new(&self.config.runtime)
            .args(&args)
            .status()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    copy_failed(format!("'{}' command not found", self.config.runtime))
                } else {
                    copy_failed(format!("failed to run {}: {}", self.config.runtime, e))
                }
            })?;

        if !status.success() {
            return Err(copy_failed(format!(
                "{} cp exited with status: {}",
                self.config.runtime, status
            )));
        }

        info!(remote = %self.remote_path(file), "script copied");
        Ok(())
    }

    fn execute_script(&self, file: &Path) -> Result<()> {
        let args = self.exec_args(file);
        debug!(runtime = %self.config.runtime, args = ?redact(&args), "running sqlcmd");

        let output = Command::new(&self.config.runtime)
            .args(&args)
            .output()
            .map_err(|e| MigrateError::ExecuteFailed {
                stderr: format!("failed to run {}: {}", self.config.runtime, e),
            })?;

        if !output.status.success() {
            return Err(MigrateError::ExecuteFailed {
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        info!(database = %self.config.db_name, "script executed");
        Ok(())
    }
}

/// Replace the value following `-P` so the password never reaches the logs
fn redact(args: &[String]) -> Vec<&str> {
    let mut out = Vec::with_capacity(args.len());
    let mut hide_next = false;
    for arg in args {
        if hide_next {
            out.push(REDACTED);
            hide_next = false;
        } else {
            hide_next = arg == "-P";
            out.push(arg.as_str());
        }
    }
    out
}
