//! Audit log of launched commands

use crate::config::config_dir;
use crate::launcher::LaunchRequest;
use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn audit_path() -> PathBuf {
    config_dir().join("audit.log")
}

/// Append a launch to the audit log at `path`
pub fn log_launch_to(path: &Path, origin: &str, request: &LaunchRequest) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    writeln!(
        file,
        "[{}] [{}] CMD: {} | ARGS: {} | DIR: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        origin,
        request.command,
        request.arguments,
        request.working_directory
    )?;
    Ok(())
}
