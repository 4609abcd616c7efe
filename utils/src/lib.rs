pub mod constants;
mod macros;

use std::{path::PathBuf, process::Command};

use log::trace;
use miette::{bail, IntoDiagnostic, Result};

/// Checks for the existance of a given command.
///
/// # Errors
/// Will error if the command doesn't exist.
pub fn check_command_exists(command: &str) -> Result<()> {
    trace!("check_command_exists({command})");

    trace!("which {command}");
    if Command::new("which")
        .arg(command)
        .output()
        .into_diagnostic()?
        .status
        .success()
    {
        trace!("Command {command} does exist");
        Ok(())
    } else {
        bail!("Command {command} doesn't exist and is required to build the images")
    }
}

#[must_use]
pub fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|base_dirs| base_dirs.home_dir().to_path_buf())
}
