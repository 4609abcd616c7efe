use std::{io, process::ExitStatus};

use log::info;

use crate::error::PipelineError;

/// Turns the outcome of running a container tool into
/// a pipeline result, logging on success.
pub(super) fn check_status(
    program: &str,
    action: &'static str,
    target: &str,
    status: io::Result<ExitStatus>,
) -> Result<(), PipelineError> {
    let status = status.map_err(|source| PipelineError::Spawn {
        program: program.to_string(),
        source,
    })?;

    if status.success() {
        info!("Successfully ran {action} for {target}");
        Ok(())
    } else {
        Err(PipelineError::ExternalTool {
            program: program.to_string(),
            action,
            target: target.to_string(),
        })
    }
}
