use std::{io, path::PathBuf};

use miette::Diagnostic;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while fetching artifacts and building images.
///
/// None of these are retried. The first one encountered stops
/// the current command.
#[derive(Error, Diagnostic, Debug)]
pub enum PipelineError {
    #[error("No download URL found for {path}, tried: {}", .tried.join(", "))]
    #[diagnostic(help("Check the `urlpath` of the descriptor or add a mirror with `--mirror`"))]
    NoDownloadUrl { path: String, tried: Vec<String> },

    #[error("Request to {url} failed")]
    #[diagnostic()]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("Failed to set up the HTTP client")]
    #[diagnostic()]
    HttpClient(#[source] BoxError),

    #[error("Failed to {action} {}", .path.display())]
    #[diagnostic()]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Exclude '{0}' must be a relative path inside the artifact")]
    #[diagnostic(help("Entries of `exclude` are removed relative to the extracted archive"))]
    InvalidExclude(String),

    #[error("Failed to extract {} into {}", .archive.display(), .dest.display())]
    #[diagnostic()]
    Extraction {
        archive: PathBuf,
        dest: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to run {program}")]
    #[diagnostic(help("Make sure the container tool is installed and on your PATH"))]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to {action} {target} with {program}")]
    #[diagnostic()]
    ExternalTool {
        program: String,
        action: &'static str,
        target: String,
    },
}

impl PipelineError {
    /// Creates a mapper from an `io::Error` for a filesystem
    /// action on `path`.
    pub fn fs<P>(action: &'static str, path: P) -> impl FnOnce(io::Error) -> Self
    where
        P: Into<PathBuf>,
    {
        let path = path.into();
        move |source| Self::Filesystem {
            action,
            path,
            source,
        }
    }

    /// Creates a mapper for a failed request to `url`.
    pub fn transport<E>(url: &str) -> impl FnOnce(E) -> Self + '_
    where
        E: Into<BoxError>,
    {
        move |source| Self::Transport {
            url: url.to_string(),
            source: source.into(),
        }
    }
}
