use bon::Builder;
use flokkr_utils::constants::{DEFAULT_MIRRORS, MIRROR_PATH_PLACEHOLDER};
use log::{debug, info, trace};

use crate::{drivers::FetchDriver, error::PipelineError};

/// An ordered list of mirrors to find release archives on.
///
/// Each mirror is either a base URL that the archive path is
/// appended to, or a template containing `{path}`.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct MirrorResolver {
    #[builder(into)]
    mirrors: Vec<String>,
}

impl Default for MirrorResolver {
    fn default() -> Self {
        Self {
            mirrors: DEFAULT_MIRRORS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl MirrorResolver {
    /// Builds the URL of `path` on a single mirror.
    #[must_use]
    pub fn mirror_url(mirror: &str, path: &str) -> String {
        if mirror.contains(MIRROR_PATH_PLACEHOLDER) {
            return mirror.replace(MIRROR_PATH_PLACEHOLDER, path);
        }

        match (mirror.ends_with('/'), path.starts_with('/')) {
            (true, true) => format!("{mirror}{}", path.trim_start_matches('/')),
            (false, false) => format!("{mirror}/{path}"),
            _ => format!("{mirror}{path}"),
        }
    }

    /// Finds the first mirror that has `path` available.
    ///
    /// Mirrors are probed in order. A mirror that answers with
    /// anything other than a success is skipped.
    ///
    /// # Errors
    /// Will error when no mirror has the path, or immediately
    /// when a probe fails at the transport level.
    pub fn resolve<F>(&self, fetcher: &F, path: &str) -> Result<String, PipelineError>
    where
        F: FetchDriver + ?Sized,
    {
        trace!("MirrorResolver::resolve({path})");

        let mut tried = Vec::with_capacity(self.mirrors.len());

        for mirror in &self.mirrors {
            let url = Self::mirror_url(mirror, path);

            debug!("Probing {url}");
            if fetcher.probe(&url)? {
                info!("Found download URL {url}");
                return Ok(url);
            }

            debug!("{url} is not available");
            tried.push(url);
        }

        Err(PipelineError::NoDownloadUrl {
            path: path.to_string(),
            tried,
        })
    }
}
