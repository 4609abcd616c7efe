use std::path::Path;

use crate::error::PipelineError;

use super::opts::{BuildOpts, ExtractOpts, PushOpts, TagOpts};

/// Allows agnostic building, tagging,
/// and pushing of images.
pub trait BuildDriver {
    /// Runs the build logic for the driver.
    ///
    /// # Errors
    /// Will error if the build fails.
    fn build(&self, opts: &BuildOpts) -> Result<(), PipelineError>;

    /// Runs the tag logic for the driver.
    ///
    /// # Errors
    /// Will error if the tagging fails.
    fn tag(&self, opts: &TagOpts) -> Result<(), PipelineError>;

    /// Runs the push logic for the driver
    ///
    /// # Errors
    /// Will error if the push fails.
    fn push(&self, opts: &PushOpts) -> Result<(), PipelineError>;
}

/// Allows agnostic retrieval of release archives.
pub trait FetchDriver {
    /// Checks whether `url` exists without downloading it.
    ///
    /// Returns `Ok(false)` when the server answers with anything
    /// other than a success.
    ///
    /// # Errors
    /// Will error if the request itself fails.
    fn probe(&self, url: &str) -> Result<bool, PipelineError>;

    /// Downloads `url` into the file at `dest`.
    ///
    /// # Errors
    /// Will error if the request fails or the file can't be written.
    fn download(&self, url: &str, dest: &Path) -> Result<(), PipelineError>;
}

/// Allows agnostic unpacking of release archives.
pub trait ExtractDriver {
    /// Extracts an archive, dropping the leading path components.
    ///
    /// # Errors
    /// Will error if the archive can't be read or unpacked.
    fn extract(&self, opts: &ExtractOpts) -> Result<(), PipelineError>;
}

impl<T: BuildDriver + ?Sized> BuildDriver for &T {
    fn build(&self, opts: &BuildOpts) -> Result<(), PipelineError> {
        (**self).build(opts)
    }

    fn tag(&self, opts: &TagOpts) -> Result<(), PipelineError> {
        (**self).tag(opts)
    }

    fn push(&self, opts: &PushOpts) -> Result<(), PipelineError> {
        (**self).push(opts)
    }
}

impl<T: FetchDriver + ?Sized> FetchDriver for &T {
    fn probe(&self, url: &str) -> Result<bool, PipelineError> {
        (**self).probe(url)
    }

    fn download(&self, url: &str, dest: &Path) -> Result<(), PipelineError> {
        (**self).download(url, dest)
    }
}

impl<T: ExtractDriver + ?Sized> ExtractDriver for &T {
    fn extract(&self, opts: &ExtractOpts) -> Result<(), PipelineError> {
        (**self).extract(opts)
    }
}
