use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use bon::Builder;
use flokkr_utils::constants::{CACHE_WORK_DIR, URL_PATH_PLACEHOLDER};
use log::{debug, trace};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::VersionTags;

#[derive(Error, Diagnostic, Debug)]
pub enum DescriptorError {
    #[error("Failed to read descriptor {}", .path.display())]
    #[diagnostic(help("Run from the project directory or pass `--descriptor`"))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to deserialize descriptor")]
    #[diagnostic()]
    Deserialize(#[source] serde_yaml::Error),

    #[error("Version '{0}' is declared more than once")]
    #[diagnostic(help("Each version can only be listed once in `versions`"))]
    DuplicateVersion(String),

    #[error("Version at position {0} is empty")]
    #[diagnostic()]
    EmptyVersion(usize),

    #[error("Version '{0}' can't be used as a directory name")]
    #[diagnostic(help("Versions can't contain path separators or be '.' or '..'"))]
    InvalidVersion(String),

    #[error("Name '{0}' can't be used as a directory name")]
    #[diagnostic(help(
        "The name must be non-empty, contain no path separators and not be '.', '..' or 'work'"
    ))]
    InvalidName(String),
}

/// The project descriptor.
///
/// This is the top-level section of a `flokkr.yaml`. It describes
/// where the release archives of a project live and which versions
/// of it should be built on top of the base image.
#[derive(Default, Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Builder)]
#[serde(default)]
pub struct Descriptor {
    /// The name of the project.
    ///
    /// Used for the image name and the cache directory.
    #[builder(into)]
    pub name: String,

    /// Path of the release archive relative to a mirror.
    ///
    /// Both `%s` placeholders are replaced with the version.
    #[serde(rename = "urlpath", alias = "urlPath", alias = "url-path")]
    #[builder(into)]
    pub url_path: String,

    /// The image every version is built on top of.
    #[serde(rename = "basetag", alias = "baseTag", alias = "base-tag")]
    #[builder(into)]
    pub base_tag: String,

    /// The versions to build.
    ///
    /// The order matters. Earlier versions claim `latest` and the
    /// shorter version tags first.
    #[builder(default, into)]
    pub versions: Vec<String>,

    /// Paths relative to the extracted archive that are
    /// removed before the image is built.
    #[builder(default, into)]
    pub exclude: Vec<String>,
}

impl Descriptor {
    /// Parse a descriptor file.
    ///
    /// # Errors
    /// Errors when the file can't be read, isn't valid yaml,
    /// or declares a version more than once.
    pub fn parse<P: AsRef<Path>>(path: P) -> Result<Self, DescriptorError> {
        fn inner(path: &Path) -> Result<Descriptor, DescriptorError> {
            trace!("Descriptor::parse({})", path.display());

            let file = fs::read_to_string(path).map_err(|source| DescriptorError::Read {
                path: path.to_path_buf(),
                source,
            })?;

            debug!("Descriptor contents: {file}");
            file.parse()
        }
        inner(path.as_ref())
    }

    /// Checks the name and versions of the descriptor.
    ///
    /// Both end up as directory names in the artifact cache.
    ///
    /// # Errors
    /// Will error on a name or version that isn't a single path
    /// segment, and on empty or duplicate versions.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if !is_path_segment(&self.name) || self.name == CACHE_WORK_DIR {
            return Err(DescriptorError::InvalidName(self.name.clone()));
        }

        let mut seen = HashSet::new();

        for (index, version) in self.versions.iter().enumerate() {
            if version.is_empty() {
                return Err(DescriptorError::EmptyVersion(index));
            }
            if !is_path_segment(version) {
                return Err(DescriptorError::InvalidVersion(version.clone()));
            }
            if !seen.insert(version.as_str()) {
                return Err(DescriptorError::DuplicateVersion(version.clone()));
            }
        }
        Ok(())
    }

    /// The archive path for `version` relative to a mirror.
    #[must_use]
    pub fn url_path_for(&self, version: &str) -> String {
        render_url_path(&self.url_path, version)
    }

    /// Resolves the tags of every version in declaration order.
    #[must_use]
    pub fn version_tags(&self) -> VersionTags {
        VersionTags::resolve(&self.versions)
    }
}

impl FromStr for Descriptor {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let descriptor =
            serde_yaml::from_str::<Self>(s).map_err(DescriptorError::Deserialize)?;
        descriptor.validate()?;
        Ok(descriptor)
    }
}

fn is_path_segment(value: &str) -> bool {
    !value.is_empty() && value != "." && value != ".." && !value.contains(['/', '\\'])
}

/// Fills every `%s` of a url path template with the version.
#[must_use]
pub fn render_url_path(template: &str, version: &str) -> String {
    template.replace(URL_PATH_PLACEHOLDER, version)
}
