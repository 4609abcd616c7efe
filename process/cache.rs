use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};

use bon::Builder;
use flokkr_descriptor::render_url_path;
use flokkr_utils::constants::{CACHE_PATH, CACHE_WORK_DIR, DOWNLOADED_ARCHIVE};
use log::{debug, info, trace, warn};

use crate::{
    drivers::{opts::ExtractOpts, ExtractDriver, FetchDriver},
    error::PipelineError,
    mirrors::MirrorResolver,
};

/// Keeps extracted release archives on disk, one directory
/// per project version.
///
/// A version is considered cached as soon as its directory
/// exists. Nothing inside it is checked.
#[derive(Debug, Builder)]
pub struct ArtifactCache<F, X>
where
    F: FetchDriver,
    X: ExtractDriver,
{
    #[builder(into, default = PathBuf::from(CACHE_PATH))]
    root: PathBuf,

    #[builder(default)]
    mirrors: MirrorResolver,

    fetcher: F,
    extractor: X,
}

impl<F, X> ArtifactCache<F, X>
where
    F: FetchDriver,
    X: ExtractDriver,
{
    /// The directory a version of a project is extracted to.
    #[must_use]
    pub fn artifact_dir(&self, name: &str, version: &str) -> PathBuf {
        self.root.join(name).join(version)
    }

    /// Makes sure the release archive of `version` is extracted
    /// into the cache and returns its directory.
    ///
    /// On a miss the archive is located on the mirrors, downloaded
    /// into a scratch directory, extracted, and the `excludes` are
    /// removed from the result. The scratch directory is removed
    /// whether or not this succeeds.
    ///
    /// # Errors
    /// Will error if no mirror has the archive, or if downloading,
    /// extracting, or pruning it fails. A failure after extraction
    /// started leaves a partial directory behind that later calls
    /// will treat as cached.
    pub fn ensure(
        &self,
        name: &str,
        version: &str,
        url_path: &str,
        excludes: &[String],
    ) -> Result<PathBuf, PipelineError> {
        trace!("ArtifactCache::ensure({name}, {version}, {url_path}, {excludes:?})");

        let artifact_dir = self.artifact_dir(name, version);

        if artifact_dir.exists() {
            info!(
                "Artifact is cached locally at {}",
                artifact_dir.display()
            );
            return Ok(artifact_dir);
        }

        let excludes = excludes
            .iter()
            .map(|exclude| validate_exclude(exclude))
            .collect::<Result<Vec<_>, _>>()?;

        let path = render_url_path(url_path, version);
        let url = self.mirrors.resolve(&self.fetcher, &path)?;

        let work_dir = WorkDir::create(self.root.join(CACHE_WORK_DIR))?;
        let archive = work_dir.path().join(DOWNLOADED_ARCHIVE);

        info!("Downloading {url}");
        self.fetcher.download(&url, &archive)?;

        fs::create_dir_all(&artifact_dir).map_err(PipelineError::fs("create", &artifact_dir))?;

        self.extractor.extract(
            &ExtractOpts::builder()
                .archive(&archive)
                .dest(&artifact_dir)
                .build(),
        )?;

        for exclude in excludes {
            remove_exclude(&artifact_dir.join(exclude))?;
        }

        info!(
            "Extracted {name} {version} into {}",
            artifact_dir.display()
        );
        Ok(artifact_dir)
    }
}

fn validate_exclude(exclude: &str) -> Result<&Path, PipelineError> {
    let path = Path::new(exclude);
    let relative = path
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
    let names_entry = path
        .components()
        .any(|component| matches!(component, Component::Normal(_)));

    if relative && names_entry {
        Ok(path)
    } else {
        Err(PipelineError::InvalidExclude(exclude.to_string()))
    }
}

fn remove_exclude(path: &Path) -> Result<(), PipelineError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("Nothing to exclude at {}", path.display());
            return Ok(());
        }
        Err(e) => return Err(PipelineError::fs("inspect", path)(e)),
    };

    debug!("Removing {}", path.display());
    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
    .map_err(PipelineError::fs("remove", path))
}

/// Scratch directory that only lives as long as one download.
struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    fn create(path: PathBuf) -> Result<Self, PipelineError> {
        if path.exists() {
            debug!("Clearing stale work dir {}", path.display());
            fs::remove_dir_all(&path).map_err(PipelineError::fs("remove", &path))?;
        }
        fs::create_dir_all(&path).map_err(PipelineError::fs("create", &path))?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.path) {
            warn!("Failed to remove work dir {}: {e}", self.path.display());
        }
    }
}
