use std::{
    cell::RefCell,
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};

use crate::{
    drivers::{
        opts::{BuildOpts, ExtractOpts, PushOpts, TagOpts},
        BuildDriver, ExtractDriver, FetchDriver,
    },
    error::PipelineError,
};

fn to_strings<I, S>(items: I) -> impl Iterator<Item = String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchCall {
    Probe(String),
    Download(String, PathBuf),
}

/// Answers probes from a fixed set of URLs and writes
/// a placeholder file for every download.
#[derive(Debug, Default)]
pub struct FakeFetcher {
    available: HashSet<String>,
    unreachable: HashSet<String>,
    broken: HashSet<String>,
    calls: RefCell<Vec<FetchCall>>,
}

impl FakeFetcher {
    pub fn available<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.available.extend(to_strings(urls));
        self
    }

    pub fn unreachable<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unreachable.extend(to_strings(urls));
        self
    }

    /// URLs that are found but drop the connection mid-download.
    pub fn broken<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.broken.extend(to_strings(urls));
        self
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.borrow().clone()
    }

    pub fn downloads(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, FetchCall::Download(..)))
            .count()
    }

    fn check_reachable(&self, url: &str) -> Result<(), PipelineError> {
        if self.unreachable.contains(url) {
            Err(PipelineError::transport(url)("connection refused"))
        } else {
            Ok(())
        }
    }
}

impl FetchDriver for FakeFetcher {
    fn probe(&self, url: &str) -> Result<bool, PipelineError> {
        self.calls.borrow_mut().push(FetchCall::Probe(url.into()));
        self.check_reachable(url)?;
        Ok(self.available.contains(url))
    }

    fn download(&self, url: &str, dest: &Path) -> Result<(), PipelineError> {
        self.calls
            .borrow_mut()
            .push(FetchCall::Download(url.into(), dest.to_path_buf()));
        self.check_reachable(url)?;
        fs::write(dest, url).map_err(PipelineError::fs("write", dest))?;

        if self.broken.contains(url) {
            return Err(PipelineError::transport(url)("connection reset"));
        }
        Ok(())
    }
}

/// Pretends to unpack an archive by creating a fixed
/// list of files in the destination.
#[derive(Debug, Default)]
pub struct FakeExtractor {
    files: Vec<String>,
    fail: bool,
    calls: RefCell<Vec<(PathBuf, PathBuf)>>,
}

impl FakeExtractor {
    pub fn with_files<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            files: to_strings(files).collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.borrow().clone()
    }
}

impl ExtractDriver for FakeExtractor {
    fn extract(&self, opts: &ExtractOpts) -> Result<(), PipelineError> {
        self.calls
            .borrow_mut()
            .push((opts.archive.to_path_buf(), opts.dest.to_path_buf()));

        if !opts.archive.is_file() {
            return Err(PipelineError::fs("open", &*opts.archive)(
                io::ErrorKind::NotFound.into(),
            ));
        }

        if self.fail {
            return Err(PipelineError::Extraction {
                archive: opts.archive.to_path_buf(),
                dest: opts.dest.to_path_buf(),
                source: io::Error::other("unexpected end of archive"),
            });
        }

        for file in &self.files {
            let target = opts.dest.join(file);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(PipelineError::fs("create", parent))?;
            }
            fs::write(&target, file).map_err(PipelineError::fs("write", &target))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildCall {
    Build {
        image: String,
        base_image: String,
        artifact_dir: PathBuf,
        context: PathBuf,
    },
    Tag {
        src_image: String,
        dest_image: String,
    },
    Push(String),
}

/// Records every container operation, failing for
/// the configured image refs.
#[derive(Debug, Default)]
pub struct FakeBuildDriver {
    fail_on: HashSet<String>,
    calls: RefCell<Vec<BuildCall>>,
}

impl FakeBuildDriver {
    pub fn failing_on<I, S>(images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fail_on: to_strings(images).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<BuildCall> {
        self.calls.borrow().clone()
    }

    fn outcome(&self, action: &'static str, image: &str) -> Result<(), PipelineError> {
        if self.fail_on.contains(image) {
            Err(PipelineError::ExternalTool {
                program: "fake".into(),
                action,
                target: image.into(),
            })
        } else {
            Ok(())
        }
    }
}

impl BuildDriver for FakeBuildDriver {
    fn build(&self, opts: &BuildOpts) -> Result<(), PipelineError> {
        self.calls.borrow_mut().push(BuildCall::Build {
            image: opts.image.to_string(),
            base_image: opts.base_image.to_string(),
            artifact_dir: opts.artifact_dir.to_path_buf(),
            context: opts.context.to_path_buf(),
        });
        self.outcome("build", &opts.image)
    }

    fn tag(&self, opts: &TagOpts) -> Result<(), PipelineError> {
        self.calls.borrow_mut().push(BuildCall::Tag {
            src_image: opts.src_image.to_string(),
            dest_image: opts.dest_image.to_string(),
        });
        self.outcome("tag", &opts.dest_image)
    }

    fn push(&self, opts: &PushOpts) -> Result<(), PipelineError> {
        self.calls
            .borrow_mut()
            .push(BuildCall::Push(opts.image.to_string()));
        self.outcome("push", &opts.image)
    }
}
