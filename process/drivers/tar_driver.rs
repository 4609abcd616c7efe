use std::{
    fs::{self, File},
    io,
    path::{Component, Path, PathBuf},
};

use flate2::read::GzDecoder;
use log::{debug, trace, warn};
use tar::{Archive, EntryType};

use crate::error::PipelineError;

use super::{opts::ExtractOpts, ExtractDriver};

/// Unpacks gzip compressed tarballs.
///
/// Link targets are stripped the same way entry paths are, and
/// nothing is written outside the destination.
#[derive(Debug, Default, Clone, Copy)]
pub struct TarDriver;

impl ExtractDriver for TarDriver {
    fn extract(&self, opts: &ExtractOpts) -> Result<(), PipelineError> {
        trace!("TarDriver::extract({opts:#?})");

        let archive_path: &Path = &opts.archive;
        let dest: &Path = &opts.dest;
        let extraction_err = |source| PipelineError::Extraction {
            archive: archive_path.to_path_buf(),
            dest: dest.to_path_buf(),
            source,
        };

        let file = File::open(archive_path).map_err(PipelineError::fs("open", archive_path))?;
        let root = fs::canonicalize(dest).map_err(PipelineError::fs("resolve", dest))?;
        let mut archive = Archive::new(GzDecoder::new(file));

        for entry in archive.entries().map_err(extraction_err)? {
            let mut entry = entry.map_err(extraction_err)?;
            let entry_path = entry.path().map_err(extraction_err)?.into_owned();

            let Some(relative) = strip_path(&entry_path, opts.strip_components) else {
                trace!("Skipping {}", entry_path.display());
                continue;
            };

            let target = root.join(&relative);
            if let Some(parent) = target.parent() {
                if !is_contained(&root, parent) {
                    warn!("Refusing to extract {} through a link", entry_path.display());
                    continue;
                }
                fs::create_dir_all(parent).map_err(PipelineError::fs("create", parent))?;
            }

            match entry.header().entry_type() {
                EntryType::Link => {
                    let link_name = entry
                        .link_name()
                        .map_err(extraction_err)?
                        .ok_or_else(|| extraction_err(missing_link_name()))?
                        .into_owned();

                    let Some(source) = strip_path(&link_name, opts.strip_components)
                        .map(|source| root.join(source))
                        .filter(|source| is_contained(&root, source))
                    else {
                        warn!(
                            "Refusing to link {} to {}",
                            entry_path.display(),
                            link_name.display()
                        );
                        continue;
                    };

                    if fs::symlink_metadata(&target).is_ok() {
                        fs::remove_file(&target).map_err(PipelineError::fs("remove", &target))?;
                    }
                    fs::hard_link(&source, &target).map_err(extraction_err)?;
                }
                EntryType::Symlink => {
                    let link_name = entry
                        .link_name()
                        .map_err(extraction_err)?
                        .ok_or_else(|| extraction_err(missing_link_name()))?
                        .into_owned();

                    let link_dir = target
                        .parent()
                        .and_then(|parent| fs::canonicalize(parent).ok())
                        .and_then(|parent| parent.strip_prefix(&root).ok().map(Path::to_path_buf));

                    if !link_dir.is_some_and(|dir| symlink_stays_inside(&dir, &link_name)) {
                        warn!(
                            "Refusing to link {} to {}",
                            entry_path.display(),
                            link_name.display()
                        );
                        continue;
                    }
                    entry.unpack(&target).map_err(extraction_err)?;
                }
                _ => {
                    entry.unpack(&target).map_err(extraction_err)?;
                }
            }
        }

        debug!("Extracted {} into {}", archive_path.display(), dest.display());
        Ok(())
    }
}

fn missing_link_name() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "link entry without a target")
}

/// Drops the first `strip` components of an archive entry.
///
/// Returns `None` for entries that are consumed entirely by the
/// strip, and for entries that would escape the destination.
fn strip_path(path: &Path, strip: usize) -> Option<PathBuf> {
    let mut components = path
        .components()
        .filter(|component| !matches!(component, Component::CurDir));

    if components
        .clone()
        .any(|component| !matches!(component, Component::Normal(_)))
    {
        warn!("Refusing to extract {}", path.display());
        return None;
    }

    for _ in 0..strip {
        components.next()?;
    }

    let stripped = components.collect::<PathBuf>();
    (!stripped.as_os_str().is_empty()).then_some(stripped)
}

/// Whether `path` resolves to somewhere below `root` once the
/// links of its nearest existing ancestor are followed.
fn is_contained(root: &Path, path: &Path) -> bool {
    path.ancestors()
        .find(|ancestor| fs::symlink_metadata(ancestor).is_ok())
        .and_then(|ancestor| fs::canonicalize(ancestor).ok())
        .is_some_and(|resolved| resolved.starts_with(root))
}

/// Whether a symlink created in `dir` (relative to the destination)
/// pointing at `target` stays inside the destination.
///
/// Writes through links are also guarded by [`is_contained`].
fn symlink_stays_inside(dir: &Path, target: &Path) -> bool {
    let mut depth = dir.components().count();

    for component in target.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir if depth > 0 => depth -= 1,
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    true
}
