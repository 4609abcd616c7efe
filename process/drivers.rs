//! This module is responsible for the external tools the
//! pipeline talks to. Container tooling, HTTP, and archive
//! handling all sit behind narrow traits so the cache and
//! the orchestrators never depend on a concrete tool.

use bon::Builder;
use clap::Args;
use flokkr_utils::constants::FLOKKR_BUILD_DRIVER;
use log::trace;
use miette::Result;

use self::{
    docker_driver::DockerDriver,
    opts::{BuildOpts, PushOpts, TagOpts},
    podman_driver::PodmanDriver,
    types::{BuildDriverType, DetermineDriver},
};
use crate::error::PipelineError;

pub use http_driver::HttpDriver;
pub use tar_driver::TarDriver;
pub use traits::*;

mod docker_driver;
mod functions;
mod http_driver;
pub mod opts;
mod podman_driver;
mod tar_driver;
mod traits;
pub mod types;

/// Args for selecting the drivers to use for runtime.
///
/// If the args are left uninitialized, the program will determine
/// the best one available.
#[derive(Default, Clone, Copy, Debug, Builder, Args)]
pub struct DriverArgs {
    /// Select which driver to use to build
    /// your images.
    #[arg(short = 'B', long, env = FLOKKR_BUILD_DRIVER)]
    build_driver: Option<BuildDriverType>,
}

/// The build driver selected for this run.
#[derive(Debug, Clone, Copy)]
pub struct Driver {
    build_driver: BuildDriverType,
}

impl Driver {
    /// Selects the build driver, detecting an installed
    /// one if none was chosen.
    ///
    /// # Errors
    /// Will error if no supported container tool is installed.
    pub fn init(mut args: DriverArgs) -> Result<Self> {
        trace!("Driver::init({args:?})");

        let build_driver = args.build_driver.determine_driver()?;
        trace!("Driver set {build_driver:?}");

        Ok(Self { build_driver })
    }

    #[must_use]
    pub const fn build_driver(&self) -> BuildDriverType {
        self.build_driver
    }
}

macro_rules! impl_build_driver {
    ($self:ident.$func:ident($($args:expr),*)) => {
        match $self.build_driver {
            BuildDriverType::Docker => DockerDriver.$func($($args,)*),
            BuildDriverType::Podman => PodmanDriver.$func($($args,)*),
        }
    };
}

impl BuildDriver for Driver {
    fn build(&self, opts: &BuildOpts) -> Result<(), PipelineError> {
        impl_build_driver!(self.build(opts))
    }

    fn tag(&self, opts: &TagOpts) -> Result<(), PipelineError> {
        impl_build_driver!(self.tag(opts))
    }

    fn push(&self, opts: &PushOpts) -> Result<(), PipelineError> {
        impl_build_driver!(self.push(opts))
    }
}
