use flokkr_utils::{
    cmd,
    constants::{ARTIFACT_DIR_ARG, BASE_IMAGE_ARG},
};
use log::trace;

use crate::{error::PipelineError, logging::CommandLogging};

use super::{
    functions::check_status,
    opts::{BuildOpts, PushOpts, TagOpts},
    BuildDriver,
};

const PODMAN: &str = "podman";

#[derive(Debug)]
pub struct PodmanDriver;

impl BuildDriver for PodmanDriver {
    fn build(&self, opts: &BuildOpts) -> Result<(), PipelineError> {
        trace!("PodmanDriver::build({opts:#?})");

        let command = cmd!(
            "podman",
            "build",
            "--pull=true",
            "-t",
            &*opts.image,
            "--build-arg",
            format!("{ARTIFACT_DIR_ARG}={}", opts.artifact_dir.display()),
            "--build-arg",
            format!("{BASE_IMAGE_ARG}={}", opts.base_image),
            &*opts.context,
        );

        trace!("{command:?}");
        check_status(
            PODMAN,
            "build",
            &opts.image,
            command.build_status(&opts.image, "Building Image"),
        )
    }

    fn tag(&self, opts: &TagOpts) -> Result<(), PipelineError> {
        trace!("PodmanDriver::tag({opts:#?})");

        let mut command = cmd!(
            "podman",
            "tag",
            &*opts.src_image,
            &*opts.dest_image,
        );

        trace!("{command:?}");
        check_status(PODMAN, "tag", &opts.dest_image, command.status())
    }

    fn push(&self, opts: &PushOpts) -> Result<(), PipelineError> {
        trace!("PodmanDriver::push({opts:#?})");

        let command = cmd!("podman", "push", &*opts.image);

        trace!("{command:?}");
        check_status(
            PODMAN,
            "push",
            &opts.image,
            command.build_status(&opts.image, "Pushing Image"),
        )
    }
}
