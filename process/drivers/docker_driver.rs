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

const DOCKER: &str = "docker";

#[derive(Debug)]
pub struct DockerDriver;

impl BuildDriver for DockerDriver {
    fn build(&self, opts: &BuildOpts) -> Result<(), PipelineError> {
        trace!("DockerDriver::build({opts:#?})");

        let command = cmd!(
            "docker",
            "build",
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
            DOCKER,
            "build",
            &opts.image,
            command.build_status(&opts.image, "Building Image"),
        )
    }

    fn tag(&self, opts: &TagOpts) -> Result<(), PipelineError> {
        trace!("DockerDriver::tag({opts:#?})");

        let mut command = cmd!(
            "docker",
            "tag",
            &*opts.src_image,
            &*opts.dest_image,
        );

        trace!("{command:?}");
        check_status(DOCKER, "tag", &opts.dest_image, command.status())
    }

    fn push(&self, opts: &PushOpts) -> Result<(), PipelineError> {
        trace!("DockerDriver::push({opts:#?})");

        let command = cmd!("docker", "push", &*opts.image);

        trace!("{command:?}");
        check_status(
            DOCKER,
            "push",
            &opts.image,
            command.build_status(&opts.image, "Pushing Image"),
        )
    }
}
