use clap::ValueEnum;
use log::trace;
use miette::{bail, Result};

pub(super) trait DetermineDriver<T> {
    fn determine_driver(&mut self) -> Result<T>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BuildDriverType {
    Docker,
    Podman,
}

impl BuildDriverType {
    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Podman => "podman",
        }
    }
}

impl std::fmt::Display for BuildDriverType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.program())
    }
}

impl DetermineDriver<BuildDriverType> for Option<BuildDriverType> {
    fn determine_driver(&mut self) -> Result<BuildDriverType> {
        trace!("BuildDriverType::determine_driver()");

        if let Some(driver) = *self {
            return Ok(driver);
        }

        let driver = match (
            flokkr_utils::check_command_exists("docker"),
            flokkr_utils::check_command_exists("podman"),
        ) {
            (Ok(()), _) => BuildDriverType::Docker,
            (_, Ok(())) => BuildDriverType::Podman,
            _ => bail!(
                "{}{}",
                "Could not determine build driver, ",
                "you need either docker or podman installed"
            ),
        };
        Ok(*self.insert(driver))
    }
}
