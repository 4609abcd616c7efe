use bon::Builder;
use clap::Args;
use flokkr_process_management::{
    drivers::{Driver, DriverArgs},
    orchestrator::DeployOrchestrator,
};
use log::trace;
use miette::Result;

use super::{DescriptorArgs, FlokkrCommand, NamespaceArgs};

#[derive(Debug, Clone, Args, Builder)]
pub struct DeployCommand {
    #[clap(flatten)]
    pub descriptor: DescriptorArgs,

    #[clap(flatten)]
    #[builder(default)]
    pub namespace: NamespaceArgs,

    #[clap(flatten)]
    #[builder(default)]
    pub drivers: DriverArgs,
}

impl FlokkrCommand for DeployCommand {
    fn try_run(&mut self) -> Result<()> {
        trace!("DeployCommand::try_run()");

        let descriptor = self.descriptor.load()?;

        DeployOrchestrator::builder()
            .driver(Driver::init(self.drivers)?)
            .namespace(self.namespace.registry_namespace.as_str())
            .build()
            .run(&descriptor)?;
        Ok(())
    }
}
