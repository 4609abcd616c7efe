use bon::Builder;
use clap::Args;
use flokkr_process_management::{
    drivers::{Driver, DriverArgs, HttpDriver, TarDriver},
    orchestrator::BuildOrchestrator,
};
use log::{info, trace};
use miette::Result;

use super::{CacheArgs, DescriptorArgs, FlokkrCommand, ImageArgs};

#[derive(Debug, Clone, Args, Builder)]
pub struct BuildCommand {
    #[clap(flatten)]
    pub descriptor: DescriptorArgs,

    #[clap(flatten)]
    pub cache: CacheArgs,

    #[clap(flatten)]
    pub image: ImageArgs,

    #[clap(flatten)]
    #[builder(default)]
    pub drivers: DriverArgs,
}

impl FlokkrCommand for BuildCommand {
    fn try_run(&mut self) -> Result<()> {
        trace!("BuildCommand::try_run()");

        let descriptor = self.descriptor.load()?;
        let driver = Driver::init(self.drivers)?;

        info!(
            "Building {} versions of {} with {}",
            descriptor.versions.len(),
            descriptor.name,
            driver.build_driver(),
        );

        BuildOrchestrator::builder()
            .driver(driver)
            .cache(self.cache.cache(HttpDriver::new()?, TarDriver))
            .namespace(self.image.namespace.registry_namespace.as_str())
            .context(self.image.context.as_path())
            .build()
            .run(&descriptor)?;
        Ok(())
    }
}
