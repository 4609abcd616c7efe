use std::path::PathBuf;

use bon::Builder;
use clap::{crate_authors, crate_version, Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use flokkr_descriptor::Descriptor;
use flokkr_process_management::{
    cache::ArtifactCache,
    drivers::{ExtractDriver, FetchDriver},
    mirrors::MirrorResolver,
};
use flokkr_utils::constants::{
    BUILD_CONTEXT_PATH, CACHE_PATH, DEFAULT_MIRRORS, DEFAULT_REGISTRY_NAMESPACE, DESCRIPTOR_FILE,
    FLOKKR_CACHE_DIR, FLOKKR_CONTEXT, FLOKKR_DESCRIPTOR, FLOKKR_LOG_OUT, FLOKKR_MIRRORS,
    FLOKKR_REGISTRY_NAMESPACE,
};
use log::{error, trace};
use miette::Result;

pub mod build;
pub mod deploy;
pub mod tags;

pub trait FlokkrCommand {
    /// Runs the command and returns a result
    /// of the execution
    ///
    /// # Errors
    /// Can return a `miette` Error
    fn try_run(&mut self) -> Result<()>;

    /// Runs the command and exits if there is an error.
    fn run(&mut self) {
        if let Err(e) = self.try_run() {
            error!("Failed:\n{e:?}");
            std::process::exit(1);
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "Flokkr",
    about,
    long_about = None,
    author = crate_authors!(),
    version = crate_version!(),
)]
pub struct FlokkrArgs {
    #[command(subcommand)]
    pub command: CommandArgs,

    /// The directory to put the log files in.
    #[arg(long, env = FLOKKR_LOG_OUT)]
    pub log_out: Option<PathBuf>,

    #[clap(flatten)]
    pub verbosity: Verbosity<InfoLevel>,
}

#[derive(Debug, Subcommand)]
pub enum CommandArgs {
    /// Build and tag an image for every version
    /// in the descriptor.
    ///
    /// Release archives are downloaded once and kept
    /// in the cache dir for later builds.
    Build(build::BuildCommand),

    /// Push every tag of every version
    /// in the descriptor.
    Deploy(deploy::DeployCommand),

    /// Print the tags each version will receive.
    Tags(tags::TagsCommand),
}

/// Args for locating the project descriptor.
#[derive(Debug, Clone, Args, Builder)]
pub struct DescriptorArgs {
    /// The descriptor of the project.
    #[arg(short, long, default_value = DESCRIPTOR_FILE, env = FLOKKR_DESCRIPTOR)]
    #[builder(into, default = PathBuf::from(DESCRIPTOR_FILE))]
    pub descriptor: PathBuf,
}

impl DescriptorArgs {
    /// Reads and validates the descriptor.
    ///
    /// # Errors
    /// Will error if the descriptor can't be read or is invalid.
    pub fn load(&self) -> Result<Descriptor> {
        trace!("DescriptorArgs::load({})", self.descriptor.display());
        Ok(Descriptor::parse(&self.descriptor)?)
    }
}

/// Args for the artifact cache.
#[derive(Debug, Clone, Args, Builder)]
pub struct CacheArgs {
    /// The directory extracted release archives are kept in.
    #[arg(long, default_value = CACHE_PATH, env = FLOKKR_CACHE_DIR)]
    #[builder(into, default = PathBuf::from(CACHE_PATH))]
    pub cache_dir: PathBuf,

    /// A mirror to look for release archives on. Mirrors
    /// are tried in the order given.
    ///
    /// Either a base URL or a template containing `{path}`.
    #[arg(
        long = "mirror",
        env = FLOKKR_MIRRORS,
        value_delimiter = ',',
        default_values = DEFAULT_MIRRORS,
    )]
    #[builder(default = DEFAULT_MIRRORS.iter().map(ToString::to_string).collect())]
    pub mirrors: Vec<String>,
}

impl CacheArgs {
    #[must_use]
    pub fn cache<F, X>(&self, fetcher: F, extractor: X) -> ArtifactCache<F, X>
    where
        F: FetchDriver,
        X: ExtractDriver,
    {
        ArtifactCache::builder()
            .root(&self.cache_dir)
            .mirrors(MirrorResolver::builder().mirrors(self.mirrors.clone()).build())
            .fetcher(fetcher)
            .extractor(extractor)
            .build()
    }
}

/// Args for the registry namespace images are named under.
#[derive(Debug, Clone, Args, Builder)]
pub struct NamespaceArgs {
    /// The registry namespace the images are named under.
    ///
    /// Pass an empty value for unqualified image names.
    #[arg(long, default_value = DEFAULT_REGISTRY_NAMESPACE, env = FLOKKR_REGISTRY_NAMESPACE)]
    #[builder(into, default = DEFAULT_REGISTRY_NAMESPACE.to_string())]
    pub registry_namespace: String,
}

impl Default for NamespaceArgs {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Args for naming and building the images.
#[derive(Debug, Clone, Args, Builder)]
pub struct ImageArgs {
    #[clap(flatten)]
    #[builder(default)]
    pub namespace: NamespaceArgs,

    /// The build context holding the Dockerfile.
    #[arg(long, default_value = BUILD_CONTEXT_PATH, env = FLOKKR_CONTEXT)]
    #[builder(into, default = PathBuf::from(BUILD_CONTEXT_PATH))]
    pub context: PathBuf,
}
