use std::path::{Path, PathBuf};

use bon::Builder;
use flokkr_descriptor::{Descriptor, VersionTag};
use flokkr_utils::constants::{BUILD_CONTEXT_PATH, BUILD_TAG, DEFAULT_REGISTRY_NAMESPACE};
use log::{debug, info, trace};

use crate::{
    cache::ArtifactCache,
    drivers::{
        opts::{BuildOpts, PushOpts, TagOpts},
        BuildDriver, ExtractDriver, FetchDriver,
    },
    error::PipelineError,
};

/// Formats the image ref of a project tag.
///
/// An empty namespace leaves the ref unqualified.
#[must_use]
pub fn image_ref(namespace: &str, name: &str, tag: &str) -> String {
    if namespace.is_empty() {
        format!("{name}:{tag}")
    } else {
        format!("{namespace}/{name}:{tag}")
    }
}

/// Builds one image per version of a descriptor and applies
/// every tag the version owns.
#[derive(Debug, Builder)]
pub struct BuildOrchestrator<D, F, X>
where
    D: BuildDriver,
    F: FetchDriver,
    X: ExtractDriver,
{
    driver: D,
    cache: ArtifactCache<F, X>,

    #[builder(into, default = DEFAULT_REGISTRY_NAMESPACE.to_string())]
    namespace: String,

    /// The directory holding the Dockerfile.
    #[builder(into, default = PathBuf::from(BUILD_CONTEXT_PATH))]
    context: PathBuf,
}

impl<D, F, X> BuildOrchestrator<D, F, X>
where
    D: BuildDriver,
    F: FetchDriver,
    X: ExtractDriver,
{
    /// Builds and tags every version in declaration order.
    ///
    /// # Errors
    /// Stops at the first version whose artifact can't be
    /// fetched or whose image can't be built or tagged.
    pub fn run(&self, descriptor: &Descriptor) -> Result<(), PipelineError> {
        trace!("BuildOrchestrator::run({})", descriptor.name);

        for version_tag in &descriptor.version_tags() {
            self.build_version(descriptor, version_tag)?;
        }

        info!("Finished building {}", descriptor.name);
        Ok(())
    }

    fn build_version(
        &self,
        descriptor: &Descriptor,
        version_tag: &VersionTag,
    ) -> Result<(), PipelineError> {
        let VersionTag { version, tags } = version_tag;
        info!("Building {} {version}", descriptor.name);

        let artifact_dir = self.cache.ensure(
            &descriptor.name,
            version,
            &descriptor.url_path,
            &descriptor.exclude,
        )?;

        let build_image = image_ref(&self.namespace, &descriptor.name, BUILD_TAG);

        self.driver.build(
            &BuildOpts::builder()
                .image(&build_image)
                .base_image(&descriptor.base_tag)
                .artifact_dir(self.context_relative(&artifact_dir))
                .context(&self.context)
                .build(),
        )?;

        for tag in tags {
            let image = image_ref(&self.namespace, &descriptor.name, tag);
            debug!("Tagging {build_image} as {image}");

            self.driver.tag(
                &TagOpts::builder()
                    .src_image(&build_image)
                    .dest_image(&image)
                    .build(),
            )?;
        }
        Ok(())
    }

    /// Build args are resolved against the build context, so the
    /// artifact dir is passed relative to it whenever it lives
    /// inside the context.
    fn context_relative<'a>(&self, artifact_dir: &'a Path) -> &'a Path {
        artifact_dir
            .strip_prefix(&self.context)
            .unwrap_or(artifact_dir)
    }
}

/// Pushes every tag of a descriptor that a build produced.
#[derive(Debug, Builder)]
pub struct DeployOrchestrator<D>
where
    D: BuildDriver,
{
    driver: D,

    #[builder(into, default = DEFAULT_REGISTRY_NAMESPACE.to_string())]
    namespace: String,
}

impl<D> DeployOrchestrator<D>
where
    D: BuildDriver,
{
    /// Pushes the tags of every version in declaration order.
    ///
    /// # Errors
    /// Stops at the first push that fails.
    pub fn run(&self, descriptor: &Descriptor) -> Result<(), PipelineError> {
        trace!("DeployOrchestrator::run({})", descriptor.name);

        for VersionTag { version, tags } in &descriptor.version_tags() {
            debug!("Pushing tags of {} {version}", descriptor.name);

            for tag in tags {
                self.driver.push(
                    &PushOpts::builder()
                        .image(image_ref(&self.namespace, &descriptor.name, tag))
                        .build(),
                )?;
            }
        }

        info!("Finished deploying {}", descriptor.name);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use flokkr_descriptor::Descriptor;
    use flokkr_utils::string_vec;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use crate::{
        cache::ArtifactCache,
        mirrors::MirrorResolver,
        test::{BuildCall, FakeBuildDriver, FakeExtractor, FakeFetcher},
    };

    use super::{image_ref, BuildOrchestrator, DeployOrchestrator};

    const MIRROR: &str = "https://mirror.example";

    #[fixture]
    fn descriptor() -> Descriptor {
        Descriptor::builder()
            .name("hadoop")
            .url_path("hadoop/common/hadoop-%s/hadoop-%s.tar.gz")
            .base_tag("flokkr/base:36")
            .versions(string_vec!["3.2.1", "3.2.0", "3.1.2"])
            .exclude(string_vec!["share/doc"])
            .build()
    }

    fn url(version: &str) -> String {
        format!("{MIRROR}/hadoop/common/hadoop-{version}/hadoop-{version}.tar.gz")
    }

    fn build_call(root: &TempDir, version: &str) -> BuildCall {
        BuildCall::Build {
            image: "flokkr/hadoop:build".into(),
            base_image: "flokkr/base:36".into(),
            artifact_dir: root.path().join("hadoop").join(version),
            context: PathBuf::from("docker"),
        }
    }

    fn tag_call(tag: &str) -> BuildCall {
        BuildCall::Tag {
            src_image: "flokkr/hadoop:build".into(),
            dest_image: format!("flokkr/hadoop:{tag}"),
        }
    }

    fn orchestrator<'a>(
        root: &TempDir,
        driver: &'a FakeBuildDriver,
        fetcher: &'a FakeFetcher,
        extractor: &'a FakeExtractor,
    ) -> BuildOrchestrator<&'a FakeBuildDriver, &'a FakeFetcher, &'a FakeExtractor> {
        BuildOrchestrator::builder()
            .driver(driver)
            .cache(
                ArtifactCache::builder()
                    .root(root.path())
                    .mirrors(
                        MirrorResolver::builder()
                            .mirrors(vec![MIRROR.to_string()])
                            .build(),
                    )
                    .fetcher(fetcher)
                    .extractor(extractor)
                    .build(),
            )
            .context("docker")
            .build()
    }

    #[rstest]
    #[case("flokkr", "hadoop", "3.2", "flokkr/hadoop:3.2")]
    #[case("flokkr", "hadoop", "build", "flokkr/hadoop:build")]
    #[case("registry.example/team", "spark", "latest", "registry.example/team/spark:latest")]
    #[case("", "hive", "3", "hive:3")]
    fn image_refs(
        #[case] namespace: &str,
        #[case] name: &str,
        #[case] tag: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(image_ref(namespace, name, tag), expected);
    }

    #[rstest]
    fn builds_and_tags_in_order(descriptor: Descriptor) {
        let root = TempDir::new().unwrap();
        let driver = FakeBuildDriver::default();
        let fetcher = FakeFetcher::default().available(["3.2.1", "3.2.0", "3.1.2"].map(url));
        let extractor = FakeExtractor::with_files(["bin/hadoop", "share/doc/index.html"]);

        orchestrator(&root, &driver, &fetcher, &extractor)
            .run(&descriptor)
            .unwrap();

        assert_eq!(
            driver.calls(),
            vec![
                build_call(&root, "3.2.1"),
                tag_call("latest"),
                tag_call("3.2.1"),
                tag_call("3.2"),
                tag_call("3"),
                build_call(&root, "3.2.0"),
                tag_call("3.2.0"),
                build_call(&root, "3.1.2"),
                tag_call("3.1.2"),
                tag_call("3.1"),
            ]
        );
        assert_eq!(fetcher.downloads(), 3);

        let artifact_dir = root.path().join("hadoop").join("3.2.0");
        assert!(artifact_dir.join("bin/hadoop").is_file());
        assert!(!artifact_dir.join("share/doc").exists());
    }

    #[rstest]
    fn cached_versions_are_not_fetched(descriptor: Descriptor) {
        let root = TempDir::new().unwrap();
        for version in ["3.2.1", "3.2.0", "3.1.2"] {
            std::fs::create_dir_all(root.path().join("hadoop").join(version)).unwrap();
        }
        let driver = FakeBuildDriver::default();
        let fetcher = FakeFetcher::default();
        let extractor = FakeExtractor::default();

        orchestrator(&root, &driver, &fetcher, &extractor)
            .run(&descriptor)
            .unwrap();

        assert!(fetcher.calls().is_empty());
        assert_eq!(driver.calls().len(), 10);
    }

    #[test]
    fn artifact_dir_is_relative_to_context() {
        let context = TempDir::new().unwrap();
        let root = context.path().join(".cache");
        let driver = FakeBuildDriver::default();
        let fetcher = FakeFetcher::default().available([url("3.2.1")]);
        let extractor = FakeExtractor::default();

        BuildOrchestrator::builder()
            .driver(&driver)
            .cache(
                ArtifactCache::builder()
                    .root(&root)
                    .mirrors(
                        MirrorResolver::builder()
                            .mirrors(vec![MIRROR.to_string()])
                            .build(),
                    )
                    .fetcher(&fetcher)
                    .extractor(&extractor)
                    .build(),
            )
            .context(context.path())
            .build()
            .run(
                &Descriptor::builder()
                    .name("hadoop")
                    .url_path("hadoop/common/hadoop-%s/hadoop-%s.tar.gz")
                    .base_tag("flokkr/base:36")
                    .versions(string_vec!["3.2.1"])
                    .build(),
            )
            .unwrap();

        assert_eq!(
            driver.calls()[0],
            BuildCall::Build {
                image: "flokkr/hadoop:build".into(),
                base_image: "flokkr/base:36".into(),
                artifact_dir: PathBuf::from(".cache/hadoop/3.2.1"),
                context: context.path().to_path_buf(),
            }
        );
    }

    #[rstest]
    fn fetch_failure_stops_build(descriptor: Descriptor) {
        let root = TempDir::new().unwrap();
        let driver = FakeBuildDriver::default();
        let fetcher = FakeFetcher::default().available([url("3.2.1")]);
        let extractor = FakeExtractor::default();

        let result = orchestrator(&root, &driver, &fetcher, &extractor).run(&descriptor);

        assert!(result.is_err());
        assert_eq!(
            driver.calls(),
            vec![
                build_call(&root, "3.2.1"),
                tag_call("latest"),
                tag_call("3.2.1"),
                tag_call("3.2"),
                tag_call("3"),
            ]
        );
    }

    #[rstest]
    fn tag_failure_stops_build(descriptor: Descriptor) {
        let root = TempDir::new().unwrap();
        let driver = FakeBuildDriver::failing_on(["flokkr/hadoop:3.2"]);
        let fetcher = FakeFetcher::default().available(["3.2.1", "3.2.0", "3.1.2"].map(url));
        let extractor = FakeExtractor::default();

        let result = orchestrator(&root, &driver, &fetcher, &extractor).run(&descriptor);

        assert!(result.is_err());
        assert_eq!(
            driver.calls(),
            vec![
                build_call(&root, "3.2.1"),
                tag_call("latest"),
                tag_call("3.2.1"),
                tag_call("3.2"),
            ]
        );
        assert_eq!(fetcher.downloads(), 1);
    }

    #[rstest]
    fn build_failure_skips_tagging(descriptor: Descriptor) {
        let root = TempDir::new().unwrap();
        let driver = FakeBuildDriver::failing_on(["flokkr/hadoop:build"]);
        let fetcher = FakeFetcher::default().available(["3.2.1", "3.2.0", "3.1.2"].map(url));
        let extractor = FakeExtractor::default();

        let result = orchestrator(&root, &driver, &fetcher, &extractor).run(&descriptor);

        assert!(result.is_err());
        assert_eq!(driver.calls(), vec![build_call(&root, "3.2.1")]);
    }

    #[rstest]
    fn deploys_every_tag(descriptor: Descriptor) {
        let driver = FakeBuildDriver::default();

        DeployOrchestrator::builder()
            .driver(&driver)
            .build()
            .run(&descriptor)
            .unwrap();

        assert_eq!(
            driver.calls(),
            [
                "latest", "3.2.1", "3.2", "3", "3.2.0", "3.1.2", "3.1",
            ]
            .map(|tag| BuildCall::Push(format!("flokkr/hadoop:{tag}")))
            .to_vec()
        );
    }

    #[rstest]
    fn push_failure_stops_deploy(descriptor: Descriptor) {
        let driver = FakeBuildDriver::failing_on(["flokkr/hadoop:3.2.0"]);

        let result = DeployOrchestrator::builder()
            .driver(&driver)
            .namespace("flokkr")
            .build()
            .run(&descriptor);

        assert!(result.is_err());
        assert_eq!(
            driver.calls().last(),
            Some(&BuildCall::Push("flokkr/hadoop:3.2.0".into()))
        );
        assert_eq!(driver.calls().len(), 5);
    }
}
