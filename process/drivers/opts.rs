use std::{borrow::Cow, path::Path};

use bon::Builder;

/// Options for building
#[derive(Debug, Clone, Builder)]
pub struct BuildOpts<'scope> {
    /// The full image ref the build is tagged with.
    #[builder(into)]
    pub image: Cow<'scope, str>,

    /// Passed to the Dockerfile as the `BASE` build arg.
    #[builder(into)]
    pub base_image: Cow<'scope, str>,

    /// Passed to the Dockerfile as the `ARTIFACTDIR` build arg.
    #[builder(into)]
    pub artifact_dir: Cow<'scope, Path>,

    /// The directory holding the Dockerfile.
    #[builder(into)]
    pub context: Cow<'scope, Path>,
}

#[derive(Debug, Clone, Builder)]
pub struct TagOpts<'scope> {
    #[builder(into)]
    pub src_image: Cow<'scope, str>,

    #[builder(into)]
    pub dest_image: Cow<'scope, str>,
}

#[derive(Debug, Clone, Builder)]
pub struct PushOpts<'scope> {
    #[builder(into)]
    pub image: Cow<'scope, str>,
}

/// Options for unpacking a release archive.
#[derive(Debug, Clone, Builder)]
pub struct ExtractOpts<'scope> {
    #[builder(into)]
    pub archive: Cow<'scope, Path>,

    #[builder(into)]
    pub dest: Cow<'scope, Path>,

    /// Number of leading path components dropped from
    /// every entry. Release tarballs wrap everything in
    /// a single top-level directory.
    #[builder(default = 1)]
    pub strip_components: usize,
}
