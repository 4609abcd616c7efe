// Paths
pub const DESCRIPTOR_FILE: &str = "flokkr.yaml";
pub const CACHE_PATH: &str = ".cache";
pub const CACHE_WORK_DIR: &str = "work";
pub const DOWNLOADED_ARCHIVE: &str = "downloaded.tar.gz";
pub const BUILD_CONTEXT_PATH: &str = ".";
pub const LOG_DIR: &str = ".cache/flokkr";

// Tags
pub const LATEST_TAG: &str = "latest";
pub const BUILD_TAG: &str = "build";
pub const DEFAULT_REGISTRY_NAMESPACE: &str = "flokkr";

// Build args
pub const ARTIFACT_DIR_ARG: &str = "ARTIFACTDIR";
pub const BASE_IMAGE_ARG: &str = "BASE";

// Mirrors
pub const APACHE_MIRROR_URL: &str = "https://www-eu.apache.org/dist/";
pub const APACHE_ARCHIVE_URL: &str = "https://archive.apache.org/dist/";
pub const DEFAULT_MIRRORS: [&str; 2] = [APACHE_MIRROR_URL, APACHE_ARCHIVE_URL];
pub const MIRROR_PATH_PLACEHOLDER: &str = "{path}";
pub const URL_PATH_PLACEHOLDER: &str = "%s";

// Flokkr vars
pub const FLOKKR_BUILD_DRIVER: &str = "FLOKKR_BUILD_DRIVER";
pub const FLOKKR_CACHE_DIR: &str = "FLOKKR_CACHE_DIR";
pub const FLOKKR_CONTEXT: &str = "FLOKKR_CONTEXT";
pub const FLOKKR_DESCRIPTOR: &str = "FLOKKR_DESCRIPTOR";
pub const FLOKKR_LOG_OUT: &str = "FLOKKR_LOG_OUT";
pub const FLOKKR_MIRRORS: &str = "FLOKKR_MIRRORS";
pub const FLOKKR_REGISTRY_NAMESPACE: &str = "FLOKKR_REGISTRY_NAMESPACE";
