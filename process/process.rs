//! This module is responsible for turning a project descriptor into
//! images. It fetches and caches release archives from the mirrors
//! and drives the container tooling that builds, tags, and pushes
//! the images.

pub mod cache;
pub mod drivers;
pub mod error;
pub mod logging;
pub mod mirrors;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod test;
