//! The `flokkr` command line. Builds container images for every
//! version of a project listed in its `flokkr.yaml` and pushes them.

pub mod commands;
