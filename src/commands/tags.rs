use std::io::{self, Write};

use bon::Builder;
use clap::Args;
use colored::Colorize;
use flokkr_descriptor::VersionTags;
use log::trace;
use miette::{IntoDiagnostic, Result};

use super::{DescriptorArgs, FlokkrCommand};

#[derive(Debug, Clone, Args, Builder)]
pub struct TagsCommand {
    #[clap(flatten)]
    pub descriptor: DescriptorArgs,

    /// Print the tags as JSON.
    #[arg(long)]
    #[builder(default)]
    pub json: bool,
}

impl FlokkrCommand for TagsCommand {
    fn try_run(&mut self) -> Result<()> {
        trace!("TagsCommand::try_run()");

        let version_tags = self.descriptor.load()?.version_tags();
        let output = if self.json {
            serde_json::to_string_pretty(&version_tags).into_diagnostic()?
        } else {
            render_table(&version_tags)
        };

        writeln!(io::stdout(), "{output}").into_diagnostic()
    }
}

fn render_table(version_tags: &VersionTags) -> String {
    let width = version_tags
        .iter()
        .map(|version_tag| version_tag.version.len())
        .max()
        .unwrap_or_default();

    version_tags
        .iter()
        .map(|version_tag| {
            format!(
                "{version:width$}  {tags}",
                version = version_tag.version.bold(),
                tags = version_tag.tags.join(", "),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
