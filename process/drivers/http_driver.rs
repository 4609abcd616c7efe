use std::{fs::File, path::Path, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, trace};
use reqwest::{blocking::Client, StatusCode};

use crate::{error::PipelineError, logging::Logger};

use super::FetchDriver;

/// Probes and downloads release archives over HTTP.
///
/// Requests are never timed out, large archives on slow
/// mirrors take as long as they take.
#[derive(Debug, Clone)]
pub struct HttpDriver {
    client: Client,
}

impl HttpDriver {
    /// # Errors
    /// Will error if the HTTP client can't be created.
    pub fn new() -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(None)
            .build()
            .map_err(|e| PipelineError::HttpClient(e.into()))?;
        Ok(Self { client })
    }
}

impl FetchDriver for HttpDriver {
    fn probe(&self, url: &str) -> Result<bool, PipelineError> {
        trace!("HttpDriver::probe({url})");

        let response = self
            .client
            .head(url)
            .send()
            .map_err(PipelineError::transport(url))?;

        debug!("HEAD {url} => {}", response.status());
        Ok(response.status() == StatusCode::OK)
    }

    fn download(&self, url: &str, dest: &Path) -> Result<(), PipelineError> {
        trace!("HttpDriver::download({url}, {})", dest.display());

        let mut response = self
            .client
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(PipelineError::transport(url))?;

        let file = File::create(dest).map_err(PipelineError::fs("create", dest))?;

        let progress = Logger::multi_progress().add(
            response
                .content_length()
                .map_or_else(ProgressBar::new_spinner, ProgressBar::new)
                .with_style(
                    ProgressStyle::with_template(
                        "{spinner} {msg} [{bar:30}] {bytes}/{total_bytes} ({bytes_per_sec})",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                )
                .with_message(format!("Downloading {url}")),
        );
        progress.enable_steady_tick(Duration::from_millis(100));

        let copied = response.copy_to(&mut progress.wrap_write(file));

        progress.finish();
        Logger::multi_progress().remove(&progress);

        let bytes = copied.map_err(PipelineError::transport(url))?;
        info!("Downloaded {bytes} bytes from {url}");
        Ok(())
    }
}
