// Re-export modules
pub mod browser;
pub mod collector;
pub mod config;
pub mod error;
pub mod parsers;
pub mod pipeline;
pub mod query;
pub mod results;
pub mod retriever;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export commonly used types for convenience
pub use config::{BrowserConfig, HarvestConfig};
pub use error::{FetchError, HarvestError, Result};
pub use query::{HarvestRequest, SearchFilters};
pub use results::{HarvestReport, RetrievalOutcome, StopReason};

use browser::{SessionLauncher, WebDriverLauncher};
use parsers::extract::LocatorPattern;
use pipeline::Plan;
use retriever::{Fetcher, HttpDownloader};
use std::future::Future;
use utils::sanitize_filename;

/// Resolves on SIGINT or SIGTERM. The handlers are registered when this is
/// called, not when the returned future is first polled.
#[cfg(unix)]
fn shutdown_signal() -> impl Future<Output = ()> {
    use tokio::signal::unix::{SignalKind, signal};

    let interrupt = signal(SignalKind::interrupt());
    let terminate = signal(SignalKind::terminate());
    async move {
        tokio::select! {
            _ = wait_for(interrupt, "SIGINT") => {}
            _ = wait_for(terminate, "SIGTERM") => {}
        }
    }
}

#[cfg(unix)]
async fn wait_for(listener: std::io::Result<tokio::signal::unix::Signal>, name: &str) {
    match listener {
        Ok(mut listener) => {
            listener.recv().await;
            ::log::warn!("Received {}", name);
        }
        Err(e) => {
            ::log::warn!("Cannot listen for {}: {}", name, e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
fn shutdown_signal() -> impl Future<Output = ()> {
    async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            ::log::warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Main builder for one harvest run
#[derive(Debug, Clone)]
pub struct Harvester {
    request: HarvestRequest,
    config: HarvestConfig,
    list_only: bool,
}

impl Harvester {
    /// Create a new Harvester for the given request with default configuration
    pub fn new(request: HarvestRequest) -> Self {
        Self {
            request,
            config: HarvestConfig::default(),
            list_only: false,
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: HarvestConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a file
    pub fn with_config_file(self, path: impl AsRef<std::path::Path>) -> Result<Self> {
        let config = HarvestConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a string
    pub fn with_config_str(self, config_str: &str) -> Result<Self> {
        let config = HarvestConfig::from_json(config_str)?;
        Ok(self.with_config(config))
    }

    /// Stop after extraction instead of downloading the located resources
    pub fn with_list_only(mut self, list_only: bool) -> Self {
        self.list_only = list_only;
        self
    }

    /// Run against a WebDriver browser, downloading over HTTP. Ctrl-C (and
    /// SIGTERM on unix) closes the browser before returning
    /// [`HarvestError::Interrupted`], including during the launch.
    pub async fn run(&self) -> Result<HarvestReport> {
        let shutdown = shutdown_signal();
        let downloader = HttpDownloader::new(&self.config.output_dir)?;

        self.run_with(&WebDriverLauncher, &downloader, shutdown)
            .await
    }

    /// Run with caller-supplied browser and fetch implementations.
    ///
    /// The search address and locator pattern are resolved first, so bad
    /// configuration fails before any browser is launched.
    pub async fn run_with<L, F, S>(
        &self,
        launcher: &L,
        fetcher: &F,
        shutdown: S,
    ) -> Result<HarvestReport>
    where
        L: SessionLauncher,
        F: Fetcher + ?Sized,
        S: Future<Output = ()>,
    {
        let pattern = match &self.config.locator_pattern {
            Some(pattern) => LocatorPattern::new(pattern)?,
            None => LocatorPattern::default(),
        };

        let plan = Plan {
            target_url: self.request.target_url(&self.config.search_url)?,
            label: sanitize_filename(&self.request.label()),
            count: self.request.count(),
            config: &self.config,
            pattern: &pattern,
            retrieve: !self.list_only,
        };

        pipeline::harvest(&plan, launcher, fetcher, shutdown).await
    }
}
