use crate::error::{HarvestError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Browser window dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 800,
        }
    }
}

/// Configuration for launching the browser session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run without a visible window
    #[serde(default)]
    pub headless: bool,

    /// Settle delay after each page interaction, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    #[serde(default)]
    pub viewport: Viewport,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: false,
            delay_ms: default_delay_ms(),
            viewport: Viewport::default(),
        }
    }
}

impl BrowserConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Configuration for one harvest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Image search endpoint the query is resolved against
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// CSS selector for result elements
    #[serde(default = "default_selector")]
    pub selector: String,

    /// Regex overriding the built-in locator pattern. Must have one capture group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator_pattern: Option<String>,

    /// Directory retrieved files are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Delay between consecutive fetches, in milliseconds
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Consecutive reveal actions without growth before collection stops
    #[serde(default = "default_stall_threshold")]
    pub stall_threshold: usize,

    /// Upper bound on reveal actions per run
    #[serde(default = "default_max_reveals")]
    pub max_reveals: usize,

    #[serde(default)]
    pub browser: BrowserConfig,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            selector: default_selector(),
            locator_pattern: None,
            output_dir: default_output_dir(),
            throttle_ms: default_throttle_ms(),
            stall_threshold: default_stall_threshold(),
            max_reveals: default_max_reveals(),
            browser: BrowserConfig::default(),
        }
    }
}

impl HarvestConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| {
            HarvestError::Config(format!("cannot open {}: {}", path.display(), e))
        })?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Apply `WEBDRIVER_URL` from the environment if it is set and non-empty
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.browser.webdriver_url = webdriver_url;
            }
        }
        self
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_delay_ms() -> u64 {
    400
}

fn default_search_url() -> String {
    "https://www.google.com/search".to_string()
}

fn default_selector() -> String {
    "div#search img".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_throttle_ms() -> u64 {
    200
}

fn default_stall_threshold() -> usize {
    2
}

fn default_max_reveals() -> usize {
    200
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HarvestConfig::default();
        assert_eq!(config.selector, "div#search img");
        assert_eq!(config.throttle(), Duration::from_millis(200));
        assert_eq!(config.stall_threshold, 2);
        assert!(!config.browser.headless);
        assert_eq!(config.browser.settle_delay(), Duration::from_millis(400));
        assert_eq!(
            config.browser.viewport,
            Viewport {
                width: 1024,
                height: 800
            }
        );
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = HarvestConfig::from_json(
            r#"{"throttle_ms": 50, "browser": {"headless": true}}"#,
        )
        .unwrap();
        assert_eq!(config.throttle_ms, 50);
        assert!(config.browser.headless);
        assert_eq!(config.browser.webdriver_url, "http://localhost:4444");
        assert_eq!(config.browser.delay_ms, 400);
        assert_eq!(config.search_url, "https://www.google.com/search");
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        assert!(matches!(
            HarvestConfig::from_json("{not json"),
            Err(HarvestError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        assert!(matches!(
            HarvestConfig::from_file("/nonexistent/harvest.json"),
            Err(HarvestError::Config(_))
        ));
    }
}
