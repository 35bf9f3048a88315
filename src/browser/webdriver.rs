use super::{BrowserSession, SessionLauncher};
use crate::config::BrowserConfig;
use crate::error::{HarvestError, Result};
use crate::parsers::html;
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use serde_json::{Map, Value, json};
use std::time::Duration;

const SCROLL_TO_END: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Endpoints tried when the configured WebDriver refuses a session
const FALLBACK_WEBDRIVER_URLS: [&str; 4] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4444", // geckodriver / Selenium default
    "http://127.0.0.1:4444",
    "http://127.0.0.1:9515",
];

/// Browser session backed by a `fantoccini` WebDriver client
pub struct WebDriverSession {
    client: Option<Client>,
    settle_delay: Duration,
}

impl WebDriverSession {
    pub fn new(client: Client, settle_delay: Duration) -> Self {
        Self {
            client: Some(client),
            settle_delay,
        }
    }

    fn client(&self) -> Result<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| HarvestError::Session("session already closed".to_string()))
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn goto(&mut self, url: &str) -> Result<()> {
        ::log::debug!("Navigating to {}", url);
        self.client()?.goto(url).await?;
        tokio::time::sleep(self.settle_delay).await;
        Ok(())
    }

    async fn select_outer_html(&mut self, selector: &str) -> Result<Vec<String>> {
        let source = self.client()?.source().await?;
        html::select_outer_html(&source, selector)
    }

    async fn reveal_more(&mut self) -> Result<()> {
        self.client()?.execute(SCROLL_TO_END, vec![]).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            client.close().await?;
        }
        Ok(())
    }
}

/// Launches sessions against a running WebDriver server
#[derive(Debug, Clone, Copy, Default)]
pub struct WebDriverLauncher;

#[async_trait]
impl SessionLauncher for WebDriverLauncher {
    type Session = WebDriverSession;

    async fn launch(&self, config: &BrowserConfig) -> Result<WebDriverSession> {
        let client = connect(config).await?;

        let viewport = config.viewport;
        if let Err(e) = client.set_window_size(viewport.width, viewport.height).await {
            // The session exists on the server; release it before failing
            if let Err(close_err) = client.close().await {
                ::log::warn!("Failed to close partially initialized session: {}", close_err);
            }
            return Err(e.into());
        }

        Ok(WebDriverSession::new(client, config.settle_delay()))
    }
}

/// Connects to the configured WebDriver, then to the fallback endpoints
async fn connect(config: &BrowserConfig) -> Result<Client> {
    let caps = capabilities(config);

    match ClientBuilder::native()
        .capabilities(caps.clone())
        .connect(&config.webdriver_url)
        .await
    {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", config.webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::warn!(
                "Failed to connect to WebDriver at {}: {}",
                config.webdriver_url,
                e
            );
        }
    }

    for url in FALLBACK_WEBDRIVER_URLS.iter() {
        if *url == config.webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = ClientBuilder::native()
            .capabilities(caps.clone())
            .connect(url)
            .await
        {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    Err(HarvestError::Session(format!(
        "no WebDriver server accepted a session (tried {} and fallbacks); \
         start one or set WEBDRIVER_URL",
        config.webdriver_url
    )))
}

/// Session capabilities for Chrome and Firefox drivers
fn capabilities(config: &BrowserConfig) -> Map<String, Value> {
    let viewport = config.viewport;
    let mut chrome_args = vec![format!(
        "--window-size={},{}",
        viewport.width, viewport.height
    )];
    let mut firefox_args = vec![
        format!("--width={}", viewport.width),
        format!("--height={}", viewport.height),
    ];

    if config.headless {
        chrome_args.push("--headless=new".to_string());
        chrome_args.push("--disable-gpu".to_string());
        firefox_args.push("-headless".to_string());
    }

    let mut caps = Map::new();
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": chrome_args }));
    caps.insert("moz:firefoxOptions".to_string(), json!({ "args": firefox_args }));
    caps
}
