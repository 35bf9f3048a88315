use crate::error::{FetchError, HarvestError, Result};
use crate::results::RetrievalOutcome;
use crate::utils::{extension_for_content_type, indexed_name};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::path::PathBuf;
use std::time::Duration;

/// Retrieves one resource and persists it under a caller-chosen name
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` and save it as `name`, returning where it was written
    async fn fetch(&self, url: &str, name: &str) -> std::result::Result<PathBuf, FetchError>;
}

/// Downloads over HTTP into a directory, adding an extension from the response content type
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: reqwest::Client,
    output_dir: PathBuf,
}

impl HttpDownloader {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("image-harvest/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| HarvestError::Config(format!("cannot build http client: {}", e)))?;

        Ok(Self {
            client,
            output_dir: output_dir.into(),
        })
    }
}

#[async_trait]
impl Fetcher for HttpDownloader {
    async fn fetch(&self, url: &str, name: &str) -> std::result::Result<PathBuf, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self
            .output_dir
            .join(file_name(name, content_type.as_deref()));
        tokio::fs::write(&path, &bytes).await?;

        ::log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}

/// `name` plus an extension when the content type is a known image type
fn file_name(name: &str, content_type: Option<&str>) -> String {
    match content_type.and_then(extension_for_content_type) {
        Some(ext) => format!("{}.{}", name, ext),
        None => name.to_string(),
    }
}

/// Fetch each locator in order, saving the one at index `i` as `${label}-${i}`.
///
/// `label` is used as given and must already be safe as a file name. `throttle`
/// is waited between consecutive fetches. A failed fetch is recorded and the
/// batch moves on to the next locator.
pub async fn retrieve<F>(
    fetcher: &F,
    locators: &[String],
    label: &str,
    throttle: Duration,
) -> Vec<RetrievalOutcome>
where
    F: Fetcher + ?Sized,
{
    let mut outcomes = Vec::with_capacity(locators.len());

    for (index, url) in locators.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(throttle).await;
        }

        let name = indexed_name(label, index);
        match fetcher.fetch(url, &name).await {
            Ok(path) => {
                ::log::info!("Saved {} as {}", url, path.display());
                outcomes.push(RetrievalOutcome::Saved {
                    index,
                    url: url.clone(),
                    path,
                });
            }
            Err(e) => {
                ::log::warn!("Failed to retrieve {}: {}", url, e);
                outcomes.push(RetrievalOutcome::Failed {
                    index,
                    url: url.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    outcomes
}
