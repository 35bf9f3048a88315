use thiserror::Error;

/// Errors that abort a harvest run
#[derive(Error, Debug)]
pub enum HarvestError {
    /// Required input missing or malformed; raised before any browser is launched
    #[error("usage: {0}")]
    Usage(String),

    /// No WebDriver endpoint would open a session
    #[error("failed to open browser session: {0}")]
    Session(String),

    /// The open session failed to navigate, read the page, or run a script
    #[error("browser command failed: {0}")]
    Navigation(#[from] fantoccini::error::CmdError),

    #[error("invalid selector `{0}`")]
    Selector(String),

    #[error("invalid locator pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("configuration error: {0}")]
    Config(String),

    /// A shutdown signal arrived while the session was open
    #[error("interrupted")]
    Interrupted,

    #[error("harvest stage panicked: {0}")]
    Panicked(String),
}

impl HarvestError {
    /// Process exit code the binary reports for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            HarvestError::Usage(_) => 2,
            HarvestError::Interrupted => 130,
            _ => 1,
        }
    }
}

impl From<std::io::Error> for HarvestError {
    fn from(e: std::io::Error) -> Self {
        HarvestError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for HarvestError {
    fn from(e: serde_json::Error) -> Self {
        HarvestError::Config(e.to_string())
    }
}

/// Failure to retrieve a single resource. Recorded per item, never fatal to a batch.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded with status {0}")]
    Status(u16),

    #[error("failed to save: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HarvestError>;
