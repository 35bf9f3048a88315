use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Why collection stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The page yielded at least the requested number of elements
    TargetReached,
    /// Consecutive reveal actions produced no new elements
    Stalled,
    /// The reveal action bound was hit while the page was still growing
    RevealLimit,
}

/// Result of fetching one located resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RetrievalOutcome {
    Saved {
        index: usize,
        url: String,
        path: PathBuf,
    },
    Failed {
        index: usize,
        url: String,
        error: String,
    },
}

impl RetrievalOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, RetrievalOutcome::Saved { .. })
    }
}

/// Summary of one harvest run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestReport {
    /// Search address the browser was sent to
    pub target_url: String,

    /// Prefix used for saved file names
    pub label: String,

    /// Number of fragments collected from the page
    pub fragments: usize,

    pub stop_reason: StopReason,

    /// Locators in document order, duplicates included
    pub locators: Vec<String>,

    /// One entry per locator when retrieval ran, empty in list-only mode
    pub outcomes: Vec<RetrievalOutcome>,
}

impl HarvestReport {
    pub fn saved(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_saved()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.saved()
    }
}
