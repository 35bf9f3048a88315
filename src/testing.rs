//! Scripted browser and fetcher doubles for unit tests.

use crate::browser::{BrowserSession, SessionLauncher};
use crate::config::BrowserConfig;
use crate::error::{FetchError, HarvestError, Result};
use crate::retriever::Fetcher;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Session operation a fault can be injected into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Navigate,
    Select,
    Reveal,
}

pub fn result_fragment(i: usize) -> String {
    format!(r#"<img src="https://images.example.com/result-{}.jpg" alt="">"#, i)
}

/// A page whose matching-element count follows a fixed schedule.
///
/// Read `k` returns the first `counts[k]` fragments of the page; reads past
/// the end of the schedule repeat its last entry.
#[derive(Debug, Clone)]
pub struct MockSession {
    page: Vec<String>,
    counts: Vec<usize>,
    reads: usize,
    reveals: Arc<AtomicUsize>,
    visited: Arc<Mutex<Vec<String>>>,
    fail_at: Option<Stage>,
    panic_at: Option<Stage>,
    closes: Arc<AtomicUsize>,
}

impl MockSession {
    pub fn with_counts(counts: Vec<usize>) -> Self {
        let size = counts.iter().copied().max().unwrap_or(0);
        Self::with_page((0..size).map(result_fragment).collect(), counts)
    }

    pub fn with_page(page: Vec<String>, counts: Vec<usize>) -> Self {
        Self {
            page,
            counts,
            reads: 0,
            reveals: Arc::new(AtomicUsize::new(0)),
            visited: Arc::new(Mutex::new(Vec::new())),
            fail_at: None,
            panic_at: None,
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn fail_at(mut self, stage: Stage) -> Self {
        self.fail_at = Some(stage);
        self
    }

    pub fn panic_at(mut self, stage: Stage) -> Self {
        self.panic_at = Some(stage);
        self
    }

    pub fn reveal_calls(&self) -> usize {
        self.reveals.load(Ordering::SeqCst)
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    fn check(&self, stage: Stage) -> Result<()> {
        if self.panic_at == Some(stage) {
            panic!("injected panic at {:?}", stage);
        }
        if self.fail_at == Some(stage) {
            return Err(HarvestError::Session(format!("injected failure at {:?}", stage)));
        }
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for MockSession {
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.check(Stage::Navigate)?;
        self.visited.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn select_outer_html(&mut self, _selector: &str) -> Result<Vec<String>> {
        self.check(Stage::Select)?;
        let count = self
            .counts
            .get(self.reads)
            .or(self.counts.last())
            .copied()
            .unwrap_or(0)
            .min(self.page.len());
        self.reads += 1;
        Ok(self.page[..count].to_vec())
    }

    async fn reveal_more(&mut self) -> Result<()> {
        self.check(Stage::Reveal)?;
        self.reveals.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out clones of a template session and counts opens and closes
#[derive(Debug)]
pub struct MockLauncher {
    template: Option<MockSession>,
    launch_delay: Duration,
    opens: AtomicUsize,
    closes: Arc<AtomicUsize>,
}

impl MockLauncher {
    pub fn new(template: MockSession) -> Self {
        let closes = Arc::clone(&template.closes);
        Self {
            template: Some(template),
            launch_delay: Duration::ZERO,
            opens: AtomicUsize::new(0),
            closes,
        }
    }

    /// A launcher whose browser never starts
    pub fn failing() -> Self {
        Self {
            template: None,
            launch_delay: Duration::ZERO,
            opens: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Take `delay` to start the browser, like a slow WebDriver handshake
    pub fn with_launch_delay(mut self, delay: Duration) -> Self {
        self.launch_delay = delay;
        self
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn template(&self) -> Option<&MockSession> {
        self.template.as_ref()
    }
}

#[async_trait]
impl SessionLauncher for MockLauncher {
    type Session = MockSession;

    async fn launch(&self, _config: &BrowserConfig) -> Result<MockSession> {
        tokio::time::sleep(self.launch_delay).await;
        match &self.template {
            Some(template) => {
                self.opens.fetch_add(1, Ordering::SeqCst);
                Ok(template.clone())
            }
            None => Err(HarvestError::Session("browser failed to start".to_string())),
        }
    }
}

/// Records every fetch; fails or panics on request
#[derive(Debug, Default)]
pub struct MockFetcher {
    fail: HashSet<String>,
    panic: bool,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(urls: &[&str]) -> Self {
        Self {
            fail: urls.iter().map(|u| u.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn panicking() -> Self {
        Self {
            panic: true,
            ..Self::default()
        }
    }

    /// Names passed to `fetch`, in call order
    pub fn names(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str, name: &str) -> std::result::Result<PathBuf, FetchError> {
        if self.panic {
            panic!("injected panic fetching {}", url);
        }
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), Instant::now()));
        if self.fail.contains(url) {
            return Err(FetchError::Status(404));
        }
        Ok(PathBuf::from(name))
    }
}
