//! Browser session lifecycle.
//!
//! A session is opened by a [`SessionLauncher`] and must be closed exactly
//! once. [`with_session`] is the only place the pipeline acquires one: it
//! runs the caller's work and then closes the session whether the work
//! returned, failed, panicked, or was interrupted by the shutdown signal.

pub mod webdriver;

use crate::config::BrowserConfig;
use crate::error::{HarvestError, Result};
use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

pub use webdriver::{WebDriverLauncher, WebDriverSession};

/// A live handle to one browser page, owned by a single harvest run
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigate the page to `url`
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// Outer markup of every element currently matching `selector`, in document order
    async fn select_outer_html(&mut self, selector: &str) -> Result<Vec<String>>;

    /// Ask the page for more content (scroll to the end of the document)
    async fn reveal_more(&mut self) -> Result<()>;

    /// Terminate the browser. Calling it on an already closed session is a no-op.
    async fn close(&mut self) -> Result<()>;
}

/// Opens browser sessions
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    type Session: BrowserSession;

    async fn launch(&self, config: &BrowserConfig) -> Result<Self::Session>;
}

/// Acquire a session, run `work` on it, and always release it.
///
/// `shutdown` is watched from the start of the launch. If it completes while
/// the launch is still in flight, the launch is allowed to finish so the new
/// session can be closed, `work` never runs, and
/// [`HarvestError::Interrupted`] is returned. If it completes during `work`
/// the work is dropped, the session is closed and `Interrupted` is returned.
/// A panic inside `work` is caught, the session closed, and the panic
/// reported as [`HarvestError::Panicked`]. A failed close is logged and does
/// not replace the work's own result.
pub async fn with_session<L, F, T, S>(
    launcher: &L,
    config: &BrowserConfig,
    shutdown: S,
    work: F,
) -> Result<T>
where
    L: SessionLauncher,
    F: AsyncFnOnce(&mut L::Session) -> Result<T>,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let launch = launcher.launch(config);
    tokio::pin!(launch);
    let launched = tokio::select! {
        launched = &mut launch => Some(launched),
        _ = &mut shutdown => None,
    };

    // Launch failures leave nothing behind to close
    let mut session = match launched {
        Some(launched) => launched?,
        None => {
            ::log::warn!("Shutdown requested during launch, closing the new session");
            let mut session = launch.await?;
            release(&mut session).await;
            return Err(HarvestError::Interrupted);
        }
    };
    ::log::info!("Browser session open");

    let outcome = {
        let guarded = AssertUnwindSafe(work(&mut session)).catch_unwind();
        tokio::select! {
            result = guarded => match result {
                Ok(result) => result,
                Err(panic) => {
                    let message = panic_message(&*panic);
                    ::log::error!("Harvest stage panicked: {}", message);
                    Err(HarvestError::Panicked(message))
                }
            },
            _ = &mut shutdown => {
                ::log::warn!("Shutdown requested, abandoning harvest");
                Err(HarvestError::Interrupted)
            }
        }
    };

    release(&mut session).await;

    outcome
}

async fn release<B: BrowserSession>(session: &mut B) {
    match session.close().await {
        Ok(()) => ::log::info!("Browser session closed"),
        Err(e) => ::log::warn!("Failed to close browser session: {}", e),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockLauncher, MockSession};
    use std::future::pending;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_close_after_success() {
        let launcher = MockLauncher::new(MockSession::with_counts(vec![1]));
        let result = with_session(
            &launcher,
            &BrowserConfig::default(),
            pending(),
            async |session: &mut MockSession| session.goto("https://example.com").await.map(|_| 7),
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(launcher.opens(), 1);
        assert_eq!(launcher.closes(), 1);
    }

    #[tokio::test]
    async fn test_close_after_error() {
        let launcher = MockLauncher::new(MockSession::with_counts(vec![1]));
        let result: Result<()> = with_session(
            &launcher,
            &BrowserConfig::default(),
            pending(),
            async |_session: &mut MockSession| -> Result<()> {
                Err(HarvestError::Selector("div[".to_string()))
            },
        )
        .await;

        assert!(matches!(result, Err(HarvestError::Selector(_))));
        assert_eq!(launcher.closes(), 1);
    }

    #[tokio::test]
    async fn test_close_after_panic() {
        let launcher = MockLauncher::new(MockSession::with_counts(vec![1]));
        let result: Result<()> = with_session(
            &launcher,
            &BrowserConfig::default(),
            pending(),
            async |_session: &mut MockSession| -> Result<()> { panic!("collector blew up") },
        )
        .await;

        match result {
            Err(HarvestError::Panicked(message)) => assert_eq!(message, "collector blew up"),
            other => panic!("expected panic error, got {:?}", other),
        }
        assert_eq!(launcher.closes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_after_shutdown() {
        let launcher = MockLauncher::new(MockSession::with_counts(vec![1]));
        let result: Result<()> = with_session(
            &launcher,
            &BrowserConfig::default(),
            tokio::time::sleep(Duration::from_millis(10)),
            async |_session: &mut MockSession| {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            },
        )
        .await;

        assert!(matches!(result, Err(HarvestError::Interrupted)));
        assert_eq!(launcher.closes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_during_slow_launch() {
        let launcher = MockLauncher::new(MockSession::with_counts(vec![1]))
            .with_launch_delay(Duration::from_secs(60));
        let ran = AtomicBool::new(false);
        let result: Result<()> = with_session(
            &launcher,
            &BrowserConfig::default(),
            tokio::time::sleep(Duration::from_millis(10)),
            async |_session: &mut MockSession| {
                ran.store(true, Ordering::SeqCst);
                Ok(())
            },
        )
        .await;

        assert!(matches!(result, Err(HarvestError::Interrupted)));
        assert!(!ran.load(Ordering::SeqCst));
        assert_eq!(launcher.opens(), 1);
        assert_eq!(launcher.closes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_during_failed_launch() {
        let launcher = MockLauncher::failing().with_launch_delay(Duration::from_secs(60));
        let result: Result<()> = with_session(
            &launcher,
            &BrowserConfig::default(),
            tokio::time::sleep(Duration::from_millis(10)),
            async |_session: &mut MockSession| Ok(()),
        )
        .await;

        assert!(matches!(result, Err(HarvestError::Session(_))));
        assert_eq!(launcher.closes(), 0);
    }

    #[tokio::test]
    async fn test_failed_launch_closes_nothing() {
        let launcher = MockLauncher::failing();
        let result: Result<()> = with_session(
            &launcher,
            &BrowserConfig::default(),
            pending(),
            async |_session: &mut MockSession| Ok(()),
        )
        .await;

        assert!(matches!(result, Err(HarvestError::Session(_))));
        assert_eq!(launcher.opens(), 0);
        assert_eq!(launcher.closes(), 0);
    }
}
