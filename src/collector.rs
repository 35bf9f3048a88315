//! Incremental collection of result markup from an open page.
//!
//! Collection is a small state machine: read the matching elements, stop if
//! a termination predicate holds, otherwise reveal more content, let it
//! settle, and read again. Three predicates end the loop:
//!
//! * the target count is reached
//! * `stall_threshold` consecutive reveals added no elements
//! * `max_reveals` reveal actions have been issued

use crate::browser::BrowserSession;
use crate::error::Result;
use crate::results::StopReason;
use std::time::Duration;

/// Parameters for one collection run
#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub selector: String,
    pub target_count: usize,
    pub settle_delay: Duration,
    pub stall_threshold: usize,
    pub max_reveals: usize,
}

impl CollectOptions {
    pub fn new(selector: impl Into<String>, target_count: usize) -> Self {
        Self {
            selector: selector.into(),
            target_count,
            settle_delay: Duration::from_millis(400),
            stall_threshold: 2,
            max_reveals: 200,
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Consecutive no-growth reveals tolerated before giving up. Clamped to at least 1.
    pub fn with_stall_threshold(mut self, threshold: usize) -> Self {
        self.stall_threshold = threshold.max(1);
        self
    }

    pub fn with_max_reveals(mut self, max_reveals: usize) -> Self {
        self.max_reveals = max_reveals;
        self
    }
}

/// What a collection run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collected {
    /// Outer markup in document order, at most `target_count` entries
    pub fragments: Vec<String>,
    pub stop_reason: StopReason,
    /// Reveal actions issued
    pub reveals: usize,
}

#[derive(Debug)]
enum Step {
    Read,
    Reveal,
    Done(StopReason),
}

/// Collect up to `options.target_count` fragments from the page `session` is on
pub async fn collect<S>(session: &mut S, options: &CollectOptions) -> Result<Collected>
where
    S: BrowserSession + ?Sized,
{
    let mut fragments: Vec<String> = Vec::new();
    let mut reveals = 0;
    let mut stalled = 0;
    let mut seen_first_read = false;
    let mut step = Step::Read;

    let stop_reason = loop {
        step = match step {
            Step::Read => {
                let current = session.select_outer_html(&options.selector).await?;
                if seen_first_read {
                    if current.len() > fragments.len() {
                        stalled = 0;
                    } else {
                        stalled += 1;
                    }
                }
                seen_first_read = true;
                ::log::debug!(
                    "Collected {} of {} (reveals: {}, stalled: {})",
                    current.len(),
                    options.target_count,
                    reveals,
                    stalled
                );
                fragments = current;

                if fragments.len() >= options.target_count {
                    Step::Done(StopReason::TargetReached)
                } else if stalled >= options.stall_threshold {
                    Step::Done(StopReason::Stalled)
                } else if reveals >= options.max_reveals {
                    Step::Done(StopReason::RevealLimit)
                } else {
                    Step::Reveal
                }
            }
            Step::Reveal => {
                session.reveal_more().await?;
                reveals += 1;
                tokio::time::sleep(options.settle_delay).await;
                Step::Read
            }
            Step::Done(reason) => break reason,
        };
    };

    fragments.truncate(options.target_count);
    ::log::info!(
        "Collection finished with {} fragments after {} reveals ({:?})",
        fragments.len(),
        reveals,
        stop_reason
    );

    Ok(Collected {
        fragments,
        stop_reason,
        reveals,
    })
}
