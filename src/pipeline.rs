//! The harvest pipeline: search → collect → extract → retrieve.
//!
//! Stages run sequentially on one session. The session is opened and closed
//! by [`with_session`], so every exit path out of the stages passes through
//! `SessionClosed`.

use crate::browser::{BrowserSession, SessionLauncher, with_session};
use crate::collector::{CollectOptions, collect};
use crate::config::HarvestConfig;
use crate::error::Result;
use crate::parsers::extract::{LocatorPattern, extract};
use crate::results::HarvestReport;
use crate::retriever::{Fetcher, retrieve};
use std::future::Future;
use url::Url;

/// Position of a run in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    SessionOpen,
    Collecting,
    Extracting,
    Retrieving,
    SessionClosed,
    Done,
}

fn enter(stage: PipelineStage) {
    ::log::debug!("Pipeline stage: {:?}", stage);
}

/// Everything a run needs, resolved before the browser is launched
#[derive(Debug, Clone)]
pub struct Plan<'a> {
    pub target_url: Url,
    /// File name prefix, already sanitized; also reported back as is
    pub label: String,
    pub count: usize,
    pub config: &'a HarvestConfig,
    pub pattern: &'a LocatorPattern,
    /// Fetch the located resources; when false the run stops after extraction
    pub retrieve: bool,
}

/// Run the whole pipeline on a fresh session from `launcher`
pub async fn harvest<L, F, S>(
    plan: &Plan<'_>,
    launcher: &L,
    fetcher: &F,
    shutdown: S,
) -> Result<HarvestReport>
where
    L: SessionLauncher,
    F: Fetcher + ?Sized,
    S: Future<Output = ()>,
{
    enter(PipelineStage::Idle);
    ::log::info!("Harvesting {} images from {}", plan.count, plan.target_url);

    let report = with_session(
        launcher,
        &plan.config.browser,
        shutdown,
        async |session: &mut L::Session| run_stages(plan, session, fetcher).await,
    )
    .await;

    enter(PipelineStage::SessionClosed);
    match &report {
        Ok(report) => ::log::info!(
            "Harvest complete: {} locators, {} saved, {} failed",
            report.locators.len(),
            report.saved(),
            report.failed()
        ),
        Err(e) => ::log::error!("Harvest failed: {}", e),
    }
    enter(PipelineStage::Done);

    report
}

async fn run_stages<B, F>(plan: &Plan<'_>, session: &mut B, fetcher: &F) -> Result<HarvestReport>
where
    B: BrowserSession + ?Sized,
    F: Fetcher + ?Sized,
{
    enter(PipelineStage::SessionOpen);
    session.goto(plan.target_url.as_str()).await?;

    enter(PipelineStage::Collecting);
    let options = CollectOptions::new(plan.config.selector.clone(), plan.count)
        .with_settle_delay(plan.config.browser.settle_delay())
        .with_stall_threshold(plan.config.stall_threshold)
        .with_max_reveals(plan.config.max_reveals);
    let collected = collect(session, &options).await?;

    enter(PipelineStage::Extracting);
    let locators = extract(&collected.fragments, plan.pattern);
    if locators.is_empty() {
        ::log::warn!("No locators matched in {} fragments", collected.fragments.len());
    }

    let outcomes = if plan.retrieve {
        enter(PipelineStage::Retrieving);
        retrieve(fetcher, &locators, &plan.label, plan.config.throttle()).await
    } else {
        Vec::new()
    };

    Ok(HarvestReport {
        target_url: plan.target_url.to_string(),
        label: plan.label.clone(),
        fragments: collected.fragments.len(),
        stop_reason: collected.stop_reason,
        locators,
        outcomes,
    })
}
