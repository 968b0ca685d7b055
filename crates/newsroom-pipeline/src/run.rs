//! `PipelineRun`: the L1→L4 orchestrator tying the stage structs together
//! with bounded channels. Backpressure is the channel itself — a full
//! bounded `mpsc` blocks the upstream `send().await` rather than needing
//! a custom wrapper (spec §5: "bounded queues enforce backpressure").
//! Ordering is preserved per `article_id` by construction: an article only
//! reaches L3's window after its own L2 step has completed, and L3/L4 are
//! periodic batch stages over whatever has accumulated by the time they
//! run, never re-ordered relative to each other.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use newsroom_core::cancel::{CancelReason, CancellationToken};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::PipelineRunError;
use crate::retry::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BASE_MS};
use crate::runtime::PipelineRuntime;
use crate::source::SourceDescriptor;

const L1_L2_CHANNEL_CAPACITY: usize = 256;
const L2_L3_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Default, Clone)]
pub struct PipelineRunSummary {
    pub sources_attempted: usize,
    pub sources_failed: usize,
    pub articles_ingested: usize,
    pub articles_enriched: usize,
    pub indicator_values_emitted: usize,
    pub companies_with_insights: usize,
}

pub struct PipelineRun {
    runtime: Arc<PipelineRuntime>,
}

impl PipelineRun {
    pub fn new(runtime: Arc<PipelineRuntime>) -> Self {
        Self { runtime }
    }

    /// Runs one full L1→L4 pass over `sources`: every source is ingested
    /// concurrently (each internally permit-limited per source), enriched
    /// articles flow into the L3 window, then one L3 batch and one L4 run
    /// per configured company close out the pass.
    pub async fn run_once(&self, sources: &[SourceDescriptor], cancellation: &CancellationToken) -> PipelineRunSummary {
        let mut summary = PipelineRunSummary::default();
        if cancellation.is_cancelled() {
            return summary;
        }

        let (l1_tx, l1_rx) = mpsc::channel(L1_L2_CHANNEL_CAPACITY);
        let (l2_tx, mut l2_rx) = mpsc::channel(L2_L3_CHANNEL_CAPACITY);

        let ingest_handle = self.spawn_ingest(sources.to_vec(), l1_tx, cancellation.clone());
        let enrich_handle = self.spawn_enrich(l1_rx, l2_tx);

        while let Some(enriched) = l2_rx.recv().await {
            self.runtime.indicators.ingest(&enriched).await;
            summary.articles_enriched += 1;
        }

        let (attempted, failed, ingested) = ingest_handle.await.unwrap_or((sources.len(), sources.len(), 0));
        summary.sources_attempted = attempted;
        summary.sources_failed = failed;
        summary.articles_ingested = ingested;
        enrich_handle.await.ok();

        if cancellation.is_cancelled() {
            return summary;
        }

        match self.runtime.indicators.run_batch(Utc::now()).await {
            Ok(values) => summary.indicator_values_emitted = values.len(),
            Err(err) => warn!(error = %err, "indicator batch run failed"),
        }

        for company in &self.runtime.companies {
            match self.runtime.insights.run_for_company(company, Utc::now()).await {
                Ok(Some(_)) => summary.companies_with_insights += 1,
                Ok(None) => {}
                Err(err) => warn!(company_id = %company.company_id, error = %err, "insight run failed"),
            }
        }

        info!(?summary, "pipeline run complete");
        summary
    }

    fn spawn_ingest(
        &self,
        sources: Vec<SourceDescriptor>,
        out: mpsc::Sender<newsroom_common::RawArticle>,
        cancellation: CancellationToken,
    ) -> tokio::task::JoinHandle<(usize, usize, usize)> {
        let runtime = self.runtime.clone();
        tokio::spawn(async move {
            let mut attempted = 0usize;
            let mut failed = 0usize;
            let mut ingested = 0usize;

            let tasks = sources.into_iter().map(|source| {
                let runtime = runtime.clone();
                let out = out.clone();
                let cancellation = cancellation.clone();
                tokio::spawn(async move {
                    runtime
                        .ingest
                        .run_source(
                            &source,
                            false,
                            DEFAULT_MAX_RETRIES,
                            Duration::from_millis(DEFAULT_RETRY_BASE_MS),
                            &cancellation,
                            &out,
                        )
                        .await
                })
            });

            for task in tasks {
                attempted += 1;
                match task.await {
                    Ok(Ok(count)) => ingested += count,
                    Ok(Err(PipelineRunError::Cancelled(reason))) => {
                        info!(?reason, "ingest task observed cancellation");
                        failed += 1;
                    }
                    Ok(Err(err)) => {
                        warn!(error = %err, "source ingest failed");
                        failed += 1;
                    }
                    Err(join_err) => {
                        warn!(error = %join_err, "ingest task panicked");
                        failed += 1;
                    }
                }
            }

            (attempted, failed, ingested)
        })
    }

    fn spawn_enrich(
        &self,
        mut rx: mpsc::Receiver<newsroom_common::RawArticle>,
        out: mpsc::Sender<newsroom_common::EnrichedArticle>,
    ) -> tokio::task::JoinHandle<()> {
        let runtime = self.runtime.clone();
        tokio::spawn(async move {
            while let Some(raw) = rx.recv().await {
                if let Err(err) = runtime.enrich.process(raw, &out).await {
                    warn!(error = %err, "enrich stage failed for article");
                }
            }
        })
    }

    /// Runs continuously on `interval_seconds`, re-scraping every source
    /// each tick, until `cancellation` fires. Mirrors
    /// `LearningOrchestrator::spawn`'s `tokio::select!` shutdown shape.
    pub fn spawn_continuous(
        self: Arc<Self>,
        sources: Vec<SourceDescriptor>,
        cancellation: CancellationToken,
        interval_seconds: u64,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(interval_seconds));
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let summary = self.run_once(&sources, &cancellation).await;
                        info!(?summary, "continuous pipeline tick complete");
                    }
                    _ = cancellation.cancelled() => {
                        info!("pipeline run cancelled, stopping continuous loop");
                        break;
                    }
                }
            }
        })
    }
}

/// Requests cooperative shutdown of every task racing against
/// `cancellation`, per spec §5.
pub fn request_shutdown(cancellation: &CancellationToken) {
    cancellation.cancel(CancelReason::UserRequested);
}
