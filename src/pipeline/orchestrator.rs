use crate::app::ports::{ContactSource, ContactStoreOpener, RunTracker};
use crate::constants::NO_MATCHES_DESCRIPTION;
use crate::error::Result;
use crate::metrics;
use crate::pipeline::processing::eligibility::EligibilityFilter;
use crate::pipeline::storage::persister::ContactPersister;
use crate::types::{EligibleRecord, RunId, RunSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Stages a run moves through. Transitions only ever go forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStage {
    Start,
    Extracted,
    Filtered,
    Persisted,
    Reported,
    Done,
}

/// Result of one complete pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub success: bool,
    pub stages: Vec<RunStage>,
    pub extracted: usize,
    pub eligible: usize,
    pub inserted: usize,
    /// `None` when the tracker was never called
    pub reported: Option<bool>,
    pub duration: Duration,
}

impl RunReport {
    fn start(run_id: RunId) -> Self {
        Self {
            run_id,
            success: false,
            stages: vec![RunStage::Start],
            extracted: 0,
            eligible: 0,
            inserted: 0,
            reported: None,
            duration: Duration::ZERO,
        }
    }

    fn advance(&mut self, stage: RunStage) {
        debug!("Run {} entering stage {:?}", self.run_id, stage);
        self.stages.push(stage);
    }

    pub fn final_stage(&self) -> RunStage {
        self.stages.last().copied().unwrap_or(RunStage::Start)
    }
}

/// Sequences extract, filter, persist and report for a single run.
pub struct Orchestrator {
    source: Arc<dyn ContactSource>,
    filter: EligibilityFilter,
    persister: ContactPersister,
    store_opener: Arc<dyn ContactStoreOpener>,
    tracker: Arc<dyn RunTracker>,
}

impl Orchestrator {
    pub fn new(
        source: Arc<dyn ContactSource>,
        filter: EligibilityFilter,
        store_opener: Arc<dyn ContactStoreOpener>,
        tracker: Arc<dyn RunTracker>,
    ) -> Self {
        Self {
            source,
            filter,
            persister: ContactPersister::new(),
            store_opener,
            tracker,
        }
    }

    pub async fn run(&self) -> RunReport {
        self.run_with_id(RunId::new()).await
    }

    /// Runs the pipeline once. Never returns an error: failures end the run
    /// with `success == false`, reporting failures are logged only.
    #[instrument(name = "run", skip(self, run_id), fields(run_id = %run_id))]
    pub async fn run_with_id(&self, run_id: RunId) -> RunReport {
        let timer = Instant::now();
        let run_started_at = Utc::now();
        let mut report = RunReport::start(run_id);
        info!("Starting ETL run {}", run_id);

        // Step 1: extract
        let raw = match self.source.extract().await {
            Ok(raw) => raw,
            Err(e) => {
                error!("Extraction failed: {}", e);
                return Self::finish(report, false, timer);
            }
        };
        report.extracted = raw.len();
        metrics::record_extracted(raw.len());
        if raw.is_empty() {
            warn!("No contacts extracted, ending run");
            return Self::finish(report, false, timer);
        }
        report.advance(RunStage::Extracted);

        // Step 2: filter
        let eligible = self.filter.filter(&raw);
        report.eligible = eligible.len();
        metrics::record_eligible(eligible.len());
        report.advance(RunStage::Filtered);

        if eligible.is_empty() {
            warn!("No contacts match filtering criteria");
            let summary = RunSummary::new(run_id, 0, NO_MATCHES_DESCRIPTION);
            self.report(&mut report, &summary).await;
            return Self::finish(report, true, timer);
        }

        // Step 3: persist
        let inserted = match self.persist(&eligible, run_id, run_started_at).await {
            Ok(inserted) => inserted,
            Err(e) => {
                error!("Persistence failed: {}", e);
                return Self::finish(report, false, timer);
            }
        };
        report.inserted = inserted;
        report.advance(RunStage::Persisted);

        // Step 4: report
        let summary = RunSummary::new(
            run_id,
            inserted,
            format!("ETL run {run_id} - inserted {inserted} contacts"),
        );
        self.report(&mut report, &summary).await;

        Self::finish(report, true, timer)
    }

    /// Opens the store for this run only; the handle is dropped on every path out.
    async fn persist(
        &self,
        eligible: &[EligibleRecord],
        run_id: RunId,
        run_started_at: DateTime<Utc>,
    ) -> Result<usize> {
        let store = self.store_opener.open().await?;
        let result = self
            .persister
            .persist(store.as_ref(), eligible, run_id, run_started_at)
            .await;
        drop(store);
        debug!("Store connection released");
        result
    }

    async fn report(&self, report: &mut RunReport, summary: &RunSummary) {
        match self.tracker.register(summary).await {
            Ok(()) => {
                info!("Run registered with tracker ({} records)", summary.count);
                report.reported = Some(true);
            }
            Err(e) => {
                error!("Failed to register run with tracker: {}", e);
                metrics::record_reporting_failure();
                report.reported = Some(false);
            }
        }
        report.advance(RunStage::Reported);
    }

    fn finish(mut report: RunReport, success: bool, timer: Instant) -> RunReport {
        report.success = success;
        report.duration = timer.elapsed();
        report.advance(RunStage::Done);
        metrics::record_run(success, report.duration.as_secs_f64());

        if success {
            info!(
                run_id = %report.run_id,
                extracted = report.extracted,
                eligible = report.eligible,
                inserted = report.inserted,
                reported = ?report.reported,
                duration_secs = report.duration.as_secs_f64(),
                "ETL run completed"
            );
        } else {
            error!(
                run_id = %report.run_id,
                extracted = report.extracted,
                duration_secs = report.duration.as_secs_f64(),
                "ETL run failed"
            );
        }
        report
    }
}
