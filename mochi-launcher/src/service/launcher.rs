//! Pipeline Launcher
//!
//! Validates a trigger, submits the backtest job chain in dependency order and
//! records the launch parameters.

use chrono::Utc;
use mochi_core::domain::artifact::MarketDataKeys;
use mochi_core::domain::group_tag::GroupTag;
use mochi_core::domain::job::{JobId, JobRef};
use mochi_core::domain::parameters::ParameterRecord;
use mochi_core::domain::request::{PipelineRequest, ValidationError};
use mochi_core::domain::stage::{GraphScript, Stage};
use std::sync::Arc;
use thiserror::Error;

use crate::backend::{ArtifactStore, BackendError, BatchBackend};
use crate::config::LauncherConfig;
use crate::service::stages::{PlannedJob, StageContext};
use crate::service::{artifact_service, parameter_service};

/// Launch error type
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend refused a stage; everything in `submitted` stays queued
    #[error("failed to submit {stage} job for {group_tag}: {source}")]
    Submission {
        stage: Stage,
        group_tag: GroupTag,
        submitted: Vec<SubmittedJob>,
        #[source]
        source: BackendError,
    },
}

/// A job accepted by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedJob {
    pub stage: Stage,
    pub job_id: JobId,
}

/// What one launch produced
#[derive(Debug, Clone)]
pub struct LaunchReceipt {
    pub ticker: String,
    pub group_tag: GroupTag,
    pub ingest: JobRef,
    pub enhance: JobId,
    pub trades: JobId,
    /// Every submitted job, in submission order
    pub jobs: Vec<SubmittedJob>,
    pub parameters_persisted: bool,
}

impl LaunchReceipt {
    /// Job id submitted for a stage, if it was submitted
    pub fn job_for(&self, stage: Stage) -> Option<&JobId> {
        self.jobs
            .iter()
            .find(|job| job.stage == stage)
            .map(|job| &job.job_id)
    }
}

/// Submits backtest job chains
///
/// Holds only immutable configuration and shared backend handles, so one
/// instance serves concurrent launches.
#[derive(Clone)]
pub struct PipelineLauncher {
    config: Arc<LauncherConfig>,
    batch: Arc<dyn BatchBackend>,
    store: Arc<dyn ArtifactStore>,
}

impl PipelineLauncher {
    pub fn new(
        config: Arc<LauncherConfig>,
        batch: Arc<dyn BatchBackend>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            config,
            batch,
            store,
        }
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    /// Parse a raw trigger body and launch it
    pub async fn launch_event(&self, raw: &[u8]) -> Result<LaunchReceipt, LaunchError> {
        let request = PipelineRequest::from_slice(raw)?;
        self.launch(request).await
    }

    /// Launch a validated request under a fresh group tag
    pub async fn launch(&self, request: PipelineRequest) -> Result<LaunchReceipt, LaunchError> {
        self.launch_with_tag(request, GroupTag::generate()).await
    }

    /// Launch a validated request under the given group tag
    pub async fn launch_with_tag(
        &self,
        request: PipelineRequest,
        group_tag: GroupTag,
    ) -> Result<LaunchReceipt, LaunchError> {
        let buckets = &self.config.buckets;
        let keys = MarketDataKeys::for_ticker(&request.ticker);

        tracing::info!(
            "Launching backtest for {} ({} to {}) as {}",
            request.ticker,
            request.from_date,
            request.to_date,
            group_tag
        );

        let mut jobs = Vec::with_capacity(Stage::ORDER.len());
        let (ingest, enhance, trades) = {
            let ctx = StageContext::new(&self.config, &request, &group_tag, &keys);

            let data_present =
                artifact_service::all_artifacts_exist(self.store.as_ref(), &buckets.raw, &keys.all())
                    .await;

            let ingest = if data_present {
                tracing::info!(
                    "Market data for {} already present, skipping ingestion",
                    request.ticker
                );
                JobRef::Skipped
            } else {
                JobRef::Submitted(self.submit(ctx.ingest(), &group_tag, &mut jobs).await?)
            };

            let enhance = self.submit(ctx.enhance(&ingest), &group_tag, &mut jobs).await?;
            self.submit(ctx.metadata(&enhance), &group_tag, &mut jobs).await?;
            let trades = self.submit(ctx.simulate(&enhance), &group_tag, &mut jobs).await?;
            let aggregate = self.submit(ctx.aggregate(&trades), &group_tag, &mut jobs).await?;

            let years = ctx.graph(GraphScript::Years, &aggregate);
            self.submit(years, &group_tag, &mut jobs).await?;
            let stops = ctx.graph(GraphScript::Stops, &aggregate);
            self.submit(stops, &group_tag, &mut jobs).await?;
            let best = ctx.graph(GraphScript::BestTraders, &aggregate);
            let best_traders = self.submit(best, &group_tag, &mut jobs).await?;

            let extract = self.submit(ctx.extract(&best_traders), &group_tag, &mut jobs).await?;
            let lens = self.submit(ctx.lens(&extract), &group_tag, &mut jobs).await?;
            self.submit(ctx.summary(&lens), &group_tag, &mut jobs).await?;

            (ingest, enhance, trades)
        };

        tracing::info!(
            "Submitted {} jobs for {} under {}",
            jobs.len(),
            request.ticker,
            group_tag
        );

        let ticker = request.ticker.clone();
        let record = ParameterRecord::new(request, group_tag.clone(), Utc::now());
        let parameters_persisted = parameter_service::persist_parameters(
            self.store.as_ref(),
            &buckets.backtest_params,
            &record,
        )
        .await;

        Ok(LaunchReceipt {
            ticker,
            group_tag,
            ingest,
            enhance,
            trades,
            jobs,
            parameters_persisted,
        })
    }

    async fn submit(
        &self,
        planned: PlannedJob,
        group_tag: &GroupTag,
        jobs: &mut Vec<SubmittedJob>,
    ) -> Result<JobId, LaunchError> {
        let PlannedJob { stage, node } = planned;

        let job_id = self.batch.submit_job(&node).await.map_err(|source| {
            tracing::error!(
                "Submission of {} ({}) failed after {} jobs: {}",
                stage,
                node.name,
                jobs.len(),
                source
            );
            LaunchError::Submission {
                stage,
                group_tag: group_tag.clone(),
                submitted: jobs.clone(),
                source,
            }
        })?;

        tracing::debug!("Submitted {} as {} ({})", stage, node.name, job_id);

        jobs.push(SubmittedJob {
            stage,
            job_id: job_id.clone(),
        });

        Ok(job_id)
    }
}
