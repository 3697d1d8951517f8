//! Scouting sessions: paced generation of a batch of jobs.
//!
//! One session at a time. Each generated job is prepended to the store and its
//! pipeline is spawned without waiting for it; the session only paces generation.
//! Cancelling stops generation at the next iteration and leaves the pipelines that
//! already started running to completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::config::ScoutConfig;
use crate::errors::AppError;
use crate::models::job::SearchCriteria;
use crate::scouting::generator::{generate_mock_job, new_job_id};
use crate::scouting::pipeline::{process_job_pipeline, PipelineContext, PipelineOutcome};

pub struct Scout {
    ctx: PipelineContext,
    config: ScoutConfig,
    active: Arc<AtomicBool>,
    cancel: AtomicBool,
}

/// Proof that the caller holds the single session slot. Dropping it frees the slot.
pub struct SessionGuard {
    active: Arc<AtomicBool>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

/// Pipelines spawned by a session, still running or finished.
pub struct PipelineTracker {
    tasks: JoinSet<PipelineOutcome>,
}

impl PipelineTracker {
    fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
        }
    }

    /// Waits for every pipeline. Outcomes arrive in completion order.
    pub async fn join_all(mut self) -> Vec<PipelineOutcome> {
        let mut outcomes = Vec::with_capacity(self.tasks.len());
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => error!("Pipeline task aborted: {e}"),
            }
        }
        outcomes
    }
}

pub struct SessionReport {
    /// Generated job ids in generation order.
    pub job_ids: Vec<String>,
    pub cancelled: bool,
    pub tracker: PipelineTracker,
}

impl Scout {
    pub fn new(ctx: PipelineContext, config: ScoutConfig) -> Self {
        Self {
            ctx,
            config,
            active: Arc::new(AtomicBool::new(false)),
            cancel: AtomicBool::new(false),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    /// Claims the session slot. Fails with `Conflict` while another session is generating.
    pub fn begin(&self) -> Result<SessionGuard, AppError> {
        self.active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| AppError::Conflict("A scouting session is already active".to_string()))?;
        self.cancel.store(false, Ordering::SeqCst);
        Ok(SessionGuard {
            active: Arc::clone(&self.active),
        })
    }

    /// Stops generation after the current iteration. Returns whether a session was running.
    pub fn cancel(&self) -> bool {
        self.cancel.store(true, Ordering::SeqCst);
        self.is_active()
    }

    /// Generates up to `batch_size` jobs. Returns once generation stops; the
    /// returned tracker holds the pipelines, which may still be running.
    pub async fn run_scouting_session(
        &self,
        guard: SessionGuard,
        criteria: SearchCriteria,
    ) -> SessionReport {
        let resume_text: Arc<str> = Arc::from(criteria.resume_text.as_str());
        let mut tracker = PipelineTracker::new();
        let mut job_ids = Vec::with_capacity(self.config.batch_size);
        let mut cancelled = false;

        info!(
            "Scouting session started: title={:?} location={:?} remote={} batch={}",
            criteria.job_title, criteria.location, criteria.is_remote, self.config.batch_size
        );

        for _ in 0..self.config.batch_size {
            if self.cancel.load(Ordering::SeqCst) {
                cancelled = true;
                break;
            }

            let job = {
                let mut rng = rand::thread_rng();
                let mut job = generate_mock_job(&criteria, &mut rng);
                while self.ctx.store.contains(&job.id) {
                    job.id = new_job_id(&mut rng);
                }
                job
            };
            let job_id = job.id.clone();
            info!("Scouted job {job_id}: {} at {}", job.title, job.company);
            self.ctx.store.prepend(job);
            job_ids.push(job_id.clone());

            let ctx = self.ctx.clone();
            let resume_text = Arc::clone(&resume_text);
            tracker
                .tasks
                .spawn(async move { process_job_pipeline(&ctx, &job_id, &resume_text).await });

            tokio::time::sleep(self.pacing_delay()).await;
        }

        info!(
            "Scouting session finished: {} jobs generated{}",
            job_ids.len(),
            if cancelled { " (cancelled)" } else { "" }
        );
        drop(guard);

        SessionReport {
            job_ids,
            cancelled,
            tracker,
        }
    }

    fn pacing_delay(&self) -> Duration {
        let min = self.config.pacing_min.as_millis() as u64;
        let max = self.config.pacing_max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}
