use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures_util::Stream;
use serde::Serialize;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::models::job::{CompensationBand, Job};
use crate::scouting::pipeline::PipelineOutcome;
use crate::scouting::session::Scout;
use crate::scouting::store::JobSnapshot;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ScoutStatusResponse {
    pub active: bool,
    pub batch_size: usize,
}

#[derive(Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}

#[derive(Serialize)]
pub struct JobStats {
    pub total: usize,
    pub high_fit: usize,
    /// Jobs still moving through the pipeline.
    pub in_flight: usize,
}

impl JobStats {
    pub fn of(jobs: &[Job]) -> Self {
        Self {
            total: jobs.len(),
            high_fit: jobs
                .iter()
                .filter(|j| j.analysis.as_ref().is_some_and(|a| a.is_high_fit()))
                .count(),
            in_flight: jobs.iter().filter(|j| !j.status.is_terminal()).count(),
        }
    }
}

#[derive(Serialize)]
pub struct JobListResponse {
    pub jobs: JobSnapshot,
    pub stats: JobStats,
}

#[derive(Serialize)]
pub struct JobDetailResponse {
    pub job: Job,
    pub search_url: String,
    pub compensation: Vec<CompensationBand>,
}

/// POST /api/v1/scout
/// Starts a session with the current criteria and returns immediately.
pub async fn handle_launch(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ScoutStatusResponse>), AppError> {
    let guard = state.scout.begin()?;
    let criteria = state.criteria.get();
    let scout = Arc::clone(&state.scout);

    tokio::spawn(async move {
        let report = scout.run_scouting_session(guard, criteria).await;
        if report.cancelled {
            info!(
                "Session cancelled after {} of {} jobs",
                report.job_ids.len(),
                scout.batch_size()
            );
        }
        let outcomes = report.tracker.join_all().await;
        log_outcomes(&outcomes);
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(ScoutStatusResponse {
            active: true,
            batch_size: state.scout.batch_size(),
        }),
    ))
}

fn log_outcomes(outcomes: &[PipelineOutcome]) {
    let mut analyzed = 0;
    for outcome in outcomes {
        match outcome {
            PipelineOutcome::Completed {
                job_id,
                analyzed: with_analysis,
            } => {
                debug!("Job {job_id} complete");
                if *with_analysis {
                    analyzed += 1;
                }
            }
            PipelineOutcome::Stalled {
                job_id,
                status: Some(status),
                error,
            } => warn!("Job {job_id} stalled at {status:?}: {error}"),
            PipelineOutcome::Stalled {
                job_id,
                status: None,
                error,
            } => warn!("Job {job_id} was removed before finishing: {error}"),
            PipelineOutcome::Failed { job_id, error } => warn!("Job {job_id} failed: {error}"),
        }
    }
    info!(
        "Session pipelines finished: {} jobs, {analyzed} analyzed",
        outcomes.len()
    );
}

/// POST /api/v1/scout/cancel
pub async fn handle_cancel(State(state): State<AppState>) -> Json<CancelResponse> {
    Json(CancelResponse {
        cancelled: state.scout.cancel(),
    })
}

/// GET /api/v1/scout/status
pub async fn handle_status(State(state): State<AppState>) -> Json<ScoutStatusResponse> {
    Json(status_of(&state.scout))
}

fn status_of(scout: &Scout) -> ScoutStatusResponse {
    ScoutStatusResponse {
        active: scout.is_active(),
        batch_size: scout.batch_size(),
    }
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(State(state): State<AppState>) -> Json<JobListResponse> {
    let jobs = state.store.get();
    let stats = JobStats::of(&jobs);
    Json(JobListResponse { jobs, stats })
}

/// DELETE /api/v1/jobs
/// Clears the collection. Pipelines still running for removed jobs stop at their next update.
pub async fn handle_clear_jobs(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    if state.scout.is_active() {
        return Err(AppError::Conflict(
            "Cannot clear jobs while a scouting session is active".to_string(),
        ));
    }
    state.store.replace_all(Vec::new());
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobDetailResponse>, AppError> {
    let job = state
        .store
        .find(&id)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    let search_url = job.search_url();
    let compensation = job.compensation_bands();
    Ok(Json(JobDetailResponse {
        job,
        search_url,
        compensation,
    }))
}

/// GET /api/v1/jobs/stream
/// One `snapshot` event per collection change, starting with the current collection.
/// A subscriber that falls behind drops its backlog and resumes at the newest snapshot.
pub async fn handle_job_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.store.subscribe();
    let initial = state.store.get();

    let stream = async_stream::stream! {
        yield Ok(snapshot_event(&initial));
        loop {
            match rx.recv().await {
                Ok(snapshot) => {
                    yield Ok(snapshot_event(&snapshot));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Job stream subscriber lagged by {skipped} snapshots");
                    if let Some(snapshot) = drain_to_newest(&mut rx) {
                        yield Ok(snapshot_event(&snapshot));
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Empties the receiver's backlog and returns the newest snapshot in it.
fn drain_to_newest(rx: &mut broadcast::Receiver<JobSnapshot>) -> Option<JobSnapshot> {
    let mut newest = None;
    loop {
        match rx.try_recv() {
            Ok(snapshot) => newest = Some(snapshot),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty | TryRecvError::Closed) => return newest,
        }
    }
}

fn snapshot_event(jobs: &JobSnapshot) -> Event {
    let body = JobListResponse {
        jobs: Arc::clone(jobs),
        stats: JobStats::of(jobs),
    };
    Event::default()
        .event("snapshot")
        .data(serde_json::to_string(&body).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::{AiAnalysis, Recommendation};
    use crate::models::job::{JobSource, JobStatus};
    use chrono::Utc;

    fn job_with_score(id: &str, score: Option<u8>) -> Job {
        Job {
            id: id.to_string(),
            title: "Sales Engineer".to_string(),
            company: "OmniCorp Global".to_string(),
            location: "Remote".to_string(),
            is_remote: true,
            posted_date: Utc::now(),
            description: String::new(),
            salary_min: 130_000,
            salary_max: 200_000,
            source: JobSource::LinkedIn,
            financials: None,
            analysis: score.map(|fit_score| AiAnalysis {
                fit_score,
                recommendation: Recommendation::Apply,
                pros_cons: vec![],
                growth_verdict: "ok".to_string(),
            }),
            status: JobStatus::Complete,
            error: None,
        }
    }

    #[test]
    fn test_high_fit_counts_only_scores_above_75() {
        let jobs = vec![
            job_with_score("a", Some(76)),
            job_with_score("b", Some(75)),
            job_with_score("c", Some(100)),
            job_with_score("d", None),
        ];
        let stats = JobStats::of(&jobs);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.high_fit, 2);
        assert_eq!(stats.in_flight, 0);
    }

    #[tokio::test]
    async fn test_lagged_subscriber_catches_up_to_newest_snapshot() {
        let (tx, mut rx) = broadcast::channel::<JobSnapshot>(2);
        for n in 1..=5 {
            let jobs = (0..n).map(|i| job_with_score(&i.to_string(), None)).collect();
            tx.send(Arc::new(jobs)).unwrap();
        }

        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(3))));
        let newest = drain_to_newest(&mut rx).unwrap();
        assert_eq!(newest.len(), 5);
        assert!(drain_to_newest(&mut rx).is_none());
    }
}
