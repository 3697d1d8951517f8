//! Job collection store.
//!
//! The collection is an `Arc<Vec<Job>>` snapshot, newest first. Every mutation builds
//! a new vector and swaps it in under the write lock, so readers and subscribers only
//! ever see complete collections. Per-job updates are field-set patches keyed by job id,
//! which keeps two pipelines updating different jobs from reverting each other.

use std::sync::{Arc, RwLock};

use thiserror::Error;
use tokio::sync::broadcast;

use crate::models::analysis::AiAnalysis;
use crate::models::job::{Financials, Job, JobStatus};

/// Snapshot of the whole collection as published to readers.
pub type JobSnapshot = Arc<Vec<Job>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job {0} not found")]
    NotFound(String),

    #[error("job {id}: illegal transition {from:?} -> {to:?}")]
    InvalidTransition {
        id: String,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("job {id}: {reason}")]
    InvalidPatch { id: String, reason: String },
}

/// A partial update to one job. Only the `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub financials: Option<Financials>,
    pub analysis: Option<AiAnalysis>,
    pub error: Option<String>,
}

impl JobPatch {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Failed),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn with_financials(mut self, financials: Financials) -> Self {
        self.financials = Some(financials);
        self
    }

    pub fn with_analysis(mut self, analysis: AiAnalysis) -> Self {
        self.analysis = Some(analysis);
        self
    }

    /// Applies the patch in place, enforcing the lifecycle invariants:
    /// status only moves forward, `financials` lands together with leaving
    /// `enriching`, and `analysis` lands together with reaching `complete`.
    fn apply(self, job: &mut Job) -> Result<(), StoreError> {
        let next = self.status.unwrap_or(job.status);
        if !job.status.can_advance_to(next) {
            return Err(StoreError::InvalidTransition {
                id: job.id.clone(),
                from: job.status,
                to: next,
            });
        }

        if self.financials.is_some()
            && !matches!(next, JobStatus::Analyzing | JobStatus::Complete)
        {
            return Err(StoreError::InvalidPatch {
                id: job.id.clone(),
                reason: format!("financials cannot be attached while {next:?}"),
            });
        }

        if self.analysis.is_some() && next != JobStatus::Complete {
            return Err(StoreError::InvalidPatch {
                id: job.id.clone(),
                reason: format!("analysis cannot be attached while {next:?}"),
            });
        }

        job.status = next;
        if let Some(financials) = self.financials {
            job.financials = Some(financials);
        }
        if let Some(analysis) = self.analysis {
            job.analysis = Some(analysis);
        }
        if let Some(error) = self.error {
            job.error = Some(error);
        }
        Ok(())
    }
}

/// State container for the job collection. The pipeline depends only on this trait.
pub trait JobStore: Send + Sync {
    /// Current collection, newest first.
    fn get(&self) -> JobSnapshot;

    /// Replaces the entire collection.
    fn replace_all(&self, jobs: Vec<Job>);

    /// Inserts a job at the front of the collection.
    fn prepend(&self, job: Job);

    /// Applies `patch` to the job with identifier `id` and returns the updated record.
    fn upsert_by_identity(&self, id: &str, patch: JobPatch) -> Result<Job, StoreError>;

    /// Receives every snapshot published after the call.
    fn subscribe(&self) -> broadcast::Receiver<JobSnapshot>;

    fn find(&self, id: &str) -> Option<Job> {
        self.get().iter().find(|j| j.id == id).cloned()
    }

    fn contains(&self, id: &str) -> bool {
        self.get().iter().any(|j| j.id == id)
    }
}

/// Process-wide in-memory store. Empty at startup, discarded at shutdown.
pub struct InMemoryJobStore {
    jobs: RwLock<JobSnapshot>,
    updates_tx: broadcast::Sender<JobSnapshot>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        let (updates_tx, _) = broadcast::channel(256);
        Self {
            jobs: RwLock::new(Arc::new(Vec::new())),
            updates_tx,
        }
    }

    /// Builds the next snapshot from the current one and publishes it.
    /// The write lock is held for the whole read-modify-swap.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Vec<Job>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        let mut next = Vec::clone(&guard);
        let out = f(&mut next)?;
        let snapshot = Arc::new(next);
        *guard = Arc::clone(&snapshot);
        drop(guard);

        // No subscribers is fine.
        let _ = self.updates_tx.send(snapshot);
        Ok(out)
    }
}

impl Default for InMemoryJobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl JobStore for InMemoryJobStore {
    fn get(&self) -> JobSnapshot {
        Arc::clone(&self.jobs.read().unwrap_or_else(|e| e.into_inner()))
    }

    fn replace_all(&self, jobs: Vec<Job>) {
        let _ = self.mutate(|current| {
            *current = jobs;
            Ok(())
        });
    }

    fn prepend(&self, job: Job) {
        let _ = self.mutate(|current| {
            current.insert(0, job);
            Ok(())
        });
    }

    fn upsert_by_identity(&self, id: &str, patch: JobPatch) -> Result<Job, StoreError> {
        self.mutate(|current| {
            let job = current
                .iter_mut()
                .find(|j| j.id == id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            patch.apply(job)?;
            Ok(job.clone())
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<JobSnapshot> {
        self.updates_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::JobSource;
    use chrono::Utc;

    fn make_job(id: &str) -> Job {
        Job {
            id: id.to_string(),
            title: "Head of Growth".to_string(),
            company: "StartupX".to_string(),
            location: "Remote".to_string(),
            is_remote: true,
            posted_date: Utc::now(),
            description: String::new(),
            salary_min: 130_000,
            salary_max: 200_000,
            source: JobSource::Indeed,
            financials: None,
            analysis: None,
            status: JobStatus::Scraped,
            error: None,
        }
    }

    fn make_financials(symbol: &str) -> Financials {
        Financials {
            symbol: symbol.to_string(),
            price: 10.0,
            revenue_growth: 0.1,
            is_private: false,
            market_cap: "1B".to_string(),
        }
    }

    #[test]
    fn test_prepend_keeps_newest_first() {
        let store = InMemoryJobStore::new();
        store.prepend(make_job("a"));
        store.prepend(make_job("b"));
        store.prepend(make_job("c"));

        let ids: Vec<_> = store.get().iter().map(|j| j.id.clone()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_snapshots_are_copy_on_write() {
        let store = InMemoryJobStore::new();
        store.prepend(make_job("a"));
        let before = store.get();

        store
            .upsert_by_identity("a", JobPatch::status(JobStatus::Enriching))
            .unwrap();

        assert_eq!(before[0].status, JobStatus::Scraped);
        assert_eq!(store.get()[0].status, JobStatus::Enriching);
    }

    #[test]
    fn test_interleaved_updates_do_not_clobber_each_other() {
        let store = InMemoryJobStore::new();
        store.prepend(make_job("a"));
        store.prepend(make_job("b"));

        store
            .upsert_by_identity("a", JobPatch::status(JobStatus::Enriching))
            .unwrap();
        store
            .upsert_by_identity("b", JobPatch::status(JobStatus::Enriching))
            .unwrap();
        store
            .upsert_by_identity(
                "b",
                JobPatch::status(JobStatus::Analyzing).with_financials(make_financials("BBB")),
            )
            .unwrap();
        store
            .upsert_by_identity(
                "a",
                JobPatch::status(JobStatus::Complete).with_financials(make_financials("AAA")),
            )
            .unwrap();

        let a = store.find("a").unwrap();
        let b = store.find("b").unwrap();
        assert_eq!(a.status, JobStatus::Complete);
        assert_eq!(a.financials.unwrap().symbol, "AAA");
        assert_eq!(b.status, JobStatus::Analyzing);
        assert_eq!(b.financials.unwrap().symbol, "BBB");
    }

    #[test]
    fn test_concurrent_updates_from_threads_are_all_applied() {
        let store = Arc::new(InMemoryJobStore::new());
        let ids: Vec<String> = (0..16).map(|i| format!("job{i}")).collect();
        for id in &ids {
            store.prepend(make_job(id));
        }

        let handles: Vec<_> = ids
            .iter()
            .cloned()
            .map(|id| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store
                        .upsert_by_identity(&id, JobPatch::status(JobStatus::Enriching))
                        .unwrap();
                    store
                        .upsert_by_identity(
                            &id,
                            JobPatch::status(JobStatus::Complete)
                                .with_financials(make_financials(&id)),
                        )
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = store.get();
        assert_eq!(snapshot.len(), 16);
        for job in snapshot.iter() {
            assert_eq!(job.status, JobStatus::Complete);
            assert_eq!(job.financials.as_ref().unwrap().symbol, job.id);
        }
    }

    #[test]
    fn test_regression_rejected() {
        let store = InMemoryJobStore::new();
        store.prepend(make_job("a"));
        store
            .upsert_by_identity("a", JobPatch::status(JobStatus::Enriching))
            .unwrap();

        let err = store
            .upsert_by_identity("a", JobPatch::status(JobStatus::Scraped))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));
        assert_eq!(store.find("a").unwrap().status, JobStatus::Enriching);
    }

    #[test]
    fn test_analysis_requires_complete() {
        let store = InMemoryJobStore::new();
        store.prepend(make_job("a"));
        store
            .upsert_by_identity("a", JobPatch::status(JobStatus::Enriching))
            .unwrap();

        let err = store
            .upsert_by_identity(
                "a",
                JobPatch::status(JobStatus::Analyzing).with_analysis(AiAnalysis::fallback()),
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPatch { .. }));
        assert!(store.find("a").unwrap().analysis.is_none());
    }

    #[test]
    fn test_financials_rejected_while_enriching() {
        let store = InMemoryJobStore::new();
        store.prepend(make_job("a"));
        store
            .upsert_by_identity("a", JobPatch::status(JobStatus::Enriching))
            .unwrap();

        let err = store
            .upsert_by_identity("a", JobPatch::default().with_financials(make_financials("X")))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPatch { .. }));
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let store = InMemoryJobStore::new();
        let err = store
            .upsert_by_identity("missing", JobPatch::status(JobStatus::Enriching))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_replace_all_swaps_collection() {
        let store = InMemoryJobStore::new();
        store.prepend(make_job("a"));
        store.replace_all(vec![make_job("x"), make_job("y")]);

        let ids: Vec<_> = store.get().iter().map(|j| j.id.clone()).collect();
        assert_eq!(ids, vec!["x", "y"]);
        assert!(!store.contains("a"));
    }

    #[tokio::test]
    async fn test_subscribers_receive_each_snapshot() {
        let store = InMemoryJobStore::new();
        let mut rx = store.subscribe();

        store.prepend(make_job("a"));
        store
            .upsert_by_identity("a", JobPatch::status(JobStatus::Enriching))
            .unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].status, JobStatus::Scraped);
        let second = rx.recv().await.unwrap();
        assert_eq!(second[0].status, JobStatus::Enriching);
    }
}
