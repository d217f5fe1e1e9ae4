//! Shared state of the background report jobs.
//!
//! Report generation runs outside the request/response cycle (see
//! `services/reports/generate.rs`). Its progress is tracked here:
//! - `JobsState`: clonable, thread-safe handle on the status of every job,
//!   injected into the Actix application state in `main.rs`.
//! - `JobUpdate`: a status change sent by a running job.
//! - `start_job_updater`: the long-running task that applies `JobUpdate`s to
//!   the shared map.

use common::jobs::JobStatus;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};

/// Capacity of the update channel between jobs and the updater task.
pub const UPDATE_CHANNEL_CAPACITY: usize = 100;

/// A thread-safe, shareable container for the state of all background jobs.
#[derive(Clone)]
pub struct JobsState {
    /// Job id → current status. Read by the status endpoint, written by
    /// `start_job_updater` and by job registration.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// Sender side of the update channel. Running jobs push `JobUpdate`s
    /// here instead of writing the map themselves.
    pub tx: mpsc::Sender<JobUpdate>,
}

impl JobsState {
    /// Empty state plus the receiver to hand to `start_job_updater`.
    pub fn new() -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
        let state = JobsState {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
        };
        (state, rx)
    }

    /// Registers a job as `Pending`.
    pub async fn register(&self, job_id: &str) {
        self.jobs
            .write()
            .await
            .insert(job_id.to_string(), JobStatus::Pending);
    }

    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).cloned()
    }

    /// Current status as handed to a client. A finished job is removed once
    /// its final status has been read, so the map only holds live jobs and
    /// unread results.
    pub async fn poll(&self, job_id: &str) -> Option<JobStatus> {
        let mut jobs = self.jobs.write().await;
        let status = jobs.get(job_id)?.clone();
        if status.is_finished() {
            jobs.remove(job_id);
            log::debug!("Job {} read as finished, evicted", job_id);
        }
        Some(status)
    }
}

/// A status change of one background job.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

impl JobUpdate {
    pub fn new(job_id: impl Into<String>, status: JobStatus) -> Self {
        JobUpdate {
            job_id: job_id.into(),
            status,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }
}

/// Applies every `JobUpdate` received on `rx` to the shared map. Runs until
/// all senders are dropped.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        log::debug!("Job {} -> {:?}", update.job_id, update.status);
        let mut jobs = state.jobs.write().await;
        jobs.insert(update.job_id, update.status);
    }
}
