//! Application state for the web layer.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local};
use tokio::sync::{RwLock, watch};

use crate::batch::{BatchConfig, BatchReport, CancelFlag, run_batch};
use crate::input::TripTable;
use crate::maps::{MapsConfig, MockMapsClient, TripRouter};
use crate::results::Reconciler;

/// Finished jobs kept for viewing and download before the oldest is dropped.
const DEFAULT_FINISHED_JOB_LIMIT: usize = 32;

/// How routing clients are created for new jobs.
#[derive(Debug, Clone)]
pub enum RouterSource {
    /// Build a live client from the key entered in the form.
    Live {
        base_url: String,
        language: String,
        timeout_secs: u64,
    },
    /// Serve canned responses; no key needed.
    Mock(MockMapsClient),
}

impl RouterSource {
    /// Live client settings with the given endpoint.
    pub fn live(config: &MapsConfig) -> Self {
        RouterSource::Live {
            base_url: config.base_url.clone(),
            language: config.language.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    /// Whether the form must ask for an API key.
    pub fn needs_api_key(&self) -> bool {
        matches!(self, RouterSource::Live { .. })
    }
}

/// What a job looks like at one point in time.
#[derive(Debug, Clone, Default)]
pub struct JobSnapshot {
    pub results: Reconciler,
    pub total: usize,
    pub finished: bool,
    pub cancelled: bool,
}

/// A batch running (or finished) in the background.
#[derive(Debug, Clone)]
pub struct Job {
    pub file_name: String,
    pub started_at: DateTime<Local>,
    pub cancel: CancelFlag,
    progress: watch::Receiver<JobSnapshot>,
}

impl Job {
    /// The latest snapshot.
    pub fn snapshot(&self) -> JobSnapshot {
        self.progress.borrow().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.progress.borrow().finished
    }

    /// Wait until the batch has stopped.
    pub async fn wait_finished(&self) {
        let mut progress = self.progress.clone();
        // An error means the sender is gone, which only happens once the
        // final snapshot has been published.
        let _ = progress.wait_for(|s| s.finished).await;
    }
}

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Debug, Clone)]
pub struct AppState {
    /// How to build a router for each job
    pub source: Arc<RouterSource>,

    /// Pacing for batches
    pub batch: Arc<BatchConfig>,

    /// Finished jobs kept before eviction
    pub finished_job_limit: usize,

    jobs: Arc<RwLock<HashMap<u64, Job>>>,
    next_id: Arc<AtomicU64>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(source: RouterSource, batch: BatchConfig) -> Self {
        Self {
            source: Arc::new(source),
            batch: Arc::new(batch),
            finished_job_limit: DEFAULT_FINISHED_JOB_LIMIT,
            jobs: Arc::default(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Set how many finished jobs are kept.
    pub fn with_finished_job_limit(mut self, limit: usize) -> Self {
        self.finished_job_limit = limit;
        self
    }

    /// Look up a job by ID.
    pub async fn job(&self, id: u64) -> Option<Job> {
        self.jobs.read().await.get(&id).cloned()
    }

    /// Start routing `table` in the background and return the job ID.
    ///
    /// Finished jobs beyond [`AppState::finished_job_limit`] are dropped
    /// first, oldest first.
    pub async fn spawn_job<R>(&self, router: R, table: TripTable, file_name: String) -> u64
    where
        R: TripRouter + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let total = table.len();
        let cancel = CancelFlag::new();

        let (tx, rx) = watch::channel(JobSnapshot {
            results: Reconciler::new(table.headers().to_vec()),
            total,
            ..JobSnapshot::default()
        });

        let job = Job {
            file_name,
            started_at: Local::now(),
            cancel: cancel.clone(),
            progress: rx,
        };
        {
            let mut jobs = self.jobs.write().await;
            evict_finished(&mut jobs, self.finished_job_limit);
            jobs.insert(id, job);
        }

        let config = BatchConfig::clone(&self.batch);
        tokio::spawn(async move {
            let BatchReport {
                results, cancelled, ..
            } = run_batch(&router, table, &config, &cancel, Local::now, |progress| {
                tx.send_replace(JobSnapshot {
                    results: progress.results.clone(),
                    total: progress.total,
                    finished: false,
                    cancelled: false,
                });
            })
            .await;

            tx.send_replace(JobSnapshot {
                results,
                total,
                finished: true,
                cancelled,
            });
            tracing::info!(job = id, "job finished");
        });

        id
    }
}

/// Drop the oldest finished jobs until at most `limit` remain. Running
/// jobs are never dropped.
fn evict_finished(jobs: &mut HashMap<u64, Job>, limit: usize) {
    let mut finished: Vec<u64> = jobs
        .iter()
        .filter(|(_, job)| job.is_finished())
        .map(|(id, _)| *id)
        .collect();
    if finished.len() <= limit {
        return;
    }

    finished.sort_unstable();
    let excess = finished.len() - limit;
    for id in &finished[..excess] {
        jobs.remove(id);
    }
    tracing::debug!(evicted = excess, "dropped finished jobs");
}
