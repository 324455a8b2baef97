//! Bookkeeping for the populate job: a single-flight guard plus the last job's progress.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::SystemTime,
};

use tokio::sync::RwLock;
use uuid::Uuid;

/// Progress of one populate job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopulatePhase {
    /// Both feeds are being downloaded.
    Fetching,
    /// The mapped records were returned to the caller and are being written.
    Persisting { fetched: usize },
    Completed { fetched: usize, inserted: usize },
    /// `fetched` is `None` when the job failed before mapping finished.
    Failed {
        fetched: Option<usize>,
        error: String,
    },
}

/// Snapshot of a populate job exposed through the status route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulateJob {
    pub id: Uuid,
    pub started_at: SystemTime,
    pub finished_at: Option<SystemTime>,
    pub phase: PopulatePhase,
}

/// Owned proof that the caller is the only populate job in flight.
///
/// The guard is released when the permit is dropped, so the permit must live until
/// persistence has finished.
#[derive(Debug)]
pub struct PopulatePermit {
    id: Uuid,
    running: Arc<AtomicBool>,
}

impl PopulatePermit {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for PopulatePermit {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

#[derive(Debug, Default)]
pub struct PopulateTracker {
    running: Arc<AtomicBool>,
    last: RwLock<Option<PopulateJob>>,
}

impl PopulateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the guard and register a fresh job in the fetching phase.
    ///
    /// Returns `None` while another permit is alive.
    pub async fn try_begin(&self) -> Option<PopulatePermit> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;

        let permit = PopulatePermit {
            id: Uuid::new_v4(),
            running: self.running.clone(),
        };
        *self.last.write().await = Some(PopulateJob {
            id: permit.id,
            started_at: SystemTime::now(),
            finished_at: None,
            phase: PopulatePhase::Fetching,
        });
        Some(permit)
    }

    /// Whether a permit is currently held.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Move the job owned by `permit` to a new phase; terminal phases stamp `finished_at`.
    pub async fn advance(&self, permit: &PopulatePermit, phase: PopulatePhase) {
        let mut slot = self.last.write().await;
        let Some(job) = slot.as_mut().filter(|job| job.id == permit.id) else {
            return;
        };
        if matches!(
            phase,
            PopulatePhase::Completed { .. } | PopulatePhase::Failed { .. }
        ) {
            job.finished_at = Some(SystemTime::now());
        }
        job.phase = phase;
    }

    /// Record the terminal phase and release the guard before the status becomes visible.
    pub async fn finish(&self, permit: PopulatePermit, phase: PopulatePhase) {
        let mut slot = self.last.write().await;
        if let Some(job) = slot.as_mut().filter(|job| job.id == permit.id) {
            job.finished_at = Some(SystemTime::now());
            job.phase = phase;
        }
        drop(permit);
    }

    /// Latest job, if any populate has ever started.
    pub async fn last_job(&self) -> Option<PopulateJob> {
        self.last.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn only_one_permit_at_a_time() {
        let tracker = PopulateTracker::new();
        let permit = tracker.try_begin().await.expect("first permit");
        assert!(tracker.is_running());
        assert!(tracker.try_begin().await.is_none());

        drop(permit);
        assert!(!tracker.is_running());
        assert!(tracker.try_begin().await.is_some());
    }

    #[tokio::test]
    async fn advance_tracks_phases_and_finish_time() {
        let tracker = PopulateTracker::new();
        assert_eq!(tracker.last_job().await, None);

        let permit = tracker.try_begin().await.unwrap();
        let job = tracker.last_job().await.unwrap();
        assert_eq!(job.id, permit.id());
        assert_eq!(job.phase, PopulatePhase::Fetching);

        tracker
            .advance(&permit, PopulatePhase::Persisting { fetched: 4 })
            .await;
        assert_eq!(tracker.last_job().await.unwrap().finished_at, None);

        tracker
            .advance(
                &permit,
                PopulatePhase::Completed {
                    fetched: 4,
                    inserted: 4,
                },
            )
            .await;
        let job = tracker.last_job().await.unwrap();
        assert!(job.finished_at.is_some());
        assert_eq!(
            job.phase,
            PopulatePhase::Completed {
                fetched: 4,
                inserted: 4
            }
        );
    }

    #[tokio::test]
    async fn stale_permit_cannot_overwrite_newer_job() {
        let tracker = PopulateTracker::new();
        let stale = tracker.try_begin().await.unwrap();
        let stale_id = stale.id();
        drop(stale);

        let current = tracker.try_begin().await.unwrap();
        let forged = PopulatePermit {
            id: stale_id,
            running: Arc::new(AtomicBool::new(true)),
        };
        tracker
            .advance(
                &forged,
                PopulatePhase::Failed {
                    fetched: None,
                    error: "late".into(),
                },
            )
            .await;

        let job = tracker.last_job().await.unwrap();
        assert_eq!(job.id, current.id());
        assert_eq!(job.phase, PopulatePhase::Fetching);
    }

    #[tokio::test]
    async fn finish_releases_guard_with_terminal_phase() {
        let tracker = PopulateTracker::new();
        let permit = tracker.try_begin().await.unwrap();

        tracker
            .finish(
                permit,
                PopulatePhase::Failed {
                    fetched: Some(2),
                    error: "insert failed".into(),
                },
            )
            .await;

        assert!(!tracker.is_running());
        let job = tracker.last_job().await.unwrap();
        assert!(job.finished_at.is_some());
        assert!(matches!(job.phase, PopulatePhase::Failed { fetched: Some(2), .. }));
    }
}
