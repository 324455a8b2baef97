use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::format_system_time,
    state::populate::{PopulateJob, PopulatePhase},
};

/// Lifecycle of the most recent populate job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PopulateStateDto {
    Idle,
    Fetching,
    Persisting,
    Completed,
    Failed,
}

/// Polling handle for the background half of populate.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PopulateStatusResponse {
    pub state: PopulateStateDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
    /// Number of mapped records returned to the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched: Option<usize>,
    /// Number of records written once persistence completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inserted: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Option<PopulateJob>> for PopulateStatusResponse {
    fn from(job: Option<PopulateJob>) -> Self {
        let Some(job) = job else {
            return Self {
                state: PopulateStateDto::Idle,
                job_id: None,
                started_at: None,
                finished_at: None,
                fetched: None,
                inserted: None,
                error: None,
            };
        };

        let state = match &job.phase {
            PopulatePhase::Fetching => PopulateStateDto::Fetching,
            PopulatePhase::Persisting { .. } => PopulateStateDto::Persisting,
            PopulatePhase::Completed { .. } => PopulateStateDto::Completed,
            PopulatePhase::Failed { .. } => PopulateStateDto::Failed,
        };
        let (fetched, inserted, error) = match job.phase {
            PopulatePhase::Fetching => (None, None, None),
            PopulatePhase::Persisting { fetched } => (Some(fetched), None, None),
            PopulatePhase::Completed { fetched, inserted } => (Some(fetched), Some(inserted), None),
            PopulatePhase::Failed { fetched, error } => (fetched, None, Some(error)),
        };

        Self {
            state,
            job_id: Some(job.id),
            started_at: Some(format_system_time(job.started_at)),
            finished_at: job.finished_at.map(format_system_time),
            fetched,
            inserted,
            error,
        }
    }
}
