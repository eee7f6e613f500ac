use serde::Serialize;

use crate::provider::types::{JobStatus, Prediction};
use crate::workflow::submitter::JobHandle;

/// Local view of one in-flight provider job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationJob {
    pub id: String,
    pub status: JobStatus,
    pub created_at: Option<String>,
    pub output: Option<String>,
    pub error: Option<String>,
}

impl GenerationJob {
    pub fn from_handle(handle: &JobHandle) -> Self {
        GenerationJob {
            id: handle.id.clone(),
            status: handle.initial_status,
            created_at: handle.created_at.clone(),
            output: handle.output.clone(),
            error: handle.error.clone(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Fold a status read into the job. Reads for another job, reads that
    /// would move the status backwards, and anything after a terminal status
    /// are ignored; returns whether the read was applied.
    pub fn observe(&mut self, prediction: &Prediction) -> bool {
        if self.is_terminal() || prediction.id != self.id || prediction.status.rank() < self.status.rank() {
            return false;
        }
        self.status = prediction.status;
        if self.created_at.is_none() {
            self.created_at = prediction.created_at.clone();
        }
        self.output = prediction.image_url().map(str::to_string);
        self.error = prediction.error_message();
        true
    }
}
