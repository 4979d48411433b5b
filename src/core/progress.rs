use serde::Serialize;
use crate::core::JobId;

/// Status text sent when a job starts.
pub const STARTED_MESSAGE: &str = "Converting...";
/// Status text sent when a job finishes cleanly.
pub const COMPLETED_MESSAGE: &str = "Conversion completed!";

/// Lifecycle notification for an admitted job.
///
/// Per job the order is always `Started`, any number of `Progress`, then
/// exactly one of `Completed` or `Failed`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BatchEvent {
    #[serde(rename_all = "camelCase")]
    Started {
        job_id: JobId,
        total_images: usize,
        message: String,
    },
    Progress(Progress),
    #[serde(rename_all = "camelCase")]
    Completed {
        job_id: JobId,
        images_written: usize,
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    Failed {
        job_id: JobId,
        error: String,
        /// Source file that caused the failure, when there is one
        filename: Option<String>,
    },
}

impl BatchEvent {
    pub fn job_id(&self) -> JobId {
        match self {
            Self::Started { job_id, .. }
            | Self::Completed { job_id, .. }
            | Self::Failed { job_id, .. } => *job_id,
            Self::Progress(progress) => progress.job_id,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }
}

/// Per-image progress message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub job_id: JobId,
    /// Number of images written so far
    pub completed: usize,
    /// Number of images in the job
    pub total: usize,
    /// Progress percentage (0-100)
    pub percentage: usize,
    /// Human readable status line
    pub message: String,
}

impl Progress {
    pub fn new(job_id: JobId, completed: usize, total: usize, message: impl Into<String>) -> Self {
        let percentage = if total > 0 {
            (completed * 100) / total
        } else {
            0
        };

        Self {
            job_id,
            completed,
            total,
            percentage,
            message: message.into(),
        }
    }
}
