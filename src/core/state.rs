//! Job lifecycle state.

use serde::Serialize;

/// Where the single job slot currently is.
///
/// `Completed` and `Failed` are transient: the orchestrator records them and
/// immediately moves back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum JobState {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(&self, next: JobState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Failed)
                | (Self::Completed, Self::Idle)
                | (Self::Failed, Self::Idle)
        )
    }
}
