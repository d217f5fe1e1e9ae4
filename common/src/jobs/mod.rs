use serde::{Deserialize, Serialize};

/// Lifecycle of a background report job, as reported by
/// `GET /api/reports/status/{job_id}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    /// Percentage of the generation stages completed.
    InProgress(u32),
    /// Path of the written report.
    Completed(String),
    Failed(String),
}

impl JobStatus {
    /// `Completed` and `Failed` are final; no update follows them.
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Completed(_) | JobStatus::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_completed_and_failed_are_final() {
        assert!(!JobStatus::Pending.is_finished());
        assert!(!JobStatus::InProgress(90).is_finished());
        assert!(JobStatus::Completed("out.docx".to_string()).is_finished());
        assert!(JobStatus::Failed("boom".to_string()).is_finished());
    }
}
