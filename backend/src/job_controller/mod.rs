pub mod state;

pub use state::{start_job_updater, JobUpdate, JobsState};
