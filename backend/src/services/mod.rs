//! HTTP surface of the report generator.
//!
//! - `samples`: parse one instrument export and return the parsed data.
//! - `reports`: start a report generation job and poll its status.

pub mod reports;
pub mod samples;
