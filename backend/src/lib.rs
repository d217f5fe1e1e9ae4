//! DSC report generation: instrument export parsing, PDF range
//! reconciliation, discussion text and `.docx` template filling, served over
//! HTTP as background jobs.

pub mod config;
pub mod docx;
pub mod error;
pub mod job_controller;
pub mod narrative;
pub mod parsing;
pub mod report;
pub mod services;
