//! # Report Generation Service
//!
//! `POST /api/reports/generate` starts a background job that turns a
//! `GenerateReportRequest` into a filled `.docx` report.
//!
//! ## Workflow:
//!
//! 1.  **HTTP Request**: `process` validates the payload and resolves the
//!     template (request value or configured default) and the output path
//!     (relative paths land in the configured output directory).
//!
//! 2.  **Job Scheduling**: `schedule_report_job` registers a `Pending` job,
//!     returns its id to the client and spawns a Tokio task for the work.
//!
//! 3.  **Background Processing**: the task runs `generate_report` through
//!     `tokio::task::spawn_blocking`, since parsing, rasterizing and zip I/O
//!     are synchronous and CPU bound.
//!
//! 4.  **Progress Reporting**: each generation stage is sent as
//!     `JobStatus::InProgress(<percent>)` to the central job controller; the
//!     job ends as `Completed(<output path>)` or `Failed(<error>)`.

use crate::config::AppConfig;
use crate::docx::PageRasterizer;
use crate::job_controller::state::{JobUpdate, JobsState};
use crate::report::{generate_report, ReportStage};
use actix_web::{web, HttpResponse, Responder};
use common::jobs::JobStatus;
use common::requests::GenerateReportRequest;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

pub(crate) async fn process(
    state: web::Data<JobsState>,
    config: web::Data<AppConfig>,
    rasterizer: web::Data<dyn PageRasterizer>,
    payload: web::Json<GenerateReportRequest>,
) -> impl Responder {
    let request = payload.into_inner();
    if let Err(err) = validate(&request) {
        return HttpResponse::BadRequest().body(err);
    }

    let template = request
        .template_path
        .as_deref()
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| config.template_path.clone());
    let output = config.resolve_output(request.output_path.trim());

    let job_id = schedule_report_job(
        state,
        rasterizer.into_inner(),
        request,
        template,
        output,
    )
    .await;
    HttpResponse::Ok().json(serde_json::json!({ "job_id": job_id }))
}

fn validate(request: &GenerateReportRequest) -> Result<(), String> {
    if request.output_path.trim().is_empty() {
        return Err("output_path must not be empty".to_string());
    }
    if request.samples.is_empty() {
        return Err("at least one sample is required".to_string());
    }
    if let Some(sample) = request
        .samples
        .iter()
        .find(|sample| sample.txt_path.as_os_str().is_empty())
    {
        return Err(format!("sample '{}' has no txt_path", sample.name));
    }
    Ok(())
}

/// Registers the job and spawns its worker. Returns the job id.
async fn schedule_report_job(
    state: web::Data<JobsState>,
    rasterizer: Arc<dyn PageRasterizer>,
    request: GenerateReportRequest,
    template: PathBuf,
    output: PathBuf,
) -> String {
    let job_id = Uuid::new_v4().to_string();
    state.register(&job_id).await;
    log::info!(
        "Report job {} queued: {} sample(s) -> {}",
        job_id,
        request.samples.len(),
        output.display()
    );

    let tx = state.tx.clone();
    let job_id_for_task = job_id.clone();
    tokio::spawn(async move {
        let stage_tx = tx.clone();
        let job_id_for_blocking = job_id_for_task.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let mut on_stage = |stage: ReportStage| {
                let _ = stage_tx.blocking_send(JobUpdate::new(
                    job_id_for_blocking.as_str(),
                    JobStatus::InProgress(stage.percent()),
                ));
            };
            generate_report(&request, &template, &output, rasterizer.as_ref(), &mut on_stage)
        });

        let status = match handle.await {
            Ok(Ok(report)) => JobStatus::Completed(report.output.display().to_string()),
            Ok(Err(err)) => {
                log::warn!("Report job {} failed: {}", job_id_for_task, err);
                JobStatus::Failed(err.to_string())
            }
            Err(err) => JobStatus::Failed(format!("Task join error: {}", err)),
        };
        let _ = tx.send(JobUpdate::new(job_id_for_task, status)).await;
    });

    job_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::sample::SampleInput;

    fn request(output_path: &str, samples: Vec<SampleInput>) -> GenerateReportRequest {
        GenerateReportRequest {
            template_path: None,
            output_path: output_path.to_string(),
            request: Default::default(),
            samples,
            strict: false,
        }
    }

    #[test]
    fn validation_rejects_incomplete_requests() {
        let sample = SampleInput {
            name: "A".to_string(),
            txt_path: "a.txt".into(),
            ..Default::default()
        };
        assert!(validate(&request("out.docx", vec![sample.clone()])).is_ok());
        assert!(validate(&request(" ", vec![sample])).is_err());
        assert!(validate(&request("out.docx", vec![])).is_err());

        let unnamed = SampleInput {
            name: "B".to_string(),
            ..Default::default()
        };
        assert_eq!(
            validate(&request("out.docx", vec![unnamed])),
            Err("sample 'B' has no txt_path".to_string())
        );
    }
}
