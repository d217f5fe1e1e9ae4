//! # Report Service Module
//!
//! Routes under `/api/reports`. Generation runs as a background job tracked
//! by the `job_controller`; clients poll its status by id.
//!
//! *   **`POST /generate`**:
//!     - **Handler**: `generate::process`
//!     - **Description**: Validates a `GenerateReportRequest`, registers a job
//!       and returns `{ "job_id": ... }` right away.
//!
//! *   **`GET /status/{job_id}`**:
//!     - **Handler**: `get_status::process`
//!     - **Description**: Current `JobStatus` of the job, or 404.

mod generate;
mod get_status;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/reports";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/generate", post().to(generate::process))
        .route("/status/{job_id}", get().to(get_status::process))
}
