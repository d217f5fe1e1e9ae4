//! # Sample Service Module
//!
//! Routes under `/api/samples`.
//!
//! *   **`POST /parse`**:
//!     - **Handler**: `parse::process`
//!     - **Description**: Reads an instrument text export (and optionally the
//!       companion PDF for range reconciliation) and returns the metadata,
//!       segments and unmatched metadata fields as JSON.

mod parse;

use actix_web::web::{post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/samples";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/parse", post().to(parse::process))
}
