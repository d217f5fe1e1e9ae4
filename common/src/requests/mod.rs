use crate::model::request::RequestInfo;
use crate::model::sample::SampleInput;
use serde::Deserialize;

/// Request payload for `POST /api/samples/parse`.
#[derive(Deserialize)]
pub struct ParseSampleRequest {
    pub txt_path: String,
    #[serde(default)]
    pub pdf_path: Option<String>,
}

/// Request payload for `POST /api/reports/generate`.
///
/// `template_path` falls back to the configured default template when absent.
/// With `strict` set, a template lacking one of the marker rows or the
/// discussion paragraph fails the job instead of being skipped.
#[derive(Deserialize, Clone, Debug)]
pub struct GenerateReportRequest {
    #[serde(default)]
    pub template_path: Option<String>,
    pub output_path: String,
    #[serde(default)]
    pub request: RequestInfo,
    pub samples: Vec<SampleInput>,
    #[serde(default)]
    pub strict: bool,
}
