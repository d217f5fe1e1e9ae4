use serde::{Deserialize, Serialize};

/// Request-level fields typed in by the operator. They land on the scalar
/// placeholders of the report header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestInfo {
    pub lsmp_code: String,
    pub request_id: String,
    pub customer_information: String,
    pub request_name: String,
    pub submission_date: String,
    pub request_number: String,
    pub project_account: String,
    pub deadline: String,
    pub test_date: String,
    pub receive_date: String,
    pub report_date: String,
    pub request_desc: String,
}
