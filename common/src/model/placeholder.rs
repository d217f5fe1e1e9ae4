use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Literal tokens recognized in report templates.
pub mod tokens {
    pub const LSMP_CODE: &str = "{{LSMP_code}}";
    pub const REQUEST_ID: &str = "{{Request_id}}";
    pub const CUSTOMER_INFORMATION: &str = "{{Customer_information}}";
    pub const REQUEST_NAME: &str = "{{Request_Name}}";
    pub const SUBMISSION_DATE: &str = "{{Submission_Date}}";
    pub const REQUEST_NUMBER: &str = "{{Request_Number}}";
    pub const PROJECT_ACCOUNT: &str = "{{Project_Account}}";
    pub const DEADLINE: &str = "{{Deadline}}";
    pub const SAMPLE_ID: &str = "{{Sample_id}}";
    pub const NATURE: &str = "{{Nature}}";
    pub const ASSIGN_TO: &str = "{{Assign_to}}";
    pub const TEST_DATE: &str = "{{Test_Date}}";
    pub const RECEIVE_DATE: &str = "{{Receive_Date}}";
    pub const REPORT_DATE: &str = "{{Report_Date}}";
    pub const REQUEST_DESC: &str = "{{Request_desc}}";
    pub const SAMPLE_NAME: &str = "{{Sample_name}}";
    pub const SAMPLE_MASS: &str = "{{Sample_mass}}";
    pub const OPERATOR: &str = "{{Operator}}";
    pub const INSTRUMENT: &str = "{{Instrument}}";
    pub const ATMOSPHERE: &str = "{{Atmosphere}}";
    pub const CRUCIBLE: &str = "{{Crucible}}";
    pub const TEMP_CALIB: &str = "{{Temp.Calib}}";
    pub const END_DATE: &str = "{{End_Date}}";
    pub const DISCUSSION: &str = "{{Discussion}}";

    pub const SEG_SAMPLE: &str = "{{SEG_SAMPLE}}";
    pub const SEG_METHOD: &str = "{{SEG_METHOD}}";
    pub const SEG_VALUE: &str = "{{SEG_VALUE}}";
    pub const SEG_ONSET: &str = "{{SEG_ONSET}}";
    pub const SEG_PEAK: &str = "{{SEG_PEAK}}";
    pub const SEG_AREA: &str = "{{SEG_AREA}}";
    pub const SEG_COMMENT: &str = "{{SEG_COMMENT}}";

    /// Every scalar token, in template order.
    pub const SCALAR: [&str; 24] = [
        LSMP_CODE,
        REQUEST_ID,
        CUSTOMER_INFORMATION,
        REQUEST_NAME,
        SUBMISSION_DATE,
        REQUEST_NUMBER,
        PROJECT_ACCOUNT,
        DEADLINE,
        SAMPLE_ID,
        NATURE,
        ASSIGN_TO,
        TEST_DATE,
        RECEIVE_DATE,
        REPORT_DATE,
        REQUEST_DESC,
        SAMPLE_NAME,
        SAMPLE_MASS,
        OPERATOR,
        INSTRUMENT,
        ATMOSPHERE,
        CRUCIBLE,
        TEMP_CALIB,
        END_DATE,
        DISCUSSION,
    ];

    /// Markers of the measurement table row.
    pub const SEGMENT_ROW: [&str; 7] = [
        SEG_SAMPLE,
        SEG_METHOD,
        SEG_VALUE,
        SEG_ONSET,
        SEG_PEAK,
        SEG_AREA,
        SEG_COMMENT,
    ];

    /// Markers of the per-sample summary table row.
    pub const SUMMARY_ROW: [&str; 4] = [SAMPLE_ID, SAMPLE_NAME, NATURE, ASSIGN_TO];
}

/// Token → replacement text.
///
/// Built once and only read afterwards; deriving a variant produces a new
/// map. Iteration order is the key order, which keeps substitution
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderMap(BTreeMap<String, String>);

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, overriding an existing key.
    pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(token.into(), value.into());
        self
    }

    /// A copy of this map without `token`.
    pub fn without(&self, token: &str) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(key, _)| key.as_str() != token)
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.0.get(token).map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains_key(token)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PlaceholderMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
