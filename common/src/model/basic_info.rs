use serde::{Deserialize, Serialize};

/// Scalar metadata read from the header of an instrument export.
///
/// Every field is optional in the source text; a field whose line is absent
/// keeps its empty default. Dates are normalized to `YYYY/MM/DD`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicInfo {
    pub sample_name: String,
    pub sample_mass_mg: Option<f64>,
    pub operator: String,
    pub instrument: String,
    pub atmosphere: String,
    /// Only the text before the first comma, e.g. `Concavus Al`.
    pub crucible: String,
    pub temp_calib: String,
    pub end_date: String,
}

impl BasicInfo {
    /// Sample mass as printed in the report, e.g. `8.496 mg`.
    pub fn sample_mass_display(&self) -> String {
        self.sample_mass_mg
            .map(|mass| format!("{:.3} mg", mass))
            .unwrap_or_default()
    }
}
