use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Per-sample fields that do not come from the instrument export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualFields {
    pub sample_id: String,
    pub nature: String,
    pub assign_to: String,
}

/// A reviewer correction of one parsed part. Indexes are 0-based; fields
/// overwrite the parsed values as a whole, so `None` clears a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartEdit {
    pub segment: usize,
    pub part: usize,
    pub value_temp_c: Option<f64>,
    pub onset_c: Option<f64>,
    pub peak_c: Option<f64>,
    pub area_report: Option<f64>,
    pub comment: String,
}

/// One sample as handed over by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleInput {
    /// Display name chosen when the sample was added.
    pub name: String,
    pub txt_path: PathBuf,
    /// Instrument PDF. Used for range reconciliation and, unless
    /// `figure_path` is set, as the figure of the sample.
    #[serde(default)]
    pub pdf_path: Option<PathBuf>,
    /// Explicit figure (png/jpg/jpeg or pdf).
    #[serde(default)]
    pub figure_path: Option<PathBuf>,
    #[serde(default)]
    pub manual: ManualFields,
    #[serde(default)]
    pub part_edits: Vec<PartEdit>,
}

impl SampleInput {
    pub fn figure_source(&self) -> Option<&PathBuf> {
        self.figure_path.as_ref().or(self.pdf_path.as_ref())
    }
}
