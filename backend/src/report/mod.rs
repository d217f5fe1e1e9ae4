//! Report generation from a set of samples.
//!
//! `sample` turns each `SampleInput` into parsed, reconciled and reviewed
//! data; `records` derives the placeholder maps the template needs; `fill`
//! drives the docx engine in its fixed step order and saves the result.

mod fill;
mod records;
mod sample;

pub use fill::{fill_template, FigureRequest, FillReport, ReportStage, TemplateFill};
pub use records::{build_placeholder_map, measurement_rows, summary_rows};
pub use sample::{
    apply_part_edits, latest_end_date, parse_sample, parse_samples, sample_label, ParsedSample,
};

use crate::docx::PageRasterizer;
use crate::error::ReportError;
use crate::narrative::build_discussion;
use common::model::placeholder::PlaceholderMap;
use common::model::segment::Segment;
use common::requests::GenerateReportRequest;
use std::path::Path;

/// Parses every sample of `request` and writes the filled `template` to
/// `output`. `on_stage` is called as each step starts.
pub fn generate_report(
    request: &GenerateReportRequest,
    template: &Path,
    output: &Path,
    rasterizer: &dyn PageRasterizer,
    on_stage: &mut dyn FnMut(ReportStage),
) -> Result<FillReport, ReportError> {
    on_stage(ReportStage::Parsing);
    let parsed = parse_samples(&request.samples)?;
    let labels: Vec<String> = request
        .samples
        .iter()
        .zip(&parsed)
        .map(|(input, sample)| sample_label(input, sample))
        .collect();
    log::info!("Generating report for {} sample(s)", parsed.len());

    let end_date = latest_end_date(&parsed);
    let scalars = build_placeholder_map(
        &request.request,
        request.samples.first().zip(parsed.first()),
        &end_date,
    );
    let measurement: Vec<PlaceholderMap> = labels
        .iter()
        .zip(&parsed)
        .flat_map(|(label, sample)| measurement_rows(label, &sample.segments))
        .collect();
    let summary = summary_rows(
        request
            .samples
            .iter()
            .zip(labels.iter().map(String::as_str)),
    );

    let narrated: Vec<(&str, &[Segment])> = labels
        .iter()
        .zip(&parsed)
        .map(|(label, sample)| (label.as_str(), sample.segments.as_slice()))
        .collect();
    let discussion = build_discussion(&narrated);

    let figures: Vec<FigureRequest> = request
        .samples
        .iter()
        .zip(&labels)
        .filter_map(|(input, label)| {
            input.figure_source().map(|source| FigureRequest {
                source: source.clone(),
                label: label.clone(),
            })
        })
        .collect();

    fill_template(
        &TemplateFill {
            template,
            output,
            scalars: &scalars,
            measurement_rows: &measurement,
            summary_rows: &summary,
            discussion: &discussion,
            figures: &figures,
            strict: request.strict,
        },
        rasterizer,
        on_stage,
    )
}
