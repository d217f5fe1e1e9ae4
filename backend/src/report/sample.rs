use crate::error::ReportError;
use crate::parsing::{
    parse_basic_info, parse_segments, read_instrument_text, read_pdf_ranges, reconcile_segments,
    BasicField,
};
use chrono::NaiveDate;
use common::model::basic_info::BasicInfo;
use common::model::sample::{PartEdit, SampleInput};
use common::model::segment::{reaction_comment, Segment};
use rayon::prelude::*;
use serde::Serialize;

const DATE_FORMATS: [&str; 3] = ["%Y/%m/%d", "%Y-%m-%d", "%Y.%m.%d"];

/// Everything read for one sample: metadata, reconciled segments and the
/// metadata fields that could not be found.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedSample {
    pub basic: BasicInfo,
    pub segments: Vec<Segment>,
    pub missing: Vec<BasicField>,
}

/// Reads the text export of a sample, reconciles its segments with the
/// ranges of the companion PDF and applies the reviewer edits.
pub fn parse_sample(input: &SampleInput) -> Result<ParsedSample, ReportError> {
    let text = read_instrument_text(&input.txt_path)?;
    let basic = parse_basic_info(&text);
    let segments = parse_segments(&text);
    if segments.is_empty() {
        log::warn!(
            "No segments found in {}",
            input.txt_path.display()
        );
    }

    let ranges = read_pdf_ranges(input.pdf_path.as_deref());
    let mut segments = reconcile_segments(segments, &ranges);
    apply_part_edits(&mut segments, &input.part_edits);

    Ok(ParsedSample {
        basic: basic.info,
        segments,
        missing: basic.missing,
    })
}

/// Parses every sample on the rayon pool. Results keep the input order; the
/// first failure is returned with the name of the sample.
pub fn parse_samples(inputs: &[SampleInput]) -> Result<Vec<ParsedSample>, ReportError> {
    inputs
        .par_iter()
        .map(|input| {
            parse_sample(input).map_err(|err| ReportError::Sample {
                name: input.name.clone(),
                reason: err.to_string(),
            })
        })
        .collect()
}

/// Overwrites parsed parts with reviewer corrections. The raw area follows
/// the corrected reported area so that `area_report == -area_raw` holds; an
/// empty comment is derived from the area sign again. Edits pointing outside
/// the parsed parts are skipped.
pub fn apply_part_edits(segments: &mut [Segment], edits: &[PartEdit]) {
    for edit in edits {
        let Some(part) = segments
            .get_mut(edit.segment)
            .and_then(|segment| segment.parts.get_mut(edit.part))
        else {
            log::warn!(
                "Ignoring edit of segment {} part {}: no such part",
                edit.segment,
                edit.part
            );
            continue;
        };

        part.value_temp_c = edit.value_temp_c;
        part.onset_c = edit.onset_c;
        part.peak_c = edit.peak_c;
        part.area_report = edit.area_report;
        part.area_raw = edit.area_report.map(|area| -area);
        let comment = edit.comment.trim();
        part.comment = if comment.is_empty() {
            edit.area_report
                .map(|area| reaction_comment(area).to_string())
                .unwrap_or_default()
        } else {
            comment.to_string()
        };
    }
}

/// Name a sample goes by in tables, prose and captions.
pub fn sample_label(input: &SampleInput, parsed: &ParsedSample) -> String {
    [
        parsed.basic.sample_name.trim(),
        input.manual.sample_id.trim(),
        input.name.trim(),
    ]
    .into_iter()
    .find(|candidate| !candidate.is_empty())
    .unwrap_or_default()
    .to_string()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Latest end date over all samples as `YYYY/MM/DD`. When no date parses,
/// the first non-empty raw value is kept as is.
pub fn latest_end_date(samples: &[ParsedSample]) -> String {
    let latest = samples
        .iter()
        .filter_map(|sample| parse_date(&sample.basic.end_date))
        .max();
    match latest {
        Some(date) => date.format("%Y/%m/%d").to_string(),
        None => samples
            .iter()
            .map(|sample| sample.basic.end_date.trim())
            .find(|raw| !raw.is_empty())
            .unwrap_or_default()
            .to_string(),
    }
}
