use super::sample::ParsedSample;
use common::model::placeholder::{tokens, PlaceholderMap};
use common::model::request::RequestInfo;
use common::model::sample::SampleInput;
use common::model::segment::Segment;

fn fixed(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{:.*}", decimals, v))
        .unwrap_or_default()
}

/// Scalar placeholders of the report header.
///
/// Request fields come from `request`; sample fields come from the first
/// sample, except `{{End_Date}}` which is the latest end date of the run.
/// `{{Discussion}}` is left out: the discussion block is inserted as
/// paragraphs, not substituted.
pub fn build_placeholder_map(
    request: &RequestInfo,
    first: Option<(&SampleInput, &ParsedSample)>,
    end_date: &str,
) -> PlaceholderMap {
    let request_fields = [
        (tokens::LSMP_CODE, &request.lsmp_code),
        (tokens::REQUEST_ID, &request.request_id),
        (tokens::CUSTOMER_INFORMATION, &request.customer_information),
        (tokens::REQUEST_NAME, &request.request_name),
        (tokens::SUBMISSION_DATE, &request.submission_date),
        (tokens::REQUEST_NUMBER, &request.request_number),
        (tokens::PROJECT_ACCOUNT, &request.project_account),
        (tokens::DEADLINE, &request.deadline),
        (tokens::TEST_DATE, &request.test_date),
        (tokens::RECEIVE_DATE, &request.receive_date),
        (tokens::REPORT_DATE, &request.report_date),
        (tokens::REQUEST_DESC, &request.request_desc),
    ];
    let mut map: PlaceholderMap = request_fields
        .into_iter()
        .map(|(token, value)| (token, value.trim().to_string()))
        .collect();

    let (manual, basic) = match first {
        Some((input, parsed)) => (input.manual.clone(), parsed.basic.clone()),
        None => Default::default(),
    };
    map = map
        .with(tokens::SAMPLE_ID, manual.sample_id.trim())
        .with(tokens::NATURE, manual.nature.trim())
        .with(tokens::ASSIGN_TO, manual.assign_to.trim())
        .with(tokens::SAMPLE_NAME, basic.sample_name.as_str())
        .with(tokens::SAMPLE_MASS, basic.sample_mass_display())
        .with(tokens::OPERATOR, basic.operator.as_str())
        .with(tokens::INSTRUMENT, basic.instrument.as_str())
        .with(tokens::ATMOSPHERE, basic.atmosphere.as_str())
        .with(tokens::CRUCIBLE, basic.crucible.as_str())
        .with(tokens::TEMP_CALIB, basic.temp_calib.as_str())
        .with(tokens::END_DATE, end_date);
    map
}

/// One `{{SEG_*}}` record per part of every segment of a sample.
///
/// Temperatures are printed with one decimal, areas with three; unset
/// values print as empty cells.
pub fn measurement_rows(label: &str, segments: &[Segment]) -> Vec<PlaceholderMap> {
    segments
        .iter()
        .flat_map(|segment| {
            segment.parts.iter().map(move |part| {
                PlaceholderMap::new()
                    .with(tokens::SEG_SAMPLE, label)
                    .with(tokens::SEG_METHOD, segment.desc_display.as_str())
                    .with(tokens::SEG_VALUE, fixed(part.value_temp_c, 1))
                    .with(tokens::SEG_ONSET, fixed(part.onset_c, 1))
                    .with(tokens::SEG_PEAK, fixed(part.peak_c, 1))
                    .with(tokens::SEG_AREA, fixed(part.area_report, 3))
                    .with(tokens::SEG_COMMENT, part.comment.as_str())
            })
        })
        .collect()
}

/// One summary record per sample: id, label, nature and assignee.
pub fn summary_rows<'a>(
    samples: impl IntoIterator<Item = (&'a SampleInput, &'a str)>,
) -> Vec<PlaceholderMap> {
    samples
        .into_iter()
        .map(|(input, label)| {
            PlaceholderMap::new()
                .with(tokens::SAMPLE_ID, input.manual.sample_id.trim())
                .with(tokens::SAMPLE_NAME, label)
                .with(tokens::NATURE, input.manual.nature.trim())
                .with(tokens::ASSIGN_TO, input.manual.assign_to.trim())
        })
        .collect()
}
