use common::model::basic_info::BasicInfo;
use common::model::segment::{PeakPart, Segment};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static RE_SAMPLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Sample (?:identity|name):[ \t]*(.+)").expect("valid regex"));
static RE_SAMPLE_MASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Sample Mass:\s*([\d.]+)\s*mg").expect("valid regex"));
static RE_OPERATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Operator:[ \t]*(.+)").expect("valid regex"));
static RE_INSTRUMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Instrument:[ \t]*(.+)").expect("valid regex"));
static RE_ATMOSPHERE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Atmosphere:[ \t]*(.+)").expect("valid regex"));
static RE_CRUCIBLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Crucible:[ \t]*(.+)").expect("valid regex"));
static RE_TEMP_CALIB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Temp\.Calib\.\s*:\s*([0-9]{2})-([0-9]{2})-([0-9]{4})").expect("valid regex")
});
static RE_END_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"End Date/Time:\s*([0-9]{4})/([0-9]{1,2})/([0-9]{1,2})").expect("valid regex")
});

static RE_SEGMENT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Segments:\s*(\d+)\s*/\s*(\d+)\s*:[ \t]*(.+)").expect("valid regex")
});
static RE_SEGMENT_DESC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(.+?)\s*°C\s*/\s*([0-9.]+)\s*\(K/min\)\s*/\s*(.+?)\s*°C").expect("valid regex")
});
static RE_PEAK_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)Complex Peak \(DSC\).*?\nArea\s+([-\d.]+)\s+J/g.*?\nPeak:\s+([-\d.]+)\s+°C.*?\nOnset:\s+([-\d.]+)\s+°C",
    )
    .expect("valid regex")
});
static RE_VALUE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Value \(DSC\)\s+([-\d.]+)\s+mW/mg\s+([-\d.]+)\s+°C").expect("valid regex")
});

/// Metadata fields looked up in the export header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BasicField {
    SampleName,
    SampleMass,
    Operator,
    Instrument,
    Atmosphere,
    Crucible,
    TempCalib,
    EndDate,
}

/// Metadata together with the fields whose pattern did not match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasicInfoParse {
    pub info: BasicInfo,
    pub missing: Vec<BasicField>,
}

impl BasicInfoParse {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

fn capture_line(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|caps| caps[1].trim().to_string())
}

/// Zero-padded `YYYY/MM/DD` from captured numeric parts.
fn format_date(year: &str, month: &str, day: &str) -> Option<String> {
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    Some(format!("{}/{:02}/{:02}", year, month, day))
}

/// Extracts the scalar metadata. Every field is searched independently; a
/// miss leaves the default value and is listed in `missing`.
pub fn parse_basic_info(text: &str) -> BasicInfoParse {
    let mut parse = BasicInfoParse::default();
    let info = &mut parse.info;
    let missing = &mut parse.missing;

    match capture_line(&RE_SAMPLE_NAME, text) {
        Some(name) => info.sample_name = name,
        None => missing.push(BasicField::SampleName),
    }

    info.sample_mass_mg = RE_SAMPLE_MASS
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok());
    if info.sample_mass_mg.is_none() {
        missing.push(BasicField::SampleMass);
    }

    match capture_line(&RE_OPERATOR, text) {
        Some(operator) => info.operator = operator,
        None => missing.push(BasicField::Operator),
    }
    match capture_line(&RE_INSTRUMENT, text) {
        Some(instrument) => info.instrument = instrument,
        None => missing.push(BasicField::Instrument),
    }
    match capture_line(&RE_ATMOSPHERE, text) {
        Some(atmosphere) => info.atmosphere = atmosphere,
        None => missing.push(BasicField::Atmosphere),
    }

    // "Concavus Al, pierced lid" -> "Concavus Al"
    match capture_line(&RE_CRUCIBLE, text) {
        Some(crucible) => {
            info.crucible = match crucible.split_once(',') {
                Some((head, _)) => head.trim().to_string(),
                None => crucible,
            }
        }
        None => missing.push(BasicField::Crucible),
    }

    // DD-MM-YYYY HH:MM
    match RE_TEMP_CALIB
        .captures(text)
        .and_then(|caps| format_date(&caps[3], &caps[2], &caps[1]))
    {
        Some(date) => info.temp_calib = date,
        None => missing.push(BasicField::TempCalib),
    }

    // YYYY/M/D HH:MM:SS (UTC+8)
    match RE_END_DATE
        .captures(text)
        .and_then(|caps| format_date(&caps[1], &caps[2], &caps[3]))
    {
        Some(date) => info.end_date = date,
        None => missing.push(BasicField::EndDate),
    }

    if !parse.missing.is_empty() {
        log::debug!("Export metadata without match: {:?}", parse.missing);
    }
    parse
}

/// `-20°C/10.0(K/min)/150°C` -> `-20°C ➜ 150°C@10K/min`.
///
/// Descriptors that do not follow the pattern are returned trimmed.
pub fn normalize_segment_desc(desc: &str) -> String {
    let Some(caps) = RE_SEGMENT_DESC.captures(desc) else {
        return desc.trim().to_string();
    };
    let Ok(rate) = caps[2].parse::<f64>() else {
        return desc.trim().to_string();
    };
    format!("{}°C ➜ {}°C@{}K/min", &caps[1], &caps[3], rate)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok()
}

/// Builds the parts of one segment body by pairing peak blocks and value
/// lines index by index.
fn parse_parts(body: &str) -> Vec<PeakPart> {
    let peaks: Vec<_> = RE_PEAK_BLOCK.captures_iter(body).collect();
    let values: Vec<_> = RE_VALUE_LINE.captures_iter(body).collect();

    (0..peaks.len().max(values.len()))
        .map(|idx| {
            let mut part = PeakPart::default();
            if let Some(peak) = peaks.get(idx) {
                part.set_peak(
                    parse_number(&peak[1]),
                    parse_number(&peak[2]),
                    parse_number(&peak[3]),
                );
            }
            if let Some(value) = values.get(idx) {
                part.value_dsc = parse_number(&value[1]);
                part.value_temp_c = parse_number(&value[2]);
            }
            part
        })
        .collect()
}

/// Extracts the segments of the run. The body of a segment runs from its
/// header to the next header (or the end of the text). An export without
/// any header yields an empty list.
pub fn parse_segments(text: &str) -> Vec<Segment> {
    let headers: Vec<_> = RE_SEGMENT_HEADER.captures_iter(text).collect();
    if headers.is_empty() {
        log::debug!("No segment header found in export");
        return Vec::new();
    }

    headers
        .iter()
        .enumerate()
        .map(|(i, caps)| {
            let start = caps.get(0).map_or(0, |m| m.end());
            let end = headers
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(text.len(), |m| m.start());
            let raw_desc = caps[3].trim().to_string();

            Segment {
                index: caps[1].parse().unwrap_or(i as u32 + 1),
                total: caps[2].parse().unwrap_or(headers.len() as u32),
                desc_display: normalize_segment_desc(&raw_desc),
                raw_desc,
                parts: parse_parts(&text[start..end]),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "\
Sample identity:      CF130G\r
Sample Mass:          8.496 mg\r
Operator:             Mark\r
Instrument:           NETZSCH DSC 214 Polyma\r
Atmosphere:           N2\r
Crucible:             Concavus Al, pierced lid\r
Temp.Calib.:          09-04-2025 14:25\r
End Date/Time:        2025/5/6 10:57:06 (UTC+8)\r
";

    const SEGMENTS: &str = "\
Segments:             1/3   :   -20°C/10.0(K/min)/150°C\r
Complex Peak (DSC)\r
Area                  -45.12 J/g\r
Peak:                 121.3 °C\r
Onset:                115.0 °C\r
Complex Peak (DSC)\r
Area                  -3.2 J/g\r
Peak:                 140.8 °C\r
Onset:                138.1 °C\r
Value (DSC)           0.123 mW/mg     110.5 °C\r
Segments:             2/3   :   150°C/10.0(K/min)/-20°C\r
Complex Peak (DSC)\r
Area                  20.5 J/g\r
Peak:                 95.2 °C\r
Onset:                99.9 °C\r
Value (DSC)           -0.2 mW/mg     101.0 °C\r
Segments:             3/3   :   -20°C/2.5(K/min)/150°C\r
";

    #[test]
    fn parses_every_metadata_field() {
        let parse = parse_basic_info(HEADER);
        assert!(parse.is_complete(), "missing: {:?}", parse.missing);
        let info = parse.info;
        assert_eq!(info.sample_name, "CF130G");
        assert_eq!(info.sample_mass_mg, Some(8.496));
        assert_eq!(info.operator, "Mark");
        assert_eq!(info.instrument, "NETZSCH DSC 214 Polyma");
        assert_eq!(info.atmosphere, "N2");
        assert_eq!(info.crucible, "Concavus Al");
        assert_eq!(info.temp_calib, "2025/04/09");
        assert_eq!(info.end_date, "2025/05/06");
    }

    #[test]
    fn reparsing_gives_the_same_record() {
        assert_eq!(parse_basic_info(HEADER), parse_basic_info(HEADER));
    }

    #[test]
    fn sample_name_label_is_also_accepted() {
        let parse = parse_basic_info("Sample name: PA66\n");
        assert_eq!(parse.info.sample_name, "PA66");
    }

    #[test]
    fn missing_fields_keep_defaults() {
        let parse = parse_basic_info("Operator: Mark\nCrucible: Al pan\n");
        assert_eq!(parse.info.operator, "Mark");
        assert_eq!(parse.info.crucible, "Al pan");
        assert_eq!(parse.info.sample_mass_mg, None);
        assert_eq!(parse.info.end_date, "");
        assert!(parse.missing.contains(&BasicField::SampleName));
        assert!(parse.missing.contains(&BasicField::EndDate));
        assert!(!parse.missing.contains(&BasicField::Operator));
    }

    #[test]
    fn normalizes_segment_descriptions() {
        assert_eq!(
            normalize_segment_desc("-20°C/10.0(K/min)/150°C"),
            "-20°C ➜ 150°C@10K/min"
        );
        assert_eq!(
            normalize_segment_desc(" 150°C / 2.5(K/min) / -20°C "),
            "150°C ➜ -20°C@2.5K/min"
        );
        assert_eq!(
            normalize_segment_desc("25 °C / 10.0 (K/min) / 200 °C"),
            "25°C ➜ 200°C@10K/min"
        );
        assert_eq!(normalize_segment_desc("  isothermal 5 min "), "isothermal 5 min");
    }

    #[test]
    fn splits_segments_and_pairs_parts() {
        let segments = parse_segments(SEGMENTS);
        assert_eq!(segments.len(), 3);

        let first = &segments[0];
        assert_eq!((first.index, first.total), (1, 3));
        assert_eq!(first.raw_desc, "-20°C/10.0(K/min)/150°C");
        assert_eq!(first.desc_display, "-20°C ➜ 150°C@10K/min");
        // two peak blocks, one value line
        assert_eq!(first.parts.len(), 2);
        assert_eq!(first.parts[0].value_temp_c, Some(110.5));
        assert_eq!(first.parts[0].value_dsc, Some(0.123));
        assert_eq!(first.parts[0].area_report, Some(45.12));
        assert_eq!(first.parts[0].comment, "Endothermic");
        assert_eq!(first.parts[1].value_temp_c, None);
        assert_eq!(first.parts[1].peak_c, Some(140.8));

        let second = &segments[1];
        assert_eq!(second.parts.len(), 1);
        assert_eq!(second.parts[0].area_report, Some(-20.5));
        assert_eq!(second.parts[0].comment, "Exothermic");
        assert_eq!(second.parts[0].onset_c, Some(99.9));

        assert!(segments[2].parts.is_empty());
    }

    #[test]
    fn value_lines_without_peaks_still_make_parts() {
        let text = "Segments: 1/1: 25°C/10.0(K/min)/200°C\nValue (DSC) 0.5 mW/mg 80.0 °C\n";
        let segments = parse_segments(text);
        assert_eq!(segments[0].parts.len(), 1);
        assert_eq!(segments[0].parts[0].value_temp_c, Some(80.0));
        assert_eq!(segments[0].parts[0].area_report, None);
        assert_eq!(segments[0].parts[0].comment, "");
    }

    #[test]
    fn no_header_means_no_segments() {
        assert!(parse_segments(HEADER).is_empty());
    }
}
