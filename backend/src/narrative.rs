//! Report prose generated from parsed segments.

use common::model::segment::{PeakPart, Segment};
use regex::Regex;
use std::sync::LazyLock;

static RE_TEMPERATURES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([\-0-9.]+)\s*°C.*?([\-0-9.]+)\s*°C").expect("valid regex")
});

const MISSING: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Heating,
    Cooling,
    Unknown,
}

/// Heating when the first temperature of the display description is below
/// the last one, cooling when above.
pub fn classify_segment(segment: &Segment) -> SegmentKind {
    let Some(caps) = RE_TEMPERATURES.captures(&segment.desc_display) else {
        return SegmentKind::Unknown;
    };
    let (Ok(start), Ok(end)) = (caps[1].parse::<f64>(), caps[2].parse::<f64>()) else {
        return SegmentKind::Unknown;
    };
    if start < end {
        SegmentKind::Heating
    } else if start > end {
        SegmentKind::Cooling
    } else {
        SegmentKind::Unknown
    }
}

fn ordinal(n: usize) -> String {
    match n {
        1 => "First".to_string(),
        2 => "Second".to_string(),
        3 => "Third".to_string(),
        _ => format!("{}th", n),
    }
}

fn count_words(n: usize) -> String {
    const WORDS: [&str; 11] = [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    ];
    WORDS
        .get(n)
        .map_or_else(|| n.to_string(), |word| word.to_string())
}

fn opening_sentence(label: &str, heating_count: usize) -> String {
    let prefix = if label.is_empty() {
        "For this sample".to_string()
    } else {
        format!("For sample {}", label)
    };
    let tail = match heating_count {
        0 => ".".to_string(),
        1 => " with one heating cycle:".to_string(),
        n => format!(" with {} heating cycles:", count_words(n)),
    };
    format!(
        "{}, we conducted a Differential Scanning Calorimetry (DSC) test{}",
        prefix, tail
    )
}

fn celsius(value: Option<f64>) -> String {
    value.map_or_else(|| format!("{} °C", MISSING), |v| format!("{:.1}°C", v))
}

fn event_sentence(part: &PeakPart) -> String {
    let reaction = if part.comment.is_empty() {
        MISSING.to_string()
    } else {
        part.comment.to_lowercase()
    };
    let enthalpy = part
        .area_report
        .map_or_else(|| format!("{} J/g", MISSING), |area| format!("{:.2} J/g", area.abs()));
    format!(
        "Starts at {} with a peak at {}, showing an {} reaction with an enthalpy change (ΔH) of {}.",
        celsius(part.value_temp_c),
        celsius(part.peak_c),
        reaction,
        enthalpy
    )
}

/// Prose for one sample. Empty when there are no segments.
///
/// The opening sentence counts every heating segment. Detail blocks are
/// only written for segments with event data and only those advance the
/// cycle ordinals, so the count and the headings can differ.
pub fn generate_summary(label: &str, segments: &[Segment]) -> String {
    if segments.is_empty() {
        return String::new();
    }

    let heating_count = segments
        .iter()
        .filter(|seg| classify_segment(seg) == SegmentKind::Heating)
        .count();

    let mut lines = vec![opening_sentence(label, heating_count)];
    let mut heating_idx = 0;
    let mut cooling_idx = 0;

    for segment in segments {
        let events: Vec<&PeakPart> = segment
            .parts
            .iter()
            .filter(|part| part.has_event_data())
            .collect();
        if events.is_empty() {
            continue;
        }

        let heading = match classify_segment(segment) {
            SegmentKind::Heating => {
                heating_idx += 1;
                format!("{} heating cycle:", ordinal(heating_idx))
            }
            SegmentKind::Cooling => {
                cooling_idx += 1;
                if cooling_idx == 1 {
                    "Cooling cycle:".to_string()
                } else {
                    format!("{} cooling cycle:", ordinal(cooling_idx))
                }
            }
            SegmentKind::Unknown => format!("Segment {}:", segment.index),
        };
        lines.push(heading);

        if let [only] = events.as_slice() {
            lines.push(format!("Event: {}", event_sentence(only)));
        } else {
            for (i, part) in events.iter().enumerate() {
                lines.push(format!("Event {}: {}", i + 1, event_sentence(part)));
            }
        }
    }

    lines.join("\n")
}

/// Summaries of several samples separated by a blank line. Samples without
/// segments contribute nothing.
pub fn build_discussion<L: AsRef<str>>(samples: &[(L, &[Segment])]) -> String {
    let mut discussion = String::new();
    for (label, segments) in samples {
        let summary = generate_summary(label.as_ref(), segments);
        if summary.is_empty() {
            continue;
        }
        if !discussion.is_empty() {
            discussion.push_str("\n\n");
        }
        discussion.push_str(&summary);
    }
    discussion
}
