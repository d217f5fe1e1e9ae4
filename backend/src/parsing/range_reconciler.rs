use common::model::segment::{PeakPart, Segment};
use lopdf::Document;
use pdfium_render::prelude::PdfiumError;
use regex::Regex;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

use super::instrument_text::normalize_segment_desc;
use crate::docx::figure::bind_pdfium;

static RE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-?\d+(?:\.\d+)?\s*°C\s*/\s*\d+(?:\.\d+)?\s*\(K/min\)\s*/\s*-?\d+(?:\.\d+)?\s*°C")
        .expect("valid regex")
});

#[derive(Debug, Error)]
enum PageTextError {
    #[error("pdfium: {0}")]
    Pdfium(#[from] PdfiumError),
    #[error("lopdf: {0}")]
    Lopdf(#[from] lopdf::Error),
    #[error("document has no pages")]
    NoPages,
    #[error("parser panicked on malformed document")]
    Panicked,
}

/// First page text through pdfium, which decodes embedded font encodings
/// (Identity-H subsets included).
fn pdfium_first_page_text(path: &Path) -> Result<String, PageTextError> {
    let pdfium = bind_pdfium()?;
    let document = pdfium.load_pdf_from_file(path, None)?;
    let page = document.pages().get(0)?;
    let text = page.text()?.all();
    Ok(text)
}

/// First page text through lopdf. Only simple font encodings decode here.
fn lopdf_first_page_text(path: &Path) -> Result<String, PageTextError> {
    let extracted = panic::catch_unwind(AssertUnwindSafe(|| -> Result<String, PageTextError> {
        let doc = Document::load(path)?;
        let first_page = doc
            .get_pages()
            .keys()
            .next()
            .copied()
            .ok_or(PageTextError::NoPages)?;
        Ok(doc.extract_text(&[first_page])?)
    }));
    extracted.unwrap_or(Err(PageTextError::Panicked))
}

/// Range descriptors listed on the first page of the instrument PDF.
///
/// The page text comes from pdfium; lopdf is tried when pdfium is not
/// available or finds no range section. Never fails: an absent, unreadable
/// or marker-less PDF gives an empty list.
pub fn read_pdf_ranges(pdf_path: Option<&Path>) -> Vec<String> {
    let Some(path) = pdf_path else {
        return Vec::new();
    };

    match pdfium_first_page_text(path) {
        Ok(text) => {
            let ranges = extract_ranges(&text);
            if !ranges.is_empty() {
                return ranges;
            }
        }
        Err(e) => log::debug!("pdfium could not read {}: {}", path.display(), e),
    }

    match lopdf_first_page_text(path) {
        Ok(text) => {
            let ranges = extract_ranges(&text);
            if ranges.is_empty() {
                log::debug!("No Range section on first page of {}", path.display());
            }
            ranges
        }
        Err(e) => {
            log::warn!("Could not read ranges from {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

fn ranges_in(line: &str) -> Vec<String> {
    RE_RANGE
        .find_iter(line)
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

/// Collects the descriptors directly following the first line that starts
/// with `Range`. The marker line itself may already carry descriptors.
/// Blank lines are skipped; the first other line without a descriptor ends
/// the section.
pub fn extract_ranges(text: &str) -> Vec<String> {
    let mut lines = text.lines();
    let Some(marker) = lines.by_ref().find(|line| line.trim_start().starts_with("Range")) else {
        return Vec::new();
    };

    let mut ranges = ranges_in(marker);
    for line in lines.filter(|line| !line.trim().is_empty()) {
        let found = ranges_in(line);
        if found.is_empty() {
            break;
        }
        ranges.extend(found);
    }
    ranges
}

/// Pads the text-derived segments with one placeholder per surplus PDF
/// range and sets `total` to the final count. Text segments are never
/// dropped or reordered; with as many or fewer ranges nothing changes.
pub fn reconcile_segments(mut segments: Vec<Segment>, ranges: &[String]) -> Vec<Segment> {
    if ranges.len() <= segments.len() {
        return segments;
    }

    let mut next_index = segments.last().map_or(1, |last| last.index + 1);
    for range in &ranges[segments.len()..] {
        log::debug!("Adding segment {} from PDF range {}", next_index, range);
        segments.push(Segment {
            index: next_index,
            total: 0,
            raw_desc: range.clone(),
            desc_display: normalize_segment_desc(range),
            parts: vec![PeakPart::default()],
        });
        next_index += 1;
    }

    let total = segments.len() as u32;
    for segment in &mut segments {
        segment.total = total;
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(index: u32, total: u32, desc: &str) -> Segment {
        Segment {
            index,
            total,
            raw_desc: desc.to_string(),
            desc_display: normalize_segment_desc(desc),
            parts: Vec::new(),
        }
    }

    #[test]
    fn extracts_ranges_after_marker() {
        let text = "Sample: CF130G\nRange\n-20°C/10.0(K/min)/150°C\n\n150°C/10.0(K/min)/-20°C\nCrucible: Al\n-20°C/10.0(K/min)/150°C\n";
        assert_eq!(
            extract_ranges(text),
            vec!["-20°C/10.0(K/min)/150°C", "150°C/10.0(K/min)/-20°C"]
        );
    }

    #[test]
    fn marker_line_may_hold_the_first_range() {
        let text = "Range: 25°C/20.0(K/min)/300°C\n300°C/20.0(K/min)/25°C\nremark";
        assert_eq!(extract_ranges(text).len(), 2);
    }

    #[test]
    fn section_ends_at_the_first_line_without_a_range() {
        let text = "Range\nMeasurement parameters\n-20°C/10.0(K/min)/150°C\n";
        assert!(extract_ranges(text).is_empty());

        let text = "Range\r\n25 °C / 10.0 (K/min) / 200 °C\r\nRemark: rerun\r\n200°C/10.0(K/min)/25°C\r\n";
        assert_eq!(extract_ranges(text), vec!["25 °C / 10.0 (K/min) / 200 °C"]);
    }

    #[test]
    fn no_marker_means_no_ranges() {
        assert!(extract_ranges("-20°C/10.0(K/min)/150°C\n").is_empty());
        assert!(extract_ranges("").is_empty());
    }

    #[test]
    fn missing_or_broken_pdf_yields_nothing() {
        assert!(read_pdf_ranges(None).is_empty());

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf").expect("write");
        assert!(read_pdf_ranges(Some(&path)).is_empty());
        assert!(read_pdf_ranges(Some(&dir.path().join("absent.pdf"))).is_empty());
    }

    #[test]
    fn surplus_ranges_append_placeholder_segments() {
        let segments = vec![segment(1, 1, "-20°C/10.0(K/min)/150°C")];
        let ranges = vec![
            "-20°C/10.0(K/min)/150°C".to_string(),
            "150°C/10.0(K/min)/-20°C".to_string(),
        ];
        let result = reconcile_segments(segments, &ranges);

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|s| s.total == 2));
        assert_eq!(result[1].index, 2);
        assert_eq!(result[1].desc_display, "150°C ➜ -20°C@10K/min");
        assert_eq!(result[1].parts, vec![PeakPart::default()]);
        assert!(!result[1].has_event_data());
    }

    #[test]
    fn fewer_ranges_leave_segments_untouched() {
        let segments = vec![
            segment(1, 2, "-20°C/10.0(K/min)/150°C"),
            segment(2, 2, "150°C/10.0(K/min)/-20°C"),
        ];
        let ranges = vec!["-20°C/10.0(K/min)/150°C".to_string()];
        assert_eq!(reconcile_segments(segments.clone(), &ranges), segments);
        assert_eq!(reconcile_segments(segments.clone(), &[]), segments);
    }

    #[test]
    fn ranges_without_text_segments_start_at_one() {
        let ranges = vec!["25°C/10.0(K/min)/200°C".to_string()];
        let result = reconcile_segments(Vec::new(), &ranges);
        assert_eq!(result.len(), 1);
        assert_eq!((result[0].index, result[0].total), (1, 1));
    }
}
