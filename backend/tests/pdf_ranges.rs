mod fixtures;

use common::model::sample::SampleInput;
use dsc_report::parsing::range_reconciler::read_pdf_ranges;
use dsc_report::report::parse_sample;
use fixtures::{write_export, write_pdf, EXPORT_A};

const RANGE_PAGE: &[&str] = &[
    "NETZSCH Proteus",
    "Sample: CF130G",
    "Range",
    "-20°C/10.0(K/min)/150°C",
    "150°C/10.0(K/min)/-20°C",
    "25 °C / 10.0 (K/min) / 200 °C",
    "Crucible: Concavus Al",
    "-20°C/10.0(K/min)/150°C",
];

#[test]
fn first_page_range_section_is_read() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pdf = dir.path().join("run.pdf");
    write_pdf(&pdf, RANGE_PAGE);

    assert_eq!(
        read_pdf_ranges(Some(&pdf)),
        vec![
            "-20°C/10.0(K/min)/150°C",
            "150°C/10.0(K/min)/-20°C",
            "25 °C / 10.0 (K/min) / 200 °C",
        ]
    );
}

#[test]
fn pdf_without_range_section_adds_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pdf = dir.path().join("run.pdf");
    write_pdf(&pdf, &["Sample: CF130G", "Measurement parameters", "-20°C/10.0(K/min)/150°C"]);

    assert!(read_pdf_ranges(Some(&pdf)).is_empty());
}

#[test]
fn surplus_pdf_range_becomes_a_trailing_segment() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pdf = dir.path().join("run.pdf");
    write_pdf(&pdf, RANGE_PAGE);
    let input = SampleInput {
        name: "run A".to_string(),
        txt_path: write_export(dir.path(), "a.txt", EXPORT_A),
        pdf_path: Some(pdf),
        ..Default::default()
    };

    let parsed = parse_sample(&input).expect("parsed sample");
    assert_eq!(parsed.segments.len(), 3);
    assert!(parsed.segments.iter().all(|segment| segment.total == 3));

    let added = &parsed.segments[2];
    assert_eq!(added.index, 3);
    assert_eq!(added.raw_desc, "25 °C / 10.0 (K/min) / 200 °C");
    assert_eq!(added.desc_display, "25°C ➜ 200°C@10K/min");
    assert!(!added.has_event_data());
    assert_eq!(parsed.segments[0].desc_display, "-20°C ➜ 150°C@10K/min");
}
