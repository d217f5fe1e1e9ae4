#![allow(dead_code)]

use dsc_report::docx::{DocxError, PageRasterizer};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/header1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/></Relationships>"#;

pub fn paragraph(text: &str) -> String {
    format!(
        r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        text
    )
}

pub fn row(cells: &[&str]) -> String {
    let cells: String = cells
        .iter()
        .map(|text| {
            format!(
                r#"<w:tc><w:tcPr><w:tcW w:w="1200" w:type="dxa"/></w:tcPr>{}</w:tc>"#,
                paragraph(text)
            )
        })
        .collect();
    format!("<w:tr>{}</w:tr>", cells)
}

pub fn measurement_table() -> String {
    format!(
        "<w:tbl><w:tblPr/>{}{}</w:tbl>",
        row(&["Sample", "Method", "Start", "Onset", "Peak", "Area", "Comment"]),
        row(&[
            "{{SEG_SAMPLE}}",
            "{{SEG_METHOD}}",
            "{{SEG_VALUE}}",
            "{{SEG_ONSET}}",
            "{{SEG_PEAK}}",
            "{{SEG_AREA}}",
            "{{SEG_COMMENT}}",
        ])
    )
}

pub fn summary_table() -> String {
    format!(
        "<w:tbl><w:tblPr/>{}{}</w:tbl>",
        row(&["ID", "Name", "Nature", "Assigned to"]),
        row(&["{{Sample_id}}", "{{Sample_name}}", "{{Nature}}", "{{Assign_to}}"])
    )
}

pub fn discussion_paragraph() -> String {
    r#"<w:p><w:pPr><w:pStyle w:val="BodyText"/></w:pPr><w:r><w:rPr><w:rFonts w:ascii="Times New Roman"/><w:sz w:val="21"/></w:rPr><w:t>{{Discussion}}</w:t></w:r></w:p>"#
        .to_string()
}

/// Body of the usual report layout: header fields, both tables, the
/// discussion marker and a closing line.
pub fn report_body() -> String {
    [
        paragraph("Request {{Request_id}} for {{Customer_information}}"),
        paragraph("Sample: {{Sample_name}} ({{Sample_mass}}), crucible {{Crucible}}"),
        measurement_table(),
        summary_table(),
        discussion_paragraph(),
        paragraph("End of report {{End_Date}}"),
    ]
    .concat()
}

pub fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}" xmlns:r="{}"><w:body>{}<w:sectPr><w:headerReference w:type="default" r:id="rId1"/><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1134" w:bottom="1440" w:left="1134"/></w:sectPr></w:body></w:document>"#,
        NS_W, NS_R, body
    )
}

pub fn docx_bytes(body: &str) -> Vec<u8> {
    let header = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:hdr xmlns:w="{}">{}</w:hdr>"#,
        NS_W,
        paragraph("LSMP {{LSMP_code}}")
    );
    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", ROOT_RELS.to_string()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.to_string()),
        ("word/document.xml", document_xml(body)),
        ("word/header1.xml", header),
    ];

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in parts {
        writer.start_file(name, options).expect("start file");
        writer.write_all(content.as_bytes()).expect("write part");
    }
    writer.finish().expect("finish zip").into_inner()
}

pub fn write_template(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("template.docx");
    fs::write(&path, docx_bytes(body)).expect("write template");
    path
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    image::RgbImage::from_pixel(width, height, image::Rgb([20, 40, 60]))
        .save(path)
        .expect("write png");
}

/// Stands in for pdfium: every PDF "renders" to the same PNG.
pub struct StubRasterizer(pub PathBuf);

impl PageRasterizer for StubRasterizer {
    fn rasterize_first_page(&self, _pdf: &Path, _dpi: f32) -> Result<PathBuf, DocxError> {
        Ok(self.0.clone())
    }
}

/// Fails like a PDF that cannot be opened.
pub struct FailingRasterizer;

impl PageRasterizer for FailingRasterizer {
    fn rasterize_first_page(&self, pdf: &Path, _dpi: f32) -> Result<PathBuf, DocxError> {
        Err(DocxError::Raster(format!("cannot open {}", pdf.display())))
    }
}

pub const EXPORT_A: &str = "\
Sample identity:      CF130G\r
Sample Mass:          8.496 mg\r
Operator:             Mark\r
Instrument:           NETZSCH DSC 214 Polyma\r
Atmosphere:           N2\r
Crucible:             Concavus Al, pierced lid\r
Temp.Calib.:          09-04-2025 14:25\r
End Date/Time:        2025/5/6 10:57:06 (UTC+8)\r
Segments:             1/2   :   -20°C/10.0(K/min)/150°C\r
Complex Peak (DSC)\r
Area                  -12.500 J/g\r
Peak:                 101.2 °C\r
Onset:                98.0 °C\r
Value (DSC)           0.120 mW/mg     95.5 °C\r
Segments:             2/2   :   150°C/10.0(K/min)/-20°C\r
Complex Peak (DSC)\r
Area                  8.000 J/g\r
Peak:                 80.1 °C\r
Onset:                85.0 °C\r
Value (DSC)           -0.050 mW/mg     86.0 °C\r
";

pub const EXPORT_B: &str = "\
Operator:             Mark\r
End Date/Time:        2025/6/1 09:00:00 (UTC+8)\r
Segments:             1/1   :   25°C/20.0(K/min)/300°C\r
Complex Peak (DSC)\r
Area                  -30.000 J/g\r
Peak:                 160.0 °C\r
Onset:                155.0 °C\r
Complex Peak (DSC)\r
Area                  5.000 J/g\r
Peak:                 250.0 °C\r
Onset:                245.0 °C\r
";

pub fn write_export(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).expect("write export");
    path
}

/// One-page PDF with one text line per entry, set in WinAnsi Helvetica.
pub fn write_pdf(path: &Path, lines: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let operations: Vec<Operation> = lines
        .iter()
        .enumerate()
        .flat_map(|(idx, line)| {
            let text = Document::encode_text(Some("WinAnsiEncoding"), line);
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 11.into()]),
                Operation::new("Td", vec![56.into(), (780 - 18 * idx as i64).into()]),
                Operation::new("Tj", vec![Object::String(text, StringFormat::Literal)]),
                Operation::new("ET", vec![]),
            ]
        })
        .collect();
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().expect("content stream"),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("write pdf");
}
