use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::xml::{XmlDocument, XmlElement};
use super::DocxError;

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

const IMAGE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

// US Letter with one-inch margins, in twips.
const DEFAULT_PAGE_WIDTH_TWIPS: i64 = 12240;
const DEFAULT_MARGIN_TWIPS: i64 = 1440;
const EMU_PER_TWIP: i64 = 635;

fn is_header_or_footer(name: &str) -> bool {
    let Some(file) = name.strip_prefix("word/") else {
        return false;
    };
    !file.contains('/')
        && (file.starts_with("header") || file.starts_with("footer"))
        && file.ends_with(".xml")
}

/// An unpacked `.docx` container.
///
/// Entries keep their original order. The document, its relationships, the
/// content types and every header/footer part are held parsed; everything
/// else stays raw bytes.
#[derive(Debug, Clone)]
pub struct DocxPackage {
    entries: Vec<(String, Vec<u8>)>,
    parsed: BTreeMap<String, XmlDocument>,
}

impl DocxPackage {
    pub fn open(path: &Path) -> Result<Self, DocxError> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocxError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            entries.push((file.name().to_string(), data));
        }

        let mut parsed = BTreeMap::new();
        for (name, data) in &entries {
            let wanted = name == DOCUMENT_PART
                || name == DOCUMENT_RELS_PART
                || name == CONTENT_TYPES_PART
                || is_header_or_footer(name);
            if wanted {
                let text = String::from_utf8_lossy(data);
                parsed.insert(name.clone(), XmlDocument::parse(name, &text)?);
            }
        }

        if !parsed.contains_key(DOCUMENT_PART) {
            return Err(DocxError::MissingPart(DOCUMENT_PART.to_string()));
        }
        Ok(Self { entries, parsed })
    }

    pub fn document(&self) -> Result<&XmlElement, DocxError> {
        self.parsed
            .get(DOCUMENT_PART)
            .map(|doc| &doc.root)
            .ok_or_else(|| DocxError::MissingPart(DOCUMENT_PART.to_string()))
    }

    pub fn document_mut(&mut self) -> Result<&mut XmlElement, DocxError> {
        self.parsed
            .get_mut(DOCUMENT_PART)
            .map(|doc| &mut doc.root)
            .ok_or_else(|| DocxError::MissingPart(DOCUMENT_PART.to_string()))
    }

    pub fn body(&self) -> Result<&XmlElement, DocxError> {
        self.document()?
            .child("w:body")
            .ok_or_else(|| DocxError::MissingPart("w:body".to_string()))
    }

    pub fn body_mut(&mut self) -> Result<&mut XmlElement, DocxError> {
        self.document_mut()?
            .child_mut("w:body")
            .ok_or_else(|| DocxError::MissingPart("w:body".to_string()))
    }

    /// Root elements of every header and footer part.
    pub fn header_footer_roots_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.parsed
            .iter_mut()
            .filter(|(name, _)| is_header_or_footer(name))
            .map(|(_, doc)| &mut doc.root)
    }

    pub fn has_entry(&self, name: &str) -> bool {
        self.entries.iter().any(|(entry, _)| entry == name)
    }

    /// Stores an image as a new media part and links it from the document.
    /// Returns the relationship id to reference from a drawing.
    pub fn add_image(&mut self, bytes: Vec<u8>, extension: &str) -> Result<String, DocxError> {
        let extension = extension.to_ascii_lowercase();
        self.ensure_content_type_default(&extension)?;

        let mut n = 1;
        let media_name = loop {
            let candidate = format!("word/media/dsc_figure{}.{}", n, extension);
            if !self.has_entry(&candidate) {
                break candidate;
            }
            n += 1;
        };

        let rels = self
            .parsed
            .entry(DOCUMENT_RELS_PART.to_string())
            .or_insert_with(|| XmlDocument {
                root: XmlElement::new("Relationships").with_attr(
                    "xmlns",
                    "http://schemas.openxmlformats.org/package/2006/relationships",
                ),
            });
        let next_id = rels
            .root
            .children_named("Relationship")
            .filter_map(|rel| rel.attr("Id"))
            .filter_map(|id| id.strip_prefix("rId"))
            .filter_map(|num| num.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let rel_id = format!("rId{}", next_id);
        let target = media_name.trim_start_matches("word/").to_string();
        rels.root.children.push(
            XmlElement::new("Relationship")
                .with_attr("Id", rel_id.as_str())
                .with_attr("Type", IMAGE_REL_TYPE)
                .with_attr("Target", target)
                .into(),
        );

        self.entries.push((media_name, bytes));
        Ok(rel_id)
    }

    fn ensure_content_type_default(&mut self, extension: &str) -> Result<(), DocxError> {
        let content_type = match extension {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            other => return Err(DocxError::UnsupportedFigure(format!("image.{}", other).into())),
        };
        let types = self
            .parsed
            .get_mut(CONTENT_TYPES_PART)
            .ok_or_else(|| DocxError::MissingPart(CONTENT_TYPES_PART.to_string()))?;
        let present = types.root.children_named("Default").any(|default| {
            default
                .attr("Extension")
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        });
        if !present {
            types.root.children.insert(
                0,
                XmlElement::new("Default")
                    .with_attr("Extension", extension)
                    .with_attr("ContentType", content_type)
                    .into(),
            );
        }
        Ok(())
    }

    /// Next free `wp:docPr` id in the document.
    pub fn next_drawing_id(&self) -> Result<u32, DocxError> {
        let mut found = Vec::new();
        self.document()?.find_all("wp:docPr", &mut found);
        Ok(found
            .iter()
            .filter_map(|pr| pr.attr("id"))
            .filter_map(|id| id.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1)
    }

    /// Page width minus left and right margins of the body section, in EMU.
    pub fn printable_width_emu(&self) -> Result<i64, DocxError> {
        let sect = self.body()?.child("w:sectPr");
        let twips = |el: Option<&XmlElement>, key: &str, default: i64| {
            el.and_then(|el| el.attr(key))
                .and_then(|value| value.parse::<i64>().ok())
                .unwrap_or(default)
        };
        let page = sect.and_then(|s| s.child("w:pgSz"));
        let margins = sect.and_then(|s| s.child("w:pgMar"));
        let width = twips(page, "w:w", DEFAULT_PAGE_WIDTH_TWIPS)
            - twips(margins, "w:left", DEFAULT_MARGIN_TWIPS)
            - twips(margins, "w:right", DEFAULT_MARGIN_TWIPS);
        Ok(width.max(0) * EMU_PER_TWIP)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, data) in &self.entries {
            writer.start_file(name.as_str(), options)?;
            match self.parsed.get(name) {
                Some(doc) => writer.write_all(doc.to_xml_string().as_bytes())?,
                None => writer.write_all(data)?,
            }
        }
        // Parts created in memory (a relationships part the template lacked).
        for (name, doc) in &self.parsed {
            if !self.has_entry(name) {
                writer.start_file(name.as_str(), options)?;
                writer.write_all(doc.to_xml_string().as_bytes())?;
            }
        }
        Ok(writer.finish()?.into_inner())
    }

    pub fn save(&self, path: &Path) -> Result<(), DocxError> {
        let bytes = self.to_bytes()?;
        fs::write(path, bytes)?;
        Ok(())
    }
}
