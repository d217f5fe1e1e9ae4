//! Template filling on WordprocessingML packages.
//!
//! The package is unzipped into memory ([`package::DocxPackage`]), the XML
//! parts of interest are parsed into a generic element tree ([`xml`]) and
//! every fill step mutates that tree in place. Saving serializes the parsed
//! parts back and copies every other entry byte for byte.

pub mod discussion;
pub mod figure;
pub mod package;
pub mod substitute;
pub mod table;
pub mod wordml;
pub mod xml;

use std::path::PathBuf;
use thiserror::Error;

pub use discussion::insert_discussion_block;
pub use figure::{insert_figure, FigureSource, PageRasterizer, PdfiumRasterizer};
pub use package::DocxPackage;
pub use substitute::{replace_in_paragraph, substitute_everywhere};
pub use table::{expand_table_rows, expand_table_rows_where, MergeRule};

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid docx container: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("malformed XML in {part}: {message}")]
    Xml { part: String, message: String },

    #[error("missing package part: {0}")]
    MissingPart(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("could not rasterize PDF: {0}")]
    Raster(String),

    #[error("unsupported figure file: {}", .0.display())]
    UnsupportedFigure(PathBuf),
}

impl DocxError {
    pub(crate) fn xml(part: &str, message: impl ToString) -> Self {
        DocxError::Xml {
            part: part.to_string(),
            message: message.to_string(),
        }
    }
}

/// Result of a repeating-row fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// The template row was replaced by this many filled rows.
    Filled(usize),
    /// The marker row exists but there was nothing to fill; the template
    /// row is left as is.
    NoRecords,
    /// No row carries the marker.
    MarkerMissing,
}

/// Position of a paragraph among the direct children of `w:body`.
///
/// Only valid until the body is modified in front of it, which is why
/// inserts return the anchor to chain from next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ParagraphAnchor(pub usize);
