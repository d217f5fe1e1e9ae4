use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbImage, RgbaImage};
use pdfium_render::prelude::{PdfRenderConfig, Pdfium, PdfiumError};
use png::{BitDepth as PngBitDepth, ColorType as PngColorType, Encoder as PngEncoder};

use super::package::DocxPackage;
use super::wordml::{center_paragraph, new_run, W_P, W_R};
use super::xml::{XmlElement, XmlNode};
use super::{DocxError, ParagraphAnchor};

/// Resolution used to rasterize a PDF figure.
pub const FIGURE_DPI: f32 = 250.0;
/// Share of the printable width taken by a figure.
pub const FIGURE_WIDTH_FRACTION: f64 = 0.9;

const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Renders the first page of a PDF to an image file.
pub trait PageRasterizer: Send + Sync {
    fn rasterize_first_page(&self, pdf: &Path, dpi: f32) -> Result<PathBuf, DocxError>;
}

/// Binds the pdfium library, looked up next to the executable first and
/// then on the system.
pub(crate) fn bind_pdfium() -> Result<Pdfium, PdfiumError> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())?;
    Ok(Pdfium::new(bindings))
}

/// Rasterizer backed by the pdfium library.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRasterizer;

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize_first_page(&self, pdf: &Path, dpi: f32) -> Result<PathBuf, DocxError> {
        let pdfium =
            bind_pdfium().map_err(|e| DocxError::Raster(format!("pdfium not available: {}", e)))?;
        let document = pdfium
            .load_pdf_from_file(pdf, None)
            .map_err(|e| DocxError::Raster(e.to_string()))?;
        let page = document
            .pages()
            .get(0)
            .map_err(|e| DocxError::Raster(e.to_string()))?;
        let bitmap = page
            .render_with_config(&PdfRenderConfig::new().scale_page_by_factor(dpi / 72.0))
            .map_err(|e| DocxError::Raster(e.to_string()))?;

        let (width, height) = (bitmap.width() as u32, bitmap.height() as u32);
        let rgba = RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes())
            .ok_or_else(|| DocxError::Raster("bitmap size mismatch".to_string()))?;
        write_temp_png(&flatten_onto_white(&rgba))
    }
}

/// Composites the image over an opaque white background.
pub fn flatten_onto_white(rgba: &RgbaImage) -> RgbImage {
    let (w, h) = rgba.dimensions();
    let mut background = RgbaImage::from_pixel(w, h, image::Rgba([255, 255, 255, 255]));
    image::imageops::overlay(&mut background, rgba, 0, 0);
    DynamicImage::ImageRgba8(background).to_rgb8()
}

/// Writes `image` as a PNG into the temp directory. The file is kept.
pub fn write_temp_png(image: &RgbImage) -> Result<PathBuf, DocxError> {
    let (w, h) = image.dimensions();
    let mut tmp = tempfile::Builder::new()
        .prefix("dsc_curve_")
        .suffix(".png")
        .tempfile()?;
    {
        let file = tmp.as_file_mut();
        let mut encoder = PngEncoder::new(file, w, h);
        encoder.set_color(PngColorType::Rgb);
        encoder.set_depth(PngBitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| DocxError::Raster(e.to_string()))?;
        writer
            .write_image_data(image.as_raw())
            .map_err(|e| DocxError::Raster(e.to_string()))?;
    }
    let (_, path) = tmp.keep().map_err(|e| DocxError::Io(e.error))?;
    Ok(path)
}

/// A figure file as handed in by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FigureSource {
    Png(PathBuf),
    Jpeg(PathBuf),
    Pdf(PathBuf),
}

impl FigureSource {
    /// Classifies by extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, DocxError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "png" => Ok(FigureSource::Png(path.to_path_buf())),
            "jpg" | "jpeg" => Ok(FigureSource::Jpeg(path.to_path_buf())),
            "pdf" => Ok(FigureSource::Pdf(path.to_path_buf())),
            _ => Err(DocxError::UnsupportedFigure(path.to_path_buf())),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            FigureSource::Png(path) | FigureSource::Jpeg(path) | FigureSource::Pdf(path) => path,
        }
    }

    /// Path of an embeddable image, rasterizing a PDF first.
    pub fn resolve(&self, rasterizer: &dyn PageRasterizer) -> Result<PathBuf, DocxError> {
        match self {
            FigureSource::Png(path) | FigureSource::Jpeg(path) => Ok(path.clone()),
            FigureSource::Pdf(path) => rasterizer.rasterize_first_page(path, FIGURE_DPI),
        }
    }
}

fn inline_drawing(rel_id: &str, drawing_id: u32, file_name: &str, cx: i64, cy: i64) -> XmlElement {
    let extent = |name: &str| {
        XmlElement::new(name)
            .with_attr("cx", cx.to_string())
            .with_attr("cy", cy.to_string())
    };

    let picture = XmlElement::new("pic:pic")
        .with_attr("xmlns:pic", NS_PIC)
        .with_child(
            XmlElement::new("pic:nvPicPr")
                .with_child(
                    XmlElement::new("pic:cNvPr")
                        .with_attr("id", "0")
                        .with_attr("name", file_name),
                )
                .with_child(XmlElement::new("pic:cNvPicPr")),
        )
        .with_child(
            XmlElement::new("pic:blipFill")
                .with_child(
                    XmlElement::new("a:blip")
                        .with_attr("xmlns:r", NS_R)
                        .with_attr("r:embed", rel_id),
                )
                .with_child(XmlElement::new("a:stretch").with_child(XmlElement::new("a:fillRect"))),
        )
        .with_child(
            XmlElement::new("pic:spPr")
                .with_child(
                    XmlElement::new("a:xfrm")
                        .with_child(XmlElement::new("a:off").with_attr("x", "0").with_attr("y", "0"))
                        .with_child(extent("a:ext")),
                )
                .with_child(
                    XmlElement::new("a:prstGeom")
                        .with_attr("prst", "rect")
                        .with_child(XmlElement::new("a:avLst")),
                ),
        );

    let inline = XmlElement::new("wp:inline")
        .with_attr("xmlns:wp", NS_WP)
        .with_attr("distT", "0")
        .with_attr("distB", "0")
        .with_attr("distL", "0")
        .with_attr("distR", "0")
        .with_child(extent("wp:extent"))
        .with_child(
            XmlElement::new("wp:docPr")
                .with_attr("id", drawing_id.to_string())
                .with_attr("name", format!("Picture {}", drawing_id)),
        )
        .with_child(
            XmlElement::new("wp:cNvGraphicFramePr").with_child(
                XmlElement::new("a:graphicFrameLocks")
                    .with_attr("xmlns:a", NS_A)
                    .with_attr("noChangeAspect", "1"),
            ),
        )
        .with_child(
            XmlElement::new("a:graphic").with_attr("xmlns:a", NS_A).with_child(
                XmlElement::new("a:graphicData")
                    .with_attr("uri", NS_PIC)
                    .with_child(picture),
            ),
        );

    XmlElement::new(W_R).with_child(XmlElement::new("w:drawing").with_child(inline))
}

/// Index right after the anchor, or in front of the trailing section
/// properties when there is no anchor.
fn insertion_index(body: &XmlElement, anchor: Option<ParagraphAnchor>) -> usize {
    match anchor {
        Some(ParagraphAnchor(idx)) => (idx + 1).min(body.children.len()),
        None => match body.children.last() {
            Some(node) if node.is("w:sectPr") => body.children.len() - 1,
            _ => body.children.len(),
        },
    }
}

/// Inserts a centered picture paragraph and a centered caption
/// `Figure <number>. <caption>` after `anchor`. The picture spans the
/// configured share of the printable width and keeps its aspect ratio.
///
/// Returns the caption anchor, which is where the next figure goes.
pub fn insert_figure(
    pkg: &mut DocxPackage,
    anchor: Option<ParagraphAnchor>,
    image_path: &Path,
    number: usize,
    caption: &str,
) -> Result<ParagraphAnchor, DocxError> {
    let extension = match FigureSource::from_path(image_path)? {
        FigureSource::Png(_) => "png",
        FigureSource::Jpeg(_) => "jpeg",
        FigureSource::Pdf(_) => return Err(DocxError::UnsupportedFigure(image_path.to_path_buf())),
    };
    let (px_w, px_h) = image::image_dimensions(image_path)?;
    let bytes = fs::read(image_path)?;

    let cx = (pkg.printable_width_emu()? as f64 * FIGURE_WIDTH_FRACTION) as i64;
    let cy = if px_w == 0 {
        cx
    } else {
        (cx as f64 * px_h as f64 / px_w as f64) as i64
    };
    let drawing_id = pkg.next_drawing_id()?;
    let rel_id = pkg.add_image(bytes, extension)?;
    let file_name = image_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut picture = XmlElement::new(W_P).with_child(inline_drawing(&rel_id, drawing_id, &file_name, cx, cy));
    center_paragraph(&mut picture);
    let mut caption_paragraph = XmlElement::new(W_P)
        .with_child(new_run(None, &format!("Figure {}. {}", number, caption)));
    center_paragraph(&mut caption_paragraph);

    let body = pkg.body_mut()?;
    let idx = insertion_index(body, anchor);
    body.children.splice(
        idx..idx,
        [XmlNode::from(picture), XmlNode::from(caption_paragraph)],
    );
    log::debug!("Inserted figure {} from {}", number, image_path.display());
    Ok(ParagraphAnchor(idx + 1))
}
