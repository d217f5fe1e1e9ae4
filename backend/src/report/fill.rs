use crate::docx::{
    expand_table_rows, expand_table_rows_where, insert_discussion_block, insert_figure,
    substitute_everywhere, DocxPackage, FigureSource, FillOutcome, MergeRule, PageRasterizer,
    ParagraphAnchor,
};
use crate::error::ReportError;
use common::model::placeholder::{tokens, PlaceholderMap};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Sample cells merge on equal text; method cells merge on equal text
/// within the same sample.
const MEASUREMENT_MERGES: [MergeRule; 2] = [MergeRule::column(0), MergeRule::scoped(1, 0)];

/// A summary template row carries at least two of the summary tokens. A
/// lone `{{Sample_id}}`, as in a sample information table, is a scalar and
/// is left to the final pass.
fn is_summary_row(text: &str) -> bool {
    tokens::SUMMARY_ROW
        .iter()
        .filter(|token| text.contains(**token))
        .count()
        >= 2
}

/// Steps of a report generation, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportStage {
    Parsing,
    Tables,
    Discussion,
    Figures,
    Saving,
}

impl ReportStage {
    /// Share of the work done once this stage starts.
    pub fn percent(self) -> u32 {
        match self {
            ReportStage::Parsing => 10,
            ReportStage::Tables => 30,
            ReportStage::Discussion => 50,
            ReportStage::Figures => 70,
            ReportStage::Saving => 90,
        }
    }
}

/// Figure of one sample: the source file (image or instrument PDF) and the
/// label used in its caption.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureRequest {
    pub source: PathBuf,
    pub label: String,
}

impl FigureRequest {
    /// `DSC test curve of <label>`, the file stem standing in for an empty
    /// label.
    pub fn caption(&self) -> String {
        let label = match self.label.trim() {
            "" => self
                .source
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
            label => label.to_string(),
        };
        format!("DSC test curve of {}", label)
    }
}

/// Everything the template needs, already computed.
#[derive(Debug, Clone)]
pub struct TemplateFill<'a> {
    pub template: &'a Path,
    pub output: &'a Path,
    /// Header placeholders. `{{Discussion}}` is ignored here.
    pub scalars: &'a PlaceholderMap,
    pub measurement_rows: &'a [PlaceholderMap],
    pub summary_rows: &'a [PlaceholderMap],
    pub discussion: &'a str,
    pub figures: &'a [FigureRequest],
    /// Fail on a missing marker row or discussion paragraph instead of
    /// skipping the step.
    pub strict: bool,
}

/// What ended up in the written document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FillReport {
    pub measurement_rows: usize,
    pub summary_rows: usize,
    pub discussion_paragraphs: usize,
    pub figures: usize,
    pub output: PathBuf,
}

fn table_rows(outcome: FillOutcome, marker: &str, strict: bool) -> Result<usize, ReportError> {
    match outcome {
        FillOutcome::Filled(rows) => Ok(rows),
        FillOutcome::NoRecords => Ok(0),
        FillOutcome::MarkerMissing if strict => Err(ReportError::MissingMarker(marker.to_string())),
        FillOutcome::MarkerMissing => {
            log::info!("Template has no {} row, skipping table", marker);
            Ok(0)
        }
    }
}

/// Placeholders of the last pass: the header values, an empty discussion
/// for a marker that was not replaced, and empty measurement cells for a
/// template row that had no records.
fn final_scalars(scalars: &PlaceholderMap) -> PlaceholderMap {
    tokens::SEGMENT_ROW
        .iter()
        .fold(scalars.without(tokens::DISCUSSION), |map, token| {
            map.with(*token, "")
        })
        .with(tokens::DISCUSSION, "")
}

/// Inserts each figure after the previous one, starting after `anchor`.
/// A figure that cannot be read or rasterized is skipped; numbering only
/// counts inserted figures.
fn insert_figures(
    pkg: &mut DocxPackage,
    mut anchor: Option<ParagraphAnchor>,
    figures: &[FigureRequest],
    rasterizer: &dyn PageRasterizer,
) -> usize {
    let mut inserted = 0;
    for figure in figures {
        let image = FigureSource::from_path(&figure.source)
            .and_then(|source| source.resolve(rasterizer));
        let image = match image {
            Ok(image) => image,
            Err(err) => {
                log::warn!("Skipping figure {}: {}", figure.source.display(), err);
                continue;
            }
        };
        match insert_figure(pkg, anchor, &image, inserted + 1, &figure.caption()) {
            Ok(caption) => {
                anchor = Some(caption);
                inserted += 1;
            }
            Err(err) => log::warn!("Skipping figure {}: {}", image.display(), err),
        }
    }
    inserted
}

/// Fills the template and writes the result to `fill.output`.
///
/// Order: measurement table, summary table, discussion, figures chained
/// after the discussion (or at the end of the body), then one scalar pass
/// over the body, headers and footers. Only the final save, the template
/// read and strict-mode marker checks fail the fill.
pub fn fill_template(
    fill: &TemplateFill<'_>,
    rasterizer: &dyn PageRasterizer,
    on_stage: &mut dyn FnMut(ReportStage),
) -> Result<FillReport, ReportError> {
    let template = fs::read(fill.template).map_err(|err| ReportError::io(fill.template, err))?;
    let mut pkg = DocxPackage::from_bytes(&template)?;
    let mut report = FillReport {
        output: fill.output.to_path_buf(),
        ..Default::default()
    };

    on_stage(ReportStage::Tables);
    let outcome = expand_table_rows(
        pkg.body_mut()?,
        tokens::SEG_VALUE,
        fill.measurement_rows,
        &MEASUREMENT_MERGES,
    );
    report.measurement_rows = table_rows(outcome, tokens::SEG_VALUE, fill.strict)?;
    let outcome = expand_table_rows_where(
        pkg.body_mut()?,
        tokens::SAMPLE_ID,
        &is_summary_row,
        fill.summary_rows,
        &[],
    );
    report.summary_rows = table_rows(outcome, tokens::SAMPLE_ID, fill.strict)?;

    on_stage(ReportStage::Discussion);
    let anchors = insert_discussion_block(pkg.body_mut()?, tokens::DISCUSSION, fill.discussion);
    let anchor = match anchors {
        Some(anchors) => {
            report.discussion_paragraphs = anchors.len();
            anchors.last().copied()
        }
        None if fill.strict => {
            return Err(ReportError::MissingMarker(tokens::DISCUSSION.to_string()));
        }
        None => {
            log::info!("Template has no {} paragraph", tokens::DISCUSSION);
            None
        }
    };

    on_stage(ReportStage::Figures);
    report.figures = insert_figures(&mut pkg, anchor, fill.figures, rasterizer);

    substitute_everywhere(&mut pkg, &final_scalars(fill.scalars))?;

    on_stage(ReportStage::Saving);
    if let Some(parent) = fill.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| ReportError::io(parent, err))?;
    }
    pkg.save(fill.output)?;
    log::info!(
        "Report written to {} ({} measurement rows, {} figures)",
        fill.output.display(),
        report.measurement_rows,
        report.figures
    );
    Ok(report)
}
