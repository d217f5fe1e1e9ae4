use common::model::placeholder::PlaceholderMap;

use super::substitute::substitute_in;
use super::wordml::{
    center_paragraph, plain_text, properties_mut, set_property, TCPR_ORDER, W_P, W_PPR, W_TBL,
    W_TC, W_TCPR, W_TR,
};
use super::xml::{XmlElement, XmlNode};
use super::FillOutcome;

/// Vertical merge of equal neighbouring cells in one column.
///
/// With a scope column, two cells only merge when the scope cells of their
/// rows are equal too, so a method repeated by two samples stays split at
/// the sample boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRule {
    pub column: usize,
    pub scope: Option<usize>,
}

impl MergeRule {
    pub const fn column(column: usize) -> Self {
        Self {
            column,
            scope: None,
        }
    }

    pub const fn scoped(column: usize, scope: usize) -> Self {
        Self {
            column,
            scope: Some(scope),
        }
    }
}

/// Locates the first row of a top-level table whose text satisfies
/// `is_marker`. Returns the table index among the body children and the row
/// index among the table children.
fn find_marker_row(body: &XmlElement, is_marker: &dyn Fn(&str) -> bool) -> Option<(usize, usize)> {
    body.children
        .iter()
        .enumerate()
        .filter(|(_, node)| node.is(W_TBL))
        .find_map(|(tbl_idx, node)| {
            let table = node.as_element()?;
            table
                .children
                .iter()
                .position(|row| {
                    row.as_element()
                        .is_some_and(|row| row.name == W_TR && is_marker(&plain_text(row)))
                })
                .map(|row_idx| (tbl_idx, row_idx))
        })
}

/// Replaces the row carrying `marker` by one filled copy per record, then
/// runs the merge rules over the new rows.
///
/// Every copy is cloned from the untouched template row, never from a row
/// that was already filled.
pub fn expand_table_rows(
    body: &mut XmlElement,
    marker: &str,
    records: &[PlaceholderMap],
    merges: &[MergeRule],
) -> FillOutcome {
    expand_table_rows_where(body, marker, &|text: &str| text.contains(marker), records, merges)
}

/// Same as [`expand_table_rows`], with the template row picked by a
/// predicate on its text. `label` only names the row in logs.
pub fn expand_table_rows_where(
    body: &mut XmlElement,
    label: &str,
    is_marker: &dyn Fn(&str) -> bool,
    records: &[PlaceholderMap],
    merges: &[MergeRule],
) -> FillOutcome {
    let Some((tbl_idx, row_idx)) = find_marker_row(body, is_marker) else {
        log::debug!("No table row with marker {}", label);
        return FillOutcome::MarkerMissing;
    };
    if records.is_empty() {
        return FillOutcome::NoRecords;
    }
    let Some(table) = body.children.get_mut(tbl_idx).and_then(XmlNode::as_element_mut) else {
        return FillOutcome::MarkerMissing;
    };
    let Some(template) = table.children.get(row_idx).and_then(XmlNode::as_element).cloned() else {
        return FillOutcome::MarkerMissing;
    };

    let rows: Vec<XmlNode> = records
        .iter()
        .map(|record| {
            let mut row = template.clone();
            substitute_in(&mut row, record);
            row.into()
        })
        .collect();
    table.children.splice(row_idx..=row_idx, rows);

    let filled = &mut table.children[row_idx..row_idx + records.len()];
    merge_rows(filled, merges);

    log::debug!("Expanded {} into {} row(s)", label, records.len());
    FillOutcome::Filled(records.len())
}

fn nth_cell_mut(row: &mut XmlElement, column: usize) -> Option<&mut XmlElement> {
    row.children_named_mut(W_TC).nth(column)
}

fn merge_rows(rows: &mut [XmlNode], merges: &[MergeRule]) {
    let mut rows: Vec<&mut XmlElement> = rows.iter_mut().filter_map(XmlNode::as_element_mut).collect();

    // Texts as filled, before any merge clears a continuation cell.
    let texts: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.children_named(W_TC).map(plain_text).collect())
        .collect();
    let text_at = |row: usize, column: usize| cell_text(&texts, row, column);

    for rule in merges {
        let mut start = 0;
        while start < rows.len() {
            let text = text_at(start, rule.column);
            let mut end = start + 1;
            while end < rows.len()
                && !text.is_empty()
                && text_at(end, rule.column) == text
                && rule
                    .scope
                    .is_none_or(|scope| text_at(end, scope) == text_at(start, scope))
            {
                end += 1;
            }
            if end - start > 1 {
                merge_group(&mut rows[start..end], rule.column);
            }
            start = end;
        }

        for row in rows.iter_mut() {
            if let Some(cell) = nth_cell_mut(row, rule.column) {
                center_cell(cell);
            }
        }
    }
}

fn cell_text(texts: &[Vec<String>], row: usize, column: usize) -> &str {
    texts[row].get(column).map_or("", String::as_str)
}

fn merge_group(rows: &mut [&mut XmlElement], column: usize) {
    for (i, row) in rows.iter_mut().enumerate() {
        let Some(cell) = nth_cell_mut(row, column) else {
            continue;
        };
        let vmerge = if i == 0 {
            XmlElement::new("w:vMerge").with_attr("w:val", "restart")
        } else {
            clear_cell(cell);
            XmlElement::new("w:vMerge")
        };
        set_property(properties_mut(cell, W_TCPR), vmerge, TCPR_ORDER);
    }
}

/// Leaves a single empty paragraph in the cell, keeping the paragraph
/// properties of its first paragraph.
fn clear_cell(cell: &mut XmlElement) {
    let ppr = cell
        .child(W_P)
        .and_then(|p| p.child(W_PPR))
        .cloned();
    cell.children.retain(|node| node.is(W_TCPR));
    let mut paragraph = XmlElement::new(W_P);
    if let Some(ppr) = ppr {
        paragraph.children.push(ppr.into());
    }
    cell.children.push(paragraph.into());
}

fn center_cell(cell: &mut XmlElement) {
    set_property(
        properties_mut(cell, W_TCPR),
        XmlElement::new("w:vAlign").with_attr("w:val", "center"),
        TCPR_ORDER,
    );
    for paragraph in cell.children_named_mut(W_P) {
        center_paragraph(paragraph);
    }
}
