use common::model::placeholder::PlaceholderMap;

use super::package::DocxPackage;
use super::wordml::{for_each_paragraph_mut, paragraph_text, run_text, set_run_text, W_R};
use super::xml::XmlElement;
use super::DocxError;

/// Replaces every key of `map` found in the paragraph.
///
/// A key that sits inside a single run is replaced there and the run keeps
/// its formatting. A key split over several runs is replaced in the full
/// paragraph text, which then goes into the first run while the others are
/// emptied. Returns whether anything was replaced.
pub fn replace_in_paragraph(paragraph: &mut XmlElement, map: &PlaceholderMap) -> bool {
    if paragraph_text(paragraph).is_empty() {
        return false;
    }

    let mut changed = false;
    for (key, value) in map.iter() {
        let full_text = paragraph_text(paragraph);
        if !full_text.contains(key) {
            continue;
        }
        changed = true;

        let mut replaced_in_run = false;
        for run in paragraph.children_named_mut(W_R) {
            let text = run_text(run);
            if text.contains(key) {
                set_run_text(run, &text.replace(key, value));
                replaced_in_run = true;
            }
        }
        if replaced_in_run {
            continue;
        }

        let collapsed = full_text.replace(key, value);
        for (i, run) in paragraph.children_named_mut(W_R).enumerate() {
            set_run_text(run, if i == 0 { collapsed.as_str() } else { "" });
        }
    }
    changed
}

/// Substitution over every paragraph below `root`. Returns the number of
/// paragraphs that changed.
pub fn substitute_in(root: &mut XmlElement, map: &PlaceholderMap) -> usize {
    let mut changed = 0;
    for_each_paragraph_mut(root, &mut |paragraph| {
        if replace_in_paragraph(paragraph, map) {
            changed += 1;
        }
    });
    changed
}

/// Substitution over the document body, its tables and every header and
/// footer part.
pub fn substitute_everywhere(
    pkg: &mut DocxPackage,
    map: &PlaceholderMap,
) -> Result<usize, DocxError> {
    if map.is_empty() {
        return Ok(0);
    }
    let mut changed = substitute_in(pkg.document_mut()?, map);
    for root in pkg.header_footer_roots_mut() {
        changed += substitute_in(root, map);
    }
    log::debug!("Placeholder substitution changed {} paragraph(s)", changed);
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::wordml::{plain_text, W_P, W_RPR, W_T};

    fn run(text: &str, bold: bool) -> XmlElement {
        let mut r = XmlElement::new(W_R);
        if bold {
            r = r.with_child(XmlElement::new(W_RPR).with_child(XmlElement::new("w:b")));
        }
        r.with_child(XmlElement::new(W_T).with_text(text))
    }

    fn paragraph(runs: Vec<XmlElement>) -> XmlElement {
        runs.into_iter()
            .fold(XmlElement::new(W_P), |p, r| p.with_child(r))
    }

    #[test]
    fn replaces_inside_a_run_and_keeps_formatting() {
        let mut p = paragraph(vec![run("Operator: ", false), run("{{Operator}}", true)]);
        let map = PlaceholderMap::new().with("{{Operator}}", "Mark");
        assert!(replace_in_paragraph(&mut p, &map));
        assert_eq!(paragraph_text(&p), "Operator: Mark");
        let runs: Vec<&XmlElement> = p.children_named(W_R).collect();
        assert!(runs[1].child(W_RPR).is_some());
    }

    #[test]
    fn split_key_collapses_into_first_run() {
        let mut p = paragraph(vec![run("Name: {{Sample", false), run("_name}}", true), run("!", false)]);
        let map = PlaceholderMap::new().with("{{Sample_name}}", "CF130G");
        assert!(replace_in_paragraph(&mut p, &map));
        let runs: Vec<String> = p.children_named(W_R).map(run_text).collect();
        assert_eq!(runs, ["Name: CF130G!", "", ""]);
    }

    #[test]
    fn every_occurrence_is_replaced() {
        let mut p = paragraph(vec![run("{{Sample_id}} / {{Sample_id}}", false)]);
        let map = PlaceholderMap::new().with("{{Sample_id}}", "S1");
        replace_in_paragraph(&mut p, &map);
        assert_eq!(paragraph_text(&p), "S1 / S1");
    }

    #[test]
    fn map_without_matching_keys_changes_nothing() {
        let mut body = XmlElement::new("w:body")
            .with_child(paragraph(vec![run("{{Operator}} and text", false)]))
            .with_child(paragraph(vec![]));
        let before = body.clone();
        let map = PlaceholderMap::new().with("{{Deadline}}", "2025/06/01");
        assert_eq!(substitute_in(&mut body, &map), 0);
        assert_eq!(body, before);
        assert_eq!(plain_text(&body), "{{Operator}} and text");
    }
}
