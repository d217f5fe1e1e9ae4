use super::wordml::{new_run, paragraph_text, set_property, RPR_ORDER, W_P, W_PPR, W_R, W_RPR};
use super::xml::{XmlElement, XmlNode};
use super::ParagraphAnchor;

const HEADING_SUFFIXES: [&str; 2] = ["heating cycle:", "cooling cycle:"];

fn is_cycle_heading(line: &str) -> bool {
    let folded = line.trim().to_lowercase();
    HEADING_SUFFIXES
        .iter()
        .any(|suffix| folded.ends_with(suffix))
}

/// Run properties carried over from the marker paragraph: font and size of
/// its first run.
fn base_run_properties(marker: &XmlElement) -> Option<XmlElement> {
    let rpr = marker.child(W_R)?.child(W_RPR)?;
    let mut base = XmlElement::new(W_RPR);
    for name in ["w:rFonts", "w:sz", "w:szCs"] {
        if let Some(property) = rpr.child(name) {
            set_property(&mut base, property.clone(), RPR_ORDER);
        }
    }
    (!base.children.is_empty()).then_some(base)
}

fn line_paragraph(style: Option<&XmlElement>, font: Option<&XmlElement>, line: &str) -> XmlElement {
    let mut paragraph = XmlElement::new(W_P);
    if let Some(style) = style {
        paragraph
            .children
            .push(XmlElement::new(W_PPR).with_child(style.clone()).into());
    }
    if line.is_empty() {
        return paragraph;
    }

    let mut rpr = font.cloned().unwrap_or_else(|| XmlElement::new(W_RPR));
    if is_cycle_heading(line) {
        set_property(&mut rpr, XmlElement::new("w:b"), RPR_ORDER);
    }
    let rpr = (!rpr.children.is_empty()).then_some(rpr);
    paragraph.children.push(new_run(rpr, line).into());
    paragraph
}

/// Replaces the top-level paragraph containing `marker` by one paragraph
/// per line of `text`.
///
/// The new paragraphs take the paragraph style and the first-run font of
/// the marker paragraph; cycle headings are bold. Returns the anchors of
/// the inserted paragraphs in order, or `None` when no paragraph carries
/// the marker. Empty `text` leaves the document untouched.
pub fn insert_discussion_block(
    body: &mut XmlElement,
    marker: &str,
    text: &str,
) -> Option<Vec<ParagraphAnchor>> {
    let position = body
        .children
        .iter()
        .position(|node| {
            node.as_element()
                .is_some_and(|p| p.name == W_P && paragraph_text(p).contains(marker))
        })?;
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return Some(Vec::new());
    }

    let marker_paragraph = body.children.remove(position);
    let marker_paragraph = marker_paragraph.as_element()?;
    let style = marker_paragraph
        .child(W_PPR)
        .and_then(|ppr| ppr.child("w:pStyle"));
    let font = base_run_properties(marker_paragraph);

    let paragraphs = lines
        .iter()
        .map(|line| XmlNode::from(line_paragraph(style, font.as_ref(), line)));
    body.children.splice(position..position, paragraphs);

    log::debug!("Inserted discussion as {} paragraph(s)", lines.len());
    Some(
        (position..position + lines.len())
            .map(ParagraphAnchor)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::wordml::{run_text, W_T};

    fn marker_body() -> XmlElement {
        let marker = XmlElement::new(W_P)
            .with_child(
                XmlElement::new(W_PPR)
                    .with_child(XmlElement::new("w:pStyle").with_attr("w:val", "BodyText"))
                    .with_child(XmlElement::new("w:jc").with_attr("w:val", "both")),
            )
            .with_child(
                XmlElement::new(W_R)
                    .with_child(
                        XmlElement::new(W_RPR)
                            .with_child(XmlElement::new("w:rFonts").with_attr("w:ascii", "Times New Roman"))
                            .with_child(XmlElement::new("w:i"))
                            .with_child(XmlElement::new("w:sz").with_attr("w:val", "21")),
                    )
                    .with_child(XmlElement::new(W_T).with_text("{{Discussion}}")),
            );
        XmlElement::new("w:body")
            .with_child(XmlElement::new(W_P))
            .with_child(marker)
            .with_child(XmlElement::new("w:sectPr"))
    }

    #[test]
    fn one_paragraph_per_line_with_inherited_style() {
        let mut body = marker_body();
        let text = "For sample A, we conducted a test with one heating cycle:\nFirst heating cycle:\nEvent: Starts at 1.0°C.\n\nFor sample B, we conducted a test.";
        let anchors = insert_discussion_block(&mut body, "{{Discussion}}", text).expect("marker");
        assert_eq!(anchors, (1..6).map(ParagraphAnchor).collect::<Vec<_>>());

        let paragraphs: Vec<&XmlElement> = body.children_named(W_P).collect();
        assert_eq!(paragraphs.len(), 6);
        assert_eq!(paragraph_text(paragraphs[2]), "First heating cycle:");
        assert_eq!(paragraph_text(paragraphs[4]), "");
        assert!(body.children.last().is_some_and(|n| n.is("w:sectPr")));

        let heading = paragraphs[2].child(W_R).expect("run");
        let rpr = heading.child(W_RPR).expect("rPr");
        let names: Vec<&str> = rpr.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["w:rFonts", "w:b", "w:sz"]);
        assert_eq!(
            paragraphs[2]
                .child(W_PPR)
                .and_then(|p| p.child("w:pStyle"))
                .and_then(|s| s.attr("w:val")),
            Some("BodyText")
        );

        let event = paragraphs[3].child(W_R).expect("run");
        assert!(event.child(W_RPR).and_then(|r| r.child("w:b")).is_none());
        assert_eq!(run_text(event), "Event: Starts at 1.0°C.");
    }

    #[test]
    fn opening_with_one_cycle_is_bold_too() {
        assert!(is_cycle_heading("For sample A, we conducted a test with one heating cycle:"));
        assert!(is_cycle_heading("  Second COOLING cycle: "));
        assert!(!is_cycle_heading("For sample A, with two heating cycles:"));
    }

    #[test]
    fn missing_marker_and_empty_text() {
        let mut body = marker_body();
        assert!(insert_discussion_block(&mut body, "{{Other}}", "x").is_none());
        let before = body.clone();
        assert_eq!(insert_discussion_block(&mut body, "{{Discussion}}", ""), Some(Vec::new()));
        assert_eq!(body, before);
    }
}
