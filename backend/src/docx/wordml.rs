//! WordprocessingML helpers over [`XmlElement`].

use super::xml::{XmlElement, XmlNode};

pub const W_P: &str = "w:p";
pub const W_R: &str = "w:r";
pub const W_T: &str = "w:t";
pub const W_TBL: &str = "w:tbl";
pub const W_TR: &str = "w:tr";
pub const W_TC: &str = "w:tc";
pub const W_PPR: &str = "w:pPr";
pub const W_RPR: &str = "w:rPr";
pub const W_TCPR: &str = "w:tcPr";

/// Child order of `w:pPr` (CT_PPr).
pub const PPR_ORDER: &[&str] = &[
    "w:pStyle",
    "w:keepNext",
    "w:keepLines",
    "w:pageBreakBefore",
    "w:framePr",
    "w:widowControl",
    "w:numPr",
    "w:suppressLineNumbers",
    "w:pBdr",
    "w:shd",
    "w:tabs",
    "w:suppressAutoHyphens",
    "w:kinsoku",
    "w:wordWrap",
    "w:overflowPunct",
    "w:topLinePunct",
    "w:autoSpaceDE",
    "w:autoSpaceDN",
    "w:bidi",
    "w:adjustRightInd",
    "w:snapToGrid",
    "w:spacing",
    "w:ind",
    "w:contextualSpacing",
    "w:mirrorIndents",
    "w:suppressOverlap",
    "w:jc",
    "w:textDirection",
    "w:textAlignment",
    "w:textboxTightWrap",
    "w:outlineLvl",
    "w:divId",
    "w:cnfStyle",
    "w:rPr",
    "w:sectPr",
    "w:pPrChange",
];

/// Child order of `w:rPr` (CT_RPr).
pub const RPR_ORDER: &[&str] = &[
    "w:rStyle",
    "w:rFonts",
    "w:b",
    "w:bCs",
    "w:i",
    "w:iCs",
    "w:caps",
    "w:smallCaps",
    "w:strike",
    "w:dstrike",
    "w:outline",
    "w:shadow",
    "w:emboss",
    "w:imprint",
    "w:noProof",
    "w:snapToGrid",
    "w:vanish",
    "w:webHidden",
    "w:color",
    "w:spacing",
    "w:w",
    "w:kern",
    "w:position",
    "w:sz",
    "w:szCs",
    "w:highlight",
    "w:u",
    "w:effect",
    "w:bdr",
    "w:shd",
    "w:fitText",
    "w:vertAlign",
    "w:rtl",
    "w:cs",
    "w:em",
    "w:lang",
    "w:eastAsianLayout",
    "w:specVanish",
    "w:oMath",
];

/// Child order of `w:tcPr` (CT_TcPr).
pub const TCPR_ORDER: &[&str] = &[
    "w:cnfStyle",
    "w:tcW",
    "w:gridSpan",
    "w:hMerge",
    "w:vMerge",
    "w:tcBorders",
    "w:shd",
    "w:noWrap",
    "w:tcMar",
    "w:textDirection",
    "w:tcFitText",
    "w:vAlign",
    "w:hideMark",
];

/// Visible text of a run: `w:t` content, tabs and breaks.
pub fn run_text(run: &XmlElement) -> String {
    let mut out = String::new();
    for child in run.elements() {
        match child.name.as_str() {
            W_T => out.push_str(&child.text_content()),
            "w:tab" => out.push('\t'),
            "w:br" | "w:cr" => out.push('\n'),
            _ => {}
        }
    }
    out
}

/// Text of the runs directly under the paragraph.
pub fn paragraph_text(paragraph: &XmlElement) -> String {
    paragraph.children_named(W_R).map(run_text).collect()
}

/// Visible text anywhere below `element`, paragraph after paragraph.
pub fn plain_text(element: &XmlElement) -> String {
    if element.name == W_P {
        let mut text = paragraph_text(element);
        for child in element.elements().filter(|el| el.name != W_R) {
            text.push_str(&plain_text(child));
        }
        return text;
    }
    element.elements().map(plain_text).collect()
}

/// Replaces the content of a run by `text`, keeping its run properties.
pub fn set_run_text(run: &mut XmlElement, text: &str) {
    run.children.retain(|node| node.is(W_RPR));
    if !text.is_empty() {
        run.children.push(
            XmlElement::new(W_T)
                .with_attr("xml:space", "preserve")
                .with_text(text)
                .into(),
        );
    }
}

pub fn new_run(properties: Option<XmlElement>, text: &str) -> XmlElement {
    let mut run = XmlElement::new(W_R);
    if let Some(rpr) = properties {
        run.children.push(rpr.into());
    }
    set_run_text(&mut run, text);
    run
}

/// The property container of `element` (`w:pPr` in a paragraph, `w:tcPr`
/// in a cell, `w:rPr` in a run), created as first child when absent.
pub fn properties_mut<'a>(element: &'a mut XmlElement, props_name: &str) -> &'a mut XmlElement {
    let idx = match element.children.iter().position(|node| node.is(props_name)) {
        Some(idx) => idx,
        None => {
            element.children.insert(0, XmlElement::new(props_name).into());
            0
        }
    };
    match &mut element.children[idx] {
        XmlNode::Element(props) => props,
        _ => unreachable!("position matched an element"),
    }
}

/// Puts `property` into `props`, replacing a same-named child, at the
/// position the schema sequence `order` requires.
pub fn set_property(props: &mut XmlElement, property: XmlElement, order: &[&str]) {
    if let Some(existing) = props.child_mut(&property.name) {
        *existing = property;
        return;
    }
    let rank = |name: &str| order.iter().position(|candidate| *candidate == name);
    let new_rank = rank(&property.name).unwrap_or(order.len());
    let insert_at = props
        .children
        .iter()
        .position(|node| {
            node.as_element()
                .and_then(|el| rank(&el.name))
                .is_some_and(|existing| existing > new_rank)
        })
        .unwrap_or(props.children.len());
    props.children.insert(insert_at, property.into());
}

/// `<w:jc w:val="center"/>` on the paragraph.
pub fn center_paragraph(paragraph: &mut XmlElement) {
    let ppr = properties_mut(paragraph, W_PPR);
    set_property(
        ppr,
        XmlElement::new("w:jc").with_attr("w:val", "center"),
        PPR_ORDER,
    );
}

/// Calls `visit` on every paragraph below `element`: body paragraphs,
/// table cells at any depth and content controls.
pub fn for_each_paragraph_mut(element: &mut XmlElement, visit: &mut dyn FnMut(&mut XmlElement)) {
    for child in element.elements_mut() {
        if child.name == W_P {
            visit(child);
        }
        for_each_paragraph_mut(child, visit);
    }
}
