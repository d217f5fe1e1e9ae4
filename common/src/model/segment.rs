use serde::{Deserialize, Serialize};

pub const ENDOTHERMIC: &str = "Endothermic";
pub const EXOTHERMIC: &str = "Exothermic";

/// One detected thermal event inside a segment.
///
/// A part pairs the i-th `Complex Peak` block with the i-th `Value` line of
/// the segment body; either side may be missing, in which case its fields
/// stay unset. A synthetic segment carries a single part with every field
/// unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakPart {
    /// `Value (DSC)` reading in mW/mg.
    pub value_dsc: Option<f64>,
    /// Temperature of the `Value (DSC)` line, reported as the event start.
    pub value_temp_c: Option<f64>,
    pub onset_c: Option<f64>,
    pub peak_c: Option<f64>,
    /// Area exactly as exported (J/g).
    pub area_raw: Option<f64>,
    /// Sign-flipped area used in the report.
    pub area_report: Option<f64>,
    /// `Endothermic`, `Exothermic` or empty.
    pub comment: String,
}

impl PeakPart {
    /// Records a peak block. The reported area is the negated raw area and
    /// the comment follows its sign.
    pub fn set_peak(&mut self, area_raw: Option<f64>, peak_c: Option<f64>, onset_c: Option<f64>) {
        self.area_raw = area_raw;
        self.area_report = area_raw.map(|area| -area);
        self.comment = self
            .area_report
            .map(|area| reaction_comment(area).to_string())
            .unwrap_or_default();
        self.peak_c = peak_c;
        self.onset_c = onset_c;
    }

    /// True when the part carries anything worth describing: a start
    /// temperature, a peak temperature or an enthalpy.
    pub fn has_event_data(&self) -> bool {
        self.value_temp_c.is_some() || self.peak_c.is_some() || self.area_report.is_some()
    }
}

/// Comment for a reported (sign-flipped) area.
pub fn reaction_comment(area_report: f64) -> &'static str {
    if area_report > 0.0 {
        ENDOTHERMIC
    } else if area_report < 0.0 {
        EXOTHERMIC
    } else {
        ""
    }
}

/// One temperature ramp of the run, e.g. `-20°C ➜ 150°C@10K/min`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub index: u32,
    /// Segment count of the run. Overwritten on every segment when the PDF
    /// lists more ranges than the text export.
    pub total: u32,
    pub raw_desc: String,
    pub desc_display: String,
    pub parts: Vec<PeakPart>,
}

impl Segment {
    pub fn has_event_data(&self) -> bool {
        self.parts.iter().any(PeakPart::has_event_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reported_area_is_negated_and_commented() {
        let mut part = PeakPart::default();
        part.set_peak(Some(-12.5), Some(101.2), Some(98.0));
        assert_eq!(part.area_report, Some(12.5));
        assert_eq!(part.comment, ENDOTHERMIC);

        part.set_peak(Some(3.0), None, None);
        assert_eq!(part.area_report, Some(-3.0));
        assert_eq!(part.comment, EXOTHERMIC);

        part.set_peak(Some(0.0), None, None);
        assert_eq!(part.comment, "");
    }

    #[test]
    fn empty_part_has_no_event_data() {
        assert!(!PeakPart::default().has_event_data());
        let part = PeakPart {
            value_temp_c: Some(40.0),
            ..Default::default()
        };
        assert!(part.has_event_data());

        let onset_only = PeakPart {
            onset_c: Some(40.0),
            ..Default::default()
        };
        assert!(!onset_only.has_event_data());
    }
}
