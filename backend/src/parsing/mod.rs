//! Instrument export parsing.
//!
//! - `text_decode`: byte decoding of the export (UTF-16 first, UTF-8 fallback).
//! - `instrument_text`: metadata and segment extraction from the decoded text.
//! - `range_reconciler`: segment ranges read from the companion PDF and
//!   merged into the text-derived segments.

pub mod instrument_text;
pub mod range_reconciler;
pub mod text_decode;

pub use instrument_text::{
    normalize_segment_desc, parse_basic_info, parse_segments, BasicField, BasicInfoParse,
};
pub use range_reconciler::{extract_ranges, read_pdf_ranges, reconcile_segments};
pub use text_decode::{decode_instrument_bytes, read_instrument_text};
