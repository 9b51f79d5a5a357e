//! Escape-aware segmentation + message normalization adapter.
//!
//! Contract:
//! - `segments` splits a string into escape sequences and single characters,
//!   in order, non-overlapping, covering the entire input when concatenated.
//! - Each segment carries its absolute byte offset into the input.
//! - `normalize_message` applies NFC so decomposed input measures the same as
//!   precomposed input.
//! - Safety: does not log content; callers should avoid logging raw text.

use crate::escape::{ESC, scan_escape};
use crate::width::{char_columns, is_combining_mark};
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// A complete escape sequence (never split).
    Escape(&'a str),
    /// One character; combining marks are reported separately so callers can
    /// keep them attached to their base without counting a column.
    Glyph(char),
    Combining(char),
}

impl Segment<'_> {
    /// Columns this segment occupies.
    pub fn columns(&self) -> usize {
        match self {
            Segment::Glyph(c) | Segment::Combining(c) => char_columns(*c),
            Segment::Escape(_) => 0,
        }
    }

    pub fn byte_len(&self) -> usize {
        match self {
            Segment::Escape(s) => s.len(),
            Segment::Glyph(c) | Segment::Combining(c) => c.len_utf8(),
        }
    }
}

/// Iterator over `(byte_offset, Segment)` pairs.
pub struct Segments<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Iterator for Segments<'a> {
    type Item = (usize, Segment<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos;
        let c = self.src[start..].chars().next()?;
        let seg = if c == ESC {
            Segment::Escape(scan_escape(self.src, start))
        } else if is_combining_mark(c) {
            Segment::Combining(c)
        } else {
            Segment::Glyph(c)
        };
        self.pos += seg.byte_len();
        Some((start, seg))
    }
}

pub fn segments(src: &str) -> Segments<'_> {
    Segments { src, pos: 0 }
}

/// Normalize a user message to NFC.
pub fn normalize_message(input: &str) -> String {
    input.nfc().collect()
}

/// Expand tabs to `tab_width` spaces and strip trailing spaces from each line.
pub fn prepare_message(input: &str, tab_width: usize) -> String {
    let tab = " ".repeat(tab_width);
    input
        .split('\n')
        .map(|line| line.replace('\t', &tab).trim_end_matches(' ').to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
