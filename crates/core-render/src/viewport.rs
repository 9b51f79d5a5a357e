//! Viewport truncation of finished output.
//!
//! Runs once over the fully composited text. Width clipping drops visible
//! characters past the budget but keeps every escape sequence whole, so the
//! terminal state at the end of a clipped line matches the unclipped one.
//! Height clipping keeps the first (or last) `height` lines.

use core_text::segment::{Segment, segments};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Which end of the output the height limit drops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TruncateFrom {
    #[default]
    Bottom,
    Top,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown truncation side `{0}` (expected `bottom` or `top`)")]
pub struct UnknownTruncateFrom(pub String);

impl FromStr for TruncateFrom {
    type Err = UnknownTruncateFrom;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bottom" => Ok(TruncateFrom::Bottom),
            "top" => Ok(TruncateFrom::Top),
            other => Err(UnknownTruncateFrom(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub truncate_from: TruncateFrom,
}

impl Viewport {
    pub fn new(width: Option<usize>, height: Option<usize>) -> Self {
        Self {
            width,
            height,
            truncate_from: TruncateFrom::Bottom,
        }
    }

    pub fn with_truncate_from(mut self, side: TruncateFrom) -> Self {
        self.truncate_from = side;
        self
    }

    pub fn apply(&self, text: &str) -> String {
        let (body, trailing) = match text.strip_suffix('\n') {
            Some(body) => (body, true),
            None => (text, false),
        };
        let mut lines: Vec<&str> = body.split('\n').collect();
        let total = lines.len();
        if let Some(height) = self.height.filter(|h| total > *h) {
            match self.truncate_from {
                TruncateFrom::Bottom => lines.truncate(height),
                TruncateFrom::Top => {
                    lines.drain(..total - height);
                }
            }
            debug!(target: "viewport", total, kept = height, "viewport_truncated");
        }
        let mut out = match self.width {
            Some(width) => lines
                .iter()
                .map(|line| clip_line(line, width))
                .collect::<Vec<_>>()
                .join("\n"),
            None => lines.join("\n"),
        };
        if trailing {
            out.push('\n');
        }
        out
    }
}

/// Keep the first `width` visible characters of `line` and all its escapes.
pub fn clip_line(line: &str, width: usize) -> String {
    let mut out = String::with_capacity(line.len());
    let mut used = 0usize;
    let mut kept_base = true;
    for (offset, seg) in segments(line) {
        let piece = &line[offset..offset + seg.byte_len()];
        match seg {
            Segment::Escape(_) => out.push_str(piece),
            Segment::Combining(_) => {
                if kept_base {
                    out.push_str(piece);
                }
            }
            Segment::Glyph(_) => {
                kept_base = used < width;
                if kept_base {
                    out.push_str(piece);
                    used += seg.columns();
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clips_width_keeping_escapes() {
        let line = "\u{1b}[31mabc\u{1b}[0mdef";
        assert_eq!(clip_line(line, 2), "\u{1b}[31mab\u{1b}[0m");
        assert_eq!(clip_line(line, 10), line);
    }

    #[test]
    fn combining_marks_follow_their_base() {
        assert_eq!(clip_line("ae\u{0301}i\u{0308}", 2), "ae\u{0301}");
    }

    #[test]
    fn height_from_bottom_and_top() {
        let text = "1\n2\n3\n4\n";
        let bottom = Viewport::new(None, Some(2));
        assert_eq!(bottom.apply(text), "1\n2\n");
        let top = bottom.with_truncate_from(TruncateFrom::Top);
        assert_eq!(top.apply(text), "3\n4\n");
        assert_eq!(top.apply("3\n4"), "3\n4");
    }

    #[test]
    fn unlimited_viewport_is_identity() {
        let text = "a\u{1b}[1m\n\nb";
        assert_eq!(Viewport::default().apply(text), text);
    }

    #[test]
    fn truncate_side_parses() {
        assert_eq!("TOP".parse::<TruncateFrom>(), Ok(TruncateFrom::Top));
        assert!("middle".parse::<TruncateFrom>().is_err());
    }
}
