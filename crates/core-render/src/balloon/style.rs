//! Balloon glyph palettes.
//!
//! A style describes a balloon outline independent of its size:
//! - north/south border rows, each `outer_left inner_left fill.. inner_right outer_right`;
//! - west/east side glyphs for a single-row message and for the first,
//!   interior and last rows of a taller one;
//! - the three link glyphs art templates use to attach the balloon.
//!
//! Text format: one `key:value` per line, value taken verbatim (spaces
//! included). Border keys may repeat to add rows:
//!
//! ```text
//! \:\          /:/          X:X
//! ww:<         ee: >
//! nww:/        w:|          sww:\
//! nee: \       e: |         see: /
//! nw: _  nnw:_  n:_  nne:_  ne:_      (one key per line)
//! sw: -  ssw:-  s:-  sse:-  se:-
//! ```

use core_text::visible_len;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StyleError {
    #[error("balloon style is missing required glyph `{key}`")]
    MissingGlyph { key: &'static str },
    #[error("balloon style key `{key}` has {found} rows, expected {expected}")]
    RowMismatch {
        key: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("balloon style line {line} is not a `key:value` pair")]
    MalformedLine { line: usize },
}

/// One row of a horizontal border.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BorderRow {
    pub outer_left: String,
    pub inner_left: String,
    pub fill: String,
    pub inner_right: String,
    pub outer_right: String,
}

impl BorderRow {
    pub fn new(
        outer_left: &str,
        inner_left: &str,
        fill: &str,
        inner_right: &str,
        outer_right: &str,
    ) -> Self {
        Self {
            outer_left: outer_left.to_string(),
            inner_left: inner_left.to_string(),
            fill: fill.to_string(),
            inner_right: inner_right.to_string(),
            outer_right: outer_right.to_string(),
        }
    }

    pub fn outer_width(&self) -> usize {
        visible_len(&self.outer_left) + visible_len(&self.outer_right)
    }

    pub fn inner_width(&self) -> usize {
        visible_len(&self.inner_left) + visible_len(&self.inner_right)
    }

    fn left_width(&self) -> usize {
        visible_len(&self.outer_left) + visible_len(&self.inner_left)
    }

    fn right_width(&self) -> usize {
        visible_len(&self.inner_right) + visible_len(&self.outer_right)
    }
}

/// Glyphs for one vertical side of the balloon.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SideGlyphs {
    /// Used when the message has exactly one row.
    pub single: String,
    pub first: String,
    pub interior: String,
    pub last: String,
}

impl SideGlyphs {
    pub fn new(single: &str, first: &str, interior: &str, last: &str) -> Self {
        Self {
            single: single.to_string(),
            first: first.to_string(),
            interior: interior.to_string(),
            last: last.to_string(),
        }
    }

    /// Glyph for message row `index` of `count`.
    pub fn for_row(&self, index: usize, count: usize) -> &str {
        if count <= 1 {
            &self.single
        } else if index == 0 {
            &self.first
        } else if index + 1 == count {
            &self.last
        } else {
            &self.interior
        }
    }

    fn widest(&self) -> usize {
        [&self.single, &self.first, &self.interior, &self.last]
            .into_iter()
            .map(|g| visible_len(g))
            .max()
            .unwrap_or(0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Links {
    /// Drawn where the art leans one way (`\` in the say style).
    pub link: String,
    pub mirror: String,
    pub cross: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalloonStyle {
    pub links: Links,
    pub north: Vec<BorderRow>,
    pub south: Vec<BorderRow>,
    pub west: SideGlyphs,
    pub east: SideGlyphs,
}

impl BalloonStyle {
    /// Speech balloon.
    pub fn say() -> Self {
        Self {
            links: Links {
                link: "\\".into(),
                mirror: "/".into(),
                cross: "X".into(),
            },
            north: vec![BorderRow::new(" _", "_", "_", "_", "_ ")],
            south: vec![BorderRow::new(" -", "-", "-", "-", "- ")],
            west: SideGlyphs::new("< ", "/ ", "| ", "\\ "),
            east: SideGlyphs::new(" >", " \\", " |", " /"),
        }
    }

    /// Thought balloon.
    pub fn think() -> Self {
        Self {
            links: Links {
                link: "o".into(),
                mirror: "o".into(),
                cross: "o".into(),
            },
            north: vec![BorderRow::new(" _", "_", "_", "_", "_ ")],
            south: vec![BorderRow::new(" -", "-", "-", "-", "- ")],
            west: SideGlyphs::new("( ", "( ", "( ", "( "),
            east: SideGlyphs::new(" )", " )", " )", " )"),
        }
    }

    /// Reject styles that cannot produce a closed outline.
    pub fn validate(&self) -> Result<(), StyleError> {
        if self.north.is_empty() {
            return Err(StyleError::MissingGlyph { key: "n" });
        }
        if self.south.is_empty() {
            return Err(StyleError::MissingGlyph { key: "s" });
        }
        Ok(())
    }

    pub fn west_width(&self) -> usize {
        self.west.widest()
    }

    pub fn east_width(&self) -> usize {
        self.east.widest()
    }

    /// Sum of the widest west-side and east-side glyph combinations.
    pub fn min_width(&self) -> usize {
        let borders = || self.north.iter().chain(self.south.iter());
        let west = borders()
            .map(BorderRow::left_width)
            .chain(std::iter::once(self.west.widest()))
            .max()
            .unwrap_or(0);
        let east = borders()
            .map(BorderRow::right_width)
            .chain(std::iter::once(self.east.widest()))
            .max()
            .unwrap_or(0);
        west + east
    }

    pub fn min_height(&self) -> usize {
        self.north.len() + self.south.len()
    }

    /// Parse the `key:value` text format.
    pub fn parse(text: &str) -> Result<Self, StyleError> {
        let mut map: HashMap<&str, Vec<&str>> = HashMap::new();
        for (i, raw) in text.lines().enumerate() {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                return Err(StyleError::MalformedLine { line: i + 1 });
            };
            map.entry(key).or_default().push(value);
        }

        let single = |key: &'static str| -> Result<String, StyleError> {
            map.get(key)
                .and_then(|v| v.last())
                .map(|v| v.to_string())
                .ok_or(StyleError::MissingGlyph { key })
        };
        let rows = |key: &'static str| -> Result<Vec<&str>, StyleError> {
            map.get(key)
                .cloned()
                .ok_or(StyleError::MissingGlyph { key })
        };
        let border = |keys: [&'static str; 5]| -> Result<Vec<BorderRow>, StyleError> {
            let cols = keys.map(rows);
            let mut parts = Vec::with_capacity(5);
            for c in cols {
                parts.push(c?);
            }
            let expected = parts[2].len();
            for (&key, part) in keys.iter().zip(&parts) {
                if part.len() != expected {
                    return Err(StyleError::RowMismatch {
                        key,
                        expected,
                        found: part.len(),
                    });
                }
            }
            Ok((0..expected)
                .map(|j| BorderRow::new(parts[0][j], parts[1][j], parts[2][j], parts[3][j], parts[4][j]))
                .collect())
        };

        let style = Self {
            links: Links {
                link: single("\\")?,
                mirror: single("/")?,
                cross: single("X")?,
            },
            north: border(["nw", "nnw", "n", "nne", "ne"])?,
            south: border(["sw", "ssw", "s", "sse", "se"])?,
            west: SideGlyphs {
                single: single("ww")?,
                first: single("nww")?,
                interior: single("w")?,
                last: single("sww")?,
            },
            east: SideGlyphs {
                single: single("ee")?,
                first: single("nee")?,
                interior: single("e")?,
                last: single("see")?,
            },
        };
        style.validate()?;
        Ok(style)
    }
}
