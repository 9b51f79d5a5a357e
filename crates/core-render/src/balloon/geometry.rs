//! Balloon sizing and outline assembly.

use super::style::{BalloonStyle, BorderRow};
use core_text::visible_len;

/// One output row of a built balloon.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BalloonLine {
    Border(String),
    Message {
        west: String,
        text: String,
        padding: usize,
        east: String,
    },
}

impl BalloonLine {
    pub fn width(&self) -> usize {
        match self {
            BalloonLine::Border(s) => visible_len(s),
            BalloonLine::Message {
                west,
                text,
                padding,
                east,
            } => visible_len(west) + visible_len(text) + padding + visible_len(east),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalloonGeometry {
    pub lines: Vec<BalloonLine>,
    pub width: usize,
    pub height: usize,
}

/// `fill` repeated across `columns`, padded with spaces when the glyph does
/// not divide the span.
fn repeat_fill(fill: &str, columns: usize) -> String {
    let glyph = visible_len(fill);
    if glyph == 0 {
        return " ".repeat(columns);
    }
    let mut out = fill.repeat(columns / glyph);
    out.push_str(&" ".repeat(columns % glyph));
    out
}

fn border(row: &BorderRow, width: usize) -> String {
    let outer = row.outer_width();
    let inner = row.inner_width();
    if outer + inner <= width {
        format!(
            "{}{}{}{}{}",
            row.outer_left,
            row.inner_left,
            repeat_fill(&row.fill, width - outer - inner),
            row.inner_right,
            row.outer_right
        )
    } else {
        format!(
            "{}{}{}",
            row.outer_left,
            repeat_fill(&row.fill, width.saturating_sub(outer)),
            row.outer_right
        )
    }
}

/// Frame `rows` with `style`.
///
/// Width is the largest of the style minimum, the widest framed message row
/// and `min_width`. Blank message rows are appended until the balloon is at
/// least `min_height` tall; an empty message still gets one row.
pub fn build(
    style: &BalloonStyle,
    min_width: Option<usize>,
    min_height: Option<usize>,
    rows: &[String],
) -> BalloonGeometry {
    let mut rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    if rows.is_empty() {
        rows.push("");
    }
    let wanted = min_height
        .unwrap_or(0)
        .saturating_sub(style.min_height())
        .max(rows.len());
    rows.resize(wanted, "");

    let count = rows.len();
    let framed = rows.iter().enumerate().map(|(j, row)| {
        visible_len(style.west.for_row(j, count))
            + visible_len(row)
            + visible_len(style.east.for_row(j, count))
    });
    let width = framed
        .chain([style.min_width(), min_width.unwrap_or(0)])
        .max()
        .unwrap_or(0);

    let mut lines = Vec::with_capacity(style.min_height() + count);
    lines.extend(style.north.iter().map(|r| BalloonLine::Border(border(r, width))));
    for (j, row) in rows.iter().enumerate() {
        let west = style.west.for_row(j, count);
        let east = style.east.for_row(j, count);
        let used = visible_len(west) + visible_len(row) + visible_len(east);
        lines.push(BalloonLine::Message {
            west: west.to_string(),
            text: row.to_string(),
            padding: width - used,
            east: east.to_string(),
        });
    }
    lines.extend(style.south.iter().map(|r| BalloonLine::Border(border(r, width))));

    let height = lines.len();
    BalloonGeometry {
        lines,
        width,
        height,
    }
}
