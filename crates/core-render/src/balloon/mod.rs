//! Balloon styles, geometry and placement.
//!
//! `paint` turns a built geometry into token rows: the outline sits in one
//! color scope carrying the balloon color, and every message text run gets a
//! nested scope so message escapes cannot leak into the outline.

pub mod geometry;
pub mod placement;
pub mod style;

pub use geometry::{BalloonGeometry, BalloonLine, build};
pub use placement::{BalloonSpec, Justify};
pub use style::{BalloonStyle, BorderRow, Links, SideGlyphs, StyleError};

use crate::style::{Token, scoped, spaces, tokenize, tokenize_into};

/// Token rows for `geometry`, one per balloon line.
pub fn paint(geometry: &BalloonGeometry, color: &str) -> Vec<Vec<Token>> {
    geometry
        .lines
        .iter()
        .map(|line| match line {
            BalloonLine::Border(s) => scoped(color, tokenize(s)),
            BalloonLine::Message {
                west,
                text,
                padding,
                east,
            } => {
                let mut inner = tokenize(west);
                inner.extend(scoped("", tokenize(text)));
                inner.extend(spaces(*padding));
                tokenize_into(east, &mut inner);
                scoped(color, inner)
            }
        })
        .collect()
}
