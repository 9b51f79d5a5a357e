//! Token stream + color scope emission.
//!
//! Rendering never writes scope sentinels into the character stream. Every
//! producer (template text, link glyphs, balloon rows) is first turned into
//! `Token`s where independently colorable regions are explicit `Open` /
//! `Close` pairs. A single emission pass then flattens the rows into text,
//! driving one `ColorStack` for the whole render so each `Close` reissues the
//! enclosing scope's state.
//!
//! Design invariants:
//! * `Glyph` is exactly one visible column; `Mark` and escapes are zero.
//! * Raw scope markers found in input text become `Open` / `Close` at
//!   tokenization time, so producers that still write sentinels keep working.
//! * Emission owns the only `ColorStack`; it is created per call.

use core_text::segment::{Segment, segments};
use core_text::sgr::{CLOSE_MARKER, ColorStack, OPEN_MARKER};
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Glyph(char),
    Mark(char),
    Escape(String),
    Open,
    Close,
}

impl Token {
    pub fn columns(&self) -> usize {
        match self {
            Token::Glyph(_) => 1,
            _ => 0,
        }
    }
}

/// Visible columns of a token slice.
pub fn width(tokens: &[Token]) -> usize {
    tokens.iter().map(Token::columns).sum()
}

impl From<Segment<'_>> for Token {
    fn from(seg: Segment<'_>) -> Self {
        match seg {
            Segment::Escape(OPEN_MARKER) => Token::Open,
            Segment::Escape(CLOSE_MARKER) => Token::Close,
            Segment::Escape(s) => Token::Escape(s.to_string()),
            Segment::Combining(c) => Token::Mark(c),
            Segment::Glyph(c) => Token::Glyph(c),
        }
    }
}

/// Append the tokens for `text` to `out`.
pub fn tokenize_into(text: &str, out: &mut Vec<Token>) {
    out.extend(segments(text).map(|(_, seg)| Token::from(seg)));
}

pub fn tokenize(text: &str) -> Vec<Token> {
    let mut out = Vec::new();
    tokenize_into(text, &mut out);
    out
}

/// `count` space glyphs.
pub fn spaces(count: usize) -> impl Iterator<Item = Token> {
    std::iter::repeat_n(Token::Glyph(' '), count)
}

/// Wrap `inner` in its own color scope, optionally starting with `color`.
pub fn scoped(color: &str, inner: impl IntoIterator<Item = Token>) -> Vec<Token> {
    let mut out = vec![Token::Open];
    tokenize_into(color, &mut out);
    out.extend(inner);
    out.push(Token::Close);
    out
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AttributeMode {
    /// Emit escape sequences and restorative codes.
    #[default]
    Color,
    /// Strip all escape sequences.
    Plain,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown attribute mode `{0}` (expected `color` or `plain`)")]
pub struct UnknownAttributeMode(pub String);

impl FromStr for AttributeMode {
    type Err = UnknownAttributeMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "color" | "colour" => Ok(AttributeMode::Color),
            "plain" | "none" | "mono" => Ok(AttributeMode::Plain),
            other => Err(UnknownAttributeMode(other.to_string())),
        }
    }
}

/// Flatten token rows into terminal text joined by `\n`.
pub fn emit(rows: &[Vec<Token>], mode: AttributeMode) -> String {
    let mut stack = ColorStack::new();
    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for token in row {
            match (token, mode) {
                (Token::Glyph(c) | Token::Mark(c), _) => {
                    out.push(*c);
                    if let Some(code) = stack.feed(*c) {
                        out.push_str(&code);
                    }
                }
                (_, AttributeMode::Plain) => {}
                (Token::Escape(seq), AttributeMode::Color) => {
                    out.push_str(seq);
                    stack.apply_escape(seq);
                }
                (Token::Open, AttributeMode::Color) => {
                    if let Some(code) = stack.push() {
                        out.push_str(&code);
                    }
                }
                (Token::Close, AttributeMode::Color) => {
                    if let Some(code) = stack.pop() {
                        out.push_str(&code);
                    }
                }
            }
        }
    }
    out
}
