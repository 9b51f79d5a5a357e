//! Terminal escape sequence scanner.
//!
//! A pragmatic lexer for the sequences that appear in figure-art templates:
//! SGR (`ESC [ ... m`), other CSI forms terminated by a letter or `~`, the
//! Linux console palette form `ESC ] P nrrggbb`, and OSC 4 palette updates
//! terminated by BEL or ST. It is not a full control-sequence parser; any
//! form it does not recognise still yields a short sequence so callers always
//! advance.
//!
//! Invariants:
//! - `scan_escape` returns a non-empty slice starting at `index`.
//! - Returned slices never split a UTF-8 code point.
//! - `visible_len` ignores escape sequences and combining marks and nothing else.

use crate::segment::{Segment, segments};

/// Escape introducer.
pub const ESC: char = '\u{1B}';
const BEL: char = '\u{07}';

/// Body length of the `ESC ] P nrrggbb` palette form (index digit + six hex digits).
const PALETTE_BODY_LEN: usize = 7;

/// Return the complete escape sequence starting at byte `index`.
///
/// `index` must point at an `ESC` character; this is a caller invariant and
/// is only checked in debug builds.
pub fn scan_escape(buffer: &str, index: usize) -> &str {
    let rest = &buffer[index..];
    debug_assert!(rest.starts_with(ESC), "scan_escape called off an escape introducer");
    let mut chars = rest.char_indices();
    let Some((_, _esc)) = chars.next() else {
        return rest;
    };
    let Some((_, kind)) = chars.next() else {
        return rest;
    };
    let end = match kind {
        ']' => scan_osc(rest, &mut chars),
        '[' => scan_csi(rest, &mut chars),
        _ => chars.next().map(|(i, _)| i).unwrap_or(rest.len()),
    };
    &rest[..end]
}

// `chars` is positioned just after `ESC [`.
fn scan_csi(rest: &str, chars: &mut std::str::CharIndices<'_>) -> usize {
    for (i, c) in chars.by_ref() {
        if c == '~' || c.is_ascii_alphabetic() {
            return i + c.len_utf8();
        }
    }
    rest.len()
}

// `chars` is positioned just after `ESC ]`.
fn scan_osc(rest: &str, chars: &mut std::str::CharIndices<'_>) -> usize {
    let Some((i, ty)) = chars.next() else {
        return rest.len();
    };
    let mut end = i + ty.len_utf8();
    if ty == 'P' {
        for _ in 0..PALETTE_BODY_LEN {
            match chars.next() {
                Some((j, c)) => end = j + c.len_utf8(),
                None => return rest.len(),
            }
        }
        return end;
    }
    if !ty.is_ascii_digit() {
        return end;
    }
    let mut number = String::from(ty);
    let mut peek = chars.clone();
    while let Some((j, c)) = peek.next() {
        if !c.is_ascii_digit() {
            break;
        }
        number.push(c);
        end = j + 1;
        chars.next();
    }
    if number != "4" {
        return end;
    }
    // OSC 4 ; index ; spec  terminated by BEL or ST (`ESC \`).
    let mut prev_esc = false;
    for (j, c) in chars.by_ref() {
        end = j + c.len_utf8();
        if c == BEL || (prev_esc && c == '\\') {
            return end;
        }
        prev_esc = c == ESC;
    }
    rest.len()
}

/// Count the visible characters of `buffer`: everything except escape
/// sequences and combining marks.
pub fn visible_len(buffer: &str) -> usize {
    segments(buffer).map(|(_, seg)| seg.columns()).sum()
}

/// Remove every escape sequence from `buffer`, keeping all other characters.
pub fn strip_escapes(buffer: &str) -> String {
    let mut out = String::with_capacity(buffer.len());
    for (_, seg) in segments(buffer) {
        match seg {
            Segment::Escape(_) => {}
            Segment::Glyph(c) | Segment::Combining(c) => out.push(c),
        }
    }
    out
}
