//! Combining-mark table and special glyph constants.
//!
//! Visible width in this workspace is a character count: every code point
//! occupies one column except escape sequences (handled by the scanner) and
//! zero-width combining marks (handled here). The table below is the single
//! authority for "does this code point merge with the previous one".
//!
//! Table maintenance:
//! 1. Ranges are inclusive and MUST stay sorted by start and non-overlapping;
//!    `is_combining_mark` binary searches them.
//! 2. When adding a block, add a representative code point to the tests.
//! 3. `table_sorted_and_disjoint` guards the ordering requirement.
//!
//! Soft hyphen and non-breaking space are not combining marks. Soft hyphens
//! are invisible break hints the wrapper consumes; non-breaking spaces are
//! visible spaces that never separate words.

/// Soft hyphen (U+00AD): preferred optional break point, invisible unless used.
pub const SOFT_HYPHEN: char = '\u{00AD}';
/// Non-breaking space (U+00A0).
pub const NBSP: char = '\u{00A0}';

// (start, end) inclusive, sorted.
static COMBINING: &[(char, char)] = &[
    ('\u{0300}', '\u{036F}'), // combining diacritical marks
    ('\u{0483}', '\u{0489}'), // cyrillic
    ('\u{0591}', '\u{05BD}'), // hebrew points
    ('\u{05BF}', '\u{05BF}'),
    ('\u{05C1}', '\u{05C2}'),
    ('\u{05C4}', '\u{05C5}'),
    ('\u{05C7}', '\u{05C7}'),
    ('\u{0610}', '\u{061A}'), // arabic
    ('\u{064B}', '\u{065F}'),
    ('\u{0670}', '\u{0670}'),
    ('\u{06D6}', '\u{06DC}'),
    ('\u{06DF}', '\u{06E4}'),
    ('\u{06E7}', '\u{06E8}'),
    ('\u{06EA}', '\u{06ED}'),
    ('\u{0900}', '\u{0903}'), // devanagari
    ('\u{093A}', '\u{093C}'),
    ('\u{093E}', '\u{094F}'),
    ('\u{0951}', '\u{0957}'),
    ('\u{0962}', '\u{0963}'),
    ('\u{0E31}', '\u{0E31}'), // thai
    ('\u{0E34}', '\u{0E3A}'),
    ('\u{0E47}', '\u{0E4E}'),
    ('\u{1AB0}', '\u{1AFF}'), // diacritical marks extended
    ('\u{1DC0}', '\u{1DFF}'), // diacritical marks supplement
    ('\u{20D0}', '\u{20FF}'), // marks for symbols
    ('\u{302A}', '\u{302F}'), // ideographic tone marks
    ('\u{3099}', '\u{309A}'), // kana voicing marks
    ('\u{FE00}', '\u{FE0F}'), // variation selectors
    ('\u{FE20}', '\u{FE2F}'), // half marks
];

/// Return true when `c` is a zero-width combining mark.
#[inline]
pub fn is_combining_mark(c: char) -> bool {
    // Fast path: nothing below U+0300 combines.
    if c < '\u{0300}' {
        return false;
    }
    let mut lo = 0usize;
    let mut hi = COMBINING.len();
    while lo < hi {
        let mid = (lo + hi) / 2;
        let (start, end) = COMBINING[mid];
        if c < start {
            hi = mid;
        } else if c > end {
            lo = mid + 1;
        } else {
            return true;
        }
    }
    false
}

/// Columns a single character contributes to visible width (0 or 1).
#[inline]
pub fn char_columns(c: char) -> usize {
    if is_combining_mark(c) { 0 } else { 1 }
}
