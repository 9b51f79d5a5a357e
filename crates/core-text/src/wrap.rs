//! Message line wrapping.
//!
//! Wraps one logical line to a column budget. Width is counted in visible
//! characters: escape sequences, combining marks and soft hyphens occupy no
//! column. Words are separated by plain spaces only; a non-breaking space
//! binds its neighbours into one word.
//!
//! Break policy for a word of `cols` columns against a remaining row budget `w`:
//! 1. While `cols > w` and (`w <= limit` or `cols > w + exceed`) the word is
//!    split inside the current row: at the last usable soft hyphen, else at the
//!    overflow column. Both append the hyphen glyph, except a split that lands
//!    on a non-breaking space, which consumes it and adds no hyphen.
//! 2. Otherwise, a word that still does not fit starts a new row.
//!
//! Continuation rows repeat the line's leading indentation and reissue the SGR
//! state active at the break. Faults never propagate: the caller receives the
//! original line plus a diagnostic.

use crate::escape::{ESC, visible_len};
use crate::segment::{Segment, segments};
use crate::sgr::ColorFrame;
use crate::width::{NBSP, SOFT_HYPHEN};
use std::fmt;
use tracing::warn;

pub const DEFAULT_WRAP_LIMIT: usize = 8;
pub const DEFAULT_WRAP_EXCEED: usize = 5;
pub const DEFAULT_HYPHEN: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapOptions {
    /// Target column budget for each row.
    pub column: usize,
    /// Remaining budget at or below which overflowing words are split in place.
    pub limit: usize,
    /// Overflow slack tolerated before a word is split in place.
    pub exceed: usize,
    /// Glyph appended at forced breaks (may carry escape sequences).
    pub hyphen: String,
}

impl WrapOptions {
    pub fn new(column: usize) -> Self {
        Self {
            column,
            limit: DEFAULT_WRAP_LIMIT,
            exceed: DEFAULT_WRAP_EXCEED,
            hyphen: DEFAULT_HYPHEN.to_string(),
        }
    }

    pub fn with_limits(mut self, limit: usize, exceed: usize) -> Self {
        self.limit = limit;
        self.exceed = exceed;
        self
    }

    pub fn with_hyphen(mut self, hyphen: impl Into<String>) -> Self {
        self.hyphen = hyphen.into();
        self
    }
}

/// Result of wrapping one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineWrap {
    pub rows: Vec<String>,
    /// Present when wrapping failed and `rows` holds the unwrapped line.
    pub diagnostic: Option<String>,
}

/// Result of wrapping a multi-line message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrappedMessage {
    pub rows: Vec<String>,
    pub diagnostics: Vec<String>,
}

impl WrappedMessage {
    /// Widest row in visible columns.
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| visible_len(r)).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum WrapFault {
    NoBudget { column: usize, indent: usize },
    UnterminatedEscape { byte_len: usize },
}

impl fmt::Display for WrapFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WrapFault::NoBudget { column, indent } => write!(
                f,
                "no room to wrap: indentation of {indent} columns leaves nothing of column budget {column}"
            ),
            WrapFault::UnterminatedEscape { byte_len } => {
                write!(f, "unterminated escape sequence ({byte_len} bytes) inside a word")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitKind {
    Glyph,
    Nbsp,
    Soft,
    Escape,
    Mark,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Unit {
    text: String,
    kind: UnitKind,
}

impl Unit {
    fn cols(&self) -> usize {
        match self.kind {
            UnitKind::Glyph | UnitKind::Nbsp => 1,
            _ => 0,
        }
    }
}

fn cols_of(units: &[Unit]) -> usize {
    units.iter().map(Unit::cols).sum()
}

// Index just past the `n`-th column-bearing unit (0 for n == 0).
fn index_after_cols(units: &[Unit], n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let mut seen = 0usize;
    for (i, u) in units.iter().enumerate() {
        seen += u.cols();
        if seen == n {
            return i + 1;
        }
    }
    units.len()
}

fn is_terminated(seq: &str) -> bool {
    if seq.len() <= ESC.len_utf8() {
        return false;
    }
    if seq.starts_with("\u{1b}[") {
        return seq
            .chars()
            .last()
            .is_some_and(|c| c == '~' || c.is_ascii_alphabetic());
    }
    true
}

fn split_words(text: &str) -> Vec<Vec<Unit>> {
    let mut words = Vec::new();
    let mut word: Vec<Unit> = Vec::new();
    for (_, seg) in segments(text) {
        match seg {
            Segment::Glyph(' ') => words.push(std::mem::take(&mut word)),
            Segment::Glyph(c) => {
                let kind = match c {
                    SOFT_HYPHEN => UnitKind::Soft,
                    NBSP => UnitKind::Nbsp,
                    _ => UnitKind::Glyph,
                };
                word.push(Unit {
                    text: c.to_string(),
                    kind,
                });
            }
            Segment::Combining(c) => match word.last_mut() {
                Some(u) if matches!(u.kind, UnitKind::Glyph | UnitKind::Nbsp) => u.text.push(c),
                _ => word.push(Unit {
                    text: c.to_string(),
                    kind: UnitKind::Mark,
                }),
            },
            Segment::Escape(s) => word.push(Unit {
                text: s.to_string(),
                kind: UnitKind::Escape,
            }),
        }
    }
    words.push(word);
    words
}

struct Split {
    prefix: Vec<Unit>,
    rest: Vec<Unit>,
    hyphen: bool,
}

// Split a word that overflows a row with `w` remaining columns.
fn split_word(mut units: Vec<Unit>, w: usize, hyphen_cols: usize) -> Split {
    let budget = w.saturating_sub(hyphen_cols).max(1);

    // Last soft hyphen whose prefix (plus hyphen) fits.
    let mut soft = None;
    let mut seen = 0usize;
    for (i, u) in units.iter().enumerate() {
        if u.kind == UnitKind::Soft && seen > 0 && seen <= budget {
            soft = Some(i);
        }
        seen += u.cols();
        if seen > budget {
            break;
        }
    }
    if let Some(i) = soft {
        let rest = units.split_off(i + 1);
        units.pop();
        return Split {
            prefix: units,
            rest,
            hyphen: true,
        };
    }

    // A break landing on a non-breaking space consumes it without a hyphen.
    // Candidate columns run from the hyphenated split (`budget`) through the
    // first column past the row (`w + 1`); the rightmost one wins and the
    // prefix always keeps at least one column.
    let mut nbsp = None;
    let mut col = 0usize;
    for (i, u) in units.iter().enumerate() {
        col += u.cols();
        if col > w + 1 {
            break;
        }
        if u.kind == UnitKind::Nbsp && col >= budget.max(2) {
            nbsp = Some(i);
        }
    }
    if let Some(i) = nbsp {
        let rest = units.split_off(i + 1);
        units.pop();
        return Split {
            prefix: units,
            rest,
            hyphen: false,
        };
    }

    let at = index_after_cols(&units, budget);
    let rest = units.split_off(at);
    Split {
        prefix: units,
        rest,
        hyphen: true,
    }
}

struct RowBuilder<'a> {
    opts: &'a WrapOptions,
    indent: String,
    full: usize,
    hyphen_cols: usize,
    rows: Vec<String>,
    cur: String,
    w: usize,
    fresh: bool,
    frame: ColorFrame,
}

impl<'a> RowBuilder<'a> {
    fn new(opts: &'a WrapOptions, indent: &str) -> Result<Self, WrapFault> {
        let indent_cols = indent.chars().count();
        let full = opts.column.saturating_sub(indent_cols);
        if full == 0 {
            return Err(WrapFault::NoBudget {
                column: opts.column,
                indent: indent_cols,
            });
        }
        Ok(Self {
            opts,
            indent: indent.to_string(),
            full,
            hyphen_cols: visible_len(&opts.hyphen),
            rows: Vec::new(),
            cur: indent.to_string(),
            w: full,
            fresh: true,
            frame: ColorFrame::default(),
        })
    }

    fn break_row(&mut self) {
        let row = std::mem::take(&mut self.cur);
        self.rows.push(row.trim_end_matches(' ').to_string());
        self.cur.push_str(&self.indent);
        if !self.frame.is_blank() {
            self.cur.push_str(&self.frame.restore_sequence());
        }
        self.w = self.full;
        self.fresh = true;
    }

    fn put(&mut self, units: &[Unit]) -> Result<(), WrapFault> {
        for u in units {
            match u.kind {
                UnitKind::Soft => continue,
                UnitKind::Escape => {
                    if !is_terminated(&u.text) {
                        return Err(WrapFault::UnterminatedEscape {
                            byte_len: u.text.len(),
                        });
                    }
                    self.frame.apply_escape(&u.text);
                }
                _ => {}
            }
            self.cur.push_str(&u.text);
            let cols = u.cols();
            if cols > 0 {
                self.w = self.w.saturating_sub(cols);
                self.fresh = false;
            }
        }
        Ok(())
    }

    fn space(&mut self) {
        if self.w > 0 {
            self.cur.push(' ');
            self.w -= 1;
        } else {
            self.break_row();
        }
    }

    fn must_split(&self, cols: usize) -> bool {
        cols > self.w && (self.w <= self.opts.limit || cols > self.w + self.opts.exceed)
    }

    fn place_word(&mut self, word: Vec<Unit>) -> Result<(), WrapFault> {
        let mut rest = word;
        while self.must_split(cols_of(&rest)) {
            if !self.fresh && self.w <= self.hyphen_cols {
                self.break_row();
                continue;
            }
            let split = split_word(rest, self.w, self.hyphen_cols);
            self.put(&split.prefix)?;
            if split.hyphen {
                self.cur.push_str(&self.opts.hyphen);
            }
            rest = split.rest;
            self.break_row();
        }
        if cols_of(&rest) > self.w && !self.fresh {
            self.break_row();
        }
        self.put(&rest)
    }

    fn finish(mut self) -> Vec<String> {
        let last = std::mem::take(&mut self.cur);
        self.rows.push(last.trim_end_matches(' ').to_string());
        self.rows
    }

    fn snapshot(&self) -> String {
        let mut s = self.rows.join("\n");
        if !s.is_empty() {
            s.push('\n');
        }
        s.push_str(&self.cur);
        s
    }
}

fn wrap_words(line: &str, opts: &WrapOptions) -> Result<Vec<String>, (WrapFault, String)> {
    let body = line.trim_start_matches(' ');
    let indent = &line[..line.len() - body.len()];
    let mut builder = RowBuilder::new(opts, indent).map_err(|f| (f, String::new()))?;
    for (i, word) in split_words(body).into_iter().enumerate() {
        if i > 0 {
            builder.space();
        }
        if let Err(fault) = builder.place_word(word) {
            let snapshot = builder.snapshot();
            return Err((fault, snapshot));
        }
    }
    Ok(builder.finish())
}

/// Wrap a single line (no `\n`). Never fails: on an internal fault the
/// original line is returned unwrapped together with a diagnostic.
pub fn wrap_line(line: &str, opts: &WrapOptions) -> LineWrap {
    match wrap_words(line, opts) {
        Ok(rows) => LineWrap {
            rows,
            diagnostic: None,
        },
        Err((fault, snapshot)) => {
            warn!(
                target: "wrap",
                column = opts.column,
                line_bytes = line.len(),
                snapshot_bytes = snapshot.len(),
                "wrap_degraded"
            );
            LineWrap {
                rows: vec![line.to_string()],
                diagnostic: Some(format!(
                    "wrap fault: {fault}; line left unwrapped; partial wrap buffer: {snapshot:?}"
                )),
            }
        }
    }
}

/// Wrap every line of `message` independently.
pub fn wrap_message(message: &str, opts: &WrapOptions) -> WrappedMessage {
    let mut out = WrappedMessage::default();
    for line in message.split('\n') {
        let wrapped = wrap_line(line, opts);
        out.rows.extend(wrapped.rows);
        out.diagnostics.extend(wrapped.diagnostic);
    }
    out
}
