//! Balloon overlay compositing.
//!
//! A balloon's first row is inserted where its directive sits; each later row
//! is pending against the template row it lands on. When a template row
//! reaches the overlay column the whole balloon row is spliced in and the same
//! number of template glyphs is discarded, so art right of the balloon keeps
//! its column.
//!
//! Invariants:
//! * `RowSplicer::column` counts output columns, not template columns.
//! * Discarded glyphs take their combining marks with them; escapes and
//!   scope tokens in the discarded span are still emitted.
//! * Overlays sharing a row are spliced in column order.

use crate::style::{Token, spaces, width};
use std::collections::VecDeque;

#[derive(Debug)]
struct Overlay {
    column: usize,
    rows: VecDeque<Vec<Token>>,
}

/// Balloon rows still waiting for a template row.
#[derive(Debug, Default)]
pub struct OverlaySet {
    pending: Vec<Overlay>,
}

impl OverlaySet {
    /// Queue `rows` to be spliced at `column`, one per following row.
    pub fn add(&mut self, column: usize, rows: impl IntoIterator<Item = Vec<Token>>) {
        let rows: VecDeque<_> = rows.into_iter().collect();
        if !rows.is_empty() {
            self.pending.push(Overlay { column, rows });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take this row's share of every overlay.
    pub fn start_row(&mut self) -> RowSplicer {
        let mut queue: Vec<(usize, Vec<Token>)> = self
            .pending
            .iter_mut()
            .filter_map(|o| o.rows.pop_front().map(|row| (o.column, row)))
            .collect();
        self.pending.retain(|o| !o.rows.is_empty());
        queue.sort_by_key(|(column, _)| *column);
        RowSplicer {
            queue: queue.into(),
            out: Vec::new(),
            column: 0,
            skip: 0,
            dropping: false,
        }
    }
}

/// Two-cursor splice of one template row: template tokens come in through
/// `push`, output accumulates with its own column counter.
#[derive(Debug)]
pub struct RowSplicer {
    queue: VecDeque<(usize, Vec<Token>)>,
    out: Vec<Token>,
    column: usize,
    skip: usize,
    dropping: bool,
}

impl RowSplicer {
    /// Current output column.
    pub fn column(&self) -> usize {
        self.column
    }

    fn splice_due(&mut self) {
        while self.skip == 0 {
            match self.queue.front() {
                Some((at, _)) if *at <= self.column => {}
                _ => break,
            }
            if let Some((_, row)) = self.queue.pop_front() {
                let w = width(&row);
                self.out.extend(row);
                self.column += w;
                self.skip = w;
            }
        }
    }

    /// Feed the next template token.
    pub fn push(&mut self, token: Token) {
        match token {
            Token::Glyph(_) => {
                self.splice_due();
                if self.skip > 0 {
                    self.skip -= 1;
                    self.dropping = true;
                } else {
                    self.dropping = false;
                    self.out.push(token);
                    self.column += 1;
                }
            }
            Token::Mark(_) if self.dropping => {}
            other => self.out.push(other),
        }
    }

    /// Insert tokens without consuming template glyphs.
    pub fn insert(&mut self, tokens: Vec<Token>) {
        self.column += width(&tokens);
        self.out.extend(tokens);
        self.dropping = false;
    }

    /// Flush overlays the template row never reached, padding with spaces.
    pub fn finish(mut self) -> Vec<Token> {
        while let Some((at, row)) = self.queue.pop_front() {
            if at > self.column {
                self.out.extend(spaces(at - self.column));
                self.column = at;
            }
            self.column += width(&row);
            self.out.extend(row);
        }
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::tokenize;
    use core_text::strip_escapes;

    fn text(tokens: &[Token]) -> String {
        let mut s = String::new();
        for t in tokens {
            match t {
                Token::Glyph(c) | Token::Mark(c) => s.push(*c),
                Token::Escape(e) => s.push_str(e),
                Token::Open => s.push('{'),
                Token::Close => s.push('}'),
            }
        }
        s
    }

    fn splice(set: &mut OverlaySet, template: &str) -> String {
        let mut row = set.start_row();
        for t in tokenize(template) {
            row.push(t);
        }
        text(&row.finish())
    }

    #[test]
    fn overwrites_exactly_balloon_width() {
        let mut set = OverlaySet::default();
        set.add(2, [tokenize("[##]")]);
        assert_eq!(splice(&mut set, "abcdefgh"), "ab[##]gh");
        assert!(set.is_empty());
    }

    #[test]
    fn short_rows_are_padded() {
        let mut set = OverlaySet::default();
        set.add(4, [tokenize("<>"), tokenize("()")]);
        assert_eq!(splice(&mut set, "ab"), "ab  <>");
        assert_eq!(splice(&mut set, ""), "    ()");
    }

    #[test]
    fn discarded_span_keeps_escapes_drops_marks() {
        let mut set = OverlaySet::default();
        set.add(1, [tokenize("##")]);
        let out = splice(&mut set, "ae\u{0301}\u{1b}[31mbc");
        assert_eq!(out, "a##\u{1b}[31mc");
        assert_eq!(strip_escapes(&out), "a##c");
    }

    #[test]
    fn two_overlays_in_column_order() {
        let mut set = OverlaySet::default();
        set.add(6, [tokenize("YY")]);
        set.add(1, [tokenize("XX")]);
        assert_eq!(splice(&mut set, "0123456789"), "0XX345YY89");
    }

    #[test]
    fn adjacent_overlays_both_land() {
        let mut set = OverlaySet::default();
        set.add(0, [tokenize("AB")]);
        set.add(2, [tokenize("CD")]);
        assert_eq!(splice(&mut set, "......"), "ABCD..");
    }

    #[test]
    fn insert_advances_without_skipping() {
        let mut set = OverlaySet::default();
        let mut row = set.start_row();
        row.push(Token::Glyph('a'));
        row.insert(tokenize("{}"));
        row.push(Token::Glyph('b'));
        assert_eq!(row.column(), 4);
        assert_eq!(text(&row.finish()), "a{}b");
    }
}
