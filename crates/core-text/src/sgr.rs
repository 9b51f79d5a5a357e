//! SGR state tracking and the color scope stack.
//!
//! Terminals have no "restore previous attributes" primitive, so nested color
//! regions are emulated: every scope owns a `ColorFrame` recording the SGR
//! state set inside it, and closing a scope reissues the parent's full state.
//!
//! Invariants:
//! - The stack always holds at least one frame (the implicit base frame).
//! - `pop` on the base frame replaces it with a fresh blank frame.
//! - Only the top frame is ever mutated by SGR input.

use crate::escape::ESC;
use bitflags::bitflags;
use smallvec::SmallVec;
use std::collections::VecDeque;

/// Raw marker opening an independently colorable region.
pub const OPEN_MARKER: &str = "\u{1b}[01010~";
/// Raw marker closing the innermost region.
pub const CLOSE_MARKER: &str = "\u{1b}[10101~";
/// Full attribute reset.
pub const RESET: &str = "\u{1b}[0m";

bitflags! {
    /// SGR attributes 1..=9; bit `n - 1` corresponds to parameter `n`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Attrs: u16 {
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const BLINK = 1 << 4;
        const RAPID_BLINK = 1 << 5;
        const REVERSE = 1 << 6;
        const HIDDEN = 1 << 7;
        const STRIKE = 1 << 8;
    }
}

impl Attrs {
    fn from_param(n: u16) -> Self {
        Attrs::from_bits_truncate(1 << (n - 1))
    }
}

/// Cumulative SGR state of one color scope.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColorFrame {
    /// Foreground parameters, e.g. `31` or `38;5;208`.
    pub fg: Option<String>,
    pub bg: Option<String>,
    pub attrs: Attrs,
}

impl ColorFrame {
    pub fn is_blank(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.attrs.is_empty()
    }

    /// Update the frame from a complete escape sequence. Anything other than
    /// a CSI sequence ending in `m` is ignored.
    pub fn apply_escape(&mut self, seq: &str) {
        let Some(body) = seq.strip_prefix("\u{1b}[") else {
            return;
        };
        let Some(params) = body.strip_suffix('m') else {
            return;
        };
        self.apply_params(params);
    }

    fn apply_params(&mut self, params: &str) {
        if params.is_empty() {
            *self = ColorFrame::default();
            return;
        }
        let values: Vec<u16> = params
            .split(';')
            .map(|p| p.parse::<u16>().unwrap_or(0))
            .collect();
        let mut i = 0usize;
        while i < values.len() {
            let v = values[i];
            match v {
                0 => *self = ColorFrame::default(),
                1..=9 => self.attrs.insert(Attrs::from_param(v)),
                21..=29 => self.attrs.remove(Attrs::from_param(v - 20)),
                30..=37 | 90..=97 => self.fg = Some(v.to_string()),
                40..=47 | 100..=107 => self.bg = Some(v.to_string()),
                38 | 48 => {
                    // 38;5;n consumes two more, 38;2;r;g;b consumes four.
                    let extra = match values.get(i + 1).copied() {
                        Some(2) => 4,
                        _ => 2,
                    };
                    let end = (i + 1 + extra).min(values.len());
                    let code = values[i..end]
                        .iter()
                        .map(|n| n.to_string())
                        .collect::<Vec<_>>()
                        .join(";");
                    if v == 38 {
                        self.fg = Some(code);
                    } else {
                        self.bg = Some(code);
                    }
                    i = end;
                    continue;
                }
                39 => self.fg = None,
                49 => self.bg = None,
                _ => {}
            }
            i += 1;
        }
    }

    /// Single SGR sequence that resets the terminal and reissues this frame.
    pub fn restore_sequence(&self) -> String {
        let mut params = String::from("0");
        if let Some(fg) = &self.fg {
            params.push(';');
            params.push_str(fg);
        }
        if let Some(bg) = &self.bg {
            params.push(';');
            params.push_str(bg);
        }
        for n in 1..=9u16 {
            if self.attrs.contains(Attrs::from_param(n)) {
                params.push(';');
                params.push_str(&n.to_string());
            }
        }
        format!("\u{1b}[{params}m")
    }
}

/// Stack of independent color scopes.
#[derive(Debug)]
pub struct ColorStack {
    frames: SmallVec<[ColorFrame; 4]>,
    pending: Option<String>,
    window: VecDeque<char>,
    window_len: usize,
}

impl Default for ColorStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorStack {
    pub fn new() -> Self {
        let window_len = OPEN_MARKER.chars().count().max(CLOSE_MARKER.chars().count());
        let mut stack = Self {
            frames: SmallVec::new(),
            pending: None,
            window: VecDeque::with_capacity(window_len),
            window_len,
        };
        // Base frame; the first push never emits.
        let _ = stack.push();
        stack
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn current(&self) -> &ColorFrame {
        // Non-empty by construction.
        &self.frames[self.frames.len() - 1]
    }

    fn current_mut(&mut self) -> &mut ColorFrame {
        let top = self.frames.len() - 1;
        &mut self.frames[top]
    }

    /// Open a new blank scope. Returns the reset code for every push after the base frame.
    pub fn push(&mut self) -> Option<String> {
        self.frames.push(ColorFrame::default());
        if self.frames.len() == 1 {
            None
        } else {
            Some(RESET.to_string())
        }
    }

    /// Close the top scope and return the sequence restoring the new top frame.
    pub fn pop(&mut self) -> Option<String> {
        self.frames.pop();
        if self.frames.is_empty() {
            self.frames.push(ColorFrame::default());
        }
        Some(self.current().restore_sequence())
    }

    /// Apply a complete escape sequence to the current frame.
    pub fn apply_escape(&mut self, seq: &str) {
        self.current_mut().apply_escape(seq);
    }

    /// Consume one output character. Returns a restorative code to splice in
    /// right after `c` when `c` completes a scope marker.
    pub fn feed(&mut self, c: char) -> Option<String> {
        if let Some(seq) = self.pending.as_mut() {
            seq.push(c);
            if c == '~' || c.is_ascii_alphabetic() {
                if let Some(seq) = self.pending.take() {
                    self.apply_escape(&seq);
                }
            }
        } else if c == ESC {
            self.pending = Some(String::from(c));
        }

        if self.window.len() == self.window_len {
            self.window.pop_front();
        }
        self.window.push_back(c);

        if self.window_ends_with(OPEN_MARKER) {
            self.window.clear();
            return self.push();
        }
        if self.window_ends_with(CLOSE_MARKER) {
            self.window.clear();
            return self.pop();
        }
        None
    }

    fn window_ends_with(&self, marker: &str) -> bool {
        let n = marker.chars().count();
        if self.window.len() < n {
            return false;
        }
        self.window
            .iter()
            .skip(self.window.len() - n)
            .copied()
            .eq(marker.chars())
    }
}
