//! Text primitives for figure-art rendering.
//!
//! Everything here operates on plain `&str` input that may contain terminal
//! escape sequences. Visible width is a character count that skips escape
//! sequences and combining marks; no caller should measure art or message
//! text any other way.
//!
//! Modules:
//! - `escape`: escape sequence scanner + visible length.
//! - `width`: combining-mark table and special glyph constants.
//! - `segment`: escape-aware segmentation and message preparation.
//! - `sgr`: SGR frame state and the color scope stack.
//! - `wrap`: soft-hyphen and combining-mark aware line wrapping.

pub mod escape;
pub mod segment;
pub mod sgr;
pub mod width;
pub mod wrap;

// Re-export the measurement primitives used across the workspace.
pub use escape::{ESC, scan_escape, strip_escapes, visible_len};
pub use width::{NBSP, SOFT_HYPHEN, is_combining_mark};
