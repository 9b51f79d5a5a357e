//! Figure-art rendering: directive expansion, balloon building + overlay,
//! color scope emission and viewport truncation.
//!
//! Pipeline for one `render` call:
//! 1. Validate the balloon style (fatal before any output).
//! 2. Split off the `$$$` metadata block; keep it verbatim or drop it.
//! 3. Expand directives line by line into tokens + balloon placements
//!    (`directive`). Syntax errors surface here, still before output.
//! 4. Composite: template rows are spliced against pending balloon rows
//!    (`overlay`); each balloon directive wraps the message for the room it
//!    has and builds + paints a balloon (`balloon`).
//! 5. Emit all token rows through one color scope stack (`style::emit`).
//! 6. Clip to the viewport (`viewport`).
//!
//! Every piece of state lives in a `RenderContext` created per call; nothing
//! is shared between renders.
//!
//! Modules:
//! - `balloon`: styles, geometry, placement, painting.
//! - `directive`: metadata split, variables, directive expansion.
//! - `error`: `RenderError`.
//! - `overlay`: two-cursor balloon row splicing.
//! - `style`: token model and emission.
//! - `viewport`: width/height truncation.

pub mod balloon;
pub mod directive;
pub mod error;
pub mod overlay;
pub mod style;
pub mod viewport;

pub use balloon::{BalloonSpec, BalloonStyle, Justify, StyleError};
pub use directive::InfoLevel;
pub use error::RenderError;
pub use style::AttributeMode;
pub use viewport::{TruncateFrom, Viewport};

use core_text::{SOFT_HYPHEN, strip_escapes};
use core_text::segment::prepare_message;
use core_text::wrap::{DEFAULT_HYPHEN, DEFAULT_WRAP_EXCEED, DEFAULT_WRAP_LIMIT, WrapOptions, wrap_message};
use directive::{Item, Variables};
use overlay::{OverlaySet, RowSplicer};
use std::collections::BTreeMap;
use style::{Token, spaces};
use tracing::{debug, warn};

pub const DEFAULT_TAB_WIDTH: usize = 8;

/// Caller-supplied knobs for one render.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Wrap boundary; falls back to `viewport_width` when unset.
    pub wrap_column: Option<usize>,
    pub viewport_width: Option<usize>,
    pub viewport_height: Option<usize>,
    pub truncate_from: TruncateFrom,
    /// `None` disables balloons; link variables then expand to a space.
    pub balloon_style: Option<BalloonStyle>,
    pub hyphen: String,
    pub link_color: String,
    pub balloon_color: String,
    pub attribute_mode: AttributeMode,
    pub wrap_limit: usize,
    pub wrap_exceed: usize,
    pub tab_width: usize,
    pub info_level: InfoLevel,
    /// Extra variables visible to every directive.
    pub variables: BTreeMap<String, String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            wrap_column: None,
            viewport_width: None,
            viewport_height: None,
            truncate_from: TruncateFrom::Bottom,
            balloon_style: None,
            hyphen: DEFAULT_HYPHEN.to_string(),
            link_color: String::new(),
            balloon_color: String::new(),
            attribute_mode: AttributeMode::Color,
            wrap_limit: DEFAULT_WRAP_LIMIT,
            wrap_exceed: DEFAULT_WRAP_EXCEED,
            tab_width: DEFAULT_TAB_WIDTH,
            info_level: InfoLevel::Strip,
            variables: BTreeMap::new(),
        }
    }
}

impl RenderOptions {
    pub fn with_style(mut self, style: BalloonStyle) -> Self {
        self.balloon_style = Some(style);
        self
    }

    pub fn with_wrap_column(mut self, column: usize) -> Self {
        self.wrap_column = Some(column);
        self
    }

    pub fn with_viewport(mut self, width: Option<usize>, height: Option<usize>) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    pub fn with_wrap_limits(mut self, limit: usize, exceed: usize) -> Self {
        self.wrap_limit = limit;
        self.wrap_exceed = exceed;
        self
    }

    pub fn with_variable(mut self, name: &str, value: &str) -> Self {
        self.variables.insert(name.to_string(), value.to_string());
        self
    }

    fn boundary(&self) -> Option<usize> {
        self.wrap_column.or(self.viewport_width)
    }
}

/// Finished render.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedOutput {
    pub text: String,
    /// Wrap degradation reports, one per line; `None` when wrapping was clean.
    pub diagnostics: Option<String>,
}

/// Render `template` with `message` framed in a balloon at each `$balloon$`.
pub fn render(
    template: &str,
    message: &str,
    opts: &RenderOptions,
) -> Result<RenderedOutput, RenderError> {
    if let Some(style) = &opts.balloon_style {
        style.validate()?;
    }

    let (metadata, body) = directive::split_metadata(template);
    let (body, trailing_newline) = match body.strip_suffix('\n') {
        Some(body) => (body, true),
        None => (body, false),
    };

    let mut vars = Variables::seeded(opts.balloon_style.as_ref(), &opts.link_color);
    for (name, value) in &opts.variables {
        vars.define(name, value);
    }
    let lines = directive::expand(body, &mut vars)?;

    let message = prepare_message(message, opts.tab_width);
    let mut ctx = RenderContext::new(opts, &message);
    let rows = ctx.composite(lines);

    let mut text = String::new();
    if let (Some(block), InfoLevel::Verbatim) = (metadata, opts.info_level) {
        match opts.attribute_mode {
            AttributeMode::Color => text.push_str(block),
            AttributeMode::Plain => text.push_str(&strip_escapes(block)),
        }
    }
    text.push_str(&style::emit(&rows, opts.attribute_mode));
    if trailing_newline {
        text.push('\n');
    }

    let viewport = Viewport::new(opts.viewport_width, opts.viewport_height)
        .with_truncate_from(opts.truncate_from);
    let text = viewport.apply(&text);

    debug!(
        target: "render",
        rows = rows.len(),
        balloons = ctx.balloons,
        diagnostics = ctx.diagnostics.len(),
        "render_complete"
    );
    let diagnostics = if ctx.diagnostics.is_empty() {
        None
    } else {
        Some(ctx.diagnostics.join("\n"))
    };
    Ok(RenderedOutput { text, diagnostics })
}

/// Call-scoped render state.
struct RenderContext<'a> {
    opts: &'a RenderOptions,
    message: &'a str,
    overlays: OverlaySet,
    diagnostics: Vec<String>,
    balloons: usize,
}

impl<'a> RenderContext<'a> {
    fn new(opts: &'a RenderOptions, message: &'a str) -> Self {
        Self {
            opts,
            message,
            overlays: OverlaySet::default(),
            diagnostics: Vec::new(),
            balloons: 0,
        }
    }

    fn composite(&mut self, lines: Vec<Vec<Item>>) -> Vec<Vec<Token>> {
        let mut rows = Vec::with_capacity(lines.len());
        for line in lines {
            let mut row = self.overlays.start_row();
            for item in line {
                match item {
                    Item::Token(token) => row.push(token),
                    Item::Balloon(spec) => self.place_balloon(&spec, &mut row),
                }
            }
            rows.push(row.finish());
        }
        // balloon rows hanging below the template
        while !self.overlays.is_empty() {
            rows.push(self.overlays.start_row().finish());
        }
        rows
    }

    fn wrapped_rows(&mut self, budget: Option<usize>) -> Vec<String> {
        let Some(column) = budget else {
            return self
                .message
                .split('\n')
                .map(|line| line.replace(SOFT_HYPHEN, ""))
                .collect();
        };
        let opts = WrapOptions::new(column)
            .with_limits(self.opts.wrap_limit, self.opts.wrap_exceed)
            .with_hyphen(self.opts.hyphen.clone());
        let wrapped = wrap_message(self.message, &opts);
        if !wrapped.diagnostics.is_empty() {
            warn!(
                target: "render.balloon",
                column,
                faults = wrapped.diagnostics.len(),
                "message_wrap_degraded"
            );
        }
        self.diagnostics.extend(wrapped.diagnostics);
        wrapped.rows
    }

    fn place_balloon(&mut self, spec: &BalloonSpec, row: &mut RowSplicer) {
        let opts = self.opts;
        let Some(style) = opts.balloon_style.as_ref() else {
            return;
        };
        let cursor = row.column();
        let boundary = opts.boundary();
        let budget = spec.available(cursor, boundary).map(|available| {
            available
                .saturating_sub(style.west_width() + style.east_width())
                .max(opts.wrap_limit)
        });
        let rows = self.wrapped_rows(budget);
        let geometry = balloon::build(style, spec.width, spec.height, &rows);
        let mut painted = balloon::paint(&geometry, &opts.balloon_color).into_iter();
        let left = spec.left_edge(cursor, boundary, geometry.width);

        let mut first: Vec<Token> = spaces(left - cursor).collect();
        first.extend(painted.next().unwrap_or_default());
        row.insert(first);
        self.overlays.add(left, painted);
        self.balloons += 1;

        debug!(
            target: "render.balloon",
            left,
            width = geometry.width,
            height = geometry.height,
            message_rows = rows.len(),
            "balloon_built"
        );
    }
}
