//! Template metadata and `$...$` directive expansion.
//!
//! Expansion is a per-line state machine (outside / inside a directive)
//! over escape-aware segments, so a `$` inside an escape sequence never opens
//! a directive. Variable values are tokenized where they are spliced in and
//! are never re-scanned for directives.

use crate::balloon::{BalloonSpec, BalloonStyle};
use crate::error::RenderError;
use crate::style::{Token, tokenize_into};
use core_text::segment::{Segment, segments};
use core_text::sgr::{CLOSE_MARKER, OPEN_MARKER};
use std::collections::HashMap;

/// What happens to a leading `$$$` metadata block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InfoLevel {
    #[default]
    Strip,
    /// Copy the block, delimiters included, ahead of the rendered body.
    Verbatim,
}

impl InfoLevel {
    /// 0 strips, anything higher keeps the block.
    pub fn from_level(level: u8) -> Self {
        if level == 0 {
            InfoLevel::Strip
        } else {
            InfoLevel::Verbatim
        }
    }
}

const METADATA_FENCE: &str = "$$$";

/// Split off a metadata block opened and closed by lines holding only `$$$`.
/// Returns `(block, body)`; an unclosed block means no metadata.
pub fn split_metadata(template: &str) -> (Option<&str>, &str) {
    let is_fence = |line: &str| line.trim_end_matches(['\n', '\r']) == METADATA_FENCE;
    let mut lines = template.split_inclusive('\n');
    match lines.next() {
        Some(first) if is_fence(first) && first.ends_with('\n') => {
            let mut end = first.len();
            for line in lines {
                end += line.len();
                if is_fence(line) {
                    return (Some(&template[..end]), &template[end..]);
                }
            }
            (None, template)
        }
        _ => (None, template),
    }
}

/// One expanded template element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    Token(Token),
    Balloon(BalloonSpec),
}

/// Directive variables. The empty name always expands to a bare `$`.
#[derive(Clone, Debug, Default)]
pub struct Variables {
    values: HashMap<String, String>,
}

impl Variables {
    /// Seed the table with the link variables `\`, `/`, `X`. Without a
    /// balloon style each link is a single space so art columns stay put.
    pub fn seeded(style: Option<&BalloonStyle>, link_color: &str) -> Self {
        let mut vars = Self::default();
        vars.define("", "$");
        let link = |glyph: &str| format!("{OPEN_MARKER}{link_color}{glyph}{CLOSE_MARKER}");
        match style {
            Some(style) => {
                vars.define("\\", &link(&style.links.link));
                vars.define("/", &link(&style.links.mirror));
                vars.define("X", &link(&style.links.cross));
            }
            None => {
                for name in ["\\", "/", "X"] {
                    vars.define(name, " ");
                }
            }
        }
        vars
    }

    pub fn define(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Expand every line of `body` (split on `\n`).
pub fn expand(body: &str, vars: &mut Variables) -> Result<Vec<Vec<Item>>, RenderError> {
    body.split('\n')
        .enumerate()
        .map(|(i, line)| expand_line(line, i + 1, vars))
        .collect()
}

fn expand_line(line: &str, line_no: usize, vars: &mut Variables) -> Result<Vec<Item>, RenderError> {
    let column_of = |byte: usize| line[..byte].chars().count() + 1;
    let mut items = Vec::new();
    let mut open: Option<usize> = None;
    for (offset, seg) in segments(line) {
        match (open, seg) {
            (None, Segment::Glyph('$')) => open = Some(offset),
            (None, seg) => items.push(Item::Token(Token::from(seg))),
            (Some(start), Segment::Glyph('$')) => {
                open = None;
                let body = &line[start + 1..offset];
                dispatch(body, line_no, column_of(start), vars, &mut items)?;
            }
            (Some(_), _) => {}
        }
    }
    match open {
        Some(start) => Err(RenderError::UnterminatedDirective {
            line: line_no,
            column: column_of(start),
        }),
        None => Ok(items),
    }
}

fn dispatch(
    body: &str,
    line: usize,
    column: usize,
    vars: &mut Variables,
    items: &mut Vec<Item>,
) -> Result<(), RenderError> {
    if let Some((name, value)) = body.split_once('=') {
        vars.define(name, value);
        return Ok(());
    }
    if let Some(spec) = body.strip_prefix("balloon") {
        let parsed = BalloonSpec::parse(spec).ok_or_else(|| RenderError::InvalidBalloonSpec {
            spec: spec.to_string(),
            line,
            column,
        })?;
        items.push(Item::Balloon(parsed));
        return Ok(());
    }
    let value = vars.get(body).ok_or_else(|| RenderError::UndefinedVariable {
        name: body.to_string(),
        line,
        column,
    })?;
    let mut tokens = Vec::new();
    tokenize_into(value, &mut tokens);
    items.extend(tokens.into_iter().map(Item::Token));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::tokenize;
    use pretty_assertions::assert_eq;

    fn tokens(items: &[Item]) -> Vec<Token> {
        items
            .iter()
            .filter_map(|i| match i {
                Item::Token(t) => Some(t.clone()),
                Item::Balloon(_) => None,
            })
            .collect()
    }

    fn plain() -> Variables {
        Variables::seeded(None, "")
    }

    #[test]
    fn substitutes_defined_variable() {
        let mut vars = plain();
        vars.define("x", "-");
        let lines = expand("A$x$B", &mut vars).expect("expands");
        assert_eq!(tokens(&lines[0]), tokenize("A-B"));
    }

    #[test]
    fn empty_directive_is_dollar() {
        let lines = expand("$$", &mut plain()).expect("expands");
        assert_eq!(tokens(&lines[0]), vec![Token::Glyph('$')]);
    }

    #[test]
    fn dollar_values_are_not_rescanned() {
        let mut vars = plain();
        let lines = expand("$d=$$$$d$", &mut vars);
        // `$d=$` defines d as empty, `$$` is a dollar, `$d$` expands to nothing
        assert_eq!(tokens(&lines.expect("expands")[0]), vec![Token::Glyph('$')]);
        vars.define("m", "$x$");
        let lines = expand("$m$", &mut vars).expect("expands");
        assert_eq!(tokens(&lines[0]), tokenize("$x$"));
    }

    #[test]
    fn later_definition_wins() {
        let mut vars = plain();
        let lines = expand("$a=1$$b=x$$a$$b$\n$a=2$$a$$b$", &mut vars);
        let lines = lines.expect("expands");
        assert_eq!(tokens(&lines[0]), tokenize("1x"));
        assert_eq!(tokens(&lines[1]), tokenize("2x"));
        assert_eq!(vars.get("b"), Some("x"));
    }

    #[test]
    fn unterminated_directive_reports_position() {
        assert_eq!(
            expand("A$x", &mut plain()),
            Err(RenderError::UnterminatedDirective { line: 1, column: 2 })
        );
        assert_eq!(
            expand("ok\nab$x\n$", &mut plain()),
            Err(RenderError::UnterminatedDirective { line: 2, column: 3 })
        );
    }

    #[test]
    fn undefined_variable_is_fatal() {
        assert_eq!(
            expand("  $nope$", &mut plain()),
            Err(RenderError::UndefinedVariable {
                name: "nope".into(),
                line: 1,
                column: 3
            })
        );
    }

    #[test]
    fn balloon_directive_parsed() {
        let lines = expand("x$balloon2r9$y", &mut plain()).expect("expands");
        assert_eq!(lines[0].len(), 3);
        assert_eq!(
            lines[0][1],
            Item::Balloon(BalloonSpec {
                offset: 2,
                justify: crate::balloon::Justify::Right,
                width: Some(9),
                height: None,
            })
        );
        assert!(matches!(
            expand("$balloonzz$", &mut plain()),
            Err(RenderError::InvalidBalloonSpec { .. })
        ));
    }

    #[test]
    fn links_are_scoped_or_blank() {
        let style = BalloonStyle::say();
        let mut vars = Variables::seeded(Some(&style), "\u{1b}[33m");
        let lines = expand("$\\$", &mut vars).expect("expands");
        assert_eq!(
            tokens(&lines[0]),
            vec![
                Token::Open,
                Token::Escape("\u{1b}[33m".into()),
                Token::Glyph('\\'),
                Token::Close
            ]
        );
        let lines = expand("$X$", &mut plain()).expect("expands");
        assert_eq!(tokens(&lines[0]), vec![Token::Glyph(' ')]);
    }

    #[test]
    fn dollar_inside_escape_is_not_a_directive() {
        let lines = expand("\u{1b}]P1ff000$$$", &mut plain()).expect("expands");
        // the palette body swallows one `$`; `$$` remains
        assert_eq!(
            tokens(&lines[0]),
            vec![Token::Escape("\u{1b}]P1ff000$".into()), Token::Glyph('$')]
        );
    }

    #[test]
    fn metadata_split() {
        let t = "$$$\nNAME: x\n$$$\nbody\n";
        assert_eq!(split_metadata(t), (Some("$$$\nNAME: x\n$$$\n"), "body\n"));
        assert_eq!(split_metadata("$$$\nopen"), (None, "$$$\nopen"));
        assert_eq!(split_metadata("art"), (None, "art"));
        assert_eq!(InfoLevel::from_level(2), InfoLevel::Verbatim);
    }
}
