//! Property-based tests for balloon sizing and overlay alignment.

use core_render::balloon::{BalloonLine, BorderRow, SideGlyphs, build};
use core_render::{AttributeMode, BalloonStyle, RenderOptions, render};
use core_text::visible_len;
use proptest::prelude::*;

fn boxed() -> BalloonStyle {
    let mut style = BalloonStyle::say();
    style.north = vec![BorderRow::new("+", "-", "-", "-", "+")];
    style.south = style.north.clone();
    style.west = SideGlyphs::new("|", "|", "|", "|");
    style.east = style.west.clone();
    style
}

fn any_style() -> impl Strategy<Value = BalloonStyle> {
    prop_oneof![
        Just(BalloonStyle::say()),
        Just(BalloonStyle::think()),
        Just(boxed()),
    ]
}

proptest! {
    #[test]
    fn balloon_meets_minimum_size(
        style in any_style(),
        rows in prop::collection::vec("[a-z ]{0,20}", 0..8),
        min_width in prop::option::of(0usize..40),
        min_height in prop::option::of(0usize..12),
    ) {
        let g = build(&style, min_width, min_height, &rows);
        let widest = rows.iter().map(|r| visible_len(r)).max().unwrap_or(0);
        prop_assert!(g.width >= style.min_width().max(widest));
        prop_assert!(g.width >= min_width.unwrap_or(0));
        prop_assert!(g.height >= style.min_height() + rows.len().max(1));
        prop_assert!(g.height >= min_height.unwrap_or(0));
        prop_assert_eq!(g.height, g.lines.len());
        for line in &g.lines {
            prop_assert_eq!(line.width(), g.width);
        }
        let texts: Vec<_> = g
            .lines
            .iter()
            .filter_map(|l| match l {
                BalloonLine::Message { text, .. } => Some(text.clone()),
                BalloonLine::Border(_) => None,
            })
            .take(rows.len())
            .collect();
        prop_assert_eq!(&texts, &rows);
    }

    #[test]
    fn art_right_of_overlay_keeps_its_column(
        lead in 0usize..10,
        art in "[a-z]{14,30}",
    ) {
        // balloon opens at column `lead`; its rows are 4 wide ("|hi|")
        let template = format!("{}$balloon$\n{art}\n{art}\n", ".".repeat(lead));
        let opts = RenderOptions {
            attribute_mode: AttributeMode::Plain,
            ..RenderOptions::default()
        }
        .with_style(boxed());
        let out = render(&template, "hi", &opts).unwrap();
        let lines: Vec<&str> = out.text.lines().collect();

        let splice = |row: &str| -> String {
            let chars: Vec<char> = art.chars().collect();
            let head: String = chars.iter().take(lead).collect();
            let pad = " ".repeat(lead.saturating_sub(chars.len()));
            let tail: String = chars.iter().skip(lead + 4).collect();
            format!("{head}{pad}{row}{tail}")
        };
        prop_assert_eq!(lines[0], format!("{}+--+", ".".repeat(lead)));
        prop_assert_eq!(lines[1], splice("|hi|"));
        prop_assert_eq!(lines[2], splice("+--+"));
        for (i, line) in lines.iter().enumerate().skip(1) {
            let original: Vec<char> = art.chars().collect();
            let rendered: Vec<char> = line.chars().collect();
            for col in lead + 4..original.len() {
                prop_assert_eq!(rendered[col], original[col], "row {} column {}", i, col);
            }
        }
    }
}
