//! `balloon` directive specs and horizontal placement.
//!
//! Spec grammar, after the `balloon` keyword:
//! `[offset](l|c|r)[width][,height]` or `[width][,height]`.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Justify {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BalloonSpec {
    /// Anchor distance from the directive column.
    pub offset: usize,
    pub justify: Justify,
    pub width: Option<usize>,
    pub height: Option<usize>,
}

fn number(text: &str) -> Option<Option<usize>> {
    let text = text.trim();
    if text.is_empty() {
        return Some(None);
    }
    text.parse().ok().map(Some)
}

impl BalloonSpec {
    /// Parse the text following `balloon`. `None` means the spec is malformed.
    pub fn parse(spec: &str) -> Option<Self> {
        let (offset, justify, size) = match spec.find(['l', 'c', 'r']) {
            Some(i) => {
                let justify = match spec.as_bytes()[i] {
                    b'c' => Justify::Center,
                    b'r' => Justify::Right,
                    _ => Justify::Left,
                };
                (number(&spec[..i])?.unwrap_or(0), justify, &spec[i + 1..])
            }
            None => (0, Justify::Left, spec),
        };
        let (width, height) = match size.split_once(',') {
            Some((w, h)) => (number(w)?, number(h)?),
            None => (number(size)?, None),
        };
        Some(Self {
            offset,
            justify,
            width,
            height,
        })
    }

    fn anchor(&self, cursor: usize) -> usize {
        cursor + self.offset
    }

    /// Columns the balloon may occupy when placed from `cursor`, or `None`
    /// when there is no right boundary.
    pub fn available(&self, cursor: usize, boundary: Option<usize>) -> Option<usize> {
        let anchor = self.anchor(cursor);
        match self.justify {
            Justify::Left => boundary.map(|b| b.saturating_sub(anchor)),
            Justify::Right => Some(anchor - cursor),
            Justify::Center => boundary.map(|b| b.saturating_sub(cursor)),
        }
    }

    /// Left edge of a balloon `width` columns wide. Never before `cursor`.
    pub fn left_edge(&self, cursor: usize, boundary: Option<usize>, width: usize) -> usize {
        let anchor = self.anchor(cursor);
        match self.justify {
            Justify::Left => anchor,
            Justify::Right => anchor.saturating_sub(width).max(cursor),
            Justify::Center => {
                let left = anchor.saturating_sub(width / 2).max(cursor);
                match boundary {
                    Some(b) if left + width > b => b.saturating_sub(width).max(cursor),
                    _ => left,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_grammar_shapes() {
        assert_eq!(BalloonSpec::parse(""), Some(BalloonSpec::default()));
        assert_eq!(
            BalloonSpec::parse("12"),
            Some(BalloonSpec {
                width: Some(12),
                ..Default::default()
            })
        );
        assert_eq!(
            BalloonSpec::parse("4c30,5"),
            Some(BalloonSpec {
                offset: 4,
                justify: Justify::Center,
                width: Some(30),
                height: Some(5),
            })
        );
        assert_eq!(
            BalloonSpec::parse("r"),
            Some(BalloonSpec {
                justify: Justify::Right,
                ..Default::default()
            })
        );
        assert_eq!(
            BalloonSpec::parse(",3"),
            Some(BalloonSpec {
                height: Some(3),
                ..Default::default()
            })
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(BalloonSpec::parse("xl").is_none());
        assert!(BalloonSpec::parse("l1x").is_none());
        assert!(BalloonSpec::parse("5,q").is_none());
    }

    #[test]
    fn left_placement() {
        let spec = BalloonSpec::parse("3l").unwrap_or_default();
        assert_eq!(spec.available(2, Some(40)), Some(35));
        assert_eq!(spec.available(2, None), None);
        assert_eq!(spec.left_edge(2, Some(40), 10), 5);
    }

    #[test]
    fn right_placement_clips_at_cursor() {
        let spec = BalloonSpec::parse("20r").unwrap_or_default();
        assert_eq!(spec.available(0, Some(80)), Some(20));
        assert_eq!(spec.left_edge(0, Some(80), 8), 12);
        assert_eq!(spec.left_edge(0, Some(80), 30), 0);
    }

    #[test]
    fn center_placement_reclips() {
        let spec = BalloonSpec::parse("10c").unwrap_or_default();
        assert_eq!(spec.left_edge(0, Some(40), 6), 7);
        // would start before the cursor
        assert_eq!(spec.left_edge(0, Some(40), 30), 0);
        // would pass the boundary
        assert_eq!(spec.left_edge(0, Some(12), 6), 6);
    }
}
