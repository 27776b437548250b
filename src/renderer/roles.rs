//! Span role classes: the markers the DOM-derived anchor scan looks for.
//!
//! The cell renderer tags every cell inside a closed slur with its role so
//! the overlay can find the span boundaries again from the markup alone.

use std::collections::BTreeMap;

use crate::model::*;

/// Position of a cell inside a span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpanRole {
    First,
    Middle,
    Last,
}

impl SpanRole {
    /// CSS class for this role in a given arc category.
    pub fn css_class(self, kind: ArcKind) -> String {
        let suffix = match self {
            SpanRole::First => "first",
            SpanRole::Middle => "middle",
            SpanRole::Last => "last",
        };
        format!("{}-{}", kind.id_prefix(), suffix)
    }
}

/// Role of every cell covered by a closed slur, keyed by cell index.
///
/// Only spans with both a Start and a matching End are tagged; a Start
/// with no End leaves its cells untouched.
pub fn slur_role_map(cells: &[Cell]) -> BTreeMap<usize, SpanRole> {
    let mut map = BTreeMap::new();
    let mut open: Option<usize> = None;

    for (pos, cell) in cells.iter().enumerate() {
        match cell.slur_indicator {
            SlurIndicator::Start => open = Some(pos),
            SlurIndicator::End => {
                if let Some(start) = open.take() {
                    for (i, c) in cells.iter().enumerate().take(pos + 1).skip(start) {
                        let role = if i == start {
                            SpanRole::First
                        } else if i == pos {
                            SpanRole::Last
                        } else {
                            SpanRole::Middle
                        };
                        map.insert(c.index, role);
                    }
                }
            }
            SlurIndicator::None => {}
        }
    }

    map
}
