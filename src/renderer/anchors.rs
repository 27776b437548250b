//! DOM-derived arc anchors, used when the layout engine supplies no
//! pre-computed arcs.
//!
//! Cell containers carry role classes marking the first and last cell of a
//! span. Scanning a line in order, a start marker opens a pending span and
//! the next end marker closes it.

use crate::dom::CellElement;
use crate::model::*;
use super::arcs::compute_arc_curve;
use super::constants::DEFAULT_ARC_COLOR;

/// Role classes marking the boundaries of one arc category.
#[derive(Clone, Copy, Debug)]
pub struct RoleMarkers {
    pub start: &'static str,
    pub end: &'static str,
}

pub fn role_markers(kind: ArcKind) -> RoleMarkers {
    match kind {
        ArcKind::Slur => RoleMarkers { start: "slur-first", end: "slur-last" },
        ArcKind::BeatLoop => RoleMarkers { start: "beat-loop-first", end: "beat-loop-last" },
        ArcKind::Ornament => RoleMarkers { start: "ornament-first", end: "ornament-last" },
    }
}

/// A closed span: anchor rectangles and cell indices of both ends.
#[derive(Clone, Debug, PartialEq)]
pub struct AnchorSpan {
    pub start_index: usize,
    pub end_index: usize,
    pub start_rect: Rect,
    pub end_rect: Rect,
}

/// Pair start and end markers in document order.
///
/// An end with no pending start is ignored. A second start before a close
/// replaces the pending one (last start wins). A cell carrying both
/// markers closes the pending span before opening a new one.
pub fn scan_anchor_spans(cells: &[CellElement], markers: RoleMarkers) -> Vec<AnchorSpan> {
    let mut spans = Vec::new();
    let mut pending: Option<(usize, Rect)> = None;

    for (pos, cell) in cells.iter().enumerate() {
        let index = cell.cell_index.unwrap_or(pos);

        if cell.has_class(markers.end) {
            match pending.take() {
                Some((start_index, start_rect)) => spans.push(AnchorSpan {
                    start_index,
                    end_index: index,
                    start_rect,
                    end_rect: cell.rect,
                }),
                None => tracing::debug!(cell = index, class = markers.end, "end marker without start"),
            }
        }

        if cell.has_class(markers.start) {
            if let Some((replaced, _)) = pending {
                tracing::debug!(replaced, cell = index, class = markers.start, "pending start replaced");
            }
            pending = Some((index, cell.rect));
        }
    }

    if let Some((start_index, _)) = pending {
        tracing::debug!(cell = start_index, class = markers.start, "start marker never closed");
    }

    spans
}

/// Derive the arcs of one category for a mounted line. Cell rectangles
/// are already in overlay space, so no further conversion is needed.
pub fn derive_line_arcs(line_index: usize, cells: &[CellElement], kind: ArcKind) -> Vec<Arc> {
    let direction = kind.default_direction();
    scan_anchor_spans(cells, role_markers(kind))
        .into_iter()
        .map(|span| {
            compute_arc_curve(&span.start_rect, &span.end_rect, direction).into_arc(
                arc_id(kind, line_index, span.start_index, span.end_index),
                kind,
                direction,
                DEFAULT_ARC_COLOR,
            )
        })
        .collect()
}
