//! Coordinate conversion for pre-computed arcs.
//!
//! The layout engine emits slurs and beat loops relative to their line's
//! local origin, but ornament arcs relative to a running y accumulated over
//! all prior lines. Both are mapped into overlay space with the line's
//! measured position; the two origins are kept as separate variants on
//! purpose.

use crate::dom::LineMetrics;
use crate::error::{OverlayError, Result};
use crate::model::*;
use super::constants::DEFAULT_ARC_COLOR;

/// The y baseline a line's source coordinates are measured from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineOrigin {
    /// The line's own y in layout space
    Local(f64),
    /// Sum of the heights of every line above this one
    Cumulative(f64),
}

impl LineOrigin {
    pub fn y(self) -> f64 {
        match self {
            LineOrigin::Local(y) | LineOrigin::Cumulative(y) => y,
        }
    }
}

pub fn to_absolute_x(x: f64, metrics: &LineMetrics) -> f64 {
    x + metrics.gutter_left
}

pub fn to_absolute_y(y: f64, origin: LineOrigin, metrics: &LineMetrics) -> f64 {
    (y - origin.y()) + metrics.offset_top
}

pub fn to_absolute(p: Point, origin: LineOrigin, metrics: &LineMetrics) -> Point {
    Point::new(to_absolute_x(p.x, metrics), to_absolute_y(p.y, origin, metrics))
}

/// Cumulative y origin of every line: the running sum of the heights of
/// the lines before it.
pub fn cumulative_origins(lines: &[RenderLine]) -> Vec<f64> {
    let mut origins = Vec::with_capacity(lines.len());
    let mut running = 0.0;
    for line in lines {
        origins.push(running);
        running += line.height;
    }
    origins
}

/// Origin used for a given arc category on a line.
pub fn origin_for(kind: ArcKind, line: &RenderLine, cumulative_y: f64) -> LineOrigin {
    match kind {
        ArcKind::Slur | ArcKind::BeatLoop => LineOrigin::Local(line.y),
        ArcKind::Ornament => LineOrigin::Cumulative(cumulative_y),
    }
}

/// Validate one wire arc and convert it into overlay space.
pub fn convert_arc(
    raw: &RenderArc,
    kind: ArcKind,
    origin: LineOrigin,
    metrics: &LineMetrics,
) -> Result<Arc> {
    let id = raw.id.clone().filter(|s| !s.is_empty()).ok_or_else(|| {
        OverlayError::MalformedArc { kind, id: String::new(), field: "id" }
    })?;
    let field = |value: Option<f64>, name: &'static str| {
        value.filter(|v| v.is_finite()).ok_or_else(|| OverlayError::MalformedArc {
            kind,
            id: id.clone(),
            field: name,
        })
    };
    let start = Point::new(field(raw.start_x, "start_x")?, field(raw.start_y, "start_y")?);
    let cp1 = Point::new(field(raw.cp1_x, "cp1_x")?, field(raw.cp1_y, "cp1_y")?);
    let cp2 = Point::new(field(raw.cp2_x, "cp2_x")?, field(raw.cp2_y, "cp2_y")?);
    let end = Point::new(field(raw.end_x, "end_x")?, field(raw.end_y, "end_y")?);
    let direction = match raw.direction.as_deref() {
        None => kind.default_direction(),
        Some(name) => ArcDirection::from_name(name).ok_or_else(|| OverlayError::MalformedArc {
            kind,
            id: id.clone(),
            field: "direction",
        })?,
    };

    Ok(Arc {
        direction,
        color: raw.color.clone().unwrap_or_else(|| DEFAULT_ARC_COLOR.to_string()),
        start: to_absolute(start, origin, metrics),
        cp1: to_absolute(cp1, origin, metrics),
        cp2: to_absolute(cp2, origin, metrics),
        end: to_absolute(end, origin, metrics),
        kind,
        id,
    })
}

/// Convert every arc of one category on one line. Malformed records are
/// logged and skipped; the count of skipped records is returned alongside.
pub fn convert_line_arcs(
    line: &RenderLine,
    kind: ArcKind,
    cumulative_y: f64,
    metrics: &LineMetrics,
) -> (Vec<Arc>, usize) {
    let origin = origin_for(kind, line, cumulative_y);
    let mut arcs = Vec::with_capacity(line.arcs(kind).len());
    let mut skipped = 0;
    for raw in line.arcs(kind) {
        match convert_arc(raw, kind, origin, metrics) {
            Ok(arc) => arcs.push(arc),
            Err(err) => {
                tracing::debug!(line = line.line_index, %err, "skipping malformed arc");
                skipped += 1;
            }
        }
    }
    (arcs, skipped)
}
