//! Arc geometry: cubic Bézier control points for slurs, beat loops and
//! ornament arcs, computed from two anchor rectangles.

use crate::model::*;
use super::constants::*;

/// The four points of a cubic Bézier arc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcCurve {
    pub start: Point,
    pub cp1: Point,
    pub cp2: Point,
    pub end: Point,
}

impl ArcCurve {
    pub fn into_arc(self, id: String, kind: ArcKind, direction: ArcDirection, color: &str) -> Arc {
        Arc {
            id,
            kind,
            direction,
            start: self.start,
            cp1: self.cp1,
            cp2: self.cp2,
            end: self.end,
            color: color.to_string(),
        }
    }
}

/// Arch height of a slur: proportional to span, clamped, and softened for
/// very long phrases so they don't balloon.
pub fn slur_height(span: f64) -> f64 {
    let height = (span * SLUR_HEIGHT_FACTOR).clamp(SLUR_MIN_HEIGHT, SLUR_MAX_HEIGHT);
    if span > SLUR_LONG_SPAN {
        height * SLUR_LONG_SPAN_SOFTENING
    } else {
        height
    }
}

/// Arch height of a beat loop: shallow and slow-growing so grouping marks
/// stay subordinate to slurs.
pub fn beat_loop_height(span: f64) -> f64 {
    if span <= BEAT_LOOP_SHORT_SPAN {
        BEAT_LOOP_MIN_HEIGHT
    } else {
        (BEAT_LOOP_MIN_HEIGHT + (span - BEAT_LOOP_SHORT_SPAN) * BEAT_LOOP_GROWTH)
            .min(BEAT_LOOP_MAX_HEIGHT)
    }
}

pub fn arch_height(direction: ArcDirection, span: f64) -> f64 {
    match direction {
        ArcDirection::Up => slur_height(span),
        ArcDirection::Down => beat_loop_height(span),
    }
}

/// Anchor point on a cell: top centre for arcs bowing up, bottom centre
/// for arcs bowing down.
fn anchor(cell: &Rect, direction: ArcDirection) -> Point {
    let y = match direction {
        ArcDirection::Up => cell.top(),
        ArcDirection::Down => cell.bottom(),
    };
    Point::new(cell.center_x(), y)
}

/// Compute the Bézier curve joining two cells.
///
/// Control points sit at 55% and 60% of the span rather than the usual
/// thirds, which puts the apex slightly past the midpoint.
pub fn compute_arc_curve(start_cell: &Rect, end_cell: &Rect, direction: ArcDirection) -> ArcCurve {
    let mut start = anchor(start_cell, direction);
    let mut end = anchor(end_cell, direction);
    start.x -= EXTENSION_OFFSET;
    end.x += EXTENSION_OFFSET;

    let span = (end.x - start.x).abs();
    let lift = direction.y_sign() * arch_height(direction, span);

    ArcCurve {
        start,
        cp1: Point::new(start.x + span * CP1_SPAN_FRACTION, start.y + lift),
        cp2: Point::new(start.x + span * CP2_SPAN_FRACTION, end.y + lift),
        end,
    }
}

/// SVG path data for an arc.
pub fn path_data(arc: &Arc) -> String {
    format!(
        "M{:.1},{:.1} C{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}",
        arc.start.x, arc.start.y,
        arc.cp1.x, arc.cp1.y,
        arc.cp2.x, arc.cp2.y,
        arc.end.x, arc.end.y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn slur_height_clamps_and_softens() {
        assert!(approx(slur_height(0.0), 6.0));
        assert!(approx(slur_height(24.0), 6.0));
        assert!(approx(slur_height(100.0), 25.0));
        assert!(approx(slur_height(400.0), 19.6));
        // exactly 300 is not softened
        assert!(approx(slur_height(300.0), 28.0));
    }

    #[test]
    fn beat_loop_height_grows_slowly_and_caps() {
        assert!(approx(beat_loop_height(0.0), 3.0));
        assert!(approx(beat_loop_height(8.0), 3.0));
        assert!(approx(beat_loop_height(28.0), 4.0));
        assert!(approx(beat_loop_height(108.0), 8.0));
        assert!(approx(beat_loop_height(1000.0), 8.0));
    }

    #[test]
    fn up_arc_anchors_on_top_and_bows_upward() {
        let a = Rect::new(10.0, 20.0, 12.0, 16.0);
        let b = Rect::new(90.0, 20.0, 12.0, 16.0);
        let curve = compute_arc_curve(&a, &b, ArcDirection::Up);

        assert_eq!(curve.start, Point::new(12.0, 20.0));
        assert_eq!(curve.end, Point::new(100.0, 20.0));
        // span 88 → height 22
        assert!(approx(curve.cp1.x, 12.0 + 88.0 * 0.55));
        assert!(approx(curve.cp2.x, 12.0 + 88.0 * 0.60));
        assert!(approx(curve.cp1.y, -2.0));
        assert!(approx(curve.cp2.y, -2.0));
    }

    #[test]
    fn down_arc_anchors_on_bottom_and_bows_downward() {
        let a = Rect::new(0.0, 0.0, 10.0, 20.0);
        let b = Rect::new(20.0, 0.0, 10.0, 20.0);
        let curve = compute_arc_curve(&a, &b, ArcDirection::Down);

        assert_eq!(curve.start, Point::new(1.0, 20.0));
        assert_eq!(curve.end, Point::new(29.0, 20.0));
        // span 28 → height 4
        assert!(approx(curve.cp1.y, 24.0));
        assert!(approx(curve.cp2.y, 24.0));
    }

    #[test]
    fn zero_span_stays_finite() {
        // End cell placed so the extended anchors coincide.
        let a = Rect::new(8.0, 0.0, 0.0, 10.0);
        let b = Rect::new(0.0, 0.0, 0.0, 10.0);
        for direction in [ArcDirection::Up, ArcDirection::Down] {
            let curve = compute_arc_curve(&a, &b, direction);
            assert!(approx(curve.start.x, curve.end.x));
            for p in [curve.start, curve.cp1, curve.cp2, curve.end] {
                assert!(p.x.is_finite() && p.y.is_finite());
            }
            assert!(approx(curve.cp1.x, curve.start.x));
        }
    }

    #[test]
    fn path_data_is_a_single_cubic() {
        let arc = ArcCurve {
            start: Point::new(0.0, 10.0),
            cp1: Point::new(5.5, 4.0),
            cp2: Point::new(6.0, 4.0),
            end: Point::new(10.0, 10.0),
        }
        .into_arc("slur-0-0-1".into(), ArcKind::Slur, ArcDirection::Up, "#000");
        assert_eq!(path_data(&arc), "M0.0,10.0 C5.5,4.0 6.0,4.0 10.0,10.0");
    }
}
