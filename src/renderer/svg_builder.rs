//! Drawing surface for the overlay, and a retained-mode SVG implementation.
//!
//! Unlike a one-shot string builder, the overlay keeps its path elements
//! alive between passes so the reconciler can update them in place.

use std::fmt;

use crate::model::ArcKind;
use super::constants::*;

// ═══════════════════════════════════════════════════════════════════════
// Surface trait
// ═══════════════════════════════════════════════════════════════════════

/// Static attributes of a path node, set once at creation.
#[derive(Clone, Debug, PartialEq)]
pub struct PathStyle {
    pub class: &'static str,
    pub stroke: String,
    pub stroke_width: f64,
}

impl PathStyle {
    pub fn for_arc(kind: ArcKind, color: &str) -> Self {
        let (class, stroke_width) = match kind {
            ArcKind::Slur => (SLUR_CLASS, SLUR_STROKE_WIDTH),
            ArcKind::BeatLoop => (BEAT_LOOP_CLASS, BEAT_LOOP_STROKE_WIDTH),
            ArcKind::Ornament => (ORNAMENT_ARC_CLASS, ORNAMENT_STROKE_WIDTH),
        };
        Self {
            class,
            stroke: color.to_string(),
            stroke_width,
        }
    }
}

/// Something the renderer can draw into.
///
/// Path nodes are created, have their path data replaced, and are removed
/// individually. Text nodes are only ever cleared and redrawn as a whole.
pub trait OverlaySurface {
    type Node: Clone + PartialEq + fmt::Debug;

    fn create_path(&mut self, kind: ArcKind, style: &PathStyle, d: &str) -> Self::Node;
    fn set_path_data(&mut self, node: &Self::Node, d: &str);
    fn remove_path(&mut self, node: &Self::Node);

    fn clear_text(&mut self);
    fn add_text(&mut self, x: f64, y: f64, content: &str, class: &str);
}

// ═══════════════════════════════════════════════════════════════════════
// SvgOverlay
// ═══════════════════════════════════════════════════════════════════════

/// Handle to a path element owned by an `SvgOverlay`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

/// Which side of the notation a layer is stacked on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayLayer {
    /// Beat loops
    BelowNotation,
    /// Slurs, ornament arcs and lyrics
    AboveNotation,
}

impl OverlayLayer {
    fn of(kind: ArcKind) -> Self {
        match kind {
            ArcKind::BeatLoop => OverlayLayer::BelowNotation,
            ArcKind::Slur | ArcKind::Ornament => OverlayLayer::AboveNotation,
        }
    }
}

#[derive(Clone, Debug)]
struct PathElement {
    id: NodeId,
    kind: ArcKind,
    style: PathStyle,
    d: String,
}

#[derive(Clone, Debug)]
struct TextElement {
    x: f64,
    y: f64,
    content: String,
    class: String,
}

#[derive(Debug, Default)]
pub struct SvgOverlay {
    paths: Vec<PathElement>,
    texts: Vec<TextElement>,
    next_id: u64,
}

impl SvgOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live path nodes in a category.
    pub fn path_count(&self, kind: ArcKind) -> usize {
        self.paths.iter().filter(|p| p.kind == kind).count()
    }

    /// Live path nodes of a category in paint order.
    pub fn nodes(&self, kind: ArcKind) -> Vec<NodeId> {
        self.paths.iter().filter(|p| p.kind == kind).map(|p| p.id).collect()
    }

    pub fn path_data(&self, node: NodeId) -> Option<&str> {
        self.find(node).map(|p| p.d.as_str())
    }

    pub fn path_class(&self, node: NodeId) -> Option<&'static str> {
        self.find(node).map(|p| p.style.class)
    }

    pub fn text_count(&self) -> usize {
        self.texts.len()
    }

    /// Text contents in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.texts.iter().map(|t| t.content.as_str()).collect()
    }

    fn find(&self, node: NodeId) -> Option<&PathElement> {
        self.paths.iter().find(|p| p.id == node)
    }

    /// Serialize one layer as a standalone, non-interactive SVG.
    pub fn build(&self, layer: OverlayLayer) -> String {
        let layer_class = match layer {
            OverlayLayer::BelowNotation => "arc-overlay arc-overlay-below",
            OverlayLayer::AboveNotation => "arc-overlay arc-overlay-above",
        };
        let z_index = match layer {
            OverlayLayer::BelowNotation => 0,
            OverlayLayer::AboveNotation => 2,
        };
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" class="{}" style="position: absolute; left: 0; top: 0; width: 100%; height: 100%; overflow: visible; pointer-events: none; z-index: {};">"#,
            layer_class, z_index
        );
        svg.push('\n');

        for kind in ArcKind::ALL {
            if OverlayLayer::of(kind) != layer {
                continue;
            }
            let group: Vec<&PathElement> = self.paths.iter().filter(|p| p.kind == kind).collect();
            if group.is_empty() {
                continue;
            }
            svg.push_str(&format!("  <g class=\"{}-group\">\n", kind.id_prefix()));
            for p in group {
                svg.push_str(&format!(
                    r#"    <path class="{}" d="{}" fill="none" stroke="{}" stroke-width="{:.1}" stroke-linecap="round" stroke-linejoin="round"/>"#,
                    p.style.class,
                    p.d,
                    escape(&p.style.stroke),
                    p.style.stroke_width
                ));
                svg.push('\n');
            }
            svg.push_str("  </g>\n");
        }

        if layer == OverlayLayer::AboveNotation && !self.texts.is_empty() {
            svg.push_str("  <g class=\"lyrics-group\">\n");
            for t in &self.texts {
                svg.push_str(&format!(
                    r#"    <text class="{}" x="{:.1}" y="{:.1}" font-size="{:.0}" fill="{}" text-anchor="middle">{}</text>"#,
                    t.class,
                    t.x,
                    t.y,
                    LYRICS_FONT_SIZE,
                    LYRICS_COLOR,
                    escape(&t.content)
                ));
                svg.push('\n');
            }
            svg.push_str("  </g>\n");
        }

        svg.push_str("</svg>\n");
        svg
    }
}

impl OverlaySurface for SvgOverlay {
    type Node = NodeId;

    fn create_path(&mut self, kind: ArcKind, style: &PathStyle, d: &str) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.paths.push(PathElement {
            id,
            kind,
            style: style.clone(),
            d: d.to_string(),
        });
        id
    }

    fn set_path_data(&mut self, node: &NodeId, d: &str) {
        if let Some(p) = self.paths.iter_mut().find(|p| p.id == *node) {
            p.d.clear();
            p.d.push_str(d);
        }
    }

    fn remove_path(&mut self, node: &NodeId) {
        self.paths.retain(|p| p.id != *node);
    }

    fn clear_text(&mut self) {
        self.texts.clear();
    }

    fn add_text(&mut self, x: f64, y: f64, content: &str, class: &str) {
        self.texts.push(TextElement {
            x,
            y,
            content: content.to_string(),
            class: class.to_string(),
        });
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
