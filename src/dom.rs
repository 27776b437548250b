//! Live-DOM measurements the renderer needs, behind a trait.
//!
//! The renderer never caches these: lines can reflow, scroll or change
//! height between passes, so every pass asks again.
//!
//! `MarkupDom` is a concrete implementation built from a snapshot of the
//! rendered line markup, where the host has recorded each element's
//! measured offsets as `data-offset-*` attributes:
//!
//! ```xml
//! <div class="notation-line" data-line-index="0" data-offset-top="40">
//!   <div class="line-content" data-offset-left="60">
//!     <span class="char-cell slur-first" data-cell-index="0"
//!           data-offset-left="0" data-offset-top="0"
//!           data-offset-width="12" data-offset-height="16">S</span>
//!   </div>
//! </div>
//! ```

use std::collections::BTreeMap;

use roxmltree::{Document, Node};

use crate::error::{OverlayError, Result};
use crate::model::Rect;

pub const LINE_CLASS: &str = "notation-line";
pub const LINE_CONTENT_CLASS: &str = "line-content";
pub const CELL_CLASS: &str = "char-cell";

/// Where a line sits on screen this pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineMetrics {
    /// Horizontal offset of the line's content wrapper (the gutter)
    pub gutter_left: f64,
    /// Vertical position of the line element
    pub offset_top: f64,
}

/// A rendered cell container, measured in overlay space.
#[derive(Debug, Clone, PartialEq)]
pub struct CellElement {
    pub cell_index: Option<usize>,
    pub classes: Vec<String>,
    pub rect: Rect,
}

impl CellElement {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Read access to the mounted notation lines.
pub trait LineDom {
    /// Measurements of a mounted line, or `None` if it is not mounted yet.
    fn line_metrics(&self, line_index: usize) -> Option<LineMetrics>;

    /// The line's cell containers in document order, or `None` if the
    /// line is not mounted yet.
    fn cell_elements(&self, line_index: usize) -> Option<Vec<CellElement>>;
}

#[derive(Debug, Clone, Default)]
struct MountedLine {
    metrics: LineMetrics,
    cells: Vec<CellElement>,
}

/// A `LineDom` backed by a markup snapshot.
#[derive(Debug, Clone, Default)]
pub struct MarkupDom {
    lines: BTreeMap<usize, MountedLine>,
}

impl MarkupDom {
    /// An empty DOM: nothing is mounted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a markup snapshot. Every `notation-line` element must carry
    /// `data-line-index`.
    pub fn parse(markup: &str) -> Result<Self> {
        let doc = Document::parse(markup)?;
        let mut dom = MarkupDom::new();

        for line_node in doc.descendants().filter(|n| has_class(n, LINE_CLASS)) {
            let line_index = line_node
                .attribute("data-line-index")
                .and_then(|s| s.trim().parse::<usize>().ok())
                .ok_or_else(|| {
                    OverlayError::InvalidMarkup(format!(
                        "{LINE_CLASS} element without a valid data-line-index"
                    ))
                })?;

            let offset_top = number_attr(&line_node, "data-offset-top")?;
            let gutter_left = match line_node
                .descendants()
                .find(|n| has_class(n, LINE_CONTENT_CLASS))
            {
                Some(content) => number_attr(&content, "data-offset-left")?,
                None => 0.0,
            };
            let metrics = LineMetrics { gutter_left, offset_top };

            let mut cells = Vec::new();
            for cell_node in line_node.descendants().filter(|n| has_class(n, CELL_CLASS)) {
                let local = Rect::new(
                    number_attr(&cell_node, "data-offset-left")?,
                    number_attr(&cell_node, "data-offset-top")?,
                    number_attr(&cell_node, "data-offset-width")?,
                    number_attr(&cell_node, "data-offset-height")?,
                );
                cells.push(CellElement {
                    cell_index: cell_node
                        .attribute("data-cell-index")
                        .and_then(|s| s.trim().parse().ok()),
                    classes: class_list(&cell_node),
                    rect: Rect::new(
                        local.x + gutter_left,
                        local.y + offset_top,
                        local.w,
                        local.h,
                    ),
                });
            }

            dom.lines.insert(line_index, MountedLine { metrics, cells });
        }

        Ok(dom)
    }

    /// Mount (or replace) a line directly.
    pub fn mount_line(&mut self, line_index: usize, metrics: LineMetrics, cells: Vec<CellElement>) {
        self.lines.insert(line_index, MountedLine { metrics, cells });
    }

    pub fn unmount_line(&mut self, line_index: usize) {
        self.lines.remove(&line_index);
    }

    /// Indices of mounted lines, ascending.
    pub fn mounted_lines(&self) -> Vec<usize> {
        self.lines.keys().copied().collect()
    }
}

impl LineDom for MarkupDom {
    fn line_metrics(&self, line_index: usize) -> Option<LineMetrics> {
        self.lines.get(&line_index).map(|l| l.metrics)
    }

    fn cell_elements(&self, line_index: usize) -> Option<Vec<CellElement>> {
        self.lines.get(&line_index).map(|l| l.cells.clone())
    }
}

fn class_list(node: &Node) -> Vec<String> {
    node.attribute("class")
        .map(|c| c.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

fn has_class(node: &Node, class: &str) -> bool {
    node.is_element()
        && node
            .attribute("class")
            .map_or(false, |c| c.split_whitespace().any(|x| x == class))
}

/// Missing offsets read as 0, like an unpositioned element. `NaN` and
/// infinities are rejected: every offset must be a finite number.
fn number_attr(node: &Node, name: &str) -> Result<f64> {
    match node.attribute(name) {
        None => Ok(0.0),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                OverlayError::InvalidMarkup(format!("{name}=\"{raw}\" is not a finite number"))
            }),
    }
}
