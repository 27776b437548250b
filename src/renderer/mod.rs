//! Overlay renderer: turns a display list (or the mounted DOM) into slur,
//! beat-loop and ornament arcs plus lyric placements on an overlay surface.
//!
//! One `render` call is one pass: collect arcs per category, convert them
//! into overlay space, reconcile them against the surface's path nodes, and
//! redraw the lyrics. Passes are synchronous and must not overlap.

pub mod anchors;
pub mod arcs;
pub mod constants;
pub mod lyrics;
pub mod reconciler;
pub mod roles;
pub mod svg_builder;
pub mod transform;

use serde::{Deserialize, Serialize};

use crate::dom::{LineDom, LineMetrics};
use crate::error::{OverlayError, Result};
use crate::model::*;
use constants::*;
use lyrics::{distribute_lyrics, LyricsLayout};
use reconciler::{OverlayReconciler, ReconcileStats};
use svg_builder::OverlaySurface;
use transform::{cumulative_origins, to_absolute, LineOrigin};

// ═══════════════════════════════════════════════════════════════════════
// Options, requests, reports
// ═══════════════════════════════════════════════════════════════════════

/// Renderer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Suppress beat loops entirely (e.g. when glyphs already draw them)
    pub skip_beat_loops: bool,
    /// Draw lyric syllables
    pub lyrics: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            skip_beat_loops: false,
            lyrics: true,
        }
    }
}

impl RenderOptions {
    /// Parse options from JSON; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json).map_err(OverlayError::from)
    }
}

/// Input of one render pass.
#[derive(Debug, Clone, Copy)]
pub enum RenderRequest<'a> {
    /// Arcs pre-computed by the layout engine (line-relative / cumulative)
    Precomputed(&'a DisplayList),
    /// Only cells are known; arcs are found from role classes in the DOM
    Derived(&'a [LineCells]),
}

impl RenderRequest<'_> {
    fn is_empty(&self) -> bool {
        match self {
            RenderRequest::Precomputed(list) => list.lines.is_empty(),
            RenderRequest::Derived(lines) => lines.is_empty(),
        }
    }
}

/// What one render pass did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    /// Reconcile stats per category, indexed by `ArcKind::index`
    arcs: [ReconcileStats; 3],
    /// Lines skipped because they are not mounted yet
    pub skipped_lines: Vec<usize>,
    /// Arc records skipped because a field was missing or malformed
    pub skipped_arcs: usize,
    pub syllables: usize,
    pub unassigned_syllables: usize,
}

impl RenderReport {
    pub fn stats(&self, kind: ArcKind) -> ReconcileStats {
        self.arcs[kind.index()]
    }

    /// Stats summed over every category.
    pub fn total(&self) -> ReconcileStats {
        let mut total = ReconcileStats::default();
        for stats in self.arcs {
            total.merge(stats);
        }
        total
    }
}

/// Arcs collected for one pass, indexed by `ArcKind::index`.
type ArcSet = [Vec<Arc>; 3];

/// A lyric line placed in overlay space.
struct PlacedLyrics {
    layout: LyricsLayout,
    origin: LineOrigin,
    metrics: LineMetrics,
}

// ═══════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════

/// Owns the reconciler state for one editor instance.
///
/// Several renderers can coexist; nothing is shared between them.
#[derive(Debug)]
pub struct OverlayRenderer<N> {
    options: RenderOptions,
    reconciler: OverlayReconciler<N>,
}

impl<N: Clone + PartialEq + std::fmt::Debug> OverlayRenderer<N> {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            reconciler: OverlayReconciler::new(),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: RenderOptions) {
        self.options = options;
    }

    pub fn reconciler(&self) -> &OverlayReconciler<N> {
        &self.reconciler
    }

    /// Run one render pass.
    ///
    /// An empty request is a no-op: the surface is left as it was. Lines
    /// that are not mounted and malformed arc records are skipped and
    /// reported; everything else still renders.
    pub fn render<D, S>(&mut self, request: RenderRequest<'_>, dom: &D, surface: &mut S) -> RenderReport
    where
        D: LineDom,
        S: OverlaySurface<Node = N>,
    {
        let mut report = RenderReport::default();
        if request.is_empty() {
            return report;
        }

        let mut arcs: ArcSet = Default::default();
        let mut lyrics: Vec<PlacedLyrics> = Vec::new();

        match request {
            RenderRequest::Precomputed(list) => {
                self.collect_precomputed(list, dom, &mut arcs, &mut lyrics, &mut report)
            }
            RenderRequest::Derived(lines) => {
                self.collect_derived(lines, dom, &mut arcs, &mut lyrics, &mut report)
            }
        }

        for kind in ArcKind::ALL {
            report.arcs[kind.index()] =
                self.reconciler.reconcile(kind, &arcs[kind.index()], surface);
        }

        surface.clear_text();
        if self.options.lyrics {
            for placed in &lyrics {
                draw_lyrics(surface, placed, &mut report);
            }
        }

        tracing::trace!(
            slurs = ?report.stats(ArcKind::Slur),
            beat_loops = ?report.stats(ArcKind::BeatLoop),
            ornaments = ?report.stats(ArcKind::Ornament),
            total = ?report.total(),
            skipped_lines = report.skipped_lines.len(),
            skipped_arcs = report.skipped_arcs,
            "overlay pass done"
        );
        report
    }

    /// Mode A: convert the layout engine's arcs into overlay space.
    fn collect_precomputed<D: LineDom>(
        &self,
        list: &DisplayList,
        dom: &D,
        arcs: &mut ArcSet,
        lyrics: &mut Vec<PlacedLyrics>,
        report: &mut RenderReport,
    ) {
        let origins = cumulative_origins(&list.lines);

        for (line, &cumulative_y) in list.lines.iter().zip(&origins) {
            let Some(metrics) = mounted_metrics(dom, line.line_index, report) else {
                continue;
            };

            for kind in ArcKind::ALL {
                if kind == ArcKind::BeatLoop && self.options.skip_beat_loops {
                    continue;
                }
                let (converted, skipped) =
                    transform::convert_line_arcs(line, kind, cumulative_y, &metrics);
                arcs[kind.index()].extend(converted);
                report.skipped_arcs += skipped;
            }

            if self.options.lyrics {
                let layout = distribute_lyrics(&line.lyrics, &line.cells);
                if !layout.is_empty() {
                    lyrics.push(PlacedLyrics { layout, origin: LineOrigin::Local(line.y), metrics });
                }
            }
        }
    }

    /// Mode B: find span boundaries from role classes on the mounted cells.
    fn collect_derived<D: LineDom>(
        &self,
        lines: &[LineCells],
        dom: &D,
        arcs: &mut ArcSet,
        lyrics: &mut Vec<PlacedLyrics>,
        report: &mut RenderReport,
    ) {
        for line in lines {
            let Some(metrics) = mounted_metrics(dom, line.line_index, report) else {
                continue;
            };
            let Some(elements) = dom.cell_elements(line.line_index) else {
                let err = OverlayError::LineNotMounted { line_index: line.line_index };
                tracing::warn!(%err, "skipping line");
                report.skipped_lines.push(line.line_index);
                continue;
            };

            for kind in ArcKind::ALL {
                if kind == ArcKind::BeatLoop && self.options.skip_beat_loops {
                    continue;
                }
                arcs[kind.index()]
                    .extend(anchors::derive_line_arcs(line.line_index, &elements, kind));
            }

            if self.options.lyrics {
                let layout = distribute_lyrics(&line.lyrics, &line.cells);
                if !layout.is_empty() {
                    lyrics.push(PlacedLyrics { layout, origin: LineOrigin::Local(line.y), metrics });
                }
            }
        }
    }
}

impl<N: Clone + PartialEq + std::fmt::Debug> Default for OverlayRenderer<N> {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

/// Measure a line, or log and record it as skipped.
fn mounted_metrics<D: LineDom>(dom: &D, line_index: usize, report: &mut RenderReport) -> Option<LineMetrics> {
    let metrics = dom.line_metrics(line_index);
    if metrics.is_none() {
        let err = OverlayError::LineNotMounted { line_index };
        tracing::warn!(%err, "skipping line");
        report.skipped_lines.push(line_index);
    }
    metrics
}

fn draw_lyrics<S: OverlaySurface>(surface: &mut S, placed: &PlacedLyrics, report: &mut RenderReport) {
    for a in &placed.layout.assignments {
        let p = to_absolute(Point::new(a.x, a.y), placed.origin, &placed.metrics);
        surface.add_text(p.x, p.y, &a.syllable, LYRIC_CLASS);
        report.syllables += 1;
    }
    for u in &placed.layout.unassigned {
        let p = to_absolute(Point::new(u.x, u.y), placed.origin, &placed.metrics);
        surface.add_text(p.x, p.y, &u.syllable, LYRIC_UNASSIGNED_CLASS);
        report.unassigned_syllables += 1;
    }
}

/// Syllable assignments of one line in overlay space, for callers that
/// draw text themselves.
pub fn place_lyrics(line: &RenderLine, metrics: &LineMetrics) -> Vec<SyllableAssignment> {
    let origin = LineOrigin::Local(line.y);
    distribute_lyrics(&line.lyrics, &line.cells)
        .assignments
        .into_iter()
        .map(|a| {
            let p = to_absolute(Point::new(a.x, a.y), origin, metrics);
            SyllableAssignment { x: p.x, y: p.y, ..a }
        })
        .collect()
}
