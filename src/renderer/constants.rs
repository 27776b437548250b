//! Shared constants for the overlay renderer (all in pixels).

// ── Arc geometry ────────────────────────────────────────────────────
/// Extends each arc slightly past the note boundary so it reads as attached.
pub const EXTENSION_OFFSET: f64 = 4.0;

pub(super) const SLUR_HEIGHT_FACTOR: f64 = 0.25;
pub(super) const SLUR_MIN_HEIGHT: f64 = 6.0;
pub(super) const SLUR_MAX_HEIGHT: f64 = 28.0;
pub(super) const SLUR_LONG_SPAN: f64 = 300.0; // spans above this get softened
pub(super) const SLUR_LONG_SPAN_SOFTENING: f64 = 0.7;

pub(super) const BEAT_LOOP_SHORT_SPAN: f64 = 8.0;
pub(super) const BEAT_LOOP_MIN_HEIGHT: f64 = 3.0;
pub(super) const BEAT_LOOP_GROWTH: f64 = 0.05;
pub(super) const BEAT_LOOP_MAX_HEIGHT: f64 = 8.0;

// Control points sit just past the midpoint, like an engraved slur.
pub(super) const CP1_SPAN_FRACTION: f64 = 0.55;
pub(super) const CP2_SPAN_FRACTION: f64 = 0.60;

// ── Stroke styles ───────────────────────────────────────────────────
pub(super) const SLUR_STROKE_WIDTH: f64 = 1.5;
pub(super) const BEAT_LOOP_STROKE_WIDTH: f64 = 1.2;
pub(super) const ORNAMENT_STROKE_WIDTH: f64 = 1.0;

// ── Colors ──────────────────────────────────────────────────────────
pub(super) const DEFAULT_ARC_COLOR: &str = "#1a1a1a";
pub(super) const LYRICS_COLOR: &str = "#333333";

// ── CSS classes ─────────────────────────────────────────────────────
pub const SLUR_CLASS: &str = "slur-path";
pub const BEAT_LOOP_CLASS: &str = "beat-loop-path";
pub const ORNAMENT_ARC_CLASS: &str = "superscript-arc-path";
pub const LYRIC_CLASS: &str = "lyric-syllable";
pub const LYRIC_UNASSIGNED_CLASS: &str = "lyric-unassigned";

// ── Lyrics placement ────────────────────────────────────────────────
pub(super) const LYRICS_FONT_SIZE: f64 = 13.0;
/// Gap between a cell's bottom edge and the lyric baseline.
pub(super) const LYRICS_OFFSET_Y: f64 = 16.0;
/// Horizontal step between leftover syllables after the last cell.
pub(super) const LYRICS_UNASSIGNED_GAP: f64 = 12.0;
pub(super) const LYRICS_CHAR_WIDTH_FACTOR: f64 = 0.55;
