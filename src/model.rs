//! Data model for the overlay renderer.
//!
//! The wire types (`DisplayList`, `RenderLine`, `RenderArc`, `Cell`)
//! mirror what the layout engine emits. The render types (`Arc`, `Rect`,
//! `SyllableAssignment`) are what the renderer works with after validation
//! and coordinate conversion.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// Geometry
// ═══════════════════════════════════════════════════════════════════════

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A pixel rectangle (the anchor rectangle of a cell).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.w / 2.0
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Cells
// ═══════════════════════════════════════════════════════════════════════

/// What kind of glyph a cell holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Pitched,
    Unpitched,
    UpperAnnotation,
    LowerAnnotation,
    Text,
    Barline,
    Breath,
    Whitespace,
}

/// Melisma/slur boundary marker carried by a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlurIndicator {
    #[default]
    None,
    Start,
    End,
}

/// One notated glyph position, with geometry supplied by the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Position in the line
    pub index: usize,
    pub kind: CellKind,
    #[serde(default)]
    pub slur_indicator: SlurIndicator,
    /// Left edge (line-relative)
    #[serde(default)]
    pub x: f64,
    /// Top edge (line-relative)
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub w: f64,
    #[serde(default)]
    pub h: f64,
}

impl Cell {
    /// A cell with no geometry. Mostly useful for lyrics distribution,
    /// which only looks at kind and slur markers.
    pub fn new(index: usize, kind: CellKind, slur_indicator: SlurIndicator) -> Self {
        Self {
            index,
            kind,
            slur_indicator,
            x: 0.0,
            y: 0.0,
            w: 0.0,
            h: 0.0,
        }
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.x = rect.x;
        self.y = rect.y;
        self.w = rect.w;
        self.h = rect.h;
        self
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    pub fn is_pitched(&self) -> bool {
        self.kind == CellKind::Pitched
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Arcs
// ═══════════════════════════════════════════════════════════════════════

/// Which way an arc bows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArcDirection {
    /// Apex above the notes (slurs, ornament arcs)
    Up,
    /// Apex below the notes (beat loops)
    Down,
}

impl ArcDirection {
    /// Sign applied to vertical offsets: screen y grows downward.
    pub fn y_sign(self) -> f64 {
        match self {
            ArcDirection::Up => -1.0,
            ArcDirection::Down => 1.0,
        }
    }

    /// Parse the wire name (`"up"` / `"down"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "up" => Some(ArcDirection::Up),
            "down" => Some(ArcDirection::Down),
            _ => None,
        }
    }
}

/// Arc category. Each category is reconciled independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcKind {
    Slur,
    BeatLoop,
    Ornament,
}

impl ArcKind {
    pub const ALL: [ArcKind; 3] = [ArcKind::Slur, ArcKind::BeatLoop, ArcKind::Ornament];

    /// Position in `ALL`, for per-category tables.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Direction used when the record does not say.
    pub fn default_direction(self) -> ArcDirection {
        match self {
            ArcKind::BeatLoop => ArcDirection::Down,
            ArcKind::Slur | ArcKind::Ornament => ArcDirection::Up,
        }
    }

    /// Short prefix used in arc ids.
    pub fn id_prefix(self) -> &'static str {
        match self {
            ArcKind::Slur => "slur",
            ArcKind::BeatLoop => "beat-loop",
            ArcKind::Ornament => "ornament",
        }
    }
}

/// Stable arc identity: the same span on the same line keeps its id
/// across render passes.
pub fn arc_id(kind: ArcKind, line_index: usize, start_cell: usize, end_cell: usize) -> String {
    format!("{}-{}-{}-{}", kind.id_prefix(), line_index, start_cell, end_cell)
}

/// One renderable curve in absolute (overlay) pixel space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arc {
    pub id: String,
    pub kind: ArcKind,
    pub direction: ArcDirection,
    pub start: Point,
    pub cp1: Point,
    pub cp2: Point,
    pub end: Point,
    /// Rendering hint, opaque to the geometry code
    pub color: String,
}

// ═══════════════════════════════════════════════════════════════════════
// Lyrics
// ═══════════════════════════════════════════════════════════════════════

/// One syllable produced by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyllableToken {
    pub text: String,
    /// True if this syllable is hyphen-joined to the next one.
    pub continues: bool,
}

/// A syllable placed under a cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyllableAssignment {
    pub cell_index: usize,
    pub syllable: String,
    pub x: f64,
    pub y: f64,
}

// ═══════════════════════════════════════════════════════════════════════
// DisplayList (layout engine output)
// ═══════════════════════════════════════════════════════════════════════

/// Everything the layout engine hands over for one render pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayList {
    #[serde(default)]
    pub lines: Vec<RenderLine>,
}

/// One line of notation as laid out by the layout engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderLine {
    pub line_index: usize,
    /// Local y origin of the line in layout space
    #[serde(default)]
    pub y: f64,
    /// Laid-out height of the line
    #[serde(default)]
    pub height: f64,
    /// Slur arcs, line-relative coordinates
    #[serde(default)]
    pub slurs: Vec<RenderArc>,
    /// Beat loop arcs, line-relative coordinates
    #[serde(default)]
    pub beat_loops: Vec<RenderArc>,
    /// Ornament arcs, cumulative-y coordinates
    #[serde(default)]
    pub ornament_arcs: Vec<RenderArc>,
    #[serde(default)]
    pub cells: Vec<Cell>,
    /// Raw lyric text for the line
    #[serde(default)]
    pub lyrics: String,
}

impl RenderLine {
    pub fn arcs(&self, kind: ArcKind) -> &[RenderArc] {
        match kind {
            ArcKind::Slur => &self.slurs,
            ArcKind::BeatLoop => &self.beat_loops,
            ArcKind::Ornament => &self.ornament_arcs,
        }
    }
}

/// A pre-computed arc as emitted by the layout engine.
///
/// Every field is read leniently: a missing value or one of the wrong type
/// reads as `None`, so a bad record is rejected on its own during
/// conversion instead of failing the whole display list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderArc {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    /// `"up"` or `"down"`; anything else marks the record malformed
    #[serde(default, deserialize_with = "lenient_text")]
    pub direction: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub start_x: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub start_y: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub cp1_x: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub cp1_y: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub cp2_x: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub cp2_y: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub end_x: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub end_y: Option<f64>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Like `lenient`, but keeps non-string values as their JSON text so the
/// caller can still tell "absent" from "wrong".
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// Cells and lyrics for one line when arcs are derived from the DOM.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineCells {
    pub line_index: usize,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub lyrics: String,
}
