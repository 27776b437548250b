//! Lyrics: syllable tokenizing and melisma-aware distribution over a line.

use serde::Serialize;

use crate::model::*;
use super::constants::*;

// ── Text width helpers ──────────────────────────────────────────────

/// Estimate the rendered width of a text string in pixels for a given font size.
pub(super) fn estimate_text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * LYRICS_CHAR_WIDTH_FACTOR
}

// ── Tokenizer ───────────────────────────────────────────────────────

/// Split a line of lyric text into syllables.
///
/// Words split on whitespace; inside a word each hyphen is folded onto the
/// fragment before it (`hel-lo` → `hel-`, `lo`). A hyphen with nothing
/// before it is kept as a syllable of its own (`he--llo` → `he-`, `-`,
/// `llo`), meaning "the melisma carries on with no new syllable".
pub fn tokenize_lyrics(text: &str) -> Vec<SyllableToken> {
    let mut tokens = Vec::new();

    for word in text.split_whitespace() {
        let mut fragment = String::new();
        for ch in word.chars() {
            if ch == '-' {
                fragment.push('-');
                tokens.push(SyllableToken {
                    text: std::mem::take(&mut fragment),
                    continues: true,
                });
            } else {
                fragment.push(ch);
            }
        }
        if !fragment.is_empty() {
            tokens.push(SyllableToken {
                text: fragment,
                continues: false,
            });
        }
    }

    tokens
}

// ── Distributor ─────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LyricsState {
    /// Looking for the next pitch to carry a syllable
    SeekingPitch,
    /// Inside a slur: interior pitches get nothing
    InMelisma,
    /// Just placed a syllable; behaves like `SeekingPitch`
    SyllableAssigned,
}

/// A syllable left over after every pitched cell was served.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UnassignedSyllable {
    pub syllable: String,
    pub x: f64,
    pub y: f64,
}

/// Result of distributing one line's lyrics, in the line's own coordinates.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LyricsLayout {
    pub assignments: Vec<SyllableAssignment>,
    pub unassigned: Vec<UnassignedSyllable>,
}

impl LyricsLayout {
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty() && self.unassigned.is_empty()
    }
}

fn lyric_position(cell: &Cell) -> (f64, f64) {
    let rect = cell.rect();
    (rect.center_x(), rect.bottom() + LYRICS_OFFSET_Y)
}

/// Give `cell` the next syllable, if there is one left.
fn assign_next<'a>(
    cell: &Cell,
    syllables: &mut impl Iterator<Item = &'a SyllableToken>,
    layout: &mut LyricsLayout,
) {
    if let Some(token) = syllables.next() {
        let (x, y) = lyric_position(cell);
        layout.assignments.push(SyllableAssignment {
            cell_index: cell.index,
            syllable: token.text.clone(),
            x,
            y,
        });
    }
}

/// Assign syllables to pitched cells, one linear pass.
///
/// - A slur start takes the next syllable and opens a melisma.
/// - A slur end closes one level; the melisma is over once depth hits 0.
///   The end note itself never takes a syllable.
/// - Pitches inside a melisma are skipped.
/// - Any other pitch takes the next syllable.
///
/// Non-pitched cells are ignored. Running out of syllables is fine.
pub fn distribute_lyrics(lyrics: &str, cells: &[Cell]) -> LyricsLayout {
    let syllables = tokenize_lyrics(lyrics);
    let mut layout = LyricsLayout::default();
    if syllables.is_empty() {
        return layout;
    }

    let mut next = syllables.iter();
    let mut state = LyricsState::SeekingPitch;
    let mut slur_depth: u32 = 0;

    for cell in cells.iter().filter(|c| c.is_pitched()) {
        match cell.slur_indicator {
            SlurIndicator::Start => {
                assign_next(cell, &mut next, &mut layout);
                slur_depth += 1;
                state = LyricsState::InMelisma;
            }
            SlurIndicator::End => {
                slur_depth = slur_depth.saturating_sub(1);
                if slur_depth == 0 {
                    state = LyricsState::SeekingPitch;
                }
            }
            SlurIndicator::None => {
                if state == LyricsState::InMelisma {
                    continue;
                }
                assign_next(cell, &mut next, &mut layout);
                state = LyricsState::SyllableAssigned;
            }
        }
    }

    // Leftovers trail after the last cell of the line, or start at the
    // line origin when there are no cells at all.
    let rect = cells.last().map(Cell::rect).unwrap_or_default();
    let y = rect.bottom() + LYRICS_OFFSET_Y;
    let mut cursor = rect.x + rect.w + LYRICS_UNASSIGNED_GAP;
    for token in next {
        let w = estimate_text_width(&token.text, LYRICS_FONT_SIZE);
        layout.unassigned.push(UnassignedSyllable {
            syllable: token.text.clone(),
            x: cursor + w / 2.0,
            y,
        });
        cursor += w + LYRICS_UNASSIGNED_GAP;
    }

    layout
}
