//! Error type shared by the entry points and the skip-reporting paths.

use crate::model::ArcKind;

#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("invalid display list JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid line markup: {0}")]
    Markup(#[from] roxmltree::Error),

    #[error("invalid line markup: {0}")]
    InvalidMarkup(String),

    #[error("line {line_index} has no mounted element")]
    LineNotMounted { line_index: usize },

    #[error("{kind:?} arc {id:?} is missing field `{field}`")]
    MalformedArc {
        kind: ArcKind,
        id: String,
        field: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, OverlayError>;
