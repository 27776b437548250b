//! scoreoverlay — slur, beat-loop and lyrics overlay renderer for the
//! notation editor.
//!
//! The layout engine computes cell geometry and (usually) pre-computed
//! arcs; this crate turns them into curve overlays and syllable
//! placements, keeping overlay nodes stable across re-renders.
//!
//! # Example
//! ```no_run
//! use scoreoverlay::render_overlay_json;
//!
//! let display_list = std::fs::read_to_string("display_list.json").unwrap();
//! let markup = std::fs::read_to_string("lines.xml").unwrap();
//! let svg = render_overlay_json(&display_list, &markup, "").unwrap();
//! println!("{}", svg.above);
//! ```

pub mod dom;
pub mod error;
pub mod model;
pub mod renderer;

#[cfg(target_os = "android")]
pub mod android;

use serde::Serialize;

pub use dom::{CellElement, LineDom, LineMetrics, MarkupDom};
pub use error::{OverlayError, Result};
pub use model::*;
pub use renderer::lyrics::{distribute_lyrics, tokenize_lyrics, LyricsLayout};
pub use renderer::reconciler::{OverlayReconciler, ReconcileStats};
pub use renderer::svg_builder::{NodeId, OverlayLayer, OverlaySurface, PathStyle, SvgOverlay};
pub use renderer::{OverlayRenderer, RenderOptions, RenderReport, RenderRequest};

/// Both overlay layers of one render, as SVG strings.
#[derive(Debug, Clone, Serialize)]
pub struct OverlaySvg {
    /// Stacked beneath the notation (beat loops)
    pub below: String,
    /// Stacked above the notation (slurs, ornament arcs, lyrics)
    pub above: String,
}

impl OverlaySvg {
    fn from_overlay(svg: &SvgOverlay) -> Self {
        Self {
            below: svg.build(OverlayLayer::BelowNotation),
            above: svg.build(OverlayLayer::AboveNotation),
        }
    }
}

/// Render a display list (pre-computed arcs) against a markup snapshot of
/// the mounted lines. `options_json` may be empty for defaults.
pub fn render_overlay_json(display_list_json: &str, dom_markup: &str, options_json: &str) -> Result<OverlaySvg> {
    let list: DisplayList = serde_json::from_str(display_list_json)?;
    let dom = MarkupDom::parse(dom_markup)?;
    let options = RenderOptions::from_json(options_json)?;

    let mut svg = SvgOverlay::new();
    let mut renderer = OverlayRenderer::new(options);
    renderer.render(RenderRequest::Precomputed(&list), &dom, &mut svg);
    Ok(OverlaySvg::from_overlay(&svg))
}

/// Render from cells only, deriving arcs from the role classes in the
/// markup snapshot. `lines_json` is an array of `LineCells`.
pub fn render_derived_overlay_json(lines_json: &str, dom_markup: &str, options_json: &str) -> Result<OverlaySvg> {
    let lines: Vec<LineCells> = serde_json::from_str(lines_json)?;
    let dom = MarkupDom::parse(dom_markup)?;
    let options = RenderOptions::from_json(options_json)?;

    let mut svg = SvgOverlay::new();
    let mut renderer = OverlayRenderer::new(options);
    renderer.render(RenderRequest::Derived(&lines), &dom, &mut svg);
    Ok(OverlaySvg::from_overlay(&svg))
}

/// Convert rendered layers to a JSON string `{"below": ..., "above": ...}`.
/// Useful for passing data across FFI boundaries.
pub fn overlay_to_json(svg: &OverlaySvg) -> Result<String> {
    serde_json::to_string(svg).map_err(OverlayError::from)
}

// ═══════════════════════════════════════════════════════════════════════
// C FFI — for iOS (static library) and Android (JNI)
// ═══════════════════════════════════════════════════════════════════════

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

unsafe fn c_str_or_empty<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return Some("");
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Render a display list and return both layers as a JSON C string.
/// The caller must free the returned string with `scoreoverlay_free_string`.
///
/// Returns null if any input is invalid.
///
/// # Safety
/// `display_list` and `dom_markup` must be valid null-terminated UTF-8 C
/// strings. `options` may be null.
#[no_mangle]
pub unsafe extern "C" fn scoreoverlay_render_json(
    display_list: *const c_char,
    dom_markup: *const c_char,
    options: *const c_char,
) -> *mut c_char {
    if display_list.is_null() || dom_markup.is_null() {
        return std::ptr::null_mut();
    }
    let (Some(list), Some(markup), Some(opts)) = (
        unsafe { c_str_or_empty(display_list) },
        unsafe { c_str_or_empty(dom_markup) },
        unsafe { c_str_or_empty(options) },
    ) else {
        return std::ptr::null_mut();
    };

    match render_overlay_json(list, markup, opts).and_then(|svg| overlay_to_json(&svg)) {
        Ok(json) => CString::new(json).unwrap_or_default().into_raw(),
        Err(err) => {
            tracing::warn!(%err, "overlay render failed");
            std::ptr::null_mut()
        }
    }
}

/// Free a string previously returned by scoreoverlay functions.
///
/// # Safety
/// `ptr` must be a string previously returned by a scoreoverlay function, or null.
#[no_mangle]
pub unsafe extern "C" fn scoreoverlay_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}
