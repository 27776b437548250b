//! Rendering tests: render the fixture display list and markup snapshot.

use pretty_assertions::assert_eq;
use scoreoverlay::renderer::constants::{BEAT_LOOP_CLASS, ORNAMENT_ARC_CLASS, SLUR_CLASS};
use scoreoverlay::{
    render_derived_overlay_json, render_overlay_json, ArcKind, DisplayList, LineCells, MarkupDom,
    OverlayLayer, OverlayRenderer, RenderRequest, SvgOverlay,
};
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixtures_dir().join(name))
        .unwrap_or_else(|e| panic!("Failed to read fixture {name}: {e}"))
}

fn display_list() -> DisplayList {
    serde_json::from_str(&read_fixture("display_list.json")).expect("Failed to parse display list")
}

fn markup_dom() -> MarkupDom {
    MarkupDom::parse(&read_fixture("lines.xml")).expect("Failed to parse markup")
}

#[test]
fn render_fixture_layers() {
    let svg = render_overlay_json(&read_fixture("display_list.json"), &read_fixture("lines.xml"), "")
        .expect("Failed to render overlay");

    assert!(svg.below.starts_with("<svg"), "Output should be SVG");
    assert!(svg.below.contains(BEAT_LOOP_CLASS), "Beat loops render below the notation");
    assert!(!svg.below.contains(SLUR_CLASS));

    assert!(svg.above.contains(SLUR_CLASS), "Slurs render above the notation");
    assert!(svg.above.contains(ORNAMENT_ARC_CLASS));
    assert!(svg.above.contains("M50.0,50.0 C67.6,44.0 69.2,44.0 82.0,50.0"));
    assert!(svg.above.contains(">mor</text>"));
    assert!(svg.above.contains("pointer-events: none"));
}

#[test]
fn render_fixture_report() {
    let list = display_list();
    let dom = markup_dom();
    let mut svg = SvgOverlay::new();
    let mut renderer = OverlayRenderer::default();

    let report = renderer.render(RenderRequest::Precomputed(&list), &dom, &mut svg);

    assert_eq!(report.stats(ArcKind::Slur).created, 2);
    assert_eq!(report.stats(ArcKind::BeatLoop).created, 1);
    assert_eq!(report.stats(ArcKind::Ornament).created, 1);
    assert_eq!(report.skipped_arcs, 1, "slur-1-0-1 has no end_y");
    assert!(report.skipped_lines.is_empty());

    assert_eq!(
        renderer.reconciler().ids(ArcKind::Slur),
        vec!["slur-0-0-1".to_string(), "slur-1-0-2".to_string()]
    );

    // Line 1: slurs use the line's own y (95), ornaments the running y (90).
    let slur = *renderer.reconciler().node(ArcKind::Slur, "slur-1-0-2").unwrap();
    assert!(svg.path_data(slur).unwrap().starts_with("M50.0,165.0"));
    let ornament = *renderer.reconciler().node(ArcKind::Ornament, "ornament-1-1-1").unwrap();
    assert!(svg.path_data(ornament).unwrap().starts_with("M74.0,160.0"));

    // "a-mor mi-o": the melisma on cells 0–1 takes "a-", the barline is
    // skipped, and "o" has no note left.
    assert_eq!(svg.texts(), vec!["a-", "mor", "mi-", "o"]);
    assert_eq!(report.syllables, 3);
    assert_eq!(report.unassigned_syllables, 1);
}

#[test]
fn rerender_keeps_nodes_and_moves_geometry() {
    let list = display_list();
    let mut svg = SvgOverlay::new();
    let mut renderer = OverlayRenderer::default();

    renderer.render(RenderRequest::Precomputed(&list), &markup_dom(), &mut svg);
    let before: Vec<_> = ArcKind::ALL.iter().flat_map(|&k| svg.nodes(k)).collect();
    let slur = *renderer.reconciler().node(ArcKind::Slur, "slur-1-0-2").unwrap();
    let old_path = svg.path_data(slur).unwrap().to_string();

    // Line 1 reflowed 40px lower.
    let moved = MarkupDom::parse(
        &read_fixture("lines.xml").replace("data-offset-top=\"140\"", "data-offset-top=\"180\""),
    )
    .unwrap();
    let report = renderer.render(RenderRequest::Precomputed(&list), &moved, &mut svg);

    for kind in ArcKind::ALL {
        assert_eq!(report.stats(kind).created, 0);
        assert_eq!(report.stats(kind).removed, 0);
    }
    let after: Vec<_> = ArcKind::ALL.iter().flat_map(|&k| svg.nodes(k)).collect();
    assert_eq!(before, after);
    assert_ne!(svg.path_data(slur).unwrap(), old_path);
    assert!(svg.path_data(slur).unwrap().starts_with("M50.0,205.0"));
}

#[test]
fn unmounted_line_drops_only_its_arcs() {
    let list = display_list();
    let mut svg = SvgOverlay::new();
    let mut renderer = OverlayRenderer::default();
    renderer.render(RenderRequest::Precomputed(&list), &markup_dom(), &mut svg);

    let mut dom = markup_dom();
    dom.unmount_line(1);
    let report = renderer.render(RenderRequest::Precomputed(&list), &dom, &mut svg);

    assert_eq!(report.skipped_lines, vec![1]);
    assert_eq!(report.stats(ArcKind::Slur).removed, 1);
    assert_eq!(report.stats(ArcKind::Ornament).removed, 1);
    assert_eq!(renderer.reconciler().ids(ArcKind::Slur), vec!["slur-0-0-1".to_string()]);
    assert_eq!(svg.path_count(ArcKind::BeatLoop), 1);
}

#[test]
fn skip_beat_loops_option() {
    let svg = render_overlay_json(
        &read_fixture("display_list.json"),
        &read_fixture("lines.xml"),
        r#"{"skip_beat_loops": true}"#,
    )
    .unwrap();
    assert!(!svg.below.contains(BEAT_LOOP_CLASS));
    assert!(svg.above.contains(SLUR_CLASS));
}

#[test]
fn derived_mode_from_markup() {
    let lines_json = r#"[
        {"line_index": 0, "y": 0, "cells": [], "lyrics": ""},
        {"line_index": 1, "y": 95, "cells": [], "lyrics": ""}
    ]"#;
    let svg = render_derived_overlay_json(lines_json, &read_fixture("lines.xml"), "").unwrap();

    assert!(svg.above.contains("M50.0,50.0 C67.6,42.0 69.2,42.0 82.0,50.0"));
    assert!(svg.below.contains("M106.0,66.0 C123.6,70.2 125.2,70.2 138.0,66.0"));

    let lines: Vec<LineCells> = serde_json::from_str(lines_json).unwrap();
    let mut overlay = SvgOverlay::new();
    let mut renderer = OverlayRenderer::default();
    renderer.render(RenderRequest::Derived(&lines), &markup_dom(), &mut overlay);
    assert_eq!(
        renderer.reconciler().ids(ArcKind::Slur),
        vec!["slur-0-0-1".to_string(), "slur-1-0-2".to_string()]
    );
    assert_eq!(renderer.reconciler().ids(ArcKind::BeatLoop), vec!["beat-loop-0-3-4".to_string()]);
    assert_eq!(overlay.build(OverlayLayer::AboveNotation).matches("<path").count(), 2);
}

#[test]
fn invalid_inputs_are_errors() {
    assert!(render_overlay_json("{not json", "<div/>", "").is_err());
    assert!(render_overlay_json("{\"lines\": []}", "<div", "").is_err());
    assert!(render_overlay_json("{\"lines\": []}", "<div/>", "[1]").is_err());
}

#[test]
fn empty_display_list_renders_empty_layers() {
    let svg = render_overlay_json("{}", "<div/>", "").unwrap();
    assert!(!svg.below.contains("<path"));
    assert!(!svg.above.contains("<path"));
    assert!(!svg.above.contains("<text"));
}

#[test]
fn badly_typed_arc_is_skipped_not_fatal() {
    let list_json = r#"{"lines": [{
        "line_index": 0, "y": 0, "height": 90,
        "slurs": [
            {"id": "slur-0-0-1", "start_x": 2, "start_y": 30, "cp1_x": 19.6, "cp1_y": 24,
             "cp2_x": 21.2, "cp2_y": 24, "end_x": 34, "end_y": 30},
            {"id": "slur-0-1-2", "direction": "sideways", "start_x": 2, "start_y": 30,
             "cp1_x": 19.6, "cp1_y": 24, "cp2_x": 21.2, "cp2_y": 24, "end_x": 34, "end_y": 30},
            {"id": "slur-0-2-3", "start_x": "12", "start_y": 30, "cp1_x": 19.6, "cp1_y": 24,
             "cp2_x": 21.2, "cp2_y": 24, "end_x": 34, "end_y": 30}
        ]
    }]}"#;

    let svg = render_overlay_json(list_json, &read_fixture("lines.xml"), "")
        .expect("A bad arc must not fail the display list");
    assert_eq!(svg.above.matches("<path").count(), 1);

    let list: DisplayList = serde_json::from_str(list_json).unwrap();
    let mut overlay = SvgOverlay::new();
    let mut renderer = OverlayRenderer::default();
    let report = renderer.render(RenderRequest::Precomputed(&list), &markup_dom(), &mut overlay);
    assert_eq!(report.skipped_arcs, 2);
    assert_eq!(renderer.reconciler().ids(ArcKind::Slur), vec!["slur-0-0-1".to_string()]);
}

#[test]
fn non_finite_markup_offsets_are_rejected() {
    let markup = read_fixture("lines.xml").replace("data-offset-top=\"20\"", "data-offset-top=\"NaN\"");
    let lines_json = r#"[{"line_index": 0, "y": 0, "cells": [], "lyrics": ""}]"#;
    let err = render_derived_overlay_json(lines_json, &markup, "").unwrap_err();
    assert!(err.to_string().contains("not a finite number"), "{err}");
}
