//! Keyed reconciliation of arcs against persistent path nodes.
//!
//! Each category keeps its own `id → node` map. A pass updates the path
//! data of arcs it has seen before, creates nodes for new ids and removes
//! nodes whose id did not appear. Nodes are never recreated just because
//! their geometry moved, so state attached to them from outside (hover
//! highlighting and so on) survives re-renders.
//!
//! Not reentrant: a pass must finish before the next one starts.

use std::collections::{HashMap, HashSet};

use crate::model::{Arc, ArcKind};
use super::arcs::path_data;
use super::svg_builder::{OverlaySurface, PathStyle};

/// What one reconcile call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
}

impl ReconcileStats {
    pub fn merge(&mut self, other: ReconcileStats) {
        self.created += other.created;
        self.updated += other.updated;
        self.removed += other.removed;
    }
}

/// Persistent `id → node` maps, one per `ArcKind`.
#[derive(Debug)]
pub struct OverlayReconciler<N> {
    maps: [HashMap<String, N>; 3],
}

impl<N> Default for OverlayReconciler<N> {
    fn default() -> Self {
        Self { maps: Default::default() }
    }
}

impl<N: Clone + PartialEq + std::fmt::Debug> OverlayReconciler<N> {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, kind: ArcKind) -> &HashMap<String, N> {
        &self.maps[kind.index()]
    }

    /// The node currently drawing an arc, if any.
    pub fn node(&self, kind: ArcKind, id: &str) -> Option<&N> {
        self.map(kind).get(id)
    }

    /// Mapped ids of a category, sorted.
    pub fn ids(&self, kind: ArcKind) -> Vec<String> {
        let mut ids: Vec<String> = self.map(kind).keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self, kind: ArcKind) -> usize {
        self.map(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.iter().all(HashMap::is_empty)
    }

    /// Bring one category's nodes in line with `arcs`.
    ///
    /// Afterwards the category's mapped ids equal the ids in `arcs`. If the
    /// same id appears twice in one pass, the first occurrence is drawn and
    /// the rest are skipped.
    pub fn reconcile<S>(&mut self, kind: ArcKind, arcs: &[Arc], surface: &mut S) -> ReconcileStats
    where
        S: OverlaySurface<Node = N>,
    {
        let mut stats = ReconcileStats::default();
        let mut seen: HashSet<&str> = HashSet::with_capacity(arcs.len());
        let map = &mut self.maps[kind.index()];

        for arc in arcs {
            if !seen.insert(arc.id.as_str()) {
                tracing::debug!(id = %arc.id, ?kind, "duplicate arc id in one pass, skipping");
                continue;
            }
            let d = path_data(arc);
            match map.get(&arc.id) {
                Some(node) => {
                    surface.set_path_data(node, &d);
                    stats.updated += 1;
                }
                None => {
                    let style = PathStyle::for_arc(kind, &arc.color);
                    let node = surface.create_path(kind, &style, &d);
                    map.insert(arc.id.clone(), node);
                    stats.created += 1;
                }
            }
        }

        map.retain(|id, node| {
            if seen.contains(id.as_str()) {
                true
            } else {
                surface.remove_path(node);
                stats.removed += 1;
                false
            }
        });

        debug_assert_eq!(map.len(), seen.len());
        stats
    }

    /// Remove every node of every category.
    pub fn clear<S>(&mut self, surface: &mut S)
    where
        S: OverlaySurface<Node = N>,
    {
        for map in &mut self.maps {
            for (_, node) in map.drain() {
                surface.remove_path(&node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArcDirection, Point};
    use crate::renderer::svg_builder::SvgOverlay;

    fn arc(id: &str, x: f64) -> Arc {
        Arc {
            id: id.to_string(),
            kind: ArcKind::Slur,
            direction: ArcDirection::Up,
            start: Point::new(x, 20.0),
            cp1: Point::new(x + 5.5, 10.0),
            cp2: Point::new(x + 6.0, 10.0),
            end: Point::new(x + 10.0, 20.0),
            color: "#1a1a1a".to_string(),
        }
    }

    #[test]
    fn second_identical_pass_is_pure_update() {
        let mut svg = SvgOverlay::new();
        let mut rec = OverlayReconciler::new();
        let arcs = vec![arc("a", 0.0), arc("b", 40.0)];

        let first = rec.reconcile(ArcKind::Slur, &arcs, &mut svg);
        assert_eq!(first, ReconcileStats { created: 2, updated: 0, removed: 0 });
        let node_a = *rec.node(ArcKind::Slur, "a").unwrap();

        let second = rec.reconcile(ArcKind::Slur, &arcs, &mut svg);
        assert_eq!(second, ReconcileStats { created: 0, updated: 2, removed: 0 });
        assert_eq!(rec.node(ArcKind::Slur, "a"), Some(&node_a));
        assert_eq!(svg.path_count(ArcKind::Slur), 2);
    }

    #[test]
    fn stale_ids_are_removed_and_survivors_untouched() {
        let mut svg = SvgOverlay::new();
        let mut rec = OverlayReconciler::new();
        rec.reconcile(ArcKind::Slur, &[arc("a", 0.0), arc("b", 40.0)], &mut svg);
        let node_a = *rec.node(ArcKind::Slur, "a").unwrap();
        let node_b = *rec.node(ArcKind::Slur, "b").unwrap();

        let stats = rec.reconcile(ArcKind::Slur, &[arc("b", 40.0)], &mut svg);
        assert_eq!(stats.removed, 1);
        assert_eq!(rec.ids(ArcKind::Slur), vec!["b".to_string()]);
        assert_eq!(rec.node(ArcKind::Slur, "b"), Some(&node_b));
        assert_eq!(svg.path_data(node_a), None);
        assert_eq!(svg.nodes(ArcKind::Slur), vec![node_b]);
    }

    #[test]
    fn moved_arc_updates_geometry_in_place() {
        let mut svg = SvgOverlay::new();
        let mut rec = OverlayReconciler::new();
        rec.reconcile(ArcKind::Slur, &[arc("a", 0.0)], &mut svg);
        let node = *rec.node(ArcKind::Slur, "a").unwrap();
        let before = svg.path_data(node).unwrap().to_string();

        rec.reconcile(ArcKind::Slur, &[arc("a", 100.0)], &mut svg);
        assert_eq!(rec.node(ArcKind::Slur, "a"), Some(&node));
        assert_ne!(svg.path_data(node).unwrap(), before);
        assert!(svg.path_data(node).unwrap().starts_with("M100.0,20.0"));
    }

    #[test]
    fn categories_do_not_interfere() {
        let mut svg = SvgOverlay::new();
        let mut rec = OverlayReconciler::new();
        rec.reconcile(ArcKind::Slur, &[arc("x", 0.0)], &mut svg);
        rec.reconcile(ArcKind::BeatLoop, &[arc("x", 0.0)], &mut svg);

        rec.reconcile(ArcKind::BeatLoop, &[], &mut svg);
        assert_eq!(rec.len(ArcKind::Slur), 1);
        assert_eq!(rec.len(ArcKind::BeatLoop), 0);
        assert_eq!(svg.path_count(ArcKind::Slur), 1);
        assert_eq!(svg.path_count(ArcKind::BeatLoop), 0);
    }

    #[test]
    fn duplicate_ids_draw_once() {
        let mut svg = SvgOverlay::new();
        let mut rec = OverlayReconciler::new();
        let stats = rec.reconcile(ArcKind::Slur, &[arc("a", 0.0), arc("a", 50.0)], &mut svg);
        assert_eq!(stats.created, 1);
        assert_eq!(svg.path_count(ArcKind::Slur), 1);
    }

    #[test]
    fn clear_removes_everything() {
        let mut svg = SvgOverlay::new();
        let mut rec = OverlayReconciler::new();
        rec.reconcile(ArcKind::Slur, &[arc("a", 0.0)], &mut svg);
        rec.reconcile(ArcKind::Ornament, &[arc("o", 0.0)], &mut svg);
        rec.clear(&mut svg);
        assert!(rec.is_empty());
        assert_eq!(svg.path_count(ArcKind::Slur) + svg.path_count(ArcKind::Ornament), 0);
    }
}
