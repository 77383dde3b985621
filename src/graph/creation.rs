// License: MIT

//! Methods for building [`LayoutGraph`] instances from placed objects and
//! wires.

use petgraph::graph::UnGraph;

use crate::device::{KindPredicates, PlacedObject, WireConnection};

use super::{LayoutGraph, NodeIndexMap};

/// Implicit panel-to-panel edges are added when two panel bounding boxes come
/// within this margin of each other, modeling touching-panel strings.
pub(crate) const PANEL_PROXIMITY_MARGIN: f64 = 0.2;

/// `LayoutGraph` construction.
impl<'a> LayoutGraph<'a> {
    /// Builds the adjacency graph for one layout.
    ///
    /// Wires referencing unknown object ids are skipped, as are wires with a
    /// disabled breaker-class endpoint.  Panels whose bounding boxes overlap
    /// within [`PANEL_PROXIMITY_MARGIN`] are linked implicitly, independent
    /// of explicit wiring.  Never fails: a malformed wire list degrades to a
    /// sparser graph, not an error.
    pub fn build(objects: &'a [PlacedObject], wires: &[WireConnection]) -> Self {
        let mut graph = UnGraph::new_undirected();
        let mut indices = NodeIndexMap::new();

        for (arena_idx, object) in objects.iter().enumerate() {
            if indices.contains_key(&object.id) {
                tracing::warn!("Duplicate object id {:?}; keeping the first.", object.id);
                continue;
            }
            let idx = graph.add_node(arena_idx);
            indices.insert(object.id.clone(), idx);
        }

        let mut lg = Self {
            objects,
            graph,
            indices,
        };
        lg.add_wires(wires);
        lg.add_proximity_edges();
        lg
    }

    fn add_wires(&mut self, wires: &[WireConnection]) {
        for w in wires {
            let (Some(&from_idx), Some(&to_idx)) =
                (self.indices.get(&w.from), self.indices.get(&w.to))
            else {
                tracing::warn!(
                    "Wire {:?} references an unknown object ({:?} -> {:?}); skipping.",
                    w.id,
                    w.from,
                    w.to
                );
                continue;
            };
            if from_idx == to_idx {
                continue;
            }

            let disabled = [from_idx, to_idx].into_iter().any(|idx| {
                let obj = &self.objects[self.graph[idx]];
                obj.is_switchable_breaker() && obj.is_on == Some(false)
            });
            if disabled {
                continue;
            }

            self.graph.update_edge(from_idx, to_idx, ());
        }
    }

    /// Links touching panel strings.  O(panels²), which stays interactive
    /// for layouts of a few hundred objects.
    fn add_proximity_edges(&mut self) {
        let panels: Vec<_> = self.objects.iter().filter(|o| o.is_panel()).collect();

        for (n, &a) in panels.iter().enumerate() {
            for &b in &panels[n + 1..] {
                if a.bounds().overlaps(&b.bounds(), PANEL_PROXIMITY_MARGIN) {
                    let (Some(&from_idx), Some(&to_idx)) =
                        (self.indices.get(&a.id), self.indices.get(&b.id))
                    else {
                        continue;
                    };
                    self.graph.update_edge(from_idx, to_idx, ());
                }
            }
        }
    }
}
