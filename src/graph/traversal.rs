// License: MIT

//! This module contains methods that help with graph traversal.

use std::collections::HashSet;

use crate::device::PlacedObject;
use crate::{Error, LayoutGraph};

/// Traversal methods.
impl<'a> LayoutGraph<'a> {
    /// Finds a node satisfying the given predicate, reachable from the node
    /// with the given `id`.
    ///
    /// The start node itself is not tested.  The graph may contain cycles,
    /// so visited nodes are tracked.  Returns an error if the start id does
    /// not exist.
    pub fn find_reachable(
        &self,
        from: &str,
        mut pred: impl FnMut(&PlacedObject) -> bool,
    ) -> Result<Option<&'a PlacedObject>, Error> {
        let start = *self
            .indices
            .get(from)
            .ok_or_else(|| Error::object_not_found(format!("Object with id {from:?} not found.")))?;

        let mut visited = HashSet::from([start]);
        let mut stack = vec![start];

        while let Some(index) = stack.pop() {
            for neighbor in self.graph.neighbors(index) {
                if !visited.insert(neighbor) {
                    continue;
                }
                let node = &self.objects[self.graph[neighbor]];
                if pred(node) {
                    return Ok(Some(node));
                }
                stack.push(neighbor);
            }
        }

        Ok(None)
    }

    /// Returns true if any node satisfying the predicate is reachable from
    /// the node with the given `id`.
    pub fn is_reachable(
        &self,
        from: &str,
        pred: impl FnMut(&PlacedObject) -> bool,
    ) -> Result<bool, Error> {
        self.find_reachable(from, pred).map(|n| n.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceKind, KindPredicates, WireKind};
    use crate::test_utils::{obj, wire};

    fn nodes_and_edges() -> (Vec<PlacedObject>, Vec<crate::device::WireConnection>) {
        let objects = vec![
            obj("p1", DeviceKind::Panel),
            obj("p2", DeviceKind::Panel),
            obj("i1", DeviceKind::Inverter),
            obj("m1", DeviceKind::Meter),
            obj("g1", DeviceKind::Grid),
            obj("b1", DeviceKind::Battery),
        ];
        let wires = vec![
            wire("w1", "p1", "p2", WireKind::Dc),
            wire("w2", "p2", "i1", WireKind::Dc),
            wire("w3", "i1", "m1", WireKind::Ac),
            wire("w4", "m1", "g1", WireKind::Ac),
        ];
        (objects, wires)
    }

    #[test]
    fn test_find_reachable() -> Result<(), Error> {
        let (objects, wires) = nodes_and_edges();
        let graph = LayoutGraph::build(&objects, &wires);

        let node = graph.find_reachable("p1", |n| n.is_inverter())?;
        assert_eq!(node.map(|n| n.id.as_str()), Some("i1"));

        // Undirected: the grid can see the panels too.
        assert!(graph.is_reachable("g1", |n| n.is_panel())?);

        // The battery is not wired to anything.
        assert!(!graph.is_reachable("b1", |n| n.is_grid())?);

        assert!(graph.find_reachable("ghost", |_| true).is_err());
        Ok(())
    }

    #[test]
    fn test_cycle_termination() -> Result<(), Error> {
        let objects = vec![
            obj("a", DeviceKind::Meter),
            obj("b", DeviceKind::Meter),
            obj("c", DeviceKind::Meter),
        ];
        let wires = vec![
            wire("w1", "a", "b", WireKind::Ac),
            wire("w2", "b", "c", WireKind::Ac),
            wire("w3", "c", "a", WireKind::Ac),
        ];
        let graph = LayoutGraph::build(&objects, &wires);

        assert!(!graph.is_reachable("a", |n| n.is_grid())?);
        Ok(())
    }
}
