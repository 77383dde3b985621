// License: MIT

//! A graph representation of the electrical devices placed on the canvas,
//! and the wires between them.

mod creation;
mod retrieval;
pub(crate) mod validation;

pub mod iterators;
mod traversal;

use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};

use crate::device::PlacedObject;

/// Objects stored in the `UnGraph` are addressed with `NodeIndex`es.
///
/// `NodeIndexMap` stores the corresponding `NodeIndex` for any object id, so
/// that nodes in the `UnGraph` can be retrieved from their ids.
pub(crate) type NodeIndexMap = HashMap<String, NodeIndex>;

/// An undirected graph over a layout's objects.
///
/// Node weights are indices into the borrowed object arena, so the graph can
/// be rebuilt cheaply on every validation or simulation call without cloning
/// any objects.  Wires whose endpoints are unknown, and wires through
/// disabled breakers, are left out; implicit panel-to-panel proximity edges
/// are added in.  The graph is undirected and may contain cycles.
pub struct LayoutGraph<'a> {
    objects: &'a [PlacedObject],
    graph: UnGraph<usize, ()>,
    indices: NodeIndexMap,
}
