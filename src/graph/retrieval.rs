// License: MIT

//! Methods for retrieving objects and adjacency from a [`LayoutGraph`].

use crate::device::PlacedObject;
use crate::graph::iterators::{Neighbors, Objects};
use crate::{Error, LayoutGraph};

/// Object and neighbor retrieval.
impl<'a> LayoutGraph<'a> {
    /// Returns the object with the given `id`, if it exists.
    pub fn object(&self, id: &str) -> Result<&'a PlacedObject, Error> {
        self.indices
            .get(id)
            .map(|&idx| &self.objects[self.graph[idx]])
            .ok_or_else(|| Error::object_not_found(format!("Object with id {id:?} not found.")))
    }

    /// Returns an iterator over the objects in the graph's arena.
    pub fn objects(&self) -> Objects<'a> {
        Objects {
            iter: self.objects.iter(),
        }
    }

    /// Returns an iterator over the neighbors of the object with the given
    /// `id`.
    ///
    /// Returns an error if the given `id` does not exist.
    pub fn neighbors(&self, id: &str) -> Result<Neighbors<'_>, Error> {
        self.indices
            .get(id)
            .map(|&idx| Neighbors {
                objects: self.objects,
                iter: self.graph.neighbors(idx),
                graph: &self.graph,
            })
            .ok_or_else(|| Error::object_not_found(format!("Object with id {id:?} not found.")))
    }

    /// Returns an iterator over the committed edges of the graph, as pairs
    /// of endpoint objects.
    pub fn edges(&self) -> impl Iterator<Item = (&'a PlacedObject, &'a PlacedObject)> + '_ {
        self.graph.raw_edges().iter().map(|e| {
            (
                &self.objects[self.graph[e.source()]],
                &self.objects[self.graph[e.target()]],
            )
        })
    }
}
