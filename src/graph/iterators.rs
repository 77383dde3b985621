// License: MIT

//! Iterators over objects and neighbors in a `LayoutGraph`.

use petgraph::graph::UnGraph;

use crate::device::PlacedObject;

/// An iterator over the objects in a `LayoutGraph`.
pub struct Objects<'a> {
    pub(crate) iter: std::slice::Iter<'a, PlacedObject>,
}

impl<'a> Iterator for Objects<'a> {
    type Item = &'a PlacedObject;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

/// An iterator over the neighbors of an object in a `LayoutGraph`.
pub struct Neighbors<'a> {
    pub(crate) objects: &'a [PlacedObject],
    pub(crate) iter: petgraph::graph::Neighbors<'a, (), petgraph::graph::DefaultIx>,
    pub(crate) graph: &'a UnGraph<usize, ()>,
}

impl<'a> Iterator for Neighbors<'a> {
    type Item = &'a PlacedObject;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|idx| &self.objects[self.graph[idx]])
    }
}
