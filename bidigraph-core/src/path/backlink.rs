//! Back-link arena.
//!
//! Every vertex a search discovers gets one link holding its predecessor and
//! the cumulative cost from the start. The links form a tree rooted at the
//! start vertices; a path is read off by following parents from the goal and
//! reversing.

use super::VertexSequence;

#[derive(Debug, Clone, Copy)]
pub(crate) struct BackLink<C> {
    pub vertex: usize,
    pub parent: Option<usize>,
    pub cost: C,
}

#[derive(Debug)]
pub(crate) struct BackLinks<C> {
    links: Vec<BackLink<C>>,
}

impl<C: Copy> BackLinks<C> {
    pub fn new() -> Self {
        Self {
            links: Vec::with_capacity(16),
        }
    }

    /// Record a link and return its handle.
    pub fn push(&mut self, vertex: usize, parent: Option<usize>, cost: C) -> usize {
        self.links.push(BackLink {
            vertex,
            parent,
            cost,
        });
        self.links.len() - 1
    }

    pub fn get(&self, handle: usize) -> BackLink<C> {
        self.links[handle]
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// The path from the root of `handle`'s tree down to `handle`.
    pub fn path_to(&self, handle: usize) -> VertexSequence<C> {
        let goal = self.links[handle];
        let mut vertices = Vec::new();
        let mut current = Some(handle);
        while let Some(index) = current {
            let link = self.links[index];
            vertices.push(link.vertex);
            current = link.parent;
        }
        vertices.reverse();
        VertexSequence {
            vertices,
            cost: goal.cost,
        }
    }
}
