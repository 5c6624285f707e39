//! Arena ownership of grammar nodes.
//!
//! Every node a session allocates lives in one arena and is addressed by
//! handle. Child and sibling links are handles into the same arena, so
//! dropping the arena releases every node exactly once with no recursive
//! free and no reference counting.

use super::error::GrammarError;
use super::node::{Node, NodeId, NodeVariant};

/// Owner of all nodes allocated by a session.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes allocated so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no nodes have been allocated.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocates a detached node and returns its handle.
    pub fn alloc(&mut self, variant: NodeVariant) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(variant));
        id
    }

    /// Resolves a handle.
    ///
    /// # Errors
    /// Returns `GrammarError::UnknownNode` for a handle this arena never
    /// issued.
    pub fn get(&self, id: NodeId) -> Result<&Node, GrammarError> {
        self.nodes
            .get(id.index())
            .ok_or(GrammarError::UnknownNode { id })
    }

    /// Resolves a handle mutably.
    ///
    /// # Errors
    /// Returns `GrammarError::UnknownNode` for a handle this arena never
    /// issued.
    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut Node, GrammarError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(GrammarError::UnknownNode { id })
    }

    /// Appends `child` to `parent`'s child/sibling chain.
    ///
    /// The child becomes the last alternative at the parent's position,
    /// preserving declaration order for match evaluation.
    ///
    /// # Errors
    /// Returns `GrammarError::AlreadyAttached` if the child already hangs
    /// under a parent, and `GrammarError::InvalidAttachment` for a
    /// self-attachment.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), GrammarError> {
        if parent == child {
            return Err(GrammarError::InvalidAttachment { parent, child });
        }
        if self.get(child)?.is_attached() {
            return Err(GrammarError::AlreadyAttached { id: child });
        }

        // Find the tail of the existing sibling chain before mutating.
        let mut tail = None;
        let mut cursor = self.get(parent)?.first_child();
        while let Some(id) = cursor {
            tail = Some(id);
            cursor = self.get(id)?.next_sibling();
        }

        match tail {
            Some(tail_id) => self.get_mut(tail_id)?.set_next_sibling(Some(child)),
            None => self.get_mut(parent)?.set_first_child(Some(child)),
        }
        self.get_mut(child)?.mark_attached();
        Ok(())
    }

    /// Iterates a node's children in declaration order.
    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let first = self.get(parent).ok().and_then(Node::first_child);
        SiblingIter {
            arena: self,
            cursor: first,
        }
    }

    /// Iterates the sibling chain starting at `first` (inclusive).
    pub fn siblings_from(&self, first: Option<NodeId>) -> impl Iterator<Item = NodeId> + '_ {
        SiblingIter {
            arena: self,
            cursor: first,
        }
    }
}

struct SiblingIter<'a> {
    arena: &'a NodeArena,
    cursor: Option<NodeId>,
}

impl Iterator for SiblingIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.cursor?;
        self.cursor = self.arena.get(id).ok().and_then(Node::next_sibling);
        Some(id)
    }
}
