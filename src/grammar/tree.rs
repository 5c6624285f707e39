//! Named parse trees and the forest that indexes them.

use std::collections::HashMap;

use super::error::GrammarError;
use super::node::NodeId;

/// Handle to a registered tree. Identities start at 1; the absent parent
/// of a top-level tree is represented structurally as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(pub(crate) u32);

impl TreeId {
    /// The raw numeric identity.
    pub fn value(self) -> u32 {
        self.0
    }
}

/// A named, rooted command grammar.
#[derive(Debug, Clone)]
pub struct Tree {
    id: TreeId,
    name: String,
    root: NodeId,
    parent: Option<TreeId>,
}

impl Tree {
    /// The tree's identity.
    pub fn id(&self) -> TreeId {
        self.id
    }

    /// Display name, used in prompts and diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The root node; always a branch node owned by the session arena.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The parent tree this grammar composes under, if any.
    pub fn parent(&self) -> Option<TreeId> {
        self.parent
    }
}

/// Registry of trees keyed by identity.
#[derive(Debug)]
pub struct Forest {
    trees: HashMap<TreeId, Tree>,
    next_id: u32,
}

impl Default for Forest {
    fn default() -> Self {
        Self::new()
    }
}

impl Forest {
    /// Creates an empty forest. Identities are issued from 1; zero is
    /// never a valid tree identity.
    pub fn new() -> Self {
        Self {
            trees: HashMap::new(),
            next_id: 1,
        }
    }

    /// Registers a tree and returns its identity.
    ///
    /// # Errors
    /// Returns `GrammarError::UnknownTree` if `parent` names a tree that
    /// was never registered.
    pub fn insert(
        &mut self,
        name: &str,
        root: NodeId,
        parent: Option<TreeId>,
    ) -> Result<TreeId, GrammarError> {
        if let Some(parent_id) = parent
            && !self.trees.contains_key(&parent_id)
        {
            return Err(GrammarError::UnknownTree { id: parent_id });
        }

        let id = TreeId(self.next_id);
        self.next_id += 1;
        self.trees.insert(
            id,
            Tree {
                id,
                name: name.to_string(),
                root,
                parent,
            },
        );
        Ok(id)
    }

    /// Looks a tree up by identity.
    ///
    /// # Errors
    /// Returns `GrammarError::UnknownTree` for an identity this forest
    /// never issued.
    pub fn get(&self, id: TreeId) -> Result<&Tree, GrammarError> {
        self.trees.get(&id).ok_or(GrammarError::UnknownTree { id })
    }

    /// Number of registered trees.
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Whether no trees are registered.
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}
