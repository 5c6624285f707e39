//! Node type registry: the type→behavior dispatch table.
//!
//! The registry is a value owned by the session, populated once with the
//! built-in behaviors before the first tree is constructed and read-only
//! afterwards, which makes it safe to share across sessions and threads.

use std::collections::HashMap;

use thiserror::Error;

use crate::control::SlotEffect;
use crate::grammar::{Node, NodeType};

#[cfg(test)]
mod tests;

/// Errors raised by registry population and lookup.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// A behavior was registered twice for the same discriminator.
    #[error("behavior already registered for node type {node_type:?}")]
    AlreadyRegistered {
        /// The doubly-registered type.
        node_type: NodeType,
    },

    /// A lookup hit a discriminator that was never registered.
    #[error("no behavior registered for node type {node_type:?}")]
    NotRegistered {
        /// The unregistered type.
        node_type: NodeType,
    },
}

/// Result of asking a behavior to match a node against unconsumed input.
///
/// `NoMatch` is not an error; the engine simply tries the next sibling.
/// A match reports how many input bytes it consumed (including any run of
/// trailing whitespace) and the slot write to apply if the node wins.
/// Effects are returned rather than applied so that losing candidates and
/// help-mode walks leave the control store untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    /// The node does not accept the input at this position.
    NoMatch,
    /// The node accepts `consumed` bytes of input.
    Match {
        /// Bytes of input consumed, trailing whitespace absorbed.
        consumed: usize,
        /// Slot write to apply when this node wins the sibling contest.
        effect: Option<SlotEffect>,
    },
}

/// Behavior set bound to one node type.
///
/// Matching is pure: implementations inspect the node payload and the
/// unconsumed input and describe the outcome without touching any state.
pub trait NodeBehavior: Send + Sync {
    /// Attempts to match `input` (the unconsumed remainder of the line)
    /// against `node`.
    fn matches(&self, node: &Node, input: &str) -> MatchResult;

    /// Renders the node for help output: the keyword text itself for
    /// literal nodes, a placeholder such as `<1-100>` otherwise.
    fn alt_text(&self, node: &Node) -> String;
}

/// The type→behavior table.
#[derive(Default)]
pub struct TypeRegistry {
    entries: HashMap<NodeType, Box<dyn NodeBehavior>>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a behavior to a type discriminator.
    ///
    /// # Errors
    /// Returns `RegistryError::AlreadyRegistered` if the discriminator is
    /// already bound.
    pub fn register(
        &mut self,
        node_type: NodeType,
        behavior: Box<dyn NodeBehavior>,
    ) -> Result<(), RegistryError> {
        if self.entries.contains_key(&node_type) {
            return Err(RegistryError::AlreadyRegistered { node_type });
        }
        self.entries.insert(node_type, behavior);
        Ok(())
    }

    /// Looks up the behavior bound to a discriminator.
    ///
    /// # Errors
    /// Returns `RegistryError::NotRegistered` if the type was never
    /// registered.
    pub fn behavior_for(&self, node_type: NodeType) -> Result<&dyn NodeBehavior, RegistryError> {
        self.entries
            .get(&node_type)
            .map(Box::as_ref)
            .ok_or(RegistryError::NotRegistered { node_type })
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no types are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
