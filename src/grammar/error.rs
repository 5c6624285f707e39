use thiserror::Error;

use crate::control::ControlError;

use super::node::{NodeId, NodeType};
use super::tree::TreeId;

/// Errors raised while building or configuring a grammar.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GrammarError {
    /// A node handle did not refer to any allocated node.
    #[error("unknown node {id:?}")]
    UnknownNode {
        /// The stale handle.
        id: NodeId,
    },

    /// A tree handle did not refer to any registered tree.
    #[error("unknown tree {id:?}")]
    UnknownTree {
        /// The stale handle.
        id: TreeId,
    },

    /// A configuration call targeted a node of the wrong type.
    #[error("node is a {actual:?} node, operation requires {expected:?}")]
    TypeMismatch {
        /// Type the operation applies to.
        expected: NodeType,
        /// Type the node actually has.
        actual: NodeType,
    },

    /// A keyword contained characters outside letters, digits, and hyphen,
    /// or was empty.
    #[error("invalid keyword '{keyword}': {reason}")]
    InvalidKeyword {
        /// The rejected keyword text.
        keyword: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A node was attached while already owned by another parent.
    #[error("node {id:?} is already attached to a parent")]
    AlreadyAttached {
        /// The doubly-attached node.
        id: NodeId,
    },

    /// An attachment would have made a node its own ancestor.
    #[error("cannot attach node {child:?} under {parent:?}")]
    InvalidAttachment {
        /// Intended parent.
        parent: NodeId,
        /// Intended child.
        child: NodeId,
    },

    /// An integer range with max below min.
    #[error("invalid integer range: max {max} is below min {min}")]
    InvalidRange {
        /// Lower bound supplied.
        min: i64,
        /// Upper bound supplied.
        max: i64,
    },

    /// A slot or bit reference failed validation at configuration time.
    #[error(transparent)]
    Slot(#[from] ControlError),
}
