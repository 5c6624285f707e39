//! Typed command-grammar data model.
//!
//! A grammar is a forest of named trees. Each tree is rooted at a branch
//! node and fans out through child/sibling chains of typed nodes; the
//! arena owns every node so teardown is a single drop.

mod arena;
mod error;
mod flags;
mod node;
mod tree;


pub use arena::NodeArena;
pub use error::GrammarError;
pub use flags::{AddressFormats, IntegerFormats, NodeFlags};
pub use node::{
    AddressNode, ConstantNode, FreeStringNode, HELP_TEXT_MAX, IntegerNode, KEYWORD_LENGTH_MAX,
    KeywordNode, Node, NodeId, NodeType, NodeVariant, SelectorNode,
};
pub use tree::{Forest, Tree, TreeId};

pub(crate) use node::validate_keyword;
