//! cmdtree - Router-style hierarchical command grammars.
//!
//! cmdtree lets a program declaratively describe a command grammar in the
//! style of router CLI shells and then incrementally match, validate, and
//! act on lines of user input against it. The main features include:
//!
//! - Typed command trees: keyword, integer, address, branch, constant,
//!   selector, and free-string nodes
//! - Priority-ordered ambiguity resolution with keyword abbreviation
//! - Slot side effects into a per-session value store
//! - Live `?` help enumeration and an interactive shell loop
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cmdtree::grammar::NodeType;
//! use cmdtree::session::Session;
//!
//! # fn main() -> cmdtree::Result<()> {
//! let mut session = Session::new()?;
//! let tree = session.create_tree("exec", None)?;
//! let root = session.tree_root(tree)?;
//!
//! let show = session.create_node(NodeType::Keyword);
//! session.set_keyword(show, "show")?;
//! session.set_help_text(show, "Show running system information")?;
//! session.attach_child(root, show)?;
//!
//! let outcome = session.execute(tree, "show")?;
//! println!("outcome: {outcome:?}");
//! # Ok(())
//! # }
//! ```

/// Core error types and result aliases.
pub mod core;

/// Per-session control context and slot store.
pub mod control;

/// Typed command-grammar data model.
pub mod grammar;

/// Node type registry and the behavior dispatch contract.
pub mod registry;

/// The matching engine and help enumeration.
pub mod engine;

/// Top-level session construction and configuration surface.
pub mod session;

/// Interactive input processor.
pub mod shell;

/// Tracing setup for binaries.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use self::core::{CmdtreeError, Result};
