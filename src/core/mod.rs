//! Core error type and result alias.

use thiserror::Error;

use crate::control::ControlError;
use crate::engine::EngineError;
use crate::grammar::GrammarError;
use crate::registry::RegistryError;
use crate::shell::ShellError;

/// Top-level error for the cmdtree crate.
///
/// Aggregates the per-module error enums so callers that do not care
/// which layer failed can hold a single type.
#[derive(Error, Debug)]
pub enum CmdtreeError {
    /// Grammar construction or configuration failure.
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// Slot store access failure.
    #[error(transparent)]
    Control(#[from] ControlError),

    /// Type registry population or lookup failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Structural failure during an engine walk.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Input processor failure.
    #[error(transparent)]
    Shell(#[from] ShellError),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CmdtreeError>;
