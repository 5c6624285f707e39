//! The matching engine.
//!
//! Walks a tree against a partially-consumed input line: every node in
//! the current sibling set is evaluated in declaration order, ties are
//! broken by node-type priority, the winner's consumed length advances
//! the cursor and its slot effect is applied, and the winner's children
//! become the next sibling set. A separate help entry point enumerates
//! the reachable sibling set without consuming input or mutating slots.

mod address;
mod integer;
mod keyword;
mod simple;
mod token;

#[cfg(test)]
mod tests;

use thiserror::Error;
use tracing::{debug, warn};

use crate::control::{ControlContext, ControlError, SlotEffect};
use crate::grammar::{GrammarError, NodeArena, NodeId, NodeType};
use crate::registry::{MatchResult, RegistryError, TypeRegistry};

use self::token::whitespace_run;

/// Errors raised while the engine walks a tree.
///
/// Non-matches, unrecognized input, and incomplete commands are not
/// errors; they are [`Outcome`] values and leave the session usable.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A structural link resolved to a node the arena never issued.
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// A node's type had no registered behavior.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A committed match failed to apply its slot effect. The cursor has
    /// already advanced; the engine performs no rollback.
    #[error("slot effect failed after commit: {0}")]
    Effect(#[from] ControlError),
}

/// Terminal state of one engine run over a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The whole line matched and ended at a terminal node; all side
    /// effects have been applied.
    Complete,
    /// The line ended while the grammar still required more input.
    Incomplete {
        /// Byte position the parse stopped at.
        cursor: usize,
    },
    /// Input remained but nothing in the current sibling set matched.
    Unrecognized {
        /// Byte position of the offending input, for error pointing.
        cursor: usize,
    },
}

/// One row of help output: the node's alt text and its help text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    /// Keyword text, or a placeholder such as `<1-100>`.
    pub alt_text: String,
    /// The node's configured help text, possibly empty.
    pub help_text: String,
}

/// Result of a help-mode walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpOutcome {
    /// Visible options reachable at the end of the prefix.
    Entries(Vec<HelpEntry>),
    /// The prefix itself failed to parse.
    Unrecognized {
        /// Byte position of the offending input.
        cursor: usize,
    },
}

/// Builds a registry populated with the seven built-in behaviors.
///
/// # Errors
/// Returns `RegistryError::AlreadyRegistered` only if invoked against a
/// registry contract violation, which cannot happen for a fresh table.
pub fn builtin_registry() -> Result<TypeRegistry, RegistryError> {
    let mut registry = TypeRegistry::new();
    registry.register(NodeType::Keyword, Box::new(keyword::KeywordBehavior))?;
    registry.register(NodeType::Integer, Box::new(integer::IntegerBehavior))?;
    registry.register(NodeType::Address, Box::new(address::AddressBehavior))?;
    registry.register(NodeType::Branch, Box::new(simple::BranchBehavior))?;
    registry.register(NodeType::Constant, Box::new(simple::ConstantBehavior))?;
    registry.register(NodeType::Selector, Box::new(simple::SelectorBehavior))?;
    registry.register(NodeType::FreeString, Box::new(simple::FreeStringBehavior))?;
    Ok(registry)
}

/// Borrowed view over the structures one engine run needs.
pub struct MatchEngine<'a> {
    arena: &'a NodeArena,
    registry: &'a TypeRegistry,
}

struct Winner {
    id: NodeId,
    priority: usize,
    consumed: usize,
    effect: Option<SlotEffect>,
}

impl<'a> MatchEngine<'a> {
    /// Creates an engine over an arena and a populated registry.
    pub fn new(arena: &'a NodeArena, registry: &'a TypeRegistry) -> Self {
        Self { arena, registry }
    }

    /// Runs the line loaded in `ctl` against the tree rooted at `root`,
    /// applying winning nodes' slot effects as it goes.
    ///
    /// # Errors
    /// Returns `EngineError` for structural faults (stale handles, an
    /// unregistered type) or a post-commit effect failure; grammar-level
    /// rejections are reported through [`Outcome`] instead.
    pub fn execute(
        &self,
        root: NodeId,
        ctl: &mut ControlContext,
    ) -> Result<Outcome, EngineError> {
        ctl.advance(whitespace_run(ctl.rest()));
        let mut current = self.arena.get(root)?.first_child();

        loop {
            let winner = self.select(current, ctl)?;
            let Some(winner) = winner else {
                let cursor = ctl.cursor();
                let outcome = if ctl.rest().is_empty() {
                    Outcome::Incomplete { cursor }
                } else {
                    Outcome::Unrecognized { cursor }
                };
                debug!(?outcome, "no candidate matched");
                return Ok(outcome);
            };

            ctl.advance(winner.consumed);
            if let Some(effect) = &winner.effect {
                // The cursor is already committed; an effect failure
                // surfaces as an error without rewinding it.
                if let Err(e) = ctl.apply(effect) {
                    warn!(error = %e, "slot effect failed after commit");
                    return Err(e.into());
                }
            }

            match self.arena.get(winner.id)?.first_child() {
                Some(child) => current = Some(child),
                None => {
                    let cursor = ctl.cursor();
                    let outcome = if ctl.rest().is_empty() {
                        Outcome::Complete
                    } else {
                        Outcome::Unrecognized { cursor }
                    };
                    debug!(?outcome, "reached terminal node");
                    return Ok(outcome);
                }
            }
        }
    }

    /// Help-mode entry point: walks the prefix already loaded in `ctl`
    /// without applying any effect, then enumerates the visible options
    /// in the reachable sibling set.
    ///
    /// The caller's control context is left untouched.
    ///
    /// # Errors
    /// Returns `EngineError` for structural faults only.
    pub fn enumerate_help(
        &self,
        root: NodeId,
        ctl: &ControlContext,
    ) -> Result<HelpOutcome, EngineError> {
        let mut scratch = ctl.clone();
        scratch.advance(whitespace_run(scratch.rest()));
        let mut current = self.arena.get(root)?.first_child();

        while !scratch.rest().is_empty() {
            let Some(winner) = self.select(current, &scratch)? else {
                return Ok(HelpOutcome::Unrecognized {
                    cursor: scratch.cursor(),
                });
            };
            scratch.advance(winner.consumed);
            // Descending into an empty child set with input left over
            // falls out of select() as unrecognized on the next pass.
            current = self.arena.get(winner.id)?.first_child();
        }

        let mut entries = Vec::new();
        self.collect_entries(current, scratch.privilege(), &mut entries)?;
        if entries.is_empty() {
            entries.push(HelpEntry {
                alt_text: "<cr>".to_string(),
                help_text: String::new(),
            });
        }
        Ok(HelpOutcome::Entries(entries))
    }

    /// Evaluates the sibling chain starting at `first` and picks the
    /// winning match, honoring privilege gating and type priority.
    fn select(
        &self,
        first: Option<NodeId>,
        ctl: &ControlContext,
    ) -> Result<Option<Winner>, EngineError> {
        let rest = ctl.rest();
        let mut winner: Option<Winner> = None;

        for id in self.arena.siblings_from(first) {
            let node = self.arena.get(id)?;
            if node.flags().privilege() > ctl.privilege() {
                continue;
            }
            let behavior = self.registry.behavior_for(node.node_type())?;
            if let MatchResult::Match { consumed, effect } = behavior.matches(node, rest) {
                let priority = node.node_type().priority();
                let better = winner.as_ref().is_none_or(|w| priority < w.priority);
                if better {
                    winner = Some(Winner {
                        id,
                        priority,
                        consumed,
                        effect,
                    });
                }
            }
        }
        Ok(winner)
    }

    /// Gathers help entries for a sibling set: privilege-gated, hidden
    /// and invisible nodes suppressed, branches expanded into their
    /// children.
    fn collect_entries(
        &self,
        first: Option<NodeId>,
        privilege: u8,
        entries: &mut Vec<HelpEntry>,
    ) -> Result<(), EngineError> {
        for id in self.arena.siblings_from(first) {
            let node = self.arena.get(id)?;
            let flags = node.flags();
            if flags.privilege() > privilege || flags.hidden() || flags.invisible() {
                continue;
            }
            if node.node_type() == NodeType::Branch {
                self.collect_entries(node.first_child(), privilege, entries)?;
                continue;
            }
            let alt_text = self.registry.behavior_for(node.node_type())?.alt_text(node);
            if alt_text.is_empty() {
                continue;
            }
            entries.push(HelpEntry {
                alt_text,
                help_text: node.help().to_string(),
            });
        }
        Ok(())
    }
}
