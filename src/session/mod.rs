//! Session: the top-level construction and execution context.
//!
//! A session owns its type registry, node arena, tree forest, and
//! control context exclusively; nothing is shared between sessions.
//! Grammar construction goes through the session so that slot and bit
//! references are validated against the store at configuration time,
//! not when a match fires. Dropping the session releases every node it
//! allocated exactly once.

use tracing::debug;

use crate::control::{ControlContext, ControlError, STRING_SLOT_MAX, SlotEffect, truncate_to};
use crate::core::{CmdtreeError, Result};
use crate::engine::{HelpOutcome, MatchEngine, Outcome, builtin_registry};
use crate::grammar::{
    AddressFormats, Forest, GrammarError, IntegerFormats, Node, NodeArena, NodeId, NodeType,
    NodeVariant, Tree, TreeId, validate_keyword,
};
use crate::registry::TypeRegistry;

#[cfg(test)]
mod tests;

/// One interactive session: registry, grammar forest, and slot store.
pub struct Session {
    registry: TypeRegistry,
    arena: NodeArena,
    forest: Forest,
    control: ControlContext,
}

impl Session {
    /// Creates a session with default slot capacities.
    ///
    /// # Errors
    /// Returns a registry error if the built-in behavior table cannot be
    /// populated.
    pub fn new() -> Result<Self> {
        Self::with_control(ControlContext::new())
    }

    /// Creates a session around an explicitly sized control context.
    ///
    /// # Errors
    /// Returns a registry error if the built-in behavior table cannot be
    /// populated.
    pub fn with_control(control: ControlContext) -> Result<Self> {
        Ok(Self {
            registry: builtin_registry()?,
            arena: NodeArena::new(),
            forest: Forest::new(),
            control,
        })
    }

    /// Read access to the control context and its slots.
    pub fn control(&self) -> &ControlContext {
        &self.control
    }

    /// Mutable access to the control context, for seeding slot defaults.
    pub fn control_mut(&mut self) -> &mut ControlContext {
        &mut self.control
    }

    /// The session's read-only behavior registry.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Sets the session privilege level, clamped to 0–15.
    pub fn set_privilege(&mut self, level: u8) {
        self.control.set_privilege(level);
    }

    // --- tree lifecycle -------------------------------------------------

    /// Allocates a named tree, optionally composing under a parent tree,
    /// and returns its identity. The root is a fresh branch node.
    ///
    /// # Errors
    /// Returns `GrammarError::UnknownTree` when `parent` was never
    /// registered.
    pub fn create_tree(&mut self, name: &str, parent: Option<TreeId>) -> Result<TreeId> {
        let root = self.arena.alloc(NodeVariant::Branch);
        // Roots belong to their tree; they can never be attached again.
        self.arena.get_mut(root)?.mark_attached();
        let id = self.forest.insert(name, root, parent)?;
        debug!(tree = name, id = id.value(), "created tree");
        Ok(id)
    }

    /// Looks up a registered tree.
    ///
    /// # Errors
    /// Returns `GrammarError::UnknownTree` for a stale identity.
    pub fn tree(&self, id: TreeId) -> Result<&Tree> {
        Ok(self.forest.get(id)?)
    }

    /// The root node of a registered tree.
    ///
    /// # Errors
    /// Returns `GrammarError::UnknownTree` for a stale identity.
    pub fn tree_root(&self, id: TreeId) -> Result<NodeId> {
        Ok(self.forest.get(id)?.root())
    }

    // --- node lifecycle -------------------------------------------------

    /// Allocates a detached node of the given type with default payload.
    pub fn create_node(&mut self, node_type: NodeType) -> NodeId {
        self.arena.alloc(NodeVariant::for_type(node_type))
    }

    /// Appends `child` as the last alternative under `parent`.
    ///
    /// # Errors
    /// Returns `GrammarError::AlreadyAttached` when the child already has
    /// a parent, keeping node ownership strictly hierarchical.
    pub fn attach_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        Ok(self.arena.attach(parent, child)?)
    }

    /// Sets a node's help text, silently truncated to the length bound.
    ///
    /// # Errors
    /// Returns `GrammarError::UnknownNode` for a stale handle.
    pub fn set_help_text(&mut self, node: NodeId, text: &str) -> Result<()> {
        self.arena.get_mut(node)?.set_help(text);
        Ok(())
    }

    /// Sets the privilege level a node requires, clamped to 0–15.
    ///
    /// # Errors
    /// Returns `GrammarError::UnknownNode` for a stale handle.
    pub fn set_node_privilege(&mut self, node: NodeId, level: u8) -> Result<()> {
        self.arena.get_mut(node)?.flags_mut().set_privilege(level);
        Ok(())
    }

    /// Marks a node hidden: matchable, but suppressed from help output.
    ///
    /// # Errors
    /// Returns `GrammarError::UnknownNode` for a stale handle.
    pub fn set_hidden(&mut self, node: NodeId, hidden: bool) -> Result<()> {
        self.arena.get_mut(node)?.flags_mut().set_hidden(hidden);
        Ok(())
    }

    /// Marks a node invisible in help output.
    ///
    /// # Errors
    /// Returns `GrammarError::UnknownNode` for a stale handle.
    pub fn set_invisible(&mut self, node: NodeId, invisible: bool) -> Result<()> {
        self.arena
            .get_mut(node)?
            .flags_mut()
            .set_invisible(invisible);
        Ok(())
    }

    /// Marks the command through this node as supporting negation.
    ///
    /// # Errors
    /// Returns `GrammarError::UnknownNode` for a stale handle.
    pub fn set_negatable(&mut self, node: NodeId, negatable: bool) -> Result<()> {
        self.arena
            .get_mut(node)?
            .flags_mut()
            .set_negatable(negatable);
        Ok(())
    }

    // --- keyword configuration ------------------------------------------

    /// Sets a keyword node's text and resets its minimum match to the
    /// full keyword length.
    ///
    /// # Errors
    /// Returns `GrammarError::InvalidKeyword` for malformed text and
    /// `GrammarError::TypeMismatch` on a non-keyword node.
    pub fn set_keyword(&mut self, node: NodeId, text: &str) -> Result<()> {
        validate_keyword(text)?;
        let entry = self.arena.get_mut(node)?;
        let actual = entry.node_type();
        let Some(keyword) = entry.keyword_mut() else {
            return Err(mismatch(NodeType::Keyword, actual));
        };
        keyword.keyword = text.to_string();
        keyword.minimum_match = text.len();
        entry.flags_mut().set_has_min_match(false);
        Ok(())
    }

    /// Sets the minimum accepted abbreviation length, silently clamped
    /// to the keyword length.
    ///
    /// # Errors
    /// Returns `GrammarError::TypeMismatch` on a non-keyword node.
    pub fn set_minimum_match(&mut self, node: NodeId, length: usize) -> Result<()> {
        let entry = self.arena.get_mut(node)?;
        let actual = entry.node_type();
        let Some(keyword) = entry.keyword_mut() else {
            return Err(mismatch(NodeType::Keyword, actual));
        };
        keyword.minimum_match = length.min(keyword.keyword.len());
        entry.flags_mut().set_has_min_match(true);
        Ok(())
    }

    /// On match, store `value` into integer slot `index`.
    ///
    /// # Errors
    /// Returns `ControlError::SlotOutOfRange` for a bad index and
    /// `GrammarError::TypeMismatch` on a non-keyword node.
    pub fn set_keyword_effect_integer(
        &mut self,
        node: NodeId,
        index: usize,
        value: i64,
    ) -> Result<()> {
        self.check_integer_slot(index)?;
        self.install_keyword_effect(node, SlotEffect::Integer { index, value }, false)
    }

    /// On match, set bit `bit` within integer slot `index`.
    ///
    /// # Errors
    /// Returns `ControlError::SlotOutOfRange`/`BitOutOfRange` for a bad
    /// target and `GrammarError::TypeMismatch` on a non-keyword node.
    pub fn set_keyword_effect_bit(&mut self, node: NodeId, index: usize, bit: u32) -> Result<()> {
        self.check_integer_slot(index)?;
        if bit > 63 {
            return Err(CmdtreeError::Grammar(GrammarError::Slot(
                ControlError::BitOutOfRange { bit },
            )));
        }
        self.install_keyword_effect(node, SlotEffect::Bit { index, bit }, true)
    }

    /// On match, store `text` into string slot `index`, truncated to the
    /// slot bound.
    ///
    /// # Errors
    /// Returns `ControlError::SlotOutOfRange` for a bad index and
    /// `GrammarError::TypeMismatch` on a non-keyword node.
    pub fn set_keyword_effect_string(
        &mut self,
        node: NodeId,
        index: usize,
        text: &str,
    ) -> Result<()> {
        self.check_string_slot(index)?;
        self.install_keyword_effect(
            node,
            SlotEffect::Text {
                index,
                text: truncate_to(text, STRING_SLOT_MAX),
            },
            false,
        )
    }

    // --- integer configuration ------------------------------------------

    /// Sets the integer node's target slot (slot 0 if never configured).
    ///
    /// # Errors
    /// Returns `ControlError::SlotOutOfRange` for a bad index and
    /// `GrammarError::TypeMismatch` on a non-integer node.
    pub fn set_integer_index(&mut self, node: NodeId, index: usize) -> Result<()> {
        self.check_integer_slot(index)?;
        let entry = self.arena.get_mut(node)?;
        let actual = entry.node_type();
        let Some(integer) = entry.integer_mut() else {
            return Err(mismatch(NodeType::Integer, actual));
        };
        integer.index = index;
        Ok(())
    }

    /// Restricts the literal bases the node accepts (default: all).
    ///
    /// # Errors
    /// Returns `GrammarError::TypeMismatch` on a non-integer node.
    pub fn set_integer_formats(&mut self, node: NodeId, formats: IntegerFormats) -> Result<()> {
        let entry = self.arena.get_mut(node)?;
        let actual = entry.node_type();
        let Some(integer) = entry.integer_mut() else {
            return Err(mismatch(NodeType::Integer, actual));
        };
        integer.formats = formats;
        Ok(())
    }

    /// Sets the inclusive accepted range (default: the full i64 range).
    ///
    /// # Errors
    /// Returns `GrammarError::InvalidRange` when `max` is below `min`
    /// (equal bounds are a legal degenerate range) and
    /// `GrammarError::TypeMismatch` on a non-integer node.
    pub fn set_integer_range(&mut self, node: NodeId, min: i64, max: i64) -> Result<()> {
        if max < min {
            return Err(CmdtreeError::Grammar(GrammarError::InvalidRange {
                min,
                max,
            }));
        }
        let entry = self.arena.get_mut(node)?;
        let actual = entry.node_type();
        let Some(integer) = entry.integer_mut() else {
            return Err(mismatch(NodeType::Integer, actual));
        };
        integer.min = min;
        integer.max = max;
        Ok(())
    }

    // --- address configuration ------------------------------------------

    /// Restricts the address families the node accepts (default: all).
    ///
    /// # Errors
    /// Returns `GrammarError::TypeMismatch` on a non-address node.
    pub fn set_address_formats(&mut self, node: NodeId, formats: AddressFormats) -> Result<()> {
        let entry = self.arena.get_mut(node)?;
        let actual = entry.node_type();
        let Some(address) = entry.address_mut() else {
            return Err(mismatch(NodeType::Address, actual));
        };
        address.formats = formats;
        Ok(())
    }

    /// Sets the address node's target slot.
    ///
    /// # Errors
    /// Returns `ControlError::SlotOutOfRange` for a bad index and
    /// `GrammarError::TypeMismatch` on a non-address node.
    pub fn set_address_index(&mut self, node: NodeId, index: usize) -> Result<()> {
        if index >= self.control.address_capacity() {
            return Err(slot_error(index, self.control.address_capacity()));
        }
        let entry = self.arena.get_mut(node)?;
        let actual = entry.node_type();
        let Some(address) = entry.address_mut() else {
            return Err(mismatch(NodeType::Address, actual));
        };
        address.index = index;
        Ok(())
    }

    // --- selector and free-string configuration -------------------------

    /// Sets the curated keyword subset a selector matches against.
    ///
    /// # Errors
    /// Returns `GrammarError::InvalidKeyword` for malformed members and
    /// `GrammarError::TypeMismatch` on a non-selector node.
    pub fn set_selector_keywords(&mut self, node: NodeId, keywords: &[&str]) -> Result<()> {
        for keyword in keywords {
            validate_keyword(keyword)?;
        }
        let entry = self.arena.get_mut(node)?;
        let actual = entry.node_type();
        let Some(selector) = entry.selector_mut() else {
            return Err(mismatch(NodeType::Selector, actual));
        };
        selector.keywords = keywords.iter().map(|k| (*k).to_string()).collect();
        Ok(())
    }

    /// Sets the string slot a selector writes the canonical keyword to.
    ///
    /// # Errors
    /// Returns `ControlError::SlotOutOfRange` for a bad index and
    /// `GrammarError::TypeMismatch` on a non-selector node.
    pub fn set_selector_index(&mut self, node: NodeId, index: usize) -> Result<()> {
        self.check_string_slot(index)?;
        let entry = self.arena.get_mut(node)?;
        let actual = entry.node_type();
        let Some(selector) = entry.selector_mut() else {
            return Err(mismatch(NodeType::Selector, actual));
        };
        selector.index = index;
        Ok(())
    }

    /// Sets the string slot a free-string node captures its token into.
    ///
    /// # Errors
    /// Returns `ControlError::SlotOutOfRange` for a bad index and
    /// `GrammarError::TypeMismatch` on a non-free-string node.
    pub fn set_string_index(&mut self, node: NodeId, index: usize) -> Result<()> {
        self.check_string_slot(index)?;
        let entry = self.arena.get_mut(node)?;
        let actual = entry.node_type();
        let Some(free) = entry.free_string_mut() else {
            return Err(mismatch(NodeType::FreeString, actual));
        };
        free.index = index;
        Ok(())
    }

    // --- constant configuration -----------------------------------------

    /// When the branch through this constant is taken, store `value`
    /// into integer slot `index`.
    ///
    /// # Errors
    /// Returns `ControlError::SlotOutOfRange` for a bad index and
    /// `GrammarError::TypeMismatch` on a non-constant node.
    pub fn set_constant_effect_integer(
        &mut self,
        node: NodeId,
        index: usize,
        value: i64,
    ) -> Result<()> {
        self.check_integer_slot(index)?;
        self.install_constant_write(node, SlotEffect::Integer { index, value })
    }

    /// When the branch through this constant is taken, set bit `bit`
    /// within integer slot `index`.
    ///
    /// # Errors
    /// Returns `ControlError::SlotOutOfRange`/`BitOutOfRange` for a bad
    /// target and `GrammarError::TypeMismatch` on a non-constant node.
    pub fn set_constant_effect_bit(&mut self, node: NodeId, index: usize, bit: u32) -> Result<()> {
        self.check_integer_slot(index)?;
        if bit > 63 {
            return Err(CmdtreeError::Grammar(GrammarError::Slot(
                ControlError::BitOutOfRange { bit },
            )));
        }
        self.install_constant_write(node, SlotEffect::Bit { index, bit })
    }

    /// When the branch through this constant is taken, store `text` into
    /// string slot `index`, truncated to the slot bound.
    ///
    /// # Errors
    /// Returns `ControlError::SlotOutOfRange` for a bad index and
    /// `GrammarError::TypeMismatch` on a non-constant node.
    pub fn set_constant_effect_string(
        &mut self,
        node: NodeId,
        index: usize,
        text: &str,
    ) -> Result<()> {
        self.check_string_slot(index)?;
        self.install_constant_write(
            node,
            SlotEffect::Text {
                index,
                text: truncate_to(text, STRING_SLOT_MAX),
            },
        )
    }

    // --- interactive surface --------------------------------------------

    /// Runs one input line against a tree, applying slot effects.
    ///
    /// # Errors
    /// Returns structural errors only; grammar-level rejection is an
    /// [`Outcome`] and leaves the session usable for the next line.
    pub fn execute(&mut self, tree: TreeId, line: &str) -> Result<Outcome> {
        let root = self.forest.get(tree)?.root();
        self.control.load_line(line);
        let outcome = MatchEngine::new(&self.arena, &self.registry)
            .execute(root, &mut self.control)?;
        Ok(outcome)
    }

    /// Enumerates the visible options reachable at the end of `prefix`
    /// without consuming input or touching any slot.
    ///
    /// # Errors
    /// Returns structural errors only.
    pub fn help(&mut self, tree: TreeId, prefix: &str) -> Result<HelpOutcome> {
        let root = self.forest.get(tree)?.root();
        self.control.load_line(prefix);
        let outcome =
            MatchEngine::new(&self.arena, &self.registry).enumerate_help(root, &self.control)?;
        Ok(outcome)
    }

    /// Immutable access to a node, for inspection.
    ///
    /// # Errors
    /// Returns `GrammarError::UnknownNode` for a stale handle.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        Ok(self.arena.get(id)?)
    }

    // --- internals ------------------------------------------------------

    fn check_integer_slot(&self, index: usize) -> Result<()> {
        if index >= self.control.integer_capacity() {
            return Err(slot_error(index, self.control.integer_capacity()));
        }
        Ok(())
    }

    fn check_string_slot(&self, index: usize) -> Result<()> {
        if index >= self.control.string_capacity() {
            return Err(slot_error(index, self.control.string_capacity()));
        }
        Ok(())
    }

    fn install_keyword_effect(
        &mut self,
        node: NodeId,
        effect: SlotEffect,
        is_bit: bool,
    ) -> Result<()> {
        let entry = self.arena.get_mut(node)?;
        let actual = entry.node_type();
        let Some(keyword) = entry.keyword_mut() else {
            return Err(mismatch(NodeType::Keyword, actual));
        };
        keyword.effect = Some(effect);
        let flags = entry.flags_mut();
        flags.set_applies_value(true);
        flags.set_applies_bit(is_bit);
        Ok(())
    }

    fn install_constant_write(&mut self, node: NodeId, write: SlotEffect) -> Result<()> {
        let is_bit = matches!(write, SlotEffect::Bit { .. });
        let entry = self.arena.get_mut(node)?;
        let actual = entry.node_type();
        let Some(constant) = entry.constant_mut() else {
            return Err(mismatch(NodeType::Constant, actual));
        };
        constant.write = Some(write);
        let flags = entry.flags_mut();
        flags.set_applies_value(true);
        flags.set_applies_bit(is_bit);
        Ok(())
    }
}

fn mismatch(expected: NodeType, actual: NodeType) -> CmdtreeError {
    CmdtreeError::Grammar(GrammarError::TypeMismatch { expected, actual })
}

fn slot_error(index: usize, capacity: usize) -> CmdtreeError {
    CmdtreeError::Grammar(GrammarError::Slot(ControlError::SlotOutOfRange {
        index,
        capacity,
    }))
}
