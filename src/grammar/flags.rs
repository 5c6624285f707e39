//! Node flag sets and accepted-format masks.

use bitflags::bitflags;

use crate::control::PRIVILEGE_MAX;

bitflags! {
    /// Numeric literal formats an integer node will accept.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IntegerFormats: u32 {
        /// Plain decimal, optionally signed.
        const DECIMAL = 0x01;
        /// Hexadecimal with a `0x`/`0X` prefix.
        const HEXADECIMAL = 0x02;
        /// Octal with a leading `0`.
        const OCTAL = 0x04;
        /// Binary with a `0b`/`0B` prefix.
        const BINARY = 0x08;
    }

    /// Address families an address node will accept.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AddressFormats: u32 {
        /// Dotted-quad IPv4, optionally with `/0`–`/32`.
        const IPV4 = 0x01;
        /// Colon-form IPv6, optionally with `/0`–`/128`.
        const IPV6 = 0x02;
        /// MAC-48, colon-separated or dotted-triplet form.
        const MAC = 0x04;
    }
}

/// Per-node behaviour flags.
///
/// Privilege level, visibility, effect kind, negation markers, and the
/// explicit minimum-match marker, stored as named fields rather than a
/// packed flag word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFlags {
    privilege: u8,
    hidden: bool,
    invisible: bool,
    applies_value: bool,
    applies_bit: bool,
    negatable: bool,
    applies_negate: bool,
    has_min_match: bool,
}

impl NodeFlags {
    /// Minimum session privilege required to match or see this node.
    pub fn privilege(&self) -> u8 {
        self.privilege
    }

    /// Sets the required privilege level, clamped to 0–15.
    pub fn set_privilege(&mut self, level: u8) {
        self.privilege = level.min(PRIVILEGE_MAX);
    }

    /// Hidden nodes match normally but are suppressed from help output.
    pub fn hidden(&self) -> bool {
        self.hidden
    }

    /// Marks or unmarks the node as hidden.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Invisible nodes are suppressed from help output.
    pub fn invisible(&self) -> bool {
        self.invisible
    }

    /// Marks or unmarks the node as invisible.
    pub fn set_invisible(&mut self, invisible: bool) {
        self.invisible = invisible;
    }

    /// Whether a successful match writes a slot.
    pub fn applies_value(&self) -> bool {
        self.applies_value
    }

    /// Records that this node writes a slot on match.
    pub fn set_applies_value(&mut self, applies: bool) {
        self.applies_value = applies;
    }

    /// Whether the slot write is a single-bit read-modify-write.
    pub fn applies_bit(&self) -> bool {
        self.applies_bit
    }

    /// Records that the slot write is a bit set.
    pub fn set_applies_bit(&mut self, applies: bool) {
        self.applies_bit = applies;
    }

    /// Whether the command this node belongs to supports negation.
    pub fn negatable(&self) -> bool {
        self.negatable
    }

    /// Marks or unmarks the node as negatable.
    pub fn set_negatable(&mut self, negatable: bool) {
        self.negatable = negatable;
    }

    /// Whether a match records the negated form of the command.
    pub fn applies_negate(&self) -> bool {
        self.applies_negate
    }

    /// Marks or unmarks the negate-on-match behaviour.
    pub fn set_applies_negate(&mut self, applies: bool) {
        self.applies_negate = applies;
    }

    /// Whether an explicit minimum-match length was configured.
    pub fn has_min_match(&self) -> bool {
        self.has_min_match
    }

    /// Records that an explicit minimum-match length was configured.
    pub fn set_has_min_match(&mut self, has: bool) {
        self.has_min_match = has;
    }
}
