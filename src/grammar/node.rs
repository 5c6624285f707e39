//! Node variants and the common node header.

use crate::control::{SlotEffect, truncate_to};

use super::flags::{AddressFormats, IntegerFormats, NodeFlags};

/// Maximum keyword length in bytes.
pub const KEYWORD_LENGTH_MAX: usize = 32;

/// Maximum help text length in bytes; longer text is silently truncated.
pub const HELP_TEXT_MAX: usize = 128;

/// Checks that keyword text is non-empty, within the length bound, and
/// restricted to letters, digits, and hyphen.
pub(crate) fn validate_keyword(text: &str) -> Result<(), super::error::GrammarError> {
    use super::error::GrammarError;

    if text.is_empty() {
        return Err(GrammarError::InvalidKeyword {
            keyword: text.to_string(),
            reason: "keyword is empty",
        });
    }
    if text.len() > KEYWORD_LENGTH_MAX {
        return Err(GrammarError::InvalidKeyword {
            keyword: text.to_string(),
            reason: "keyword exceeds the length bound",
        });
    }
    if !text.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(GrammarError::InvalidKeyword {
            keyword: text.to_string(),
            reason: "keywords may contain letters, digits, and hyphen",
        });
    }
    Ok(())
}

/// Handle to a node inside its session's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Node type discriminator.
///
/// Declaration order doubles as match priority: when several siblings of
/// different types match the same input span, the earliest-declared type
/// wins. More specific token kinds therefore beat generic ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Constant alphanumeric keyword.
    Keyword,
    /// Signed 64-bit integer within a configured range.
    Integer,
    /// IPv4/IPv6/MAC address.
    Address,
    /// Consumes nothing; forks the tree.
    Branch,
    /// Consumes nothing; stamps a configured value.
    Constant,
    /// Curated keyword subset for disambiguation.
    Selector,
    /// One arbitrary bounded token.
    FreeString,
}

impl NodeType {
    /// Number of node types in the enumeration.
    pub const COUNT: usize = 7;

    /// All node types in priority order.
    pub const ALL: [NodeType; NodeType::COUNT] = [
        NodeType::Keyword,
        NodeType::Integer,
        NodeType::Address,
        NodeType::Branch,
        NodeType::Constant,
        NodeType::Selector,
        NodeType::FreeString,
    ];

    /// Match priority; lower wins.
    pub fn priority(self) -> usize {
        self as usize
    }
}

/// Payload of a keyword node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordNode {
    /// Keyword text: letters, digits, and hyphen.
    pub keyword: String,
    /// Shortest accepted prefix length; defaults to the full keyword.
    pub minimum_match: usize,
    /// Slot write applied on a successful match.
    pub effect: Option<SlotEffect>,
}

/// Payload of an integer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerNode {
    /// Accepted literal bases.
    pub formats: IntegerFormats,
    /// Inclusive lower bound.
    pub min: i64,
    /// Inclusive upper bound.
    pub max: i64,
    /// Target integer slot.
    pub index: usize,
}

impl Default for IntegerNode {
    fn default() -> Self {
        Self {
            formats: IntegerFormats::all(),
            min: i64::MIN,
            max: i64::MAX,
            index: 0,
        }
    }
}

/// Payload of an address node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressNode {
    /// Accepted address families.
    pub formats: AddressFormats,
    /// Target address slot.
    pub index: usize,
}

impl Default for AddressNode {
    fn default() -> Self {
        Self {
            formats: AddressFormats::all(),
            index: 0,
        }
    }
}

/// Payload of a constant node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantNode {
    /// Slot write stamped whenever the branch through this node is taken.
    pub write: Option<SlotEffect>,
}

/// Payload of a selector node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorNode {
    /// The curated keyword subset, in declaration order.
    pub keywords: Vec<String>,
    /// String slot receiving the canonical matched keyword.
    pub index: usize,
}

/// Payload of a free-form string node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FreeStringNode {
    /// String slot receiving the captured token.
    pub index: usize,
}

/// Type-specific node payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeVariant {
    /// Keyword payload.
    Keyword(KeywordNode),
    /// Integer payload.
    Integer(IntegerNode),
    /// Address payload.
    Address(AddressNode),
    /// Branch nodes carry no payload.
    Branch,
    /// Constant payload.
    Constant(ConstantNode),
    /// Selector payload.
    Selector(SelectorNode),
    /// Free-string payload.
    FreeString(FreeStringNode),
}

impl NodeVariant {
    /// Builds the default payload for a node type.
    pub fn for_type(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Keyword => NodeVariant::Keyword(KeywordNode::default()),
            NodeType::Integer => NodeVariant::Integer(IntegerNode::default()),
            NodeType::Address => NodeVariant::Address(AddressNode::default()),
            NodeType::Branch => NodeVariant::Branch,
            NodeType::Constant => NodeVariant::Constant(ConstantNode::default()),
            NodeType::Selector => NodeVariant::Selector(SelectorNode::default()),
            NodeType::FreeString => NodeVariant::FreeString(FreeStringNode::default()),
        }
    }

    /// The discriminator for this payload.
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeVariant::Keyword(_) => NodeType::Keyword,
            NodeVariant::Integer(_) => NodeType::Integer,
            NodeVariant::Address(_) => NodeType::Address,
            NodeVariant::Branch => NodeType::Branch,
            NodeVariant::Constant(_) => NodeType::Constant,
            NodeVariant::Selector(_) => NodeType::Selector,
            NodeVariant::FreeString(_) => NodeType::FreeString,
        }
    }
}

/// One unit of grammar: common header plus a typed payload.
///
/// Structural links are arena handles. The child link is owned by this
/// node; the sibling link is owned by the common parent, so the sibling
/// chain as a whole hangs off the parent's child link.
#[derive(Debug, Clone)]
pub struct Node {
    first_child: Option<NodeId>,
    next_sibling: Option<NodeId>,
    attached: bool,
    flags: NodeFlags,
    help: String,
    variant: NodeVariant,
}

impl Node {
    /// Creates a detached node around a payload.
    pub fn new(variant: NodeVariant) -> Self {
        Self {
            first_child: None,
            next_sibling: None,
            attached: false,
            flags: NodeFlags::default(),
            help: String::new(),
            variant,
        }
    }

    /// The node's immutable type discriminator.
    pub fn node_type(&self) -> NodeType {
        self.variant.node_type()
    }

    /// First child, if the node has any.
    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    /// Next alternative at the same grammar position.
    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling
    }

    /// Whether the node already hangs under a parent.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// The flag set.
    pub fn flags(&self) -> &NodeFlags {
        &self.flags
    }

    pub(crate) fn flags_mut(&mut self) -> &mut NodeFlags {
        &mut self.flags
    }

    /// Help text shown next to the node's alt text in help output.
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Sets the help text, silently truncated to [`HELP_TEXT_MAX`] bytes.
    pub fn set_help(&mut self, text: &str) {
        self.help = truncate_to(text, HELP_TEXT_MAX);
    }

    /// The typed payload.
    pub fn variant(&self) -> &NodeVariant {
        &self.variant
    }

    pub(crate) fn variant_mut(&mut self) -> &mut NodeVariant {
        &mut self.variant
    }

    pub(crate) fn keyword_mut(&mut self) -> Option<&mut KeywordNode> {
        match &mut self.variant {
            NodeVariant::Keyword(k) => Some(k),
            _ => None,
        }
    }

    pub(crate) fn integer_mut(&mut self) -> Option<&mut IntegerNode> {
        match &mut self.variant {
            NodeVariant::Integer(i) => Some(i),
            _ => None,
        }
    }

    pub(crate) fn address_mut(&mut self) -> Option<&mut AddressNode> {
        match &mut self.variant {
            NodeVariant::Address(a) => Some(a),
            _ => None,
        }
    }

    pub(crate) fn constant_mut(&mut self) -> Option<&mut ConstantNode> {
        match &mut self.variant {
            NodeVariant::Constant(c) => Some(c),
            _ => None,
        }
    }

    pub(crate) fn selector_mut(&mut self) -> Option<&mut SelectorNode> {
        match &mut self.variant {
            NodeVariant::Selector(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn free_string_mut(&mut self) -> Option<&mut FreeStringNode> {
        match &mut self.variant {
            NodeVariant::FreeString(f) => Some(f),
            _ => None,
        }
    }

    pub(crate) fn set_first_child(&mut self, child: Option<NodeId>) {
        self.first_child = child;
    }

    pub(crate) fn set_next_sibling(&mut self, sibling: Option<NodeId>) {
        self.next_sibling = sibling;
    }

    pub(crate) fn mark_attached(&mut self) {
        self.attached = true;
    }
}
