//! Branch, constant, selector, and free-string node matching.

use crate::control::{STRING_SLOT_MAX, SlotEffect, truncate_to};
use crate::grammar::{Node, NodeVariant, SelectorNode};
use crate::registry::{MatchResult, NodeBehavior};

use super::token::scan_token;

/// Branch nodes consume nothing and always match; they exist only to fan
/// out to multiple children.
pub(crate) struct BranchBehavior;

impl NodeBehavior for BranchBehavior {
    fn matches(&self, node: &Node, _input: &str) -> MatchResult {
        match node.variant() {
            NodeVariant::Branch => MatchResult::Match {
                consumed: 0,
                effect: None,
            },
            _ => MatchResult::NoMatch,
        }
    }

    fn alt_text(&self, _node: &Node) -> String {
        // Branches are expanded into their children during help
        // enumeration and never rendered themselves.
        String::new()
    }
}

/// Constant nodes consume nothing, always match, and stamp a configured
/// value when the branch through them is taken.
pub(crate) struct ConstantBehavior;

impl NodeBehavior for ConstantBehavior {
    fn matches(&self, node: &Node, _input: &str) -> MatchResult {
        match node.variant() {
            NodeVariant::Constant(constant) => MatchResult::Match {
                consumed: 0,
                effect: constant.write.clone(),
            },
            _ => MatchResult::NoMatch,
        }
    }

    fn alt_text(&self, _node: &Node) -> String {
        "<cr>".to_string()
    }
}

/// Selector nodes match one token against a curated keyword subset,
/// accepting exact members and unambiguous prefixes.
pub(crate) struct SelectorBehavior;

impl NodeBehavior for SelectorBehavior {
    fn matches(&self, node: &Node, input: &str) -> MatchResult {
        let NodeVariant::Selector(selector) = node.variant() else {
            return MatchResult::NoMatch;
        };
        match_selector(selector, input)
    }

    fn alt_text(&self, node: &Node) -> String {
        match node.variant() {
            NodeVariant::Selector(selector) => format!("{{{}}}", selector.keywords.join("|")),
            _ => String::new(),
        }
    }
}

fn match_selector(selector: &SelectorNode, input: &str) -> MatchResult {
    let (token, consumed) = scan_token(input);
    if token.is_empty() {
        return MatchResult::NoMatch;
    }

    let chosen = if let Some(exact) = selector.keywords.iter().find(|k| *k == token) {
        exact
    } else {
        let mut candidates = selector.keywords.iter().filter(|k| k.starts_with(token));
        match (candidates.next(), candidates.next()) {
            (Some(only), None) => only,
            // No candidate, or an ambiguous abbreviation.
            _ => return MatchResult::NoMatch,
        }
    };

    MatchResult::Match {
        consumed,
        effect: Some(SlotEffect::Text {
            index: selector.index,
            text: chosen.clone(),
        }),
    }
}

/// Free-string nodes accept any single bounded token and capture it.
pub(crate) struct FreeStringBehavior;

impl NodeBehavior for FreeStringBehavior {
    fn matches(&self, node: &Node, input: &str) -> MatchResult {
        let NodeVariant::FreeString(free) = node.variant() else {
            return MatchResult::NoMatch;
        };
        let (token, consumed) = scan_token(input);
        if token.is_empty() {
            return MatchResult::NoMatch;
        }
        MatchResult::Match {
            consumed,
            effect: Some(SlotEffect::Text {
                index: free.index,
                text: truncate_to(token, STRING_SLOT_MAX),
            }),
        }
    }

    fn alt_text(&self, _node: &Node) -> String {
        "<string>".to_string()
    }
}
