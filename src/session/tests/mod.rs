//! Unit tests for the session construction and configuration surface.

#![allow(clippy::unwrap_used, clippy::panic)]

use crate::control::{ControlContext, ControlError};
use crate::core::CmdtreeError;
use crate::engine::Outcome;
use crate::grammar::{GrammarError, IntegerFormats, NodeType, NodeVariant};
use crate::session::Session;

fn session() -> Session {
    Session::new().unwrap()
}

#[test]
fn create_tree_returns_branch_root() {
    let mut s = session();
    let tree = s.create_tree("exec", None).unwrap();
    let root = s.tree_root(tree).unwrap();

    assert_eq!(s.node(root).unwrap().node_type(), NodeType::Branch);
    assert_eq!(s.tree(tree).unwrap().name(), "exec");
    assert_eq!(s.tree(tree).unwrap().parent(), None);
}

#[test]
fn tree_roots_cannot_be_reattached() {
    let mut s = session();
    let tree = s.create_tree("exec", None).unwrap();
    let root = s.tree_root(tree).unwrap();
    let other = s.create_node(NodeType::Branch);

    let result = s.attach_child(other, root);
    assert!(matches!(
        result,
        Err(CmdtreeError::Grammar(GrammarError::AlreadyAttached { .. }))
    ));
}

#[test]
fn keyword_configuration_validates_charset() {
    let mut s = session();
    let node = s.create_node(NodeType::Keyword);

    assert!(s.set_keyword(node, "show-run").is_ok());
    for bad in ["", "has space", "punct!", "Ünïcode"] {
        assert!(
            matches!(
                s.set_keyword(node, bad),
                Err(CmdtreeError::Grammar(GrammarError::InvalidKeyword { .. }))
            ),
            "keyword {bad:?}"
        );
    }
}

#[test]
fn minimum_match_is_clamped_to_keyword_length() {
    let mut s = session();
    let node = s.create_node(NodeType::Keyword);
    s.set_keyword(node, "show").unwrap();

    s.set_minimum_match(node, 100).unwrap();
    let NodeVariant::Keyword(keyword) = s.node(node).unwrap().variant() else {
        panic!("keyword node expected");
    };
    assert_eq!(keyword.minimum_match, 4);
    assert!(s.node(node).unwrap().flags().has_min_match());
}

#[test]
fn set_keyword_resets_minimum_match() {
    let mut s = session();
    let node = s.create_node(NodeType::Keyword);
    s.set_keyword(node, "show").unwrap();
    s.set_minimum_match(node, 2).unwrap();
    s.set_keyword(node, "shutdown").unwrap();

    let NodeVariant::Keyword(keyword) = s.node(node).unwrap().variant() else {
        panic!("keyword node expected");
    };
    assert_eq!(keyword.minimum_match, 8);
}

#[test]
fn configuration_calls_enforce_node_type() {
    let mut s = session();
    let integer = s.create_node(NodeType::Integer);

    let result = s.set_keyword(integer, "nope");
    assert!(matches!(
        result,
        Err(CmdtreeError::Grammar(GrammarError::TypeMismatch {
            expected: NodeType::Keyword,
            actual: NodeType::Integer,
        }))
    ));

    let keyword = s.create_node(NodeType::Keyword);
    let result = s.set_integer_range(keyword, 0, 10);
    assert!(matches!(
        result,
        Err(CmdtreeError::Grammar(GrammarError::TypeMismatch {
            expected: NodeType::Integer,
            actual: NodeType::Keyword,
        }))
    ));
}

#[test]
fn slot_references_are_validated_at_configuration_time() {
    let mut s = Session::with_control(ControlContext::with_capacity(2, 2, 2)).unwrap();
    let keyword = s.create_node(NodeType::Keyword);
    s.set_keyword(keyword, "on").unwrap();

    assert!(s.set_keyword_effect_integer(keyword, 1, 5).is_ok());
    let result = s.set_keyword_effect_integer(keyword, 2, 5);
    assert!(matches!(
        result,
        Err(CmdtreeError::Grammar(GrammarError::Slot(
            ControlError::SlotOutOfRange {
                index: 2,
                capacity: 2
            }
        )))
    ));

    let result = s.set_keyword_effect_bit(keyword, 0, 64);
    assert!(matches!(
        result,
        Err(CmdtreeError::Grammar(GrammarError::Slot(
            ControlError::BitOutOfRange { bit: 64 }
        )))
    ));
}

#[test]
fn inverted_integer_range_is_rejected() {
    let mut s = session();
    let node = s.create_node(NodeType::Integer);

    assert!(matches!(
        s.set_integer_range(node, 10, 1),
        Err(CmdtreeError::Grammar(GrammarError::InvalidRange {
            min: 10,
            max: 1
        }))
    ));
    // Equal bounds are a legal degenerate range.
    assert!(s.set_integer_range(node, 10, 10).is_ok());
}

#[test]
fn effect_flags_mirror_the_configured_kind() {
    let mut s = session();
    let keyword = s.create_node(NodeType::Keyword);
    s.set_keyword(keyword, "flag").unwrap();

    s.set_keyword_effect_bit(keyword, 0, 7).unwrap();
    let flags = *s.node(keyword).unwrap().flags();
    assert!(flags.applies_value());
    assert!(flags.applies_bit());

    s.set_keyword_effect_integer(keyword, 0, 1).unwrap();
    let flags = *s.node(keyword).unwrap().flags();
    assert!(flags.applies_value());
    assert!(!flags.applies_bit());
}

#[test]
fn keyword_effect_string_truncates() {
    let mut s = session();
    let keyword = s.create_node(NodeType::Keyword);
    s.set_keyword(keyword, "name").unwrap();
    s.set_keyword_effect_string(keyword, 0, &"y".repeat(100)).unwrap();

    let tree = s.create_tree("exec", None).unwrap();
    let root = s.tree_root(tree).unwrap();
    s.attach_child(root, keyword).unwrap();

    assert_eq!(s.execute(tree, "name").unwrap(), Outcome::Complete);
    assert_eq!(s.control().get_string(0).map(str::len), Ok(32));
}

#[test]
fn selector_members_are_validated() {
    let mut s = session();
    let selector = s.create_node(NodeType::Selector);

    assert!(s
        .set_selector_keywords(selector, &["ethernet", "loopback"])
        .is_ok());
    assert!(matches!(
        s.set_selector_keywords(selector, &["ok", "not ok"]),
        Err(CmdtreeError::Grammar(GrammarError::InvalidKeyword { .. }))
    ));
}

#[test]
fn integer_formats_can_be_restricted() {
    let mut s = session();
    let tree = s.create_tree("exec", None).unwrap();
    let root = s.tree_root(tree).unwrap();
    let integer = s.create_node(NodeType::Integer);
    s.set_integer_formats(integer, IntegerFormats::DECIMAL).unwrap();
    s.set_integer_range(integer, 0, 255).unwrap();
    s.attach_child(root, integer).unwrap();

    assert_eq!(s.execute(tree, "200").unwrap(), Outcome::Complete);
    assert_eq!(
        s.execute(tree, "0xC8").unwrap(),
        Outcome::Unrecognized { cursor: 0 }
    );
}

#[test]
fn session_stays_usable_after_rejection() {
    let mut s = session();
    let tree = s.create_tree("exec", None).unwrap();
    let root = s.tree_root(tree).unwrap();
    let exit = s.create_node(NodeType::Keyword);
    s.set_keyword(exit, "exit").unwrap();
    s.attach_child(root, exit).unwrap();

    assert_eq!(
        s.execute(tree, "bogus").unwrap(),
        Outcome::Unrecognized { cursor: 0 }
    );
    assert_eq!(s.execute(tree, "exit").unwrap(), Outcome::Complete);
}
