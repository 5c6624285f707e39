//! Unit tests for the type registry.

use crate::grammar::{Node, NodeType, NodeVariant};
use crate::registry::{MatchResult, NodeBehavior, RegistryError, TypeRegistry};

struct NullBehavior;

impl NodeBehavior for NullBehavior {
    fn matches(&self, _node: &Node, _input: &str) -> MatchResult {
        MatchResult::NoMatch
    }

    fn alt_text(&self, _node: &Node) -> String {
        "<null>".to_string()
    }
}

#[test]
fn register_binds_each_type_once() {
    let mut registry = TypeRegistry::new();
    assert!(registry.is_empty());

    assert_eq!(
        registry.register(NodeType::Keyword, Box::new(NullBehavior)),
        Ok(())
    );
    assert_eq!(registry.len(), 1);

    assert_eq!(
        registry.register(NodeType::Keyword, Box::new(NullBehavior)),
        Err(RegistryError::AlreadyRegistered {
            node_type: NodeType::Keyword
        })
    );
}

#[test]
fn lookup_fails_only_for_unregistered_types() {
    let mut registry = TypeRegistry::new();
    let _ = registry.register(NodeType::Integer, Box::new(NullBehavior));

    assert!(registry.behavior_for(NodeType::Integer).is_ok());
    assert_eq!(
        registry.behavior_for(NodeType::Selector).err(),
        Some(RegistryError::NotRegistered {
            node_type: NodeType::Selector
        })
    );
}

#[test]
fn registered_behavior_is_dispatched() {
    let mut registry = TypeRegistry::new();
    let _ = registry.register(NodeType::Branch, Box::new(NullBehavior));

    let node = Node::new(NodeVariant::for_type(NodeType::Branch));
    let behavior = match registry.behavior_for(NodeType::Branch) {
        Ok(b) => b,
        Err(e) => unreachable!("behavior registered above: {e}"),
    };
    assert_eq!(behavior.matches(&node, "anything"), MatchResult::NoMatch);
    assert_eq!(behavior.alt_text(&node), "<null>");
}
