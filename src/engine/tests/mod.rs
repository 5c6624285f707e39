//! Unit tests for the engine's selection state machine.
//!
//! The per-type match algorithms are tested next to their
//! implementations; these tests cover candidate selection, priority
//! tie-breaking, privilege gating, zero-consuming traversal, and the
//! help-mode walk.

#![allow(clippy::unwrap_used, clippy::panic)]

use crate::control::{ControlContext, SlotEffect};
use crate::engine::{EngineError, HelpOutcome, MatchEngine, Outcome, builtin_registry};
use crate::grammar::{NodeArena, NodeId, NodeType, NodeVariant};
use crate::registry::TypeRegistry;

struct Fixture {
    arena: NodeArena,
    registry: TypeRegistry,
    root: NodeId,
}

impl Fixture {
    fn new() -> Self {
        let mut arena = NodeArena::new();
        let root = arena.alloc(NodeVariant::for_type(NodeType::Branch));
        Self {
            arena,
            registry: builtin_registry().unwrap(),
            root,
        }
    }

    fn keyword(&mut self, parent: NodeId, text: &str, minimum: usize) -> NodeId {
        let id = self.arena.alloc(NodeVariant::for_type(NodeType::Keyword));
        if let NodeVariant::Keyword(k) = self.arena.get_mut(id).unwrap().variant_mut() {
            k.keyword = text.to_string();
            k.minimum_match = minimum;
        }
        self.arena.attach(parent, id).unwrap();
        id
    }

    fn integer(&mut self, parent: NodeId, min: i64, max: i64, index: usize) -> NodeId {
        let id = self.arena.alloc(NodeVariant::for_type(NodeType::Integer));
        if let NodeVariant::Integer(node) = self.arena.get_mut(id).unwrap().variant_mut() {
            node.min = min;
            node.max = max;
            node.index = index;
        }
        self.arena.attach(parent, id).unwrap();
        id
    }

    fn branch(&mut self, parent: NodeId) -> NodeId {
        let id = self.arena.alloc(NodeVariant::for_type(NodeType::Branch));
        self.arena.attach(parent, id).unwrap();
        id
    }

    fn constant(&mut self, parent: NodeId, write: SlotEffect) -> NodeId {
        let id = self.arena.alloc(NodeVariant::for_type(NodeType::Constant));
        if let NodeVariant::Constant(node) = self.arena.get_mut(id).unwrap().variant_mut() {
            node.write = Some(write);
        }
        self.arena.attach(parent, id).unwrap();
        id
    }

    fn run(&self, line: &str, ctl: &mut ControlContext) -> Result<Outcome, EngineError> {
        ctl.load_line(line);
        MatchEngine::new(&self.arena, &self.registry).execute(self.root, ctl)
    }

    fn help(&self, prefix: &str, ctl: &mut ControlContext) -> HelpOutcome {
        ctl.load_line(prefix);
        MatchEngine::new(&self.arena, &self.registry)
            .enumerate_help(self.root, ctl)
            .unwrap()
    }
}

#[test]
fn keyword_effect_lands_in_slot() {
    let mut fx = Fixture::new();
    let show = fx.keyword(fx.root, "show", 4);
    if let NodeVariant::Keyword(k) = fx.arena.get_mut(show).unwrap().variant_mut() {
        k.effect = Some(SlotEffect::Integer { index: 1, value: 5 });
    }

    let mut ctl = ControlContext::new();
    assert_eq!(fx.run("show", &mut ctl).unwrap(), Outcome::Complete);
    assert_eq!(ctl.get_integer(1), Ok(5));

    // Matching the same line again is idempotent.
    assert_eq!(fx.run("show", &mut ctl).unwrap(), Outcome::Complete);
    assert_eq!(ctl.get_integer(1), Ok(5));
}

#[test]
fn keyword_literal_beats_integer_on_same_span() {
    let mut fx = Fixture::new();
    // Declare the integer node first so priority, not declaration order,
    // must decide the winner.
    fx.integer(fx.root, 0, 100, 0);
    let kw = fx.keyword(fx.root, "20", 2);
    if let NodeVariant::Keyword(k) = fx.arena.get_mut(kw).unwrap().variant_mut() {
        k.effect = Some(SlotEffect::Integer {
            index: 1,
            value: -1,
        });
    }

    let mut ctl = ControlContext::new();
    assert_eq!(fx.run("20", &mut ctl).unwrap(), Outcome::Complete);
    // The keyword's effect ran; the integer node's slot 0 write did not.
    assert_eq!(ctl.get_integer(1), Ok(-1));
    assert_eq!(ctl.get_integer(0), Ok(0));
}

#[test]
fn declaration_order_breaks_same_type_ties() {
    let mut fx = Fixture::new();
    let first = fx.keyword(fx.root, "shutdown", 2);
    let second = fx.keyword(fx.root, "show", 2);
    if let NodeVariant::Keyword(k) = fx.arena.get_mut(first).unwrap().variant_mut() {
        k.effect = Some(SlotEffect::Integer { index: 0, value: 1 });
    }
    if let NodeVariant::Keyword(k) = fx.arena.get_mut(second).unwrap().variant_mut() {
        k.effect = Some(SlotEffect::Integer { index: 0, value: 2 });
    }

    // "sh" satisfies both minimum-match lengths; the first declared wins.
    let mut ctl = ControlContext::new();
    assert_eq!(fx.run("sh", &mut ctl).unwrap(), Outcome::Complete);
    assert_eq!(ctl.get_integer(0), Ok(1));
}

#[test]
fn privilege_gated_nodes_are_skipped_entirely() {
    let mut fx = Fixture::new();
    let secret = fx.keyword(fx.root, "debug", 5);
    fx.arena
        .get_mut(secret)
        .unwrap()
        .flags_mut()
        .set_privilege(15);

    let mut ctl = ControlContext::new();
    assert_eq!(
        fx.run("debug", &mut ctl).unwrap(),
        Outcome::Unrecognized { cursor: 0 }
    );

    ctl.set_privilege(15);
    assert_eq!(fx.run("debug", &mut ctl).unwrap(), Outcome::Complete);
}

#[test]
fn branch_fans_out_without_consuming_input() {
    let mut fx = Fixture::new();
    let show = fx.keyword(fx.root, "show", 4);
    let fork = fx.branch(show);
    fx.keyword(fork, "version", 7);
    fx.keyword(fork, "clock", 5);

    let mut ctl = ControlContext::new();
    assert_eq!(fx.run("show clock", &mut ctl).unwrap(), Outcome::Complete);
    assert_eq!(fx.run("show version", &mut ctl).unwrap(), Outcome::Complete);
}

#[test]
fn constant_chain_completes_at_end_of_line() {
    let mut fx = Fixture::new();
    let show = fx.keyword(fx.root, "show", 4);
    fx.constant(show, SlotEffect::Integer { index: 2, value: 99 });

    let mut ctl = ControlContext::new();
    assert_eq!(fx.run("show", &mut ctl).unwrap(), Outcome::Complete);
    assert_eq!(ctl.get_integer(2), Ok(99));
}

#[test]
fn missing_required_argument_is_incomplete() {
    let mut fx = Fixture::new();
    let show = fx.keyword(fx.root, "show", 4);
    fx.keyword(show, "version", 7);

    let mut ctl = ControlContext::new();
    assert_eq!(
        fx.run("show", &mut ctl).unwrap(),
        Outcome::Incomplete { cursor: 4 }
    );
}

#[test]
fn unrecognized_input_reports_the_cursor() {
    let mut fx = Fixture::new();
    let set = fx.keyword(fx.root, "mtu", 3);
    fx.integer(set, 1, 100, 0);

    let mut ctl = ControlContext::new();
    assert_eq!(
        fx.run("mtu 150", &mut ctl).unwrap(),
        Outcome::Unrecognized { cursor: 4 }
    );
}

#[test]
fn trailing_garbage_after_terminal_is_unrecognized() {
    let mut fx = Fixture::new();
    fx.keyword(fx.root, "exit", 4);

    let mut ctl = ControlContext::new();
    assert_eq!(
        fx.run("exit now", &mut ctl).unwrap(),
        Outcome::Unrecognized { cursor: 5 }
    );
}

#[test]
fn leading_whitespace_is_ignored() {
    let mut fx = Fixture::new();
    fx.keyword(fx.root, "exit", 4);

    let mut ctl = ControlContext::new();
    assert_eq!(fx.run("   exit", &mut ctl).unwrap(), Outcome::Complete);
}

#[test]
fn committed_effect_failure_keeps_the_cursor() {
    let mut fx = Fixture::new();
    let kw = fx.keyword(fx.root, "boom", 4);
    if let NodeVariant::Keyword(k) = fx.arena.get_mut(kw).unwrap().variant_mut() {
        k.effect = Some(SlotEffect::Integer {
            index: 999,
            value: 1,
        });
    }

    let mut ctl = ControlContext::new();
    ctl.load_line("boom");
    let engine = MatchEngine::new(&fx.arena, &fx.registry);
    let result = engine.execute(fx.root, &mut ctl);

    assert!(matches!(result, Err(EngineError::Effect(_))));
    // No rollback across a committed node.
    assert_eq!(ctl.cursor(), 4);
}

#[test]
fn help_lists_visible_siblings_with_alt_text() {
    let mut fx = Fixture::new();
    let show = fx.keyword(fx.root, "show", 4);
    let version = fx.keyword(show, "version", 7);
    fx.arena
        .get_mut(version)
        .unwrap()
        .set_help("System hardware and software status");
    fx.integer(show, 1, 100, 0);

    let mut ctl = ControlContext::new();
    let HelpOutcome::Entries(entries) = fx.help("show ", &mut ctl) else {
        panic!("prefix should parse");
    };
    let alts: Vec<_> = entries.iter().map(|e| e.alt_text.as_str()).collect();
    assert_eq!(alts, vec!["version", "<1-100>"]);
    assert_eq!(entries[0].help_text, "System hardware and software status");
}

#[test]
fn help_suppresses_hidden_and_invisible_nodes() {
    let mut fx = Fixture::new();
    let visible = fx.keyword(fx.root, "visible", 7);
    let hidden = fx.keyword(fx.root, "hidden", 6);
    let invisible = fx.keyword(fx.root, "unseen", 6);
    fx.arena.get_mut(visible).unwrap().set_help("shown");
    fx.arena.get_mut(hidden).unwrap().flags_mut().set_hidden(true);
    fx.arena
        .get_mut(invisible)
        .unwrap()
        .flags_mut()
        .set_invisible(true);

    let mut ctl = ControlContext::new();
    let HelpOutcome::Entries(entries) = fx.help("", &mut ctl) else {
        panic!("empty prefix should enumerate the root");
    };
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].alt_text, "visible");

    // Hidden nodes still match normally.
    assert_eq!(fx.run("hidden", &mut ctl).unwrap(), Outcome::Complete);
}

#[test]
fn help_expands_branches_into_their_children() {
    let mut fx = Fixture::new();
    let fork = fx.branch(fx.root);
    fx.keyword(fork, "alpha", 5);
    fx.keyword(fork, "beta", 4);

    let mut ctl = ControlContext::new();
    let HelpOutcome::Entries(entries) = fx.help("", &mut ctl) else {
        panic!("empty prefix should enumerate the root");
    };
    let alts: Vec<_> = entries.iter().map(|e| e.alt_text.as_str()).collect();
    assert_eq!(alts, vec!["alpha", "beta"]);
}

#[test]
fn help_on_terminal_renders_cr() {
    let mut fx = Fixture::new();
    fx.keyword(fx.root, "exit", 4);

    let mut ctl = ControlContext::new();
    let HelpOutcome::Entries(entries) = fx.help("exit ", &mut ctl) else {
        panic!("prefix should parse");
    };
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].alt_text, "<cr>");
}

#[test]
fn help_does_not_mutate_slots_or_cursor() {
    let mut fx = Fixture::new();
    let kw = fx.keyword(fx.root, "show", 4);
    if let NodeVariant::Keyword(k) = fx.arena.get_mut(kw).unwrap().variant_mut() {
        k.effect = Some(SlotEffect::Integer { index: 0, value: 9 });
    }
    fx.keyword(kw, "version", 7);

    let mut ctl = ControlContext::new();
    let _ = fx.help("show ", &mut ctl);
    assert_eq!(ctl.get_integer(0), Ok(0));
    assert_eq!(ctl.cursor(), 0);
}

#[test]
fn help_past_a_terminal_is_unrecognized() {
    let mut fx = Fixture::new();
    fx.keyword(fx.root, "exit", 4);

    let mut ctl = ControlContext::new();
    assert_eq!(
        fx.help("exit garbage ", &mut ctl),
        HelpOutcome::Unrecognized { cursor: 5 }
    );
}

#[test]
fn help_on_unparseable_prefix_reports_cursor() {
    let mut fx = Fixture::new();
    fx.keyword(fx.root, "show", 4);

    let mut ctl = ControlContext::new();
    assert_eq!(
        fx.help("bogus ", &mut ctl),
        HelpOutcome::Unrecognized { cursor: 0 }
    );
}
