//! Unit tests for the input processor.

#![allow(clippy::unwrap_used, clippy::panic)]

use crate::grammar::{NodeType, TreeId};
use crate::session::Session;
use crate::shell::{Cycle, ScriptSource, Shell};

fn sample_session() -> (Session, TreeId) {
    let mut s = Session::new().unwrap();
    let tree = s.create_tree("exec", None).unwrap();
    let root = s.tree_root(tree).unwrap();

    let show = s.create_node(NodeType::Keyword);
    s.set_keyword(show, "show").unwrap();
    s.set_help_text(show, "Show running system information").unwrap();
    s.attach_child(root, show).unwrap();

    let version = s.create_node(NodeType::Keyword);
    s.set_keyword(version, "version").unwrap();
    s.set_help_text(version, "System version").unwrap();
    s.set_keyword_effect_integer(version, 0, 1).unwrap();
    s.attach_child(show, version).unwrap();

    (s, tree)
}

fn run_script(lines: &[&str]) -> (String, String, Session, TreeId) {
    let (mut session, tree) = sample_session();
    let mut out = Vec::new();
    let mut err = Vec::new();
    {
        let source = ScriptSource::new(lines.iter().copied());
        let mut shell = Shell::new(source, &mut out, &mut err);
        shell.run(&mut session, tree).unwrap();
    }
    (
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
        session,
        tree,
    )
}

#[test]
fn complete_command_applies_effects_silently() {
    let (out, err, session, _) = run_script(&["show version"]);

    assert!(err.is_empty());
    assert!(out.starts_with("> "));
    assert_eq!(session.control().get_integer(0), Ok(1));
}

#[test]
fn line_terminators_are_trimmed() {
    let (_, err, session, _) = run_script(&["show version\r\n"]);

    assert!(err.is_empty());
    assert_eq!(session.control().get_integer(0), Ok(1));
}

#[test]
fn incomplete_command_is_reported() {
    let (_, err, _, _) = run_script(&["show"]);
    assert!(err.contains("% Incomplete command."));
}

#[test]
fn unrecognized_command_points_at_the_error() {
    let (_, err, _, _) = run_script(&["show bogus"]);

    // Prompt is two columns wide and "show " consumes five, so the caret
    // lands under the 'b'.
    assert!(err.contains(&format!("{}^", " ".repeat(7))));
    assert!(err.contains("% Invalid input detected at '^' marker."));
}

#[test]
fn blank_lines_are_ignored() {
    let (_, err, session, _) = run_script(&["", "   ", "show version"]);

    assert!(err.is_empty());
    assert_eq!(session.control().get_integer(0), Ok(1));
}

#[test]
fn help_sentinel_lists_options() {
    let (out, err, _, _) = run_script(&["show ?"]);

    assert!(err.is_empty());
    assert!(out.contains("version"));
    assert!(out.contains("System version"));
}

#[test]
fn help_does_not_consume_the_line() {
    let (_, _, session, _) = run_script(&["show version?"]);
    // The sentinel walk must not have applied the keyword effect.
    assert_eq!(session.control().get_integer(0), Ok(0));
}

#[test]
fn eof_ends_the_loop() {
    let (mut session, tree) = sample_session();
    let mut out = Vec::new();
    let mut err = Vec::new();
    let source = ScriptSource::new(Vec::<String>::new());
    let mut shell = Shell::new(source, &mut out, &mut err);

    assert_eq!(shell.process_line(&mut session, tree).unwrap(), Cycle::Eof);
}
