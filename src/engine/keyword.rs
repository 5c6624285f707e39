//! Keyword node matching.

use crate::grammar::{KeywordNode, Node, NodeVariant};
use crate::registry::{MatchResult, NodeBehavior};

use super::token::whitespace_run;

/// Matches constant alphanumeric keywords with prefix abbreviation.
pub(crate) struct KeywordBehavior;

impl NodeBehavior for KeywordBehavior {
    fn matches(&self, node: &Node, input: &str) -> MatchResult {
        let NodeVariant::Keyword(keyword) = node.variant() else {
            return MatchResult::NoMatch;
        };
        match_keyword(keyword, input)
    }

    fn alt_text(&self, node: &Node) -> String {
        match node.variant() {
            NodeVariant::Keyword(keyword) => keyword.keyword.clone(),
            _ => String::new(),
        }
    }
}

/// Compares the keyword against the unconsumed input byte-by-byte.
///
/// End-of-input and whitespace are equivalent keyword terminators: input
/// ending anywhere past the minimum-match prefix is accepted, and input
/// continuing with a non-space character beyond the keyword is a
/// non-match. Accepted matches absorb the trailing whitespace run.
fn match_keyword(keyword: &KeywordNode, input: &str) -> MatchResult {
    if keyword.keyword.is_empty() {
        return MatchResult::NoMatch;
    }

    let want = keyword.keyword.as_bytes();
    let have = input.as_bytes();
    let mut matched = 0;
    loop {
        match (want.get(matched), have.get(matched)) {
            (Some(w), Some(h)) if w == h => matched += 1,
            (_, None) => break,
            (_, Some(h)) if h.is_ascii_whitespace() => break,
            // Mismatch, or input running past the keyword end.
            _ => return MatchResult::NoMatch,
        }
    }

    if matched < keyword.minimum_match.min(keyword.keyword.len()) {
        return MatchResult::NoMatch;
    }

    let consumed = matched + whitespace_run(&input[matched..]);
    MatchResult::Match {
        consumed,
        effect: keyword.effect.clone(),
    }
}
