//! Integer node matching.

use crate::control::SlotEffect;
use crate::grammar::{IntegerFormats, IntegerNode, Node, NodeVariant};
use crate::registry::{MatchResult, NodeBehavior};

use super::token::scan_token;

/// Matches signed 64-bit literals in the node's enabled bases.
pub(crate) struct IntegerBehavior;

impl NodeBehavior for IntegerBehavior {
    fn matches(&self, node: &Node, input: &str) -> MatchResult {
        let NodeVariant::Integer(integer) = node.variant() else {
            return MatchResult::NoMatch;
        };
        match_integer(integer, input)
    }

    fn alt_text(&self, node: &Node) -> String {
        match node.variant() {
            NodeVariant::Integer(integer)
                if integer.min == i64::MIN && integer.max == i64::MAX =>
            {
                "<integer>".to_string()
            }
            NodeVariant::Integer(integer) => format!("<{}-{}>", integer.min, integer.max),
            _ => String::new(),
        }
    }
}

fn match_integer(integer: &IntegerNode, input: &str) -> MatchResult {
    let (token, consumed) = scan_token(input);
    let Some(value) = parse_literal(token, integer.formats) else {
        return MatchResult::NoMatch;
    };
    if value < integer.min || value > integer.max {
        return MatchResult::NoMatch;
    }
    MatchResult::Match {
        consumed,
        effect: Some(SlotEffect::Integer {
            index: integer.index,
            value,
        }),
    }
}

/// Parses a whole token as a signed 64-bit literal.
///
/// Base is disambiguated by the usual prefixes: `0x` hex, `0b` binary, a
/// leading `0` with further digits octal, anything else decimal. A sign
/// is only meaningful in decimal. Returns `None` when no digits are
/// present, the apparent base is disabled, or the value overflows.
fn parse_literal(token: &str, formats: IntegerFormats) -> Option<i64> {
    let (negative, body) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };

    let (base, digits, format) = if let Some(rest) =
        body.strip_prefix("0x").or_else(|| body.strip_prefix("0X"))
    {
        (16, rest, IntegerFormats::HEXADECIMAL)
    } else if let Some(rest) = body.strip_prefix("0b").or_else(|| body.strip_prefix("0B")) {
        (2, rest, IntegerFormats::BINARY)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..], IntegerFormats::OCTAL)
    } else {
        (10, body, IntegerFormats::DECIMAL)
    };

    if digits.is_empty() || !formats.contains(format) {
        return None;
    }
    if negative && base != 10 {
        return None;
    }

    if negative {
        i64::from_str_radix(&format!("-{digits}"), base).ok()
    } else {
        i64::from_str_radix(digits, base).ok()
    }
}
