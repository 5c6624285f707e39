//! Address node matching: IPv4, IPv6, and MAC-48 tokens.

use std::net::{Ipv4Addr, Ipv6Addr};

use crate::control::{Address, AddressFamily, SlotEffect};
use crate::grammar::{AddressFormats, AddressNode, Node, NodeVariant};
use crate::registry::{MatchResult, NodeBehavior};

use super::token::scan_token;

/// Matches one whitespace-delimited address token, optionally followed by
/// a `/`-prefixed mask length for the IP families.
pub(crate) struct AddressBehavior;

impl NodeBehavior for AddressBehavior {
    fn matches(&self, node: &Node, input: &str) -> MatchResult {
        let NodeVariant::Address(address) = node.variant() else {
            return MatchResult::NoMatch;
        };
        match_address(address, input)
    }

    fn alt_text(&self, node: &Node) -> String {
        let NodeVariant::Address(address) = node.variant() else {
            return String::new();
        };
        if address.formats == AddressFormats::IPV4 {
            "<A.B.C.D>".to_string()
        } else if address.formats == AddressFormats::IPV6 {
            "<X:X::X>".to_string()
        } else if address.formats == AddressFormats::MAC {
            "<H.H.H>".to_string()
        } else {
            "<address>".to_string()
        }
    }
}

fn match_address(address: &AddressNode, input: &str) -> MatchResult {
    let (token, consumed) = scan_token(input);
    if token.is_empty() {
        return MatchResult::NoMatch;
    }

    let (body, mask_text) = match token.split_once('/') {
        Some((body, mask)) => (body, Some(mask)),
        None => (token, None),
    };

    let Some(parsed) = parse_family(address.formats, body, mask_text) else {
        return MatchResult::NoMatch;
    };
    MatchResult::Match {
        consumed,
        effect: Some(SlotEffect::Address {
            index: address.index,
            address: parsed,
        }),
    }
}

fn parse_family(formats: AddressFormats, body: &str, mask_text: Option<&str>) -> Option<Address> {
    if formats.contains(AddressFormats::IPV4)
        && let Ok(v4) = body.parse::<Ipv4Addr>()
    {
        let mask = parse_mask(mask_text, 32)?;
        return Some(Address::new(AddressFamily::V4, &v4.octets(), mask));
    }

    if formats.contains(AddressFormats::IPV6)
        && let Ok(v6) = body.parse::<Ipv6Addr>()
    {
        let mask = parse_mask(mask_text, 128)?;
        return Some(Address::new(AddressFamily::V6, &v6.octets(), mask));
    }

    if formats.contains(AddressFormats::MAC)
        && mask_text.is_none()
        && let Some(mac) = parse_mac(body)
    {
        return Some(Address::new(AddressFamily::Mac, &mac, None));
    }

    None
}

/// Parses an optional mask suffix, rejecting lengths beyond the family
/// maximum. `None` input yields `Some(None)`: no mask is not an error.
fn parse_mask(mask_text: Option<&str>, max: u8) -> Option<Option<u8>> {
    match mask_text {
        None => Some(None),
        Some(text) => match text.parse::<u8>() {
            Ok(len) if len <= max => Some(Some(len)),
            _ => None,
        },
    }
}

/// Parses MAC-48 in colon-separated (`aa:bb:cc:dd:ee:ff`) or dotted
/// triplet (`aabb.ccdd.eeff`) notation.
fn parse_mac(body: &str) -> Option<[u8; 6]> {
    let mut bytes = [0u8; 6];

    if body.len() == 17 && body.matches(':').count() == 5 {
        for (i, group) in body.split(':').enumerate() {
            if group.len() != 2 {
                return None;
            }
            bytes[i] = u8::from_str_radix(group, 16).ok()?;
        }
        return Some(bytes);
    }

    if body.len() == 14 && body.matches('.').count() == 2 {
        for (i, group) in body.split('.').enumerate() {
            if group.len() != 4 {
                return None;
            }
            let pair = u16::from_str_radix(group, 16).ok()?;
            bytes[i * 2] = (pair >> 8) as u8;
            bytes[i * 2 + 1] = (pair & 0xff) as u8;
        }
        return Some(bytes);
    }

    None
}
