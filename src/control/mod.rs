//! Per-session control context: the input line cursor and the slot store.
//!
//! Slots are untyped storage cells written as side effects of successful
//! matches. A given index may hold an integer for one command and a string
//! for another; the store only enforces the physical array bounds.

use thiserror::Error;


/// Maximum stored length of a string slot value, in bytes.
///
/// Longer values are silently truncated at the nearest character boundary.
pub const STRING_SLOT_MAX: usize = 32;

/// Default number of slots in each bank when none is configured.
pub const DEFAULT_SLOT_CAPACITY: usize = 16;

/// Highest privilege level a session or node can carry.
pub const PRIVILEGE_MAX: u8 = 15;

/// Errors reported by the slot store.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ControlError {
    /// A slot index was outside the configured capacity of its bank.
    #[error("slot index {index} out of range (capacity {capacity})")]
    SlotOutOfRange {
        /// The offending index.
        index: usize,
        /// Configured capacity of the addressed bank.
        capacity: usize,
    },

    /// A bit position was outside the width of a 64-bit integer slot.
    #[error("bit position {bit} out of range for a 64-bit slot")]
    BitOutOfRange {
        /// The offending bit position.
        bit: u32,
    },
}

/// Address family discriminator for parsed address values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    /// 32-bit IPv4 address.
    V4,
    /// 128-bit IPv6 address.
    V6,
    /// 48-bit Ethernet MAC address.
    Mac,
}

impl AddressFamily {
    /// Number of significant bytes for this family.
    pub fn width(self) -> usize {
        match self {
            AddressFamily::V4 => 4,
            AddressFamily::V6 => 16,
            AddressFamily::Mac => 6,
        }
    }
}

/// A parsed network address with optional prefix length.
///
/// The byte buffer is left-justified: 4 bytes used for IPv4, 16 for IPv6,
/// 6 for MAC, remaining bytes zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    family: AddressFamily,
    mask: Option<u8>,
    octets: [u8; 16],
}

impl Address {
    /// Builds an address record from its family, significant bytes, and
    /// optional mask length. Bytes beyond the family's width are ignored.
    pub fn new(family: AddressFamily, bytes: &[u8], mask: Option<u8>) -> Self {
        let mut octets = [0u8; 16];
        let len = family.width().min(bytes.len());
        octets[..len].copy_from_slice(&bytes[..len]);
        Self {
            family,
            mask,
            octets,
        }
    }

    /// The address family.
    pub fn family(&self) -> AddressFamily {
        self.family
    }

    /// The prefix length, if one was supplied.
    pub fn mask(&self) -> Option<u8> {
        self.mask
    }

    /// The significant bytes of the address, in network byte order.
    pub fn bytes(&self) -> &[u8] {
        &self.octets[..self.family.width()]
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.family {
            AddressFamily::V4 => {
                let b = self.bytes();
                write!(f, "{}.{}.{}.{}", b[0], b[1], b[2], b[3])?;
            }
            AddressFamily::V6 => {
                let mut groups = [0u16; 8];
                for (i, group) in groups.iter_mut().enumerate() {
                    *group = u16::from_be_bytes([self.octets[i * 2], self.octets[i * 2 + 1]]);
                }
                let v6 = std::net::Ipv6Addr::new(
                    groups[0], groups[1], groups[2], groups[3], groups[4], groups[5], groups[6],
                    groups[7],
                );
                write!(f, "{v6}")?;
            }
            AddressFamily::Mac => {
                let b = self.bytes();
                write!(
                    f,
                    "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
                    b[0], b[1], b[2], b[3], b[4], b[5]
                )?;
            }
        }
        if let Some(mask) = self.mask {
            write!(f, "/{mask}")?;
        }
        Ok(())
    }
}

/// One slot write produced by a successful match.
///
/// Keyword and constant nodes carry these as configuration; integer,
/// address, and free-string nodes synthesize them from parsed input.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotEffect {
    /// Store an integer value at the indexed integer slot.
    Integer {
        /// Target integer slot.
        index: usize,
        /// Value to store.
        value: i64,
    },

    /// Set one bit within the indexed integer slot (read-modify-write).
    Bit {
        /// Target integer slot.
        index: usize,
        /// Bit position, 0–63.
        bit: u32,
    },

    /// Store text at the indexed string slot, truncated to the bound.
    Text {
        /// Target string slot.
        index: usize,
        /// Text to store.
        text: String,
    },

    /// Store a parsed address at the indexed address slot.
    Address {
        /// Target address slot.
        index: usize,
        /// Parsed address record.
        address: Address,
    },
}

/// Truncates `text` to at most `max` bytes without splitting a character.
pub(crate) fn truncate_to(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

/// Per-session match state: the raw input line, the consumption cursor,
/// the slot banks, and the active privilege level.
#[derive(Debug, Clone)]
pub struct ControlContext {
    line: String,
    cursor: usize,
    integers: Vec<i64>,
    strings: Vec<String>,
    addresses: Vec<Option<Address>>,
    privilege: u8,
}

impl Default for ControlContext {
    fn default() -> Self {
        Self::with_capacity(
            DEFAULT_SLOT_CAPACITY,
            DEFAULT_SLOT_CAPACITY,
            DEFAULT_SLOT_CAPACITY,
        )
    }
}

impl ControlContext {
    /// Creates a context with the default slot capacities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context with explicit capacities for each slot bank.
    pub fn with_capacity(integers: usize, strings: usize, addresses: usize) -> Self {
        Self {
            line: String::new(),
            cursor: 0,
            integers: vec![0; integers],
            strings: vec![String::new(); strings],
            addresses: vec![None; addresses],
            privilege: 0,
        }
    }

    /// Capacity of the integer slot bank.
    pub fn integer_capacity(&self) -> usize {
        self.integers.len()
    }

    /// Capacity of the string slot bank.
    pub fn string_capacity(&self) -> usize {
        self.strings.len()
    }

    /// Capacity of the address slot bank.
    pub fn address_capacity(&self) -> usize {
        self.addresses.len()
    }

    /// Reads the integer slot at `index`.
    ///
    /// # Errors
    /// Returns `ControlError::SlotOutOfRange` if `index` is beyond the
    /// configured capacity.
    pub fn get_integer(&self, index: usize) -> Result<i64, ControlError> {
        self.integers
            .get(index)
            .copied()
            .ok_or(ControlError::SlotOutOfRange {
                index,
                capacity: self.integers.len(),
            })
    }

    /// Writes the integer slot at `index`.
    ///
    /// # Errors
    /// Returns `ControlError::SlotOutOfRange` if `index` is beyond the
    /// configured capacity.
    pub fn set_integer(&mut self, index: usize, value: i64) -> Result<(), ControlError> {
        let capacity = self.integers.len();
        let slot = self
            .integers
            .get_mut(index)
            .ok_or(ControlError::SlotOutOfRange { index, capacity })?;
        *slot = value;
        Ok(())
    }

    /// Reads the string slot at `index`.
    ///
    /// # Errors
    /// Returns `ControlError::SlotOutOfRange` if `index` is beyond the
    /// configured capacity.
    pub fn get_string(&self, index: usize) -> Result<&str, ControlError> {
        self.strings
            .get(index)
            .map(String::as_str)
            .ok_or(ControlError::SlotOutOfRange {
                index,
                capacity: self.strings.len(),
            })
    }

    /// Writes the string slot at `index`, truncating to the slot bound.
    ///
    /// # Errors
    /// Returns `ControlError::SlotOutOfRange` if `index` is beyond the
    /// configured capacity.
    pub fn set_string(&mut self, index: usize, text: &str) -> Result<(), ControlError> {
        let capacity = self.strings.len();
        let slot = self
            .strings
            .get_mut(index)
            .ok_or(ControlError::SlotOutOfRange { index, capacity })?;
        *slot = truncate_to(text, STRING_SLOT_MAX);
        Ok(())
    }

    /// Reads the address slot at `index`. `None` means never written.
    ///
    /// # Errors
    /// Returns `ControlError::SlotOutOfRange` if `index` is beyond the
    /// configured capacity.
    pub fn get_address(&self, index: usize) -> Result<Option<&Address>, ControlError> {
        self.addresses
            .get(index)
            .map(Option::as_ref)
            .ok_or(ControlError::SlotOutOfRange {
                index,
                capacity: self.addresses.len(),
            })
    }

    /// Writes the address slot at `index`.
    ///
    /// # Errors
    /// Returns `ControlError::SlotOutOfRange` if `index` is beyond the
    /// configured capacity.
    pub fn set_address(&mut self, index: usize, address: Address) -> Result<(), ControlError> {
        let capacity = self.addresses.len();
        let slot = self
            .addresses
            .get_mut(index)
            .ok_or(ControlError::SlotOutOfRange { index, capacity })?;
        *slot = Some(address);
        Ok(())
    }

    /// Applies one slot effect against the store.
    ///
    /// # Errors
    /// Returns `ControlError::SlotOutOfRange` or `ControlError::BitOutOfRange`
    /// when the effect addresses storage that does not exist.
    pub fn apply(&mut self, effect: &SlotEffect) -> Result<(), ControlError> {
        match effect {
            SlotEffect::Integer { index, value } => self.set_integer(*index, *value),
            SlotEffect::Bit { index, bit } => {
                if *bit > 63 {
                    return Err(ControlError::BitOutOfRange { bit: *bit });
                }
                let current = self.get_integer(*index)?;
                self.set_integer(*index, current | (1i64 << bit))
            }
            SlotEffect::Text { index, text } => self.set_string(*index, text),
            SlotEffect::Address { index, address } => self.set_address(*index, *address),
        }
    }

    /// Loads a fresh input line and resets the cursor.
    pub fn load_line(&mut self, line: &str) {
        self.line = line.to_string();
        self.cursor = 0;
    }

    /// The full input line currently loaded.
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Number of bytes of the line already consumed.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The unconsumed remainder of the line.
    pub fn rest(&self) -> &str {
        &self.line[self.cursor..]
    }

    /// Advances the cursor by `consumed` bytes, saturating at line end.
    pub fn advance(&mut self, consumed: usize) {
        self.cursor = (self.cursor + consumed).min(self.line.len());
    }

    /// The active privilege level, 0–15.
    pub fn privilege(&self) -> u8 {
        self.privilege
    }

    /// Sets the active privilege level, clamped to the valid range.
    pub fn set_privilege(&mut self, level: u8) {
        self.privilege = level.min(PRIVILEGE_MAX);
    }
}
