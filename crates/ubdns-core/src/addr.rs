//! Address records and result ordering.

use std::cmp::Ordering;

/// Address-family codes as seen at the ABI boundary.
pub const AF_UNSPEC: i32 = 0;
pub const AF_INET: i32 = 2;
pub const AF_INET6: i32 = 10;

/// Address family of a resolved record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    V4,
    V6,
}

impl Family {
    /// Maps an `AF_*` code to a family; anything other than `AF_INET`
    /// or `AF_INET6` is unsupported.
    pub fn from_af(af: i32) -> Option<Self> {
        match af {
            AF_INET => Some(Family::V4),
            AF_INET6 => Some(Family::V6),
            _ => None,
        }
    }

    /// The `AF_*` code for this family.
    pub fn af(self) -> i32 {
        match self {
            Family::V4 => AF_INET,
            Family::V6 => AF_INET6,
        }
    }

    /// Significant address length in bytes: 4 or 16.
    pub fn addr_len(self) -> usize {
        match self {
            Family::V4 => 4,
            Family::V6 => 16,
        }
    }
}

/// One resolved address: family, address bytes, and ordering scope.
///
/// The address buffer is fixed at 16 bytes with the significant prefix
/// determined by the family; IPv4 addresses are left-justified with
/// zero trailing bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    pub family: Family,
    pub bytes: [u8; 16],
    pub scope: u8,
}

impl Address {
    /// Builds a record from raw rdata. Returns `None` unless `data` is
    /// exactly the family's address length.
    pub fn new(family: Family, data: &[u8], scope: u8) -> Option<Self> {
        if data.len() != family.addr_len() {
            return None;
        }
        let mut bytes = [0u8; 16];
        bytes[..data.len()].copy_from_slice(data);
        Some(Self {
            family,
            bytes,
            scope,
        })
    }

    /// The significant address bytes.
    pub fn octets(&self) -> &[u8] {
        &self.bytes[..self.family.addr_len()]
    }
}

/// Result-list ordering: lowest scope first, IPv4 before IPv6 at equal
/// scope. Everything else compares equal, so a stable sort preserves
/// the relative input order of equal-ranked records.
pub fn address_order(a: &Address, b: &Address) -> Ordering {
    a.scope.cmp(&b.scope).then(match (a.family, b.family) {
        (Family::V4, Family::V6) => Ordering::Less,
        (Family::V6, Family::V4) => Ordering::Greater,
        _ => Ordering::Equal,
    })
}

/// Sorts a result list with [`address_order`], stably.
pub fn sort_addresses(list: &mut [Address]) {
    list.sort_by(address_order);
}
