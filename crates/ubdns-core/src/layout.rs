//! Result record layout computation.
//!
//! Phase one of marshaling: every offset and the total size of a
//! packed result are computed here as pure functions of the hostname
//! length and record count, so the size math is testable on its own
//! and the write phase can verify it landed exactly where predicted.
//!
//! All pointers and alignment use native pointer width, matching what
//! the fixed-ABI consumer expects to find in the buffer.

use std::mem::size_of;

use crate::addr::Family;

/// Native pointer width in bytes.
pub const PTR_SIZE: usize = size_of::<usize>();

/// Rounds `n` up to pointer-size granularity.
pub const fn align_ptr(n: usize) -> usize {
    n.div_ceil(PTR_SIZE) * PTR_SIZE
}

/// Layout of a single-family `hostent`-style record: NUL-terminated
/// hostname, an empty alias array (one null pointer), `count` address
/// blocks, then a null-terminated address pointer array.
///
/// The reverse-lookup result is the same shape with `count == 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostentLayout {
    /// Hostname offset, always 0.
    pub name: usize,
    /// Alias array offset.
    pub aliases: usize,
    /// First address block offset.
    pub addrs: usize,
    /// Address pointer array offset.
    pub addr_list: usize,
    /// Total bytes required.
    pub size: usize,
    /// Significant bytes per address block.
    pub addr_len: usize,
    /// Number of address blocks.
    pub count: usize,
}

impl HostentLayout {
    pub fn compute(name_len: usize, family: Family, count: usize) -> Self {
        let addr_len = family.addr_len();
        let aliases = align_ptr(name_len + 1);
        let addrs = aliases + PTR_SIZE;
        let addr_list = addrs + count * align_ptr(addr_len);
        let size = addr_list + (count + 1) * PTR_SIZE;
        Self {
            name: 0,
            aliases,
            addrs,
            addr_list,
            size,
            addr_len,
            count,
        }
    }

    /// Offset of the `index`-th address block.
    pub fn addr_at(&self, index: usize) -> usize {
        self.addrs + index * align_ptr(self.addr_len)
    }
}

/// Field offsets of one linked address record, matching glibc's
/// `struct gaih_addrtuple`: next pointer, name pointer, family,
/// 16-byte address, scope id.
pub const TUPLE_NEXT: usize = 0;
pub const TUPLE_NAME: usize = PTR_SIZE;
pub const TUPLE_FAMILY: usize = 2 * PTR_SIZE;
pub const TUPLE_ADDR: usize = 2 * PTR_SIZE + 4;
pub const TUPLE_SCOPEID: usize = 2 * PTR_SIZE + 20;

/// Unpadded record size; [`TupleLayout`] strides by its aligned form.
pub const TUPLE_SIZE: usize = 2 * PTR_SIZE + 24;

/// Layout of the all-families result: NUL-terminated hostname followed
/// by a run of fixed-size linked records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TupleLayout {
    /// Hostname offset, always 0.
    pub name: usize,
    /// First record offset.
    pub tuples: usize,
    /// Distance between consecutive records.
    pub stride: usize,
    /// Total bytes required.
    pub size: usize,
    /// Number of records.
    pub count: usize,
}

impl TupleLayout {
    pub fn compute(name_len: usize, count: usize) -> Self {
        let tuples = align_ptr(name_len + 1);
        let stride = align_ptr(TUPLE_SIZE);
        // At least one record's worth of space is always reserved.
        let size = tuples + stride * count.max(1);
        Self {
            name: 0,
            tuples,
            stride,
            size,
            count,
        }
    }

    /// Offset of the `index`-th record.
    pub fn tuple_at(&self, index: usize) -> usize {
        self.tuples + index * self.stride
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_rounds_up_to_pointer_width() {
        assert_eq!(align_ptr(0), 0);
        assert_eq!(align_ptr(1), PTR_SIZE);
        assert_eq!(align_ptr(PTR_SIZE), PTR_SIZE);
        assert_eq!(align_ptr(PTR_SIZE + 1), 2 * PTR_SIZE);
    }

    #[test]
    fn hostent_size_matches_formula() {
        // "example.com" is 11 bytes, two IPv4 addresses.
        let l = HostentLayout::compute(11, Family::V4, 2);
        let expected = align_ptr(12) + PTR_SIZE + 2 * align_ptr(4) + 3 * PTR_SIZE;
        assert_eq!(l.size, expected);
    }

    #[test]
    fn hostent_offsets_are_ordered_and_disjoint() {
        let l = HostentLayout::compute(11, Family::V6, 3);
        assert_eq!(l.name, 0);
        assert_eq!(l.aliases, align_ptr(12));
        assert_eq!(l.addrs, l.aliases + PTR_SIZE);
        assert_eq!(l.addr_list, l.addrs + 3 * align_ptr(16));
        assert_eq!(l.size, l.addr_list + 4 * PTR_SIZE);
    }

    #[test]
    fn hostent_v4_blocks_are_pointer_aligned() {
        let l = HostentLayout::compute(4, Family::V4, 2);
        assert_eq!(l.addr_at(1) - l.addr_at(0), align_ptr(4));
        assert_eq!(l.addr_at(0) % PTR_SIZE, 0);
    }

    #[test]
    fn single_address_shape() {
        // Reverse-lookup records: one address, two-entry pointer array.
        let l = HostentLayout::compute(12, Family::V4, 1);
        assert_eq!(
            l.size,
            align_ptr(13) + PTR_SIZE + align_ptr(4) + 2 * PTR_SIZE
        );
    }

    #[test]
    fn tuple_record_field_offsets_are_disjoint() {
        assert_eq!(TUPLE_NAME - TUPLE_NEXT, PTR_SIZE);
        assert_eq!(TUPLE_ADDR - TUPLE_FAMILY, 4);
        assert_eq!(TUPLE_SCOPEID - TUPLE_ADDR, 16);
        assert_eq!(TUPLE_SIZE - TUPLE_SCOPEID, 4);
    }

    #[test]
    fn tuple_size_matches_formula() {
        let l = TupleLayout::compute(11, 3);
        assert_eq!(l.size, align_ptr(12) + 3 * align_ptr(TUPLE_SIZE));
        assert_eq!(l.tuple_at(2) - l.tuple_at(1), l.stride);
    }

    #[test]
    fn tuple_layout_reserves_one_record_when_empty() {
        let l = TupleLayout::compute(4, 0);
        assert_eq!(l.size, align_ptr(5) + align_ptr(TUPLE_SIZE));
    }
}
