//! Fixed-layout result packing into caller-supplied buffers.
//!
//! Phase two of marshaling: fields are written at the offsets computed
//! by [`crate::layout`]. Nothing is written until the full computed
//! size is known to fit, so an undersized buffer is left untouched and
//! the caller can retry with a larger one. After a successful pack the
//! write cursor must equal the computed size exactly; a mismatch is a
//! layout bug, not a runtime condition, and panics.

use thiserror::Error;

use crate::addr::{Address, Family};
use crate::layout::{
    HostentLayout, PTR_SIZE, TUPLE_ADDR, TUPLE_FAMILY, TUPLE_NAME, TUPLE_NEXT, TUPLE_SCOPEID,
    TupleLayout, align_ptr,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MarshalError {
    /// No addresses matched the requested shape. Reported before any
    /// size computation.
    #[error("no addresses for the requested family")]
    NotFound,
    /// The caller's buffer cannot hold the record set. Retryable with
    /// a buffer of at least `needed` bytes; nothing was written.
    #[error("result buffer too small: {needed} bytes required")]
    BufferTooSmall { needed: usize },
}

/// Offsets into a packed buffer for wiring up a `hostent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedHostent {
    pub name: usize,
    pub aliases: usize,
    pub addr_list: usize,
    pub family: Family,
    pub addr_len: usize,
    pub count: usize,
}

/// Offset of the head record of a packed linked-record result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedTuples {
    pub head: usize,
    pub count: usize,
}

fn put_ptr(buf: &mut [u8], at: usize, value: usize) {
    buf[at..at + PTR_SIZE].copy_from_slice(&value.to_ne_bytes());
}

fn put_i32(buf: &mut [u8], at: usize, value: i32) {
    buf[at..at + 4].copy_from_slice(&value.to_ne_bytes());
}

fn put_u32(buf: &mut [u8], at: usize, value: u32) {
    buf[at..at + 4].copy_from_slice(&value.to_ne_bytes());
}

fn put_name(buf: &mut [u8], hostname: &str) {
    buf[..hostname.len()].copy_from_slice(hostname.as_bytes());
    buf[hostname.len()] = 0;
}

/// Packs a hostname and its addresses of one family as a
/// `hostent`-style record set: name, empty alias array, address
/// blocks, null-terminated address pointer array.
///
/// Records of other families in `addrs` are skipped; the relative
/// order of matching records is preserved. A reverse-lookup result is
/// packed the same way with a single-element `addrs`.
pub fn pack_hostent(
    buf: &mut [u8],
    hostname: &str,
    family: Family,
    addrs: &[Address],
) -> Result<PackedHostent, MarshalError> {
    let count = addrs.iter().filter(|a| a.family == family).count();
    if count == 0 {
        return Err(MarshalError::NotFound);
    }

    let layout = HostentLayout::compute(hostname.len(), family, count);
    if buf.len() < layout.size {
        return Err(MarshalError::BufferTooSmall {
            needed: layout.size,
        });
    }

    let base = buf.as_ptr() as usize;

    put_name(buf, hostname);
    let mut idx = align_ptr(hostname.len() + 1);

    // Empty alias array: a single null pointer.
    put_ptr(buf, layout.aliases, 0);
    idx += PTR_SIZE;

    let mut i = 0;
    for a in addrs.iter().filter(|a| a.family == family) {
        let at = layout.addr_at(i);
        buf[at..at + layout.addr_len].copy_from_slice(a.octets());
        i += 1;
    }
    idx += count * align_ptr(layout.addr_len);

    for i in 0..count {
        put_ptr(buf, layout.addr_list + i * PTR_SIZE, base + layout.addr_at(i));
    }
    put_ptr(buf, layout.addr_list + count * PTR_SIZE, 0);
    idx += (count + 1) * PTR_SIZE;

    assert_eq!(idx, layout.size, "write cursor diverged from computed layout");

    Ok(PackedHostent {
        name: layout.name,
        aliases: layout.aliases,
        addr_list: layout.addr_list,
        family,
        addr_len: layout.addr_len,
        count,
    })
}

/// Packs a hostname and every address in `addrs` as a chain of linked
/// records. Records are written in list order with forward-threaded
/// next links, so traversal from the returned head yields the input
/// order.
pub fn pack_addrtuples(
    buf: &mut [u8],
    hostname: &str,
    addrs: &[Address],
) -> Result<PackedTuples, MarshalError> {
    if addrs.is_empty() {
        return Err(MarshalError::NotFound);
    }

    let layout = TupleLayout::compute(hostname.len(), addrs.len());
    if buf.len() < layout.size {
        return Err(MarshalError::BufferTooSmall {
            needed: layout.size,
        });
    }

    let base = buf.as_ptr() as usize;

    put_name(buf, hostname);
    let mut idx = layout.tuples;

    for (i, a) in addrs.iter().enumerate() {
        let at = layout.tuple_at(i);
        let next = if i + 1 < addrs.len() {
            base + layout.tuple_at(i + 1)
        } else {
            0
        };
        put_ptr(buf, at + TUPLE_NEXT, next);
        put_ptr(buf, at + TUPLE_NAME, base + layout.name);
        put_i32(buf, at + TUPLE_FAMILY, a.family.af());
        buf[at + TUPLE_ADDR..at + TUPLE_ADDR + 16].copy_from_slice(&a.bytes);
        put_u32(buf, at + TUPLE_SCOPEID, a.scope as u32);
        idx += layout.stride;
    }

    assert_eq!(idx, layout.size, "write cursor diverged from computed layout");

    Ok(PackedTuples {
        head: layout.tuples,
        count: addrs.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addr::{AF_INET, AF_INET6};

    fn get_ptr(buf: &[u8], at: usize) -> usize {
        let mut raw = [0u8; PTR_SIZE];
        raw.copy_from_slice(&buf[at..at + PTR_SIZE]);
        usize::from_ne_bytes(raw)
    }

    fn get_i32(buf: &[u8], at: usize) -> i32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&buf[at..at + 4]);
        i32::from_ne_bytes(raw)
    }

    fn v4(last: u8) -> Address {
        Address::new(Family::V4, &[10, 0, 0, last], 0).unwrap()
    }

    fn v6(last: u8) -> Address {
        let mut data = [0u8; 16];
        data[15] = last;
        Address::new(Family::V6, &data, 0).unwrap()
    }

    // ---- pack_hostent ----

    #[test]
    fn hostent_layout_round_trip() {
        let addrs = [v4(1), v4(2)];
        let layout = HostentLayout::compute(11, Family::V4, 2);
        let mut buf = vec![0u8; layout.size];
        let base = buf.as_ptr() as usize;

        let packed = pack_hostent(&mut buf, "example.com", Family::V4, &addrs).unwrap();

        assert_eq!(&buf[..12], b"example.com\0");
        assert_eq!(packed.family, Family::V4);
        assert_eq!(packed.addr_len, 4);
        assert_eq!(packed.count, 2);

        // Empty alias array.
        assert_eq!(get_ptr(&buf, packed.aliases), 0);

        // Pointer array entries point at the address blocks, in order.
        let p0 = get_ptr(&buf, packed.addr_list);
        let p1 = get_ptr(&buf, packed.addr_list + PTR_SIZE);
        assert_eq!(p0, base + layout.addr_at(0));
        assert_eq!(p1, base + layout.addr_at(1));
        assert_eq!(get_ptr(&buf, packed.addr_list + 2 * PTR_SIZE), 0);

        assert_eq!(&buf[layout.addr_at(0)..layout.addr_at(0) + 4], &[10, 0, 0, 1]);
        assert_eq!(&buf[layout.addr_at(1)..layout.addr_at(1) + 4], &[10, 0, 0, 2]);
    }

    #[test]
    fn hostent_filters_other_families() {
        let addrs = [v4(1), v6(2), v4(3)];
        let mut buf = vec![0u8; 512];
        let packed = pack_hostent(&mut buf, "h", Family::V4, &addrs).unwrap();
        assert_eq!(packed.count, 2);

        let layout = HostentLayout::compute(1, Family::V4, 2);
        assert_eq!(&buf[layout.addr_at(0)..layout.addr_at(0) + 4], &[10, 0, 0, 1]);
        assert_eq!(&buf[layout.addr_at(1)..layout.addr_at(1) + 4], &[10, 0, 0, 3]);
    }

    #[test]
    fn hostent_v6_blocks() {
        let addrs = [v6(7)];
        let mut buf = vec![0u8; 512];
        let packed = pack_hostent(&mut buf, "h6", Family::V6, &addrs).unwrap();
        assert_eq!(packed.addr_len, 16);

        let layout = HostentLayout::compute(2, Family::V6, 1);
        let block = &buf[layout.addr_at(0)..layout.addr_at(0) + 16];
        assert_eq!(block[15], 7);
        assert_eq!(&block[..15], &[0u8; 15]);
    }

    #[test]
    fn hostent_no_matching_family_is_not_found() {
        let addrs = [v6(1)];
        let mut buf = vec![0u8; 512];
        assert_eq!(
            pack_hostent(&mut buf, "h", Family::V4, &addrs),
            Err(MarshalError::NotFound)
        );
    }

    #[test]
    fn hostent_empty_list_is_not_found() {
        let mut buf = vec![0u8; 512];
        assert_eq!(
            pack_hostent(&mut buf, "h", Family::V4, &[]),
            Err(MarshalError::NotFound)
        );
    }

    #[test]
    fn hostent_small_buffer_untouched() {
        let addrs = [v4(1)];
        let needed = HostentLayout::compute(1, Family::V4, 1).size;
        let mut buf = vec![0xAAu8; needed - 1];

        let err = pack_hostent(&mut buf, "h", Family::V4, &addrs).unwrap_err();
        assert_eq!(err, MarshalError::BufferTooSmall { needed });
        assert!(buf.iter().all(|&b| b == 0xAA), "canary bytes were touched");
    }

    #[test]
    fn hostent_exact_buffer_succeeds() {
        let addrs = [v4(1)];
        let needed = HostentLayout::compute(1, Family::V4, 1).size;
        let mut buf = vec![0u8; needed];
        assert!(pack_hostent(&mut buf, "h", Family::V4, &addrs).is_ok());
    }

    // ---- pack_addrtuples ----

    #[test]
    fn tuples_thread_in_forward_order() {
        let addrs = [v4(1), v4(2), v6(3)];
        let mut buf = vec![0u8; 512];
        let base = buf.as_ptr() as usize;

        let packed = pack_addrtuples(&mut buf, "example.com", &addrs).unwrap();
        assert_eq!(packed.count, 3);

        // Walk the chain via next pointers, collecting the family and
        // the distinguishing address bytes of each record.
        let mut seen = Vec::new();
        let mut at = packed.head;
        loop {
            let family = get_i32(&buf, at + TUPLE_FAMILY);
            let b3 = buf[at + TUPLE_ADDR + 3];
            let b15 = buf[at + TUPLE_ADDR + 15];
            let name_ptr = get_ptr(&buf, at + TUPLE_NAME);
            assert_eq!(name_ptr, base, "name pointer must target the hostname");
            seen.push((family, b3, b15));

            let next = get_ptr(&buf, at + TUPLE_NEXT);
            if next == 0 {
                break;
            }
            at = next - base;
        }

        assert_eq!(
            seen,
            [(AF_INET, 1, 0), (AF_INET, 2, 0), (AF_INET6, 0, 3)],
            "traversal must yield list order"
        );
    }

    #[test]
    fn tuple_v4_address_bytes_left_justified() {
        let addrs = [v4(9)];
        let mut buf = vec![0u8; 512];
        let packed = pack_addrtuples(&mut buf, "h", &addrs).unwrap();
        let at = packed.head;
        assert_eq!(&buf[at + TUPLE_ADDR..at + TUPLE_ADDR + 4], &[10, 0, 0, 9]);
        assert_eq!(get_ptr(&buf, at + TUPLE_NEXT), 0);
    }

    #[test]
    fn tuple_scope_is_recorded() {
        let addrs = [Address::new(Family::V4, &[1, 2, 3, 4], 5).unwrap()];
        let mut buf = vec![0u8; 512];
        let packed = pack_addrtuples(&mut buf, "h", &addrs).unwrap();
        let at = packed.head;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&buf[at + TUPLE_SCOPEID..at + TUPLE_SCOPEID + 4]);
        assert_eq!(u32::from_ne_bytes(raw), 5);
    }

    #[test]
    fn tuples_empty_list_is_not_found() {
        let mut buf = vec![0u8; 512];
        assert_eq!(
            pack_addrtuples(&mut buf, "h", &[]),
            Err(MarshalError::NotFound)
        );
    }

    #[test]
    fn tuples_small_buffer_untouched() {
        let addrs = [v4(1), v4(2)];
        let needed = TupleLayout::compute(1, 2).size;
        let mut buf = vec![0x55u8; needed - PTR_SIZE];

        let err = pack_addrtuples(&mut buf, "h", &addrs).unwrap_err();
        assert_eq!(err, MarshalError::BufferTooSmall { needed });
        assert!(buf.iter().all(|&b| b == 0x55), "canary bytes were touched");
    }
}
