//! Reverse-lookup query name construction.
//!
//! PTR queries resolve an address back to a hostname via a query name
//! built under `in-addr.arpa.` (IPv4) or `ip6.arpa.` (IPv6).

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Builds the `in-addr.arpa.` query name for an IPv4 address.
///
/// Octets appear in reverse order, each as unsigned decimal:
/// `[1, 2, 3, 4]` becomes `"4.3.2.1.in-addr.arpa."`. At most 30
/// characters.
pub fn arpa_qname_ip4(addr: &[u8; 4]) -> String {
    format!(
        "{}.{}.{}.{}.in-addr.arpa.",
        addr[3], addr[2], addr[1], addr[0]
    )
}

/// Builds the `ip6.arpa.` query name for an IPv6 address.
///
/// Emits 32 dot-separated nibbles, least-significant byte first, low
/// nibble before high nibble, in lowercase hex. Always exactly 73
/// characters.
pub fn arpa_qname_ip6(addr: &[u8; 16]) -> String {
    let mut qname = String::with_capacity(73);
    for &b in addr.iter().rev() {
        qname.push(HEX[(b & 0x0f) as usize] as char);
        qname.push('.');
        qname.push(HEX[(b >> 4) as usize] as char);
        qname.push('.');
    }
    qname.push_str("ip6.arpa.");
    qname
}
