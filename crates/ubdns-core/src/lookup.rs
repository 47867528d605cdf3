//! Forward and reverse lookup orchestration over an external resolver.
//!
//! The resolver itself is an opaque collaborator behind the
//! [`Resolver`] trait: it performs the actual (possibly validating)
//! DNS resolution and reports per-query trust status. This module
//! turns its raw answers into sorted [`Address`] lists and
//! presentation-form hostnames.

use thiserror::Error;
use tracing::debug;

use crate::addr::{Address, Family, sort_addresses};
use crate::arpa::{arpa_qname_ip4, arpa_qname_ip6};
use crate::name::{PRESLEN_NAME, domain_to_presentation};

/// DNS record type codes used by the lookup paths.
pub const TYPE_A: u16 = 1;
pub const TYPE_PTR: u16 = 12;
pub const TYPE_AAAA: u16 = 28;

/// DNS class code for Internet records.
pub const CLASS_IN: u16 = 1;

/// One resolver answer: presence and trust status plus raw rdata.
#[derive(Debug, Clone, Default)]
pub struct Answer {
    /// The answer carried at least one record.
    pub has_data: bool,
    /// The answer failed cryptographic validation.
    pub bogus: bool,
    /// Raw rdata of each record, in answer order.
    pub records: Vec<Vec<u8>>,
}

impl Answer {
    /// Only answers that carry data and were not flagged bogus are
    /// used; everything else is treated as a miss.
    pub fn usable(&self) -> bool {
        self.has_data && !self.bogus
    }
}

/// A query the resolver could not complete at all (as opposed to a
/// clean empty or unvalidated answer).
#[derive(Debug, Error)]
#[error("resolver failure: {0}")]
pub struct ResolveError(pub String);

/// The external resolving service.
///
/// Implementations must tolerate concurrent `resolve` calls; the
/// surrounding system may issue lookups from many threads through one
/// shared handle. Blocking on network I/O inside `resolve` is
/// expected, and timeout policy belongs to the implementation.
pub trait Resolver: Send + Sync {
    fn resolve(&self, qname: &str, rrtype: u16, class: u16) -> Result<Answer, ResolveError>;
}

/// Appends every well-formed record of `answer` to `list`. Records
/// whose rdata length does not match the family are dropped.
fn add_result(list: &mut Vec<Address>, answer: &Answer, family: Family) {
    if !answer.usable() {
        debug!(
            af = family.af(),
            has_data = answer.has_data,
            bogus = answer.bogus,
            "answer rejected"
        );
        return;
    }
    for rdata in &answer.records {
        if let Some(address) = Address::new(family, rdata, 0) {
            list.push(address);
        }
    }
}

/// Resolves `hostname` to its addresses, optionally restricted to one
/// family (`None` queries both A and AAAA).
///
/// A failed or rejected query for one family does not abort the
/// other; the result degrades to whatever did resolve and is empty
/// only when nothing did. The list is sorted lowest scope first, IPv4
/// before IPv6 at equal scope.
pub fn lookup_forward<R: Resolver + ?Sized>(
    resolver: &R,
    hostname: &str,
    family: Option<Family>,
) -> Vec<Address> {
    let mut list = Vec::new();

    if matches!(family, None | Some(Family::V4)) {
        match resolver.resolve(hostname, TYPE_A, CLASS_IN) {
            Ok(answer) => add_result(&mut list, &answer, Family::V4),
            Err(err) => debug!(%err, hostname, "A query failed"),
        }
    }
    if matches!(family, None | Some(Family::V6)) {
        match resolver.resolve(hostname, TYPE_AAAA, CLASS_IN) {
            Ok(answer) => add_result(&mut list, &answer, Family::V6),
            Err(err) => debug!(%err, hostname, "AAAA query failed"),
        }
    }

    sort_addresses(&mut list);
    list
}

/// Resolves an address to at most one hostname via PTR.
///
/// Builds the reverse query name for the address, queries PTR, and on
/// a single validated answer decodes its first record to presentation
/// form. Every failure mode (resolver error, bogus or empty answer,
/// oversized name) is a miss.
pub fn lookup_reverse<R: Resolver + ?Sized>(resolver: &R, addr: &Address) -> Option<String> {
    let qname = match addr.family {
        Family::V4 => {
            let mut octets = [0u8; 4];
            octets.copy_from_slice(addr.octets());
            arpa_qname_ip4(&octets)
        }
        Family::V6 => arpa_qname_ip6(&addr.bytes),
    };

    let answer = match resolver.resolve(&qname, TYPE_PTR, CLASS_IN) {
        Ok(answer) => answer,
        Err(err) => {
            debug!(%err, qname, "PTR query failed");
            return None;
        }
    };
    if !answer.usable() {
        return None;
    }
    let wire = answer.records.first()?;

    let mut buf = [0u8; PRESLEN_NAME];
    let decoded = domain_to_presentation(wire, &mut buf).ok()?;
    core::str::from_utf8(&buf[..decoded.len])
        .ok()
        .map(str::to_owned)
}
