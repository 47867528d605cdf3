//! # ubdns-abi
//!
//! NSS-compatible `extern "C"` boundary for the ubdns lookup backend.
//! Exposes the `_nss_ubdns_gethostby*` entry points that glibc's name
//! service switch dispatches to, marshaling results into the caller's
//! buffer via `ubdns-core`.

#![allow(clippy::missing_safety_doc)]

pub mod context;
pub mod netdb;
