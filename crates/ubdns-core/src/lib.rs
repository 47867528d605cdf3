//! # ubdns-core
//!
//! Safe core of a validating-resolver host lookup backend: DNS
//! wire-format name decoding into presentation form, reverse (PTR)
//! query name construction, and fixed-layout packing of lookup results
//! into caller-supplied buffers.
//!
//! No `unsafe` code is permitted at the crate level. Pointer values in
//! packed result buffers are written as native-width integers; only the
//! ABI crate reinterprets them.

#![deny(unsafe_code)]

pub mod addr;
pub mod arpa;
pub mod layout;
pub mod lookup;
pub mod marshal;
pub mod name;

pub use addr::{Address, Family};
pub use lookup::{Answer, ResolveError, Resolver};
pub use marshal::MarshalError;
pub use name::PRESLEN_NAME;
