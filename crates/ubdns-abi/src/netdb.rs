//! NSS host database entry points (`<netdb.h>` / `<nss.h>`).
//!
//! Each entry point resolves through the installed process-wide
//! resolver and packs its result into the caller-supplied buffer with
//! `ubdns-core`'s marshaler. An undersized buffer reports
//! `NSS_STATUS_TRYAGAIN` with `errno = ENOMEM` and leaves the buffer
//! untouched, so the caller retries with a larger one.

use std::ffi::CStr;
use std::slice;

use libc::{c_char, c_int, c_void, size_t, socklen_t};
use ubdns_core::addr::{Address, Family};
use ubdns_core::layout;
use ubdns_core::lookup::{lookup_forward, lookup_reverse};
use ubdns_core::marshal::{MarshalError, PackedHostent, pack_addrtuples, pack_hostent};

use crate::context;

/// `h_errno` values from `<netdb.h>`.
pub const HOST_NOT_FOUND: c_int = 1;
pub const NO_RECOVERY: c_int = 3;
pub const NO_DATA: c_int = 4;

/// `enum nss_status` from glibc's `<nss.h>`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NssStatus {
    TryAgain = -2,
    Unavail = -1,
    NotFound = 0,
    Success = 1,
}

/// glibc's `struct gaih_addrtuple`, the record chain consumed by
/// `getaddrinfo` through the `gethostbyname4_r` interface.
///
/// glibc declares `addr` as `uint32_t[4]`; the byte form has identical
/// size and offsets.
#[repr(C)]
#[derive(Debug)]
pub struct GaihAddrtuple {
    pub next: *mut GaihAddrtuple,
    pub name: *mut c_char,
    pub family: c_int,
    pub addr: [u8; 16],
    pub scopeid: u32,
}

// The marshaler writes records field by field at these offsets; they
// must agree with the repr(C) struct the consumer reads.
const _: () = {
    assert!(std::mem::offset_of!(GaihAddrtuple, next) == layout::TUPLE_NEXT);
    assert!(std::mem::offset_of!(GaihAddrtuple, name) == layout::TUPLE_NAME);
    assert!(std::mem::offset_of!(GaihAddrtuple, family) == layout::TUPLE_FAMILY);
    assert!(std::mem::offset_of!(GaihAddrtuple, addr) == layout::TUPLE_ADDR);
    assert!(std::mem::offset_of!(GaihAddrtuple, scopeid) == layout::TUPLE_SCOPEID);
    assert!(std::mem::size_of::<GaihAddrtuple>() == layout::align_ptr(layout::TUPLE_SIZE));
};

unsafe fn set_err(errnop: *mut c_int, h_errnop: *mut c_int, errno: c_int, h_errno: c_int) {
    if !errnop.is_null() {
        // SAFETY: non-null out-parameter provided by the NSS caller.
        unsafe { *errnop = errno };
    }
    if !h_errnop.is_null() {
        // SAFETY: non-null out-parameter provided by the NSS caller.
        unsafe { *h_errnop = h_errno };
    }
}

/// Points the caller's `hostent` fields into the packed buffer.
unsafe fn fill_hostent(buffer: *mut c_char, packed: &PackedHostent, result: *mut libc::hostent) {
    // SAFETY: result is non-null and the packed offsets lie inside the
    // caller buffer by the marshaler's contract.
    unsafe {
        (*result).h_name = buffer.add(packed.name);
        (*result).h_aliases = buffer.add(packed.aliases).cast::<*mut c_char>();
        (*result).h_addrtype = packed.family.af();
        (*result).h_length = packed.addr_len as c_int;
        (*result).h_addr_list = buffer.add(packed.addr_list).cast::<*mut c_char>();
    }
}

/// `_nss_ubdns_gethostbyname4_r`: all-families lookup producing a
/// `gaih_addrtuple` chain.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn _nss_ubdns_gethostbyname4_r(
    name: *const c_char,
    pat: *mut *mut GaihAddrtuple,
    buffer: *mut c_char,
    buflen: size_t,
    errnop: *mut c_int,
    h_errnop: *mut c_int,
    ttlp: *mut i32,
) -> NssStatus {
    if name.is_null() || pat.is_null() || buffer.is_null() {
        // SAFETY: out-parameters checked individually.
        unsafe { set_err(errnop, h_errnop, libc::EINVAL, NO_RECOVERY) };
        return NssStatus::Unavail;
    }

    // SAFETY: caller-provided NUL-terminated hostname.
    let hostname = match unsafe { CStr::from_ptr(name) }.to_str() {
        Ok(hostname) => hostname,
        Err(_) => {
            // SAFETY: out-parameters checked individually.
            unsafe { set_err(errnop, h_errnop, libc::ENOENT, HOST_NOT_FOUND) };
            return NssStatus::NotFound;
        }
    };

    // No installed resolver behaves like an empty result set.
    let addresses = match context::current() {
        Some(resolver) => lookup_forward(resolver.as_ref(), hostname, None),
        None => Vec::new(),
    };

    // SAFETY: buffer/buflen describe a caller-owned writable region.
    let buf = unsafe { slice::from_raw_parts_mut(buffer.cast::<u8>(), buflen) };

    let packed = match pack_addrtuples(buf, hostname, &addresses) {
        Ok(packed) => packed,
        Err(MarshalError::NotFound) => {
            // SAFETY: out-parameters checked individually.
            unsafe { set_err(errnop, h_errnop, libc::ENOENT, HOST_NOT_FOUND) };
            return NssStatus::NotFound;
        }
        Err(MarshalError::BufferTooSmall { .. }) => {
            // SAFETY: out-parameters checked individually.
            unsafe { set_err(errnop, h_errnop, libc::ENOMEM, NO_RECOVERY) };
            return NssStatus::TryAgain;
        }
    };

    // SAFETY: pat is non-null; head offset lies inside the buffer.
    unsafe { *pat = buffer.add(packed.head).cast::<GaihAddrtuple>() };
    if !ttlp.is_null() {
        // SAFETY: non-null out-parameter.
        unsafe { *ttlp = 0 };
    }
    NssStatus::Success
}

/// `_nss_ubdns_gethostbyname3_r`: single-family lookup producing a
/// `hostent`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn _nss_ubdns_gethostbyname3_r(
    name: *const c_char,
    af: c_int,
    result: *mut libc::hostent,
    buffer: *mut c_char,
    buflen: size_t,
    errnop: *mut c_int,
    h_errnop: *mut c_int,
    ttlp: *mut i32,
    canonp: *mut *mut c_char,
) -> NssStatus {
    let Some(family) = Family::from_af(af) else {
        // SAFETY: out-parameters checked individually.
        unsafe { set_err(errnop, h_errnop, libc::EAFNOSUPPORT, NO_DATA) };
        return NssStatus::Unavail;
    };

    if name.is_null() || result.is_null() || buffer.is_null() {
        // SAFETY: out-parameters checked individually.
        unsafe { set_err(errnop, h_errnop, libc::EINVAL, NO_RECOVERY) };
        return NssStatus::Unavail;
    }

    // SAFETY: caller-provided NUL-terminated hostname.
    let hostname = match unsafe { CStr::from_ptr(name) }.to_str() {
        Ok(hostname) => hostname,
        Err(_) => {
            // SAFETY: out-parameters checked individually.
            unsafe { set_err(errnop, h_errnop, libc::ENOENT, HOST_NOT_FOUND) };
            return NssStatus::NotFound;
        }
    };

    let addresses = match context::current() {
        Some(resolver) => lookup_forward(resolver.as_ref(), hostname, Some(family)),
        None => Vec::new(),
    };

    // SAFETY: buffer/buflen describe a caller-owned writable region.
    let buf = unsafe { slice::from_raw_parts_mut(buffer.cast::<u8>(), buflen) };

    let packed = match pack_hostent(buf, hostname, family, &addresses) {
        Ok(packed) => packed,
        Err(MarshalError::NotFound) => {
            // SAFETY: out-parameters checked individually.
            unsafe { set_err(errnop, h_errnop, libc::ENOENT, HOST_NOT_FOUND) };
            return NssStatus::NotFound;
        }
        Err(MarshalError::BufferTooSmall { .. }) => {
            // SAFETY: out-parameters checked individually.
            unsafe { set_err(errnop, h_errnop, libc::ENOMEM, NO_RECOVERY) };
            return NssStatus::TryAgain;
        }
    };

    // SAFETY: result and buffer checked non-null above.
    unsafe { fill_hostent(buffer, &packed, result) };
    if !ttlp.is_null() {
        // SAFETY: non-null out-parameter.
        unsafe { *ttlp = 0 };
    }
    if !canonp.is_null() {
        // SAFETY: non-null out-parameter; name offset lies inside the buffer.
        unsafe { *canonp = buffer.add(packed.name) };
    }
    NssStatus::Success
}

/// `_nss_ubdns_gethostbyname2_r`: `gethostbyname3_r` without
/// ttl/canonical-name out-parameters.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn _nss_ubdns_gethostbyname2_r(
    name: *const c_char,
    af: c_int,
    result: *mut libc::hostent,
    buffer: *mut c_char,
    buflen: size_t,
    errnop: *mut c_int,
    h_errnop: *mut c_int,
) -> NssStatus {
    // SAFETY: forwards the caller's pointers unchanged.
    unsafe {
        _nss_ubdns_gethostbyname3_r(
            name,
            af,
            result,
            buffer,
            buflen,
            errnop,
            h_errnop,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
        )
    }
}

/// `_nss_ubdns_gethostbyname_r`: IPv4-only legacy variant.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn _nss_ubdns_gethostbyname_r(
    name: *const c_char,
    result: *mut libc::hostent,
    buffer: *mut c_char,
    buflen: size_t,
    errnop: *mut c_int,
    h_errnop: *mut c_int,
) -> NssStatus {
    // SAFETY: forwards the caller's pointers unchanged.
    unsafe {
        _nss_ubdns_gethostbyname3_r(
            name,
            ubdns_core::addr::AF_INET,
            result,
            buffer,
            buflen,
            errnop,
            h_errnop,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
        )
    }
}

/// `_nss_ubdns_gethostbyaddr2_r`: reverse lookup producing a
/// single-address `hostent`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn _nss_ubdns_gethostbyaddr2_r(
    addr: *const c_void,
    len: socklen_t,
    af: c_int,
    result: *mut libc::hostent,
    buffer: *mut c_char,
    buflen: size_t,
    errnop: *mut c_int,
    h_errnop: *mut c_int,
    ttlp: *mut i32,
) -> NssStatus {
    let Some(family) = Family::from_af(af) else {
        // SAFETY: out-parameters checked individually.
        unsafe { set_err(errnop, h_errnop, libc::EAFNOSUPPORT, NO_DATA) };
        return NssStatus::Unavail;
    };

    if len as usize != family.addr_len() {
        // SAFETY: out-parameters checked individually.
        unsafe { set_err(errnop, h_errnop, libc::EINVAL, NO_RECOVERY) };
        return NssStatus::Unavail;
    }

    if addr.is_null() || result.is_null() || buffer.is_null() {
        // SAFETY: out-parameters checked individually.
        unsafe { set_err(errnop, h_errnop, libc::EINVAL, NO_RECOVERY) };
        return NssStatus::Unavail;
    }

    // SAFETY: addr points at `len` readable bytes per the call contract.
    let octets = unsafe { slice::from_raw_parts(addr.cast::<u8>(), len as usize) };
    let Some(address) = Address::new(family, octets, 0) else {
        // Unreachable after the length check, but total.
        unsafe { set_err(errnop, h_errnop, libc::EINVAL, NO_RECOVERY) };
        return NssStatus::Unavail;
    };

    let hostname = match context::current() {
        Some(resolver) => lookup_reverse(resolver.as_ref(), &address),
        None => None,
    };
    let Some(hostname) = hostname else {
        // SAFETY: out-parameters checked individually.
        unsafe { set_err(errnop, h_errnop, libc::ENOENT, HOST_NOT_FOUND) };
        return NssStatus::NotFound;
    };

    // SAFETY: buffer/buflen describe a caller-owned writable region.
    let buf = unsafe { slice::from_raw_parts_mut(buffer.cast::<u8>(), buflen) };

    let packed = match pack_hostent(buf, &hostname, family, slice::from_ref(&address)) {
        Ok(packed) => packed,
        Err(MarshalError::NotFound) => {
            // SAFETY: out-parameters checked individually.
            unsafe { set_err(errnop, h_errnop, libc::ENOENT, HOST_NOT_FOUND) };
            return NssStatus::NotFound;
        }
        Err(MarshalError::BufferTooSmall { .. }) => {
            // SAFETY: out-parameters checked individually.
            unsafe { set_err(errnop, h_errnop, libc::ENOMEM, NO_RECOVERY) };
            return NssStatus::TryAgain;
        }
    };

    // SAFETY: result and buffer checked non-null above.
    unsafe { fill_hostent(buffer, &packed, result) };
    if !ttlp.is_null() {
        // SAFETY: non-null out-parameter.
        unsafe { *ttlp = 0 };
    }
    NssStatus::Success
}

/// `_nss_ubdns_gethostbyaddr_r`: `gethostbyaddr2_r` without the ttl
/// out-parameter.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn _nss_ubdns_gethostbyaddr_r(
    addr: *const c_void,
    len: socklen_t,
    af: c_int,
    result: *mut libc::hostent,
    buffer: *mut c_char,
    buflen: size_t,
    errnop: *mut c_int,
    h_errnop: *mut c_int,
) -> NssStatus {
    // SAFETY: forwards the caller's pointers unchanged.
    unsafe {
        _nss_ubdns_gethostbyaddr2_r(
            addr,
            len,
            af,
            result,
            buffer,
            buflen,
            errnop,
            h_errnop,
            std::ptr::null_mut(),
        )
    }
}
