//! Wire-format domain name to presentation format conversion.
//!
//! A name on the wire is a sequence of length-prefixed labels
//! terminated by a zero-length root label. The presentation form joins
//! the labels with `.`, always ends with a trailing dot, and escapes
//! anything that is not plain printable ASCII.

use thiserror::Error;

/// Maximum presentation-form name length, terminator included.
///
/// Callers decoding PTR rdata reserve this much; the decoder itself
/// checks the capacity it is actually given.
pub const PRESLEN_NAME: usize = 1025;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NameError {
    /// The presentation buffer cannot hold the escaped name.
    #[error("presentation buffer too small")]
    BufferTooSmall,
}

/// Result of a successful [`domain_to_presentation`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedName {
    /// Wire bytes accounted for. Each started label contributes its
    /// length octet plus its declared length, and the terminating root
    /// label contributes 1 even when a truncated buffer never
    /// contained it. For a well-formed name this equals the wire
    /// length of the name; for a truncated one it can exceed the
    /// input length. Callers depend on this exact accounting.
    pub bytes_read: usize,
    /// Presentation bytes written, terminator excluded.
    pub len: usize,
}

/// Decodes a wire-format domain name into escaped presentation form.
///
/// Escaping, per content byte: `.` becomes `\.`, printable ASCII in
/// `!`..=`~` is emitted verbatim, and every other value becomes a
/// backslash followed by three zero-padded decimal digits. Each label
/// is followed by a literal `.`, so a non-empty name carries a
/// trailing dot; the root (empty) name decodes to `"."` alone.
///
/// The decoder is best-effort over attacker-influenced bytes: a buffer
/// shorter than its labels declare stops at the boundary instead of
/// failing. The output is always NUL-terminated. The only error is an
/// undersized `dst`, in which case the contents of `dst` are
/// unspecified but never written past its end.
pub fn domain_to_presentation(src: &[u8], dst: &mut [u8]) -> Result<DecodedName, NameError> {
    fn put(dst: &mut [u8], at: &mut usize, b: u8) -> Result<(), NameError> {
        if *at >= dst.len() {
            return Err(NameError::BufferTooSmall);
        }
        dst[*at] = b;
        *at += 1;
        Ok(())
    }

    let mut out = 0usize;
    let mut pos = 0usize;
    let mut bytes_read = 0usize;

    let mut oclen = src.first().copied().unwrap_or(0);
    while pos < src.len() && oclen != 0 {
        // Length octet, counted even if the content is truncated.
        pos += 1;
        bytes_read += oclen as usize + 1;

        let mut left = oclen;
        while left > 0 && pos < src.len() {
            let c = src[pos];
            pos += 1;
            left -= 1;

            match c {
                b'.' => {
                    put(dst, &mut out, b'\\')?;
                    put(dst, &mut out, c)?;
                }
                b'!'..=b'~' => put(dst, &mut out, c)?,
                _ => {
                    put(dst, &mut out, b'\\')?;
                    put(dst, &mut out, b'0' + c / 100)?;
                    put(dst, &mut out, b'0' + c / 10 % 10)?;
                    put(dst, &mut out, b'0' + c % 10)?;
                }
            }
        }
        put(dst, &mut out, b'.')?;

        oclen = src.get(pos).copied().unwrap_or(0);
    }

    if bytes_read == 0 {
        put(dst, &mut out, b'.')?;
    }
    // Implicit terminating root label.
    bytes_read += 1;

    put(dst, &mut out, 0)?;
    Ok(DecodedName {
        bytes_read,
        len: out - 1,
    })
}
