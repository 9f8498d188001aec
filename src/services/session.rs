//! Session token helpers.
//!
//! Login and registration live outside this crate; they create rows in
//! `sessions`. This module only mints tokens and encodes bytes.

use std::fmt::Write;

use rand::Rng;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}
