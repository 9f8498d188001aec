//! Anti-forgery tokens bound to a session.
//!
//! The page embeds `csrf_token` in a hidden field; the vote endpoint expects
//! the same value back. Tokens are derived, not stored:
//! `hex(sha256(secret ":" session_token))`.

use rand::Rng;
use sha2::{Digest, Sha256};

use crate::services::session::bytes_to_hex;

pub struct CsrfSecret {
    secret: Vec<u8>,
}

impl CsrfSecret {
    #[must_use]
    pub fn from_secret(secret: &str) -> Self {
        Self { secret: secret.as_bytes().to_vec() }
    }

    /// Random per-process secret. Tokens stop verifying after a restart.
    #[must_use]
    pub fn generate() -> Self {
        let bytes: [u8; 32] = rand::rng().random();
        Self { secret: bytes.to_vec() }
    }

    #[must_use]
    pub fn token_for(&self, session_token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(b":");
        hasher.update(session_token.as_bytes());
        bytes_to_hex(&hasher.finalize())
    }

    #[must_use]
    pub fn verify(&self, session_token: &str, candidate: &str) -> bool {
        constant_time_eq(self.token_for(session_token).as_bytes(), candidate.as_bytes())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
