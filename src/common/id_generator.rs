// src/common/id_generator.rs
//! Crockford Base32 random identifier generator
//!
//! Used for session token `jti` values so that two tokens minted for the
//! same user within the same second are still distinct strings.
//!
//! Benefits:
//! - No ambiguous characters (excludes I, L, O, U)
//! - Case-insensitive
//! - Easy to read and communicate verbally when grepping audit logs

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Number of random characters in a session `jti`
const SESSION_JTI_LENGTH: usize = 16;

/// Generate a random Crockford Base32 string of specified length
pub fn generate_raw_id(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a unique identifier for an issued session token (`jti` claim)
pub fn generate_session_jti() -> String {
    generate_raw_id(SESSION_JTI_LENGTH)
}
