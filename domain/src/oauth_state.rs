//! CSRF state values for the OAuth flow.
//!
//! A fresh state is issued on every login and kept in the caller's session; the
//! callback is only honored when TikTok hands the same value back.

use rand::Rng;

/// Generate a cryptographically random state token (32 bytes, hex encoded).
pub fn generate() -> String {
    let random_bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(random_bytes)
}

/// Compare the state issued to the session with the one returned by the provider.
///
/// Runs in time independent of where the first mismatch occurs.
pub fn verify(issued: Option<&str>, returned: Option<&str>) -> bool {
    match (issued, returned) {
        (Some(issued), Some(returned)) if !issued.is_empty() => {
            issued.len() == returned.len()
                && issued
                    .bytes()
                    .zip(returned.bytes())
                    .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                    == 0
        }
        _ => false,
    }
}
