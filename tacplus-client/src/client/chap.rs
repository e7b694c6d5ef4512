//! CHAP response generation & per-attempt identifiers.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use md5::{Digest, Md5};

#[cfg(test)]
mod tests;

/// Length of the challenge generated by the client, in bytes.
pub const CHALLENGE_LENGTH: usize = 16;

/// Length of an MD5 CHAP response, in bytes.
const RESPONSE_LENGTH: usize = 16;

/// A source of CHAP identifiers, which should be distinct across concurrent attempts.
///
/// Identifiers wrap around after 255, as they only occupy a single byte.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use tacplus_client::client::ChapIdentifierSequence;
///
/// let sequence = ChapIdentifierSequence::starting_at(254);
/// assert_eq!(sequence.next_identifier(), 254);
/// assert_eq!(sequence.next_identifier(), 255);
/// assert_eq!(sequence.next_identifier(), 0);
///
/// // shared by every client configuration that doesn't supply its own
/// let global = ChapIdentifierSequence::process_wide();
/// assert!(Arc::ptr_eq(&global, &ChapIdentifierSequence::process_wide()));
/// ```
#[derive(Debug)]
pub struct ChapIdentifierSequence(AtomicU8);

impl ChapIdentifierSequence {
    /// Creates a sequence whose first identifier is `first`.
    pub fn starting_at(first: u8) -> Self {
        Self(AtomicU8::new(first))
    }

    /// The sequence shared across the whole process.
    pub fn process_wide() -> Arc<Self> {
        static PROCESS_WIDE: OnceLock<Arc<ChapIdentifierSequence>> = OnceLock::new();

        PROCESS_WIDE
            .get_or_init(|| Arc::new(Self::starting_at(0)))
            .clone()
    }

    /// Returns the next identifier in this sequence.
    pub fn next_identifier(&self) -> u8 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

/// Generates a random challenge for a CHAP attempt.
pub(super) fn random_challenge() -> [u8; CHALLENGE_LENGTH] {
    rand::random()
}

/// Builds the data field of a CHAP start packet: identifier, then challenge, then
/// MD5(identifier || password || challenge).
pub(super) fn chap_data(
    identifier: u8,
    password: &[u8],
    challenge: &[u8; CHALLENGE_LENGTH],
) -> Vec<u8> {
    let mut hasher = Md5::new();
    hasher.update([identifier]);
    hasher.update(password);
    hasher.update(challenge);
    let response = hasher.finalize();

    let mut data = Vec::with_capacity(1 + CHALLENGE_LENGTH + RESPONSE_LENGTH);
    data.push(identifier);
    data.extend_from_slice(challenge);
    data.extend_from_slice(&response);

    data
}
