use std::fmt::Display;
use std::sync::Arc;

use rand::Rng;

/// Symbols a sequence id is drawn from.
pub const SEQ_ALPHABET: &[u8; 62] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of a generated sequence id.
pub const SEQ_LEN: usize = 21;

/// A sequence id correlating a request with its reply, or a stream message with its
/// acknowledgment.
///
/// Ids generated locally are 21 symbols over a 62 symbol URL-safe alphabet. Ids received from
/// the server are kept verbatim.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SeqId(Arc<str>);

impl SeqId {
    /// Generate a fresh id from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let id: String = (0..SEQ_LEN)
            .map(|_| char::from(SEQ_ALPHABET[rng.random_range(0..SEQ_ALPHABET.len())]))
            .collect();
        Self(id.into())
    }

    /// Returns the underlying string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SeqId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for SeqId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for SeqId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for SeqId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<SeqId> for String {
    fn from(id: SeqId) -> Self {
        id.0.to_string()
    }
}
