/// Number of hex characters kept by [`short_id`].
pub const SHORT_ID_LEN: usize = 16;

/// Compute the BLAKE3 hash of a byte slice, returning the hex-encoded digest.
#[must_use]
pub fn blake3_bytes(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Derive a short, stable identifier from a string key.
///
/// The same key always yields the same identifier, across processes and
/// platforms, so identifiers can be handed to clients and looked up later.
#[must_use]
pub fn short_id(key: &str) -> String {
    let mut hex = blake3_bytes(key.as_bytes());
    hex.truncate(SHORT_ID_LEN);
    hex
}
