//! Base58Check address encoding.

/// Encodes `version ‖ payload ‖ checksum` in base-58 with the Bitcoin alphabet.
///
/// The checksum is the first 4 bytes of double SHA-256 over `version ‖ payload`.
pub fn check_encode(version: u8, payload: &[u8]) -> String {
    bs58::encode(payload).with_check_version(version).into_string()
}
