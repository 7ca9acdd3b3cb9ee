//! Content digest over the canonical rendering.

use super::writer::render_text;
use crate::model::Document;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// SHA-256 of the UTF-8 rendering, base64-encoded, then hex-encoded.
///
/// The rendering is encoding-independent, so documents read from PC8, UTF-8
/// and Latin-1 copies of the same file hash identically.
pub fn checksum(doc: &Document) -> String {
    let digest = sha256(render_text(doc).as_bytes());
    hex::encode(STANDARD.encode(digest))
}

fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_digest() {
        let b64 = STANDARD.encode(sha256(b""));
        assert_eq!(b64, "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=");
        assert_eq!(hex::encode(&b64).len(), 88);
    }
}
