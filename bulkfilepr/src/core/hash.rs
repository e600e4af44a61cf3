//! SHA-256 content fingerprints.

use std::fs::File;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Lowercase hex SHA-256 of the file at `path`, streamed from disk.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// First `len` characters of a hex digest (the whole digest if shorter).
pub fn truncate_hex(digest: &str, len: usize) -> &str {
    digest.get(..len).unwrap_or(digest)
}
