//! Content fingerprinting for change detection
//!
//! Uses SHA-256. Fingerprints are opaque to the rest of the core and are only
//! ever compared for equality.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// Hash a string using SHA-256
pub fn hash_string(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let hash = hasher.finalize();
    format!("sha256:{}", hex::encode(hash))
}

/// Hash a file's contents, streaming
pub fn hash_file(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open file for hashing: {}", path.display()))?;

    let mut hasher = Sha256::new();
    let mut buffer = [0; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    let hash = hasher.finalize();
    Ok(format!("sha256:{}", hex::encode(hash)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_hash_string() {
        let hash = hash_string("let g:foo = 1");
        assert!(hash.starts_with("sha256:"));
        assert_eq!(hash.len(), 7 + 64); // "sha256:" + 64 hex chars
    }

    #[test]
    fn test_hash_string_deterministic() {
        let hash1 = hash_string("test content");
        let hash2 = hash_string("test content");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_single_byte_change_alters_fingerprint() {
        let hash1 = hash_string("let g:foo = 1");
        let hash2 = hash_string("let g:foo = 2");
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_empty_vs_nonempty() {
        assert_ne!(hash_string(""), hash_string(" "));
    }

    #[test]
    fn test_hash_file_matches_hash_string() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        write!(temp_file, "set number")?;

        let from_file = hash_file(temp_file.path())?;
        assert_eq!(from_file, hash_string("set number"));

        Ok(())
    }
}
