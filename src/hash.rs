//! # Definition Digests
//!
//! Incremental SHA-256 digest used to fingerprint pod definitions.
//!
//! ## Encoding
//!
//! Every field is written as `label '=' len(value) value`, where `len` is the
//! little-endian `u64` byte length of the value. Labels are fixed per field,
//! so two structures can only share a digest if they carry the same values in
//! the same fields:
//!
//! ```text
//! name=<8>"frontend" image=<12>"nginx:latest" memory_mb=<3>"128"
//! ```
//!
//! Absent fields write nothing at all. Numbers are written as their decimal
//! representation and booleans as `"true"` / `"false"`.
//!
//! Composite fields are written as the digests of their elements, in the order
//! produced by [`crate::canonical`].

use sha2::{Digest, Sha256};

/// Incremental digest over labelled fields.
#[derive(Clone, Default)]
pub struct DefinitionHasher {
    inner: Sha256,
}

impl DefinitionHasher {
    /// Creates an empty hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a field unconditionally.
    pub fn add(&mut self, label: &str, value: impl AsRef<[u8]>) {
        let value = value.as_ref();
        self.inner.update(label.as_bytes());
        self.inner.update(b"=");
        self.inner.update((value.len() as u64).to_le_bytes());
        self.inner.update(value);
    }

    /// Writes a string field if it is present and non-empty.
    pub fn add_str(&mut self, label: &str, value: Option<&str>) {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.add(label, v);
        }
    }

    /// Writes a numeric field if present.
    pub fn add_int(&mut self, label: &str, value: Option<i32>) {
        if let Some(v) = value {
            self.add(label, v.to_string());
        }
    }

    /// Writes a boolean field if present.
    pub fn add_bool(&mut self, label: &str, value: Option<bool>) {
        if let Some(v) = value {
            self.add(label, if v { "true" } else { "false" });
        }
    }

    /// Writes every element of an ordered sequence under the same label.
    pub fn add_all<I, S>(&mut self, label: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        for v in values {
            self.add(label, v);
        }
    }

    /// Finishes the digest and returns it as lowercase hex.
    #[must_use]
    pub fn finish(self) -> String {
        hex::encode(self.inner.finalize())
    }
}

/// Length of a finished digest in hex characters.
pub const DIGEST_HEX_LEN: usize = 64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_digest_is_sha256_of_nothing() {
        let digest = DefinitionHasher::new().finish();
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_absent_and_empty_fields_write_nothing() {
        let mut h = DefinitionHasher::new();
        h.add_str("name", None);
        h.add_str("image", Some(""));
        h.add_int("cpu", None);
        h.add_bool("owned", None);
        assert_eq!(h.finish(), DefinitionHasher::new().finish());
    }

    #[test]
    fn test_field_boundaries_are_unambiguous() {
        let mut a = DefinitionHasher::new();
        a.add("command", "ab");
        a.add("command", "c");

        let mut b = DefinitionHasher::new();
        b.add("command", "a");
        b.add("command", "bc");

        assert_ne!(a.finish(), b.finish());
    }

    #[test]
    fn test_labels_distinguish_fields() {
        let mut a = DefinitionHasher::new();
        a.add_str("task_role", Some("role"));
        let mut b = DefinitionHasher::new();
        b.add_str("execution_role", Some("role"));
        assert_ne!(a.finish(), b.finish());
    }

    #[test]
    fn test_digest_is_fixed_width_hex() {
        let mut h = DefinitionHasher::new();
        h.add_int("memory_mb", Some(128));
        let digest = h.finish();
        assert_eq!(digest.len(), DIGEST_HEX_LEN);
        assert!(digest
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }
}
