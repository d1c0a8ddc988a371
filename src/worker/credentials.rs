//! Credential Lookup
//!
//! Stored password digests keyed by username. The backing file holds one
//! `username:md5hex` record per line; blank lines and lines without a colon
//! are skipped. Usernames match case-insensitively.

use crate::error::Result;

use dashmap::DashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Lowercase hex MD5 of `candidate`.
pub fn digest(candidate: impl AsRef<[u8]>) -> String {
    format!("{:x}", md5::compute(candidate.as_ref()))
}

#[derive(Debug, Default)]
pub struct CredentialStore {
    digests: DashMap<String, String>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::info!("Initializing password repository from: {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        let store = Self::new();

        let mut parsed = 0usize;
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let Some((username, hash)) = line.split_once(':') else {
                tracing::debug!("Skipping invalid line (no colon): '{}'", line);
                continue;
            };

            store.insert(username.trim(), hash.trim());
            parsed += 1;
            if parsed % 1_000_000 == 0 {
                tracing::info!("Processed {} records so far...", parsed);
            }
        }

        tracing::info!("Loaded {} valid user records from file", parsed);
        Ok(store)
    }

    /// Builds a store from `(username, plaintext)` pairs.
    pub fn from_passwords<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        for (username, password) in pairs {
            store.insert(username, &digest(password));
        }
        store
    }

    pub fn insert(&self, username: &str, digest: &str) {
        self.digests
            .insert(username.to_lowercase(), digest.to_lowercase());
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.digests.contains_key(&username.to_lowercase())
    }

    /// Stored digest for `username`.
    pub fn get_digest(&self, username: &str) -> Option<String> {
        self.digests
            .get(&username.to_lowercase())
            .map(|entry| entry.value().clone())
    }

    /// Whether `candidate_digest` equals the digest stored for `username`.
    pub fn check_digest(&self, username: &str, candidate_digest: &str) -> bool {
        self.digests
            .get(&username.to_lowercase())
            .is_some_and(|stored| stored.eq_ignore_ascii_case(candidate_digest))
    }
}
