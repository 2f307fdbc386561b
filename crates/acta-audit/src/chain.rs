//! Hash-chain primitives: entry hashing and chain integrity verification.
//!
//! Every entry commits to its predecessor through `prev_hash`, a digest of
//! the predecessor's full serialized form. The digest input is exactly the
//! canonical JSON of the entry (serde_json, no pretty-printing): struct
//! fields serialize in declaration order and `Value` maps keep sorted keys,
//! so the same entry always produces the same bytes, and therefore the same
//! hash, no matter how many times it round-trips through storage.

use sha2::{Digest, Sha256, Sha512};

use acta_contracts::audit::AuditEntry;

/// The sentinel `prev_hash` for the first entry of a SHA-256 chain.
///
/// 64 hex zeros, a value that can never be the digest of real data, making
/// genesis detection unambiguous.
pub const GENESIS_SHA256: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// The sentinel `prev_hash` for the first entry of a SHA-512 chain.
pub const GENESIS_SHA512: &str =
    "00000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000";

/// Which digest the chain is built from. Fixed per log at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    /// Digest raw bytes to a lowercase hex string.
    pub fn digest(&self, bytes: &[u8]) -> String {
        match self {
            HashAlgorithm::Sha256 => hex::encode(Sha256::digest(bytes)),
            HashAlgorithm::Sha512 => hex::encode(Sha512::digest(bytes)),
        }
    }

    /// The genesis sentinel of this algorithm's digest width.
    pub fn genesis(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => GENESIS_SHA256,
            HashAlgorithm::Sha512 => GENESIS_SHA512,
        }
    }
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        HashAlgorithm::Sha256
    }
}

/// Compute the digest of one entry's canonical serialized form.
///
/// This is the value the NEXT entry must carry as its `prev_hash`.
///
/// # Panics
///
/// Panics if `entry` cannot be serialized to JSON, which cannot happen for
/// the well-formed `AuditEntry` type.
pub fn hash_entry(algorithm: HashAlgorithm, entry: &AuditEntry) -> String {
    let bytes =
        serde_json::to_vec(entry).expect("AuditEntry must always be serializable to JSON");
    algorithm.digest(&bytes)
}

/// Verify the prev-hash linkage of a chain.
///
/// Walks the entries in order, checking that each entry's `prev_hash`
/// equals the recomputed digest of its predecessor (or the genesis sentinel
/// for the first entry). Returns `false` the moment any link fails. An
/// empty chain is defined as valid.
///
/// Linkage alone cannot detect tampering with the FINAL entry (nothing
/// commits to it yet); sinks additionally compare the recomputed terminal
/// digest against the `last_hash` they track.
pub fn verify_entries(algorithm: HashAlgorithm, entries: &[AuditEntry]) -> bool {
    let mut expected_prev = algorithm.genesis().to_string();

    for entry in entries {
        if entry.prev_hash != expected_prev {
            return false;
        }
        expected_prev = hash_entry(algorithm, entry);
    }

    true
}
