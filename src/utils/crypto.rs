use data_encoding::HEXLOWER;
use ring::digest::{Context, SHA256};

/// Deterministic one-way digest used for transaction fingerprints and block hashes.
///
/// Implementations must be pure: the same input always yields the same
/// lowercase hex string, on every machine.
pub trait HashingService: Send + Sync {
    fn digest(&self, data: &[u8]) -> String;

    fn digest_str(&self, text: &str) -> String {
        self.digest(text.as_bytes())
    }
}

/// SHA-256, hex encoded
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl HashingService for Sha256Hasher {
    fn digest(&self, data: &[u8]) -> String {
        sha256_hex(data)
    }
}

pub fn sha256_digest(data: &[u8]) -> Vec<u8> {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    digest.as_ref().to_vec()
}

pub fn sha256_hex(data: &[u8]) -> String {
    HEXLOWER.encode(&sha256_digest(data))
}
