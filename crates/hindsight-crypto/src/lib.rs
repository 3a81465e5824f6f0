/// Hindsight crypto primitives.
///
/// Two distinct derivations from the same raw connection id, which must
/// never be mixed up:
/// - `hash::connection_key` produces the opaque digest used as the storage
///   partition key (safe to persist);
/// - `cipher::ContentCipher` uses the raw id itself as symmetric key
///   material (never persisted).
///
/// Once a connection is revoked the raw id is gone and any ciphertext still
/// stored under its digest is permanently unreadable. That is accepted:
/// the store is purged on revocation anyway.
pub mod cipher;
pub mod hash;

pub use cipher::{CipherError, ContentCipher};
pub use hash::connection_key;
