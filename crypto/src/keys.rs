//! Ed25519 key generation.

use ed25519_dalek::SigningKey;
use lattice_types::{Account, KeyPair, PrivateKey};
use rand::rngs::OsRng;

/// Generate a new Ed25519 key pair from a secure random source.
pub fn generate_keypair() -> KeyPair {
    let signing_key = SigningKey::generate(&mut OsRng);
    KeyPair {
        account: Account::new(signing_key.verifying_key().to_bytes()),
        private: PrivateKey(signing_key.to_bytes()),
    }
}

/// Derive the account (public key) from a private key.
pub fn public_from_private(private: &PrivateKey) -> Account {
    let signing_key = SigningKey::from_bytes(&private.0);
    Account::new(signing_key.verifying_key().to_bytes())
}

/// Reconstruct a full key pair from a private key.
pub fn keypair_from_private(private: PrivateKey) -> KeyPair {
    let account = public_from_private(&private);
    KeyPair { account, private }
}

/// Derive a key pair from a 32-byte seed (deterministic).
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    keypair_from_private(PrivateKey(*seed))
}
