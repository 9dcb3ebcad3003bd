//! Ed25519 message signing and verification.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use lattice_types::{Account, PrivateKey, Signature};

/// Sign a message with a private key, returning the signature.
pub fn sign_message(message: &[u8], private_key: &PrivateKey) -> Signature {
    let signing_key = SigningKey::from_bytes(&private_key.0);
    Signature(signing_key.sign(message).to_bytes())
}

/// Verify a signature against a message and the account's public key.
///
/// Returns `false` for malformed public keys instead of erroring.
pub fn verify_signature(message: &[u8], signature: &Signature, account: &Account) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(account.as_bytes()) else {
        return false;
    };
    let dalek_sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key.verify(message, &dalek_sig).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::keypair_from_seed;

    #[test]
    fn sign_and_verify() {
        let kp = keypair_from_seed(&[7u8; 32]);
        let msg = b"test message";
        let sig = sign_message(msg, &kp.private);
        assert!(verify_signature(msg, &sig, &kp.account));
    }

    #[test]
    fn wrong_message_fails() {
        let kp = keypair_from_seed(&[7u8; 32]);
        let sig = sign_message(b"correct message", &kp.private);
        assert!(!verify_signature(b"wrong message", &sig, &kp.account));
    }

    #[test]
    fn wrong_key_fails() {
        let kp1 = keypair_from_seed(&[1u8; 32]);
        let kp2 = keypair_from_seed(&[2u8; 32]);
        let sig = sign_message(b"test", &kp1.private);
        assert!(!verify_signature(b"test", &sig, &kp2.account));
    }

    #[test]
    fn zero_signature_fails() {
        let kp = keypair_from_seed(&[3u8; 32]);
        assert!(!verify_signature(b"test", &Signature::ZERO, &kp.account));
    }
}
