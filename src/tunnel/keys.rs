//! WireGuard key pairs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use x25519_dalek::{PublicKey, StaticSecret};

/// A Curve25519 key pair, both halves base64 encoded as in wg-quick files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPair {
    pub public_key: String,
    pub private_key: String,
}

/// Generate a fresh key pair from the OS random source.
///
/// The private key is clamped the same way `wg genkey` clamps it.
pub fn generate_key_pair() -> KeyPair {
    let mut private = StaticSecret::random_from_rng(OsRng).to_bytes();
    private[0] &= 248;
    private[31] &= 127;
    private[31] |= 64;

    let secret = StaticSecret::from(private);
    let public = PublicKey::from(&secret);

    KeyPair {
        public_key: STANDARD.encode(public.as_bytes()),
        private_key: STANDARD.encode(secret.to_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(key: &str) -> [u8; 32] {
        STANDARD.decode(key).unwrap().try_into().unwrap()
    }

    #[test]
    fn test_keys_are_32_bytes() {
        let pair = generate_key_pair();
        assert_eq!(pair.public_key.len(), 44);
        assert_eq!(pair.private_key.len(), 44);
        decode(&pair.public_key);
        decode(&pair.private_key);
    }

    #[test]
    fn test_public_key_derives_from_private() {
        let pair = generate_key_pair();
        let secret = StaticSecret::from(decode(&pair.private_key));
        assert_eq!(
            STANDARD.encode(PublicKey::from(&secret).as_bytes()),
            pair.public_key
        );
    }

    #[test]
    fn test_private_key_is_clamped() {
        let private = decode(&generate_key_pair().private_key);
        assert_eq!(private[0] & 7, 0);
        assert_eq!(private[31] & 128, 0);
        assert_eq!(private[31] & 64, 64);
    }

    #[test]
    fn test_pairs_differ() {
        assert_ne!(generate_key_pair(), generate_key_pair());
    }

    #[test]
    fn test_serializes_with_camel_case_names() {
        let json = serde_json::to_value(generate_key_pair()).unwrap();
        assert!(json["publicKey"].is_string());
        assert!(json["privateKey"].is_string());
    }
}
