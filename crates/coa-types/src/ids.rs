//! Identifiers used throughout the CoA exchange.
//!
//! Accounts are raw 20-byte ledger addresses, businesses are identified by a
//! natural number (typically a VAT id), and requests by a monotonically
//! increasing number assigned by the exchange.

use std::fmt;

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{CoaError, Result, constants};

fn decode_prefixed_hex(s: &str) -> std::result::Result<Vec<u8>, hex::FromHexError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    hex::decode(digits)
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// A ledger account address. The calling identity of every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AccountId(pub [u8; constants::ACCOUNT_LEN]);

impl AccountId {
    #[must_use]
    pub fn from_bytes(bytes: [u8; constants::ACCOUNT_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; constants::ACCOUNT_LEN] {
        &self.0
    }

    /// Parse a `0x`-prefixed (or bare) hex address.
    ///
    /// # Errors
    /// Returns [`CoaError::InvalidAccount`] for non-hex input or a length
    /// other than 20 bytes.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = decode_prefixed_hex(s).map_err(|e| CoaError::InvalidAccount {
            reason: format!("{s:?}: {e}"),
        })?;
        let arr: [u8; constants::ACCOUNT_LEN] =
            bytes
                .try_into()
                .map_err(|b: Vec<u8>| CoaError::InvalidAccount {
                    reason: format!(
                        "expected {} bytes, got {}",
                        constants::ACCOUNT_LEN,
                        b.len()
                    ),
                })?;
        Ok(Self(arr))
    }

    /// Short form for log lines: first four bytes.
    #[must_use]
    pub fn short(&self) -> String {
        format!("0x{}", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl std::str::FromStr for AccountId {
    type Err = CoaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

// ---------------------------------------------------------------------------
// BusinessId
// ---------------------------------------------------------------------------

/// Natural-number business identifier (e.g. a VAT id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct BusinessId(pub u64);

impl fmt::Display for BusinessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "biz:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// RequestNumber
// ---------------------------------------------------------------------------

/// Monotonically increasing identifier of a CoA request. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct RequestNumber(pub u64);

impl RequestNumber {
    /// The number following this one.
    ///
    /// # Errors
    /// Returns [`CoaError::RequestNumberExhausted`] instead of wrapping.
    pub fn next(self) -> Result<Self> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or(CoaError::RequestNumberExhausted)
    }
}

impl fmt::Display for RequestNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ContentRef
// ---------------------------------------------------------------------------

/// Opaque reference (usually a hash) to the off-ledger report being certified.
///
/// The exchange never dereferences it and never checks that matching
/// content exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRef(pub Vec<u8>);

impl ContentRef {
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Build a SHA-256 reference over `content`.
    #[must_use]
    pub fn digest(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(constants::CONTENT_REF_DOMAIN);
        hasher.update(content);
        Self(hasher.finalize().to_vec())
    }

    /// Parse a `0x`-prefixed (or bare) hex reference such as `0x98653a`.
    ///
    /// # Errors
    /// Returns [`CoaError::Serialization`] for malformed or empty input.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = decode_prefixed_hex(s)
            .map_err(|e| CoaError::Serialization(format!("content ref {s:?}: {e}")))?;
        if bytes.is_empty() {
            return Err(CoaError::Serialization("content ref is empty".into()));
        }
        Ok(Self(bytes))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// A business's public key, stored as opaque bytes.
///
/// The registry does not interpret the encoding. Callers that use ed25519
/// keys can go through [`PublicKey::to_ed25519`] and [`PublicKey::verify`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub Vec<u8>);

impl PublicKey {
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Parse a `0x`-prefixed (or bare) hex key.
    ///
    /// # Errors
    /// Returns [`CoaError::InvalidPublicKey`] for malformed hex.
    pub fn from_hex(s: &str) -> Result<Self> {
        decode_prefixed_hex(s)
            .map(Self)
            .map_err(|e| CoaError::InvalidPublicKey {
                reason: format!("{s:?}: {e}"),
            })
    }

    #[must_use]
    pub fn from_ed25519(key: &VerifyingKey) -> Self {
        Self(key.to_bytes().to_vec())
    }

    /// Interpret the stored bytes as an ed25519 verifying key.
    ///
    /// # Errors
    /// Returns [`CoaError::InvalidPublicKey`] if the bytes are not a valid
    /// 32-byte compressed point.
    pub fn to_ed25519(&self) -> Result<VerifyingKey> {
        let bytes: [u8; 32] =
            self.0
                .as_slice()
                .try_into()
                .map_err(|_| CoaError::InvalidPublicKey {
                    reason: format!("expected 32 bytes, got {}", self.0.len()),
                })?;
        VerifyingKey::from_bytes(&bytes).map_err(|e| CoaError::InvalidPublicKey {
            reason: e.to_string(),
        })
    }

    /// Verify an ed25519 signature over `message`.
    ///
    /// # Errors
    /// - `InvalidPublicKey` if the key bytes are not ed25519
    /// - `SignatureInvalid` if the signature is malformed or does not verify
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        let key = self.to_ed25519()?;
        let sig = Signature::from_slice(signature).map_err(|_| CoaError::SignatureInvalid)?;
        key.verify(message, &sig)
            .map_err(|_| CoaError::SignatureInvalid)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

/// Random identities for tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl AccountId {
    /// A uniformly random account address.
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random::<[u8; constants::ACCOUNT_LEN]>())
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl PublicKey {
    /// A freshly generated ed25519 key, returned with its signing half.
    #[must_use]
    pub fn generate_ed25519() -> (ed25519_dalek::SigningKey, Self) {
        let signing = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
        let public = Self::from_ed25519(&signing.verifying_key());
        (signing, public)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::Signer;

    #[test]
    fn account_hex_roundtrip() {
        let acct = AccountId::random();
        let parsed = AccountId::from_hex(&acct.to_string()).unwrap();
        assert_eq!(acct, parsed);
        let parsed: AccountId = acct.to_string().parse().unwrap();
        assert_eq!(acct, parsed);
    }

    #[test]
    fn account_rejects_wrong_length() {
        let err = AccountId::from_hex("0x1234").unwrap_err();
        assert!(matches!(err, CoaError::InvalidAccount { .. }));
    }

    #[test]
    fn account_rejects_non_hex() {
        let err = AccountId::from_hex("0xzz").unwrap_err();
        assert!(matches!(err, CoaError::InvalidAccount { .. }));
    }

    #[test]
    fn account_short_is_prefix() {
        let acct = AccountId([0x11; 20]);
        assert_eq!(acct.short(), "0x11111111");
        assert!(acct.to_string().starts_with(&acct.short()));
    }

    #[test]
    fn request_number_next() {
        assert_eq!(RequestNumber(5).next().unwrap(), RequestNumber(6));
    }

    #[test]
    fn request_number_does_not_wrap() {
        let err = RequestNumber(u64::MAX).next().unwrap_err();
        assert_eq!(err, CoaError::RequestNumberExhausted);
    }

    #[test]
    fn content_ref_from_short_hex() {
        let r = ContentRef::from_hex("0x98653a").unwrap();
        assert_eq!(r.as_bytes(), &[0x98, 0x65, 0x3a]);
        assert_eq!(r.to_string(), "0x98653a");
    }

    #[test]
    fn content_ref_rejects_empty() {
        assert!(ContentRef::from_hex("0x").is_err());
    }

    #[test]
    fn content_ref_digest_deterministic() {
        let a = ContentRef::digest(b"batch 42 report");
        let b = ContentRef::digest(b"batch 42 report");
        let c = ContentRef::digest(b"batch 43 report");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_bytes().len(), 32);
    }

    #[test]
    fn public_key_from_hex() {
        let key = PublicKey::from_hex(
            "0x49c7e43c42e28e74e31abbb02534d2a383ec42df5ae41a7cf9da1e74dfc0226a",
        )
        .unwrap();
        assert_eq!(key.as_bytes().len(), 32);
    }

    #[test]
    fn public_key_verifies_ed25519_signature() {
        let (signing, public) = PublicKey::generate_ed25519();
        let sig = signing.sign(b"coa report");
        assert!(public.verify(b"coa report", &sig.to_bytes()).is_ok());
        assert_eq!(
            public.verify(b"tampered", &sig.to_bytes()).unwrap_err(),
            CoaError::SignatureInvalid
        );
    }

    #[test]
    fn opaque_key_is_not_ed25519() {
        let key = PublicKey::new(vec![1, 2, 3]);
        assert!(matches!(
            key.to_ed25519().unwrap_err(),
            CoaError::InvalidPublicKey { .. }
        ));
    }

    #[test]
    fn serde_roundtrips() {
        let acct = AccountId::random();
        let json = serde_json::to_string(&acct).unwrap();
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(acct, back);

        let n = RequestNumber(12);
        let json = serde_json::to_string(&n).unwrap();
        let back: RequestNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(n, back);
    }
}
