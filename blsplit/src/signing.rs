//! BLS signing and verification
//!
//! Signing is the deterministic BLS transform $\sigma = H(m) \cdot sk$, where $H$ is
//! [hash-to-curve](Ciphersuite::hash_to_curve) with the ciphersuite's domain separation tag. It's
//! linear in the secret key, so signature shares produced by key shares can be
//! [interpolated](crate::recovery::recover_signature) into the master signature.

use crate::{key_share::PublicKeyShare, Ciphersuite, Identifier, KeyShare, SecretScalar};

/// Signature issued by one key share
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureShare<C: Ciphersuite> {
    /// Identifier of the key share that produced the signature
    pub id: Identifier,
    /// Partial signature $H(m) \cdot f(x_i)$
    pub signature: C::Signature,
}

impl<C: Ciphersuite> SignatureShare<C> {
    /// Verifies the signature share against the public key share of the same participant
    ///
    /// Returns `false` if the share was issued by another participant.
    pub fn verify(&self, public_share: &PublicKeyShare<C>, msg: &[u8]) -> bool {
        self.id == public_share.id && verify::<C>(&self.signature, &public_share.public, msg)
    }
}

/// Signs the message with the key share
pub fn sign<C: Ciphersuite>(key_share: &KeyShare<C>, msg: &[u8]) -> SignatureShare<C> {
    SignatureShare {
        id: key_share.id,
        signature: C::sign(&key_share.secret, msg),
    }
}

/// Signs the message with the secret key
pub fn sign_with_secret<C: Ciphersuite>(secret_key: &SecretScalar, msg: &[u8]) -> C::Signature {
    C::sign(secret_key, msg)
}

/// Verifies the signature against the public key and message
pub fn verify<C: Ciphersuite>(
    signature: &C::Signature,
    public_key: &C::PublicKey,
    msg: &[u8],
) -> bool {
    C::verify(public_key, signature, msg)
}
