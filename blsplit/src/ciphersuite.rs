//! BLS Ciphersuite
//!
//! Ciphersuite specifies which groups hold public keys and signatures, and which hash-to-curve
//! suite and domain separation tag are used to map a message onto the signature group.
//!
//! Out of the box, we provide both ciphersuites defined for BLS12-381 in the [BLS signatures draft]:
//! * [MinPk]: public keys in G1 (48 bytes), signatures in G2 (96 bytes). This is the layout used by
//!   Ethereum consensus layer.
//! * [MinSig]: public keys in G2 (96 bytes), signatures in G1 (48 bytes).
//!
//! Both use the proof-of-possession scheme tag, so signatures are interoperable with other
//! implementations of the same ciphersuite (e.g. `blst`).
//!
//! A ciphersuite is a zero-sized type. It carries no state, so the whole configuration is fixed at
//! compile time and threaded through every component as a generic parameter.
//!
//! [BLS signatures draft]: https://www.ietf.org/archive/id/draft-irtf-cfrg-bls-signature-05.html#name-ciphersuites

use group::{Group, GroupEncoding};

use crate::{
    errors::{InvalidPoint, InvalidScalar},
    recovery::Interpolate,
    Scalar, SecretScalar,
};

mod min_pk;
mod min_sig;

pub use min_pk::MinPk;
pub use min_sig::MinSig;

/// Size of serialized scalar in bytes
pub const SCALAR_SIZE: usize = 32;

/// Ciphersuite determines the groups and hash-to-curve suite used for signing
pub trait Ciphersuite:
    Sized + Clone + Copy + core::fmt::Debug + PartialEq + Eq + Send + Sync + 'static
{
    /// Name of the ciphersuite
    const NAME: &'static str;

    /// Domain separation tag fed into hash-to-curve
    ///
    /// Signing never applies any other domain separation on top of it: the message is hashed
    /// exactly as provided by the caller.
    const DST: &'static [u8];

    /// Group that holds public keys
    type PublicKey: Group<Scalar = Scalar> + GroupEncoding + Interpolate;
    /// Group that holds signatures
    type Signature: Group<Scalar = Scalar> + GroupEncoding + Interpolate;

    /// Hashes the message onto the signature group
    ///
    /// Implementations use `hash_to_curve` from [RFC 9380] with `expand_message_xmd(SHA-256)` and
    /// [`Self::DST`](Ciphersuite::DST).
    ///
    /// [RFC 9380]: https://www.rfc-editor.org/rfc/rfc9380.html
    fn hash_to_curve(msg: &[u8]) -> Self::Signature;

    /// Checks the pairing equation of BLS signature verification
    ///
    /// Must return `false` if `public_key` is the identity point.
    fn verify(public_key: &Self::PublicKey, signature: &Self::Signature, msg: &[u8]) -> bool;

    /// Public key that corresponds to the secret key
    fn public_key(secret_key: &SecretScalar) -> Self::PublicKey {
        Self::PublicKey::generator() * secret_key.as_ref()
    }

    /// Signs the message with the secret key
    ///
    /// BLS signing is deterministic: `H(msg) * secret_key`
    fn sign(secret_key: &SecretScalar, msg: &[u8]) -> Self::Signature {
        Self::hash_to_curve(msg) * secret_key.as_ref()
    }

    /// Serializes scalar as 32 bytes little-endian
    fn serialize_scalar(scalar: &Scalar) -> [u8; SCALAR_SIZE] {
        scalar.to_bytes()
    }
    /// Deserializes scalar, encoding must be canonical
    fn deserialize_scalar(bytes: &[u8]) -> Result<Scalar, InvalidScalar> {
        let bytes: &[u8; SCALAR_SIZE] = bytes.try_into().map_err(|_| InvalidScalar)?;
        Option::from(Scalar::from_bytes(bytes)).ok_or(InvalidScalar)
    }
    /// Deserializes secret scalar
    fn deserialize_secret_scalar(bytes: &[u8]) -> Result<SecretScalar, InvalidScalar> {
        let mut scalar = Self::deserialize_scalar(bytes)?;
        Ok(SecretScalar::new(&mut scalar))
    }

    /// Serializes public key in compressed form
    fn serialize_public_key(point: &Self::PublicKey) -> <Self::PublicKey as GroupEncoding>::Repr {
        point.to_bytes()
    }
    /// Deserializes public key from compressed form
    fn deserialize_public_key(bytes: &[u8]) -> Result<Self::PublicKey, InvalidPoint> {
        deserialize_point(bytes)
    }

    /// Serializes signature in compressed form
    fn serialize_signature(point: &Self::Signature) -> <Self::Signature as GroupEncoding>::Repr {
        point.to_bytes()
    }
    /// Deserializes signature from compressed form
    fn deserialize_signature(bytes: &[u8]) -> Result<Self::Signature, InvalidPoint> {
        deserialize_point(bytes)
    }
}

/// Deserializes a point from its compressed encoding
///
/// Rejects encodings of the wrong length, encodings that are not on the curve, and points
/// outside the prime-order subgroup.
pub fn deserialize_point<G: GroupEncoding>(bytes: &[u8]) -> Result<G, InvalidPoint> {
    let mut repr = G::Repr::default();
    if repr.as_ref().len() != bytes.len() {
        return Err(InvalidPoint);
    }
    repr.as_mut().copy_from_slice(bytes);
    Option::from(G::from_bytes(&repr)).ok_or(InvalidPoint)
}
