//! Verification vector
//!
//! Public commitments $A_i = a_i \cdot G$ to the coefficients of the sharing polynomial. It's
//! published to every participant, and lets anyone derive a participant's public key share from
//! its identifier without any secret material:
//!
//! $$P_j = \sum_i A_i \cdot x_j^i = f(x_j) \cdot G$$
//!
//! The commitment is binding but not hiding: the first entry is the master public key.

use alloc::vec::Vec;

use group::Group;

use crate::{errors::CryptoError, Ciphersuite, Identifier, Threshold};

/// Commitments to the sharing polynomial coefficients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationVector<C: Ciphersuite> {
    commitments: Vec<C::PublicKey>,
}

impl<C: Ciphersuite> VerificationVector<C> {
    /// Constructs a verification vector from the list of commitments
    ///
    /// Returns error if the list is empty, if it's longer than [`Threshold::MAX`], or if the master
    /// public key is the identity point.
    pub fn from_commitments(commitments: Vec<C::PublicKey>) -> Result<Self, CryptoError> {
        match commitments.first() {
            None => return Err(CryptoError::empty_verification_vector()),
            Some(pk) if bool::from(pk.is_identity()) => {
                return Err(CryptoError::invalid_commitment(0))
            }
            Some(_) => (),
        }
        if Threshold::try_from(commitments.len()).is_err() {
            return Err(CryptoError::invalid_commitment(usize::from(Threshold::MAX)));
        }
        Ok(Self { commitments })
    }

    pub(crate) fn from_commitments_unchecked(commitments: Vec<C::PublicKey>) -> Self {
        Self { commitments }
    }

    /// Threshold `t` of the split, equals to the number of commitments
    pub fn threshold(&self) -> Threshold {
        Threshold::try_from(self.commitments.len()).unwrap_or(Threshold::MAX)
    }

    /// Master public key
    pub fn master_public_key(&self) -> C::PublicKey {
        self.commitments
            .first()
            .copied()
            .unwrap_or_else(C::PublicKey::identity)
    }

    /// List of commitments
    pub fn commitments(&self) -> &[C::PublicKey] {
        &self.commitments
    }

    /// Evaluates the verification vector at the identifier
    ///
    /// Group-valued analogue of polynomial evaluation (Horner's method with scalar
    /// multiplication and point addition). Returns the public key share of the participant.
    pub fn evaluate(&self, x: &Identifier) -> C::PublicKey {
        self.commitments
            .iter()
            .rev()
            .fold(C::PublicKey::identity(), |acc, a_i| acc * x.as_scalar() + a_i)
    }

    /// Serializes each commitment in compressed form
    pub fn to_bytes(&self) -> Vec<Vec<u8>> {
        self.commitments
            .iter()
            .map(|a_i| C::serialize_public_key(a_i).as_ref().to_vec())
            .collect()
    }

    /// Deserializes verification vector from the list of compressed commitments
    pub fn from_bytes<B: AsRef<[u8]>>(commitments: &[B]) -> Result<Self, CryptoError> {
        let commitments = commitments
            .iter()
            .enumerate()
            .map(|(i, bytes)| {
                C::deserialize_public_key(bytes.as_ref())
                    .map_err(|_| CryptoError::invalid_commitment(i))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_commitments(commitments)
    }
}

#[cfg(feature = "serde")]
impl<C: Ciphersuite> serde::Serialize for VerificationVector<C> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.commitments.len()))?;
        for a_i in &self.commitments {
            seq.serialize_element(&hex::encode(C::serialize_public_key(a_i)))?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
impl<'de, C: Ciphersuite> serde::Deserialize<'de> for VerificationVector<C> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;
        let encoded = <Vec<alloc::string::String>>::deserialize(deserializer)?;
        let commitments = encoded
            .iter()
            .map(hex::decode)
            .collect::<Result<Vec<_>, _>>()
            .map_err(D::Error::custom)?;
        Self::from_bytes(&commitments).map_err(D::Error::custom)
    }
}
