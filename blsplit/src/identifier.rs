//! Participant identifiers
//!
//! Every participant is known by an integer [`ParticipantId`]. Its share is the sharing polynomial
//! evaluated at the [`Identifier`]: the participant ID embedded into the scalar field as
//! little-endian bytes, zero-padded to the field width. Zero is reserved for the master secret
//! itself, so an ID that maps to zero is never accepted.

use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::{config::ConfigError, errors::CryptoError, ParticipantId, Scalar};

/// Nonzero evaluation point of a participant's share
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identifier {
    participant: ParticipantId,
    scalar: Scalar,
}

impl Identifier {
    /// Embeds participant ID into the scalar field
    ///
    /// Returns error if the embedding is the zero scalar.
    pub fn new(participant: ParticipantId) -> Result<Self, CryptoError> {
        // Same as reading `participant.to_le_bytes()` zero-padded to 32 bytes: any u64 is
        // below the field modulus
        let scalar = Scalar::from(participant);
        if bool::from(ff::Field::is_zero(&scalar)) {
            return Err(CryptoError::zero_identifier(participant));
        }
        Ok(Self {
            participant,
            scalar,
        })
    }

    /// Participant ID this identifier was derived from
    pub fn participant_id(&self) -> ParticipantId {
        self.participant
    }

    /// Identifier as a field element
    pub fn as_scalar(&self) -> &Scalar {
        &self.scalar
    }
}

impl AsRef<Scalar> for Identifier {
    fn as_ref(&self) -> &Scalar {
        &self.scalar
    }
}

// The embedding is injective on `u64`, so participant IDs order identifiers unambiguously
impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.participant.cmp(&other.participant)
    }
}

/// Issues identifiers for all participants of one split
///
/// Output preserves the input order. Fails with [`ConfigError::DuplicateIdentifier`] if some ID
/// appears more than once, and with [`ConfigError::Crypto`] if some ID maps to zero.
pub fn issue_identifiers(
    participants: impl IntoIterator<Item = ParticipantId>,
) -> Result<Vec<Identifier>, ConfigError> {
    let ids = participants
        .into_iter()
        .map(Identifier::new)
        .collect::<Result<Vec<_>, _>>()?;

    let mut sorted = ids.clone();
    sorted.sort_unstable();
    if let Some(dup) = sorted.windows(2).find(|win| win[0] == win[1]) {
        return Err(ConfigError::DuplicateIdentifier(dup[0].participant));
    }

    Ok(ids)
}
