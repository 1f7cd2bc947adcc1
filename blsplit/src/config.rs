//! Split configuration
//!
//! Describes who takes part in the split and how many of them are needed to sign. Loading it from
//! a file or environment is left to the caller.

use alloc::{collections::BTreeMap, string::String, vec::Vec};
use core::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    errors::CryptoError,
    identifier::{issue_identifiers, Identifier},
    ParticipantId, Threshold,
};

/// Participant of the split
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Participant {
    /// Participant ID, its share is evaluated at the [identifier](Identifier) derived from it
    pub id: ParticipantId,
    /// Address at which the participant is reachable when signing
    pub uri: String,
    /// Passphrase protecting the participant's account in its wallet
    pub passphrase: String,
}

impl fmt::Debug for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Participant")
            .field("id", &self.id)
            .field("uri", &self.uri)
            .finish_non_exhaustive()
    }
}

/// Threshold and list of participants
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DealerConfig {
    /// Minimal number of participants required to sign
    pub threshold: Threshold,
    /// All participants of the split
    pub participants: Vec<Participant>,
}

impl DealerConfig {
    /// Checks that `1 <= threshold <= n`, that there are no more than [`Threshold::MAX`]
    /// participants, and that participant IDs map to distinct nonzero identifiers
    ///
    /// Returns the identifiers in the same order as participants.
    pub fn validate(&self) -> Result<Vec<Identifier>, ConfigError> {
        let n = Threshold::try_from(self.participants.len())
            .map_err(|_| ConfigError::TooManyParticipants(self.participants.len()))?;
        validate_threshold(self.threshold, n)?;
        issue_identifiers(self.participants.iter().map(|p| p.id))
    }

    /// Maps participant IDs to their URIs
    pub fn participant_map(&self) -> BTreeMap<ParticipantId, String> {
        self.participants
            .iter()
            .map(|p| (p.id, p.uri.clone()))
            .collect()
    }
}

pub(crate) fn validate_threshold(threshold: Threshold, n: Threshold) -> Result<(), ConfigError> {
    if n == 0 {
        return Err(ConfigError::NoParticipants);
    }
    if threshold == 0 || threshold > n {
        return Err(ConfigError::InvalidThreshold {
            threshold,
            participants: n,
        });
    }
    Ok(())
}

/// Invalid split configuration
///
/// Detected before any cryptographic work is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// List of participants is empty
    NoParticipants,
    /// Number of participants doesn't fit into [`Threshold`]
    TooManyParticipants(usize),
    /// Threshold must be in range `1..=participants`
    InvalidThreshold {
        /// Requested threshold
        threshold: Threshold,
        /// Number of participants
        participants: Threshold,
    },
    /// Same participant ID appears more than once
    DuplicateIdentifier(ParticipantId),
    /// Participant ID can't be used as identifier
    Crypto(CryptoError),
}

impl From<CryptoError> for ConfigError {
    fn from(err: CryptoError) -> Self {
        Self::Crypto(err)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoParticipants => f.write_str("no participants specified"),
            Self::TooManyParticipants(n) => write!(
                f,
                "{n} participants specified, at most {} are supported",
                Threshold::MAX
            ),
            Self::InvalidThreshold {
                threshold,
                participants,
            } => write!(
                f,
                "invalid threshold value {threshold} (should be between 1 and {participants})"
            ),
            Self::DuplicateIdentifier(id) => {
                write!(f, "participant id {id} appears more than once")
            }
            Self::Crypto(_) => f.write_str("invalid participant id"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Crypto(err) => Some(err),
            Self::NoParticipants
            | Self::TooManyParticipants(_)
            | Self::InvalidThreshold { .. }
            | Self::DuplicateIdentifier(_) => None,
        }
    }
}
