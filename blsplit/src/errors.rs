//! Errors related to malformed cryptographic material

use core::fmt;

use crate::ParticipantId;

/// Scalar bytes aren't a canonical encoding of a field element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidScalar;

impl fmt::Display for InvalidScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid scalar encoding")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidScalar {}

/// Point bytes aren't a valid compressed encoding of a group element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPoint;

impl fmt::Display for InvalidPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid point encoding")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidPoint {}

/// Malformed key material
///
/// Any operation failing with this error must abort the split: values derived downstream from
/// malformed material can't be verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoError(Reason);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Reason {
    InvalidScalar,
    InvalidPoint { index: Option<usize> },
    ZeroIdentifier(ParticipantId),
    ZeroSecret,
    EmptyVerificationVector,
}

impl CryptoError {
    pub(crate) fn zero_identifier(id: ParticipantId) -> Self {
        Self(Reason::ZeroIdentifier(id))
    }
    pub(crate) fn zero_secret() -> Self {
        Self(Reason::ZeroSecret)
    }
    pub(crate) fn empty_verification_vector() -> Self {
        Self(Reason::EmptyVerificationVector)
    }
    pub(crate) fn invalid_commitment(index: usize) -> Self {
        Self(Reason::InvalidPoint { index: Some(index) })
    }

    /// Indicates that the error was caused by an identifier that maps to zero
    pub fn is_zero_identifier(&self) -> bool {
        matches!(self.0, Reason::ZeroIdentifier(_))
    }
}

impl From<InvalidScalar> for CryptoError {
    fn from(_: InvalidScalar) -> Self {
        Self(Reason::InvalidScalar)
    }
}

impl From<InvalidPoint> for CryptoError {
    fn from(_: InvalidPoint) -> Self {
        Self(Reason::InvalidPoint { index: None })
    }
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Reason::InvalidScalar => f.write_str("malformed secret: invalid scalar encoding"),
            Reason::InvalidPoint { index: None } => f.write_str("invalid point encoding"),
            Reason::InvalidPoint { index: Some(i) } => {
                write!(f, "verification vector entry {i} is not a valid point")
            }
            Reason::ZeroIdentifier(id) => {
                write!(f, "participant id {id} maps to the zero identifier")
            }
            Reason::ZeroSecret => f.write_str("secret key must be nonzero"),
            Reason::EmptyVerificationVector => f.write_str("verification vector is empty"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CryptoError {}
