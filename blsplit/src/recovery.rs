//! Recovery by Lagrange interpolation at zero
//!
//! Given $t$ evaluations $(x_i, y_i)$ of a polynomial of degree $t-1$, its constant term is
//!
//! $$f(0) = \sum_i \lambda_i \cdot y_i, \quad \lambda_i = \prod_{j \ne i} \frac{x_j}{x_j - x_i}$$
//!
//! Key generation and signing are linear in the secret, so the same coefficients recover the master
//! secret from secret shares, the master public key from public key shares, and the master
//! signature from signature shares. Any $t$ shares with distinct identifiers give the same result.

use alloc::vec::Vec;
use core::fmt;

use bls12_381::{G1Projective, G2Projective};
use ff::Field;

use crate::{
    key_share::PublicKeyShare, Ciphersuite, Identifier, KeyShare, ParticipantId, Scalar,
    SecretScalar, SignatureShare, Threshold,
};

/// Value that can be recovered by interpolation: an element of a vector space over the scalar
/// field
pub trait Interpolate: Sized {
    /// Computes $\sum_i \lambda_i \cdot v_i$
    fn weighted_sum<'a>(terms: impl Iterator<Item = (Scalar, &'a Self)>) -> Self
    where
        Self: 'a;
}

impl Interpolate for Scalar {
    fn weighted_sum<'a>(terms: impl Iterator<Item = (Scalar, &'a Self)>) -> Self {
        terms.fold(Scalar::zero(), |acc, (lambda, y)| acc + lambda * y)
    }
}

impl Interpolate for SecretScalar {
    fn weighted_sum<'a>(terms: impl Iterator<Item = (Scalar, &'a Self)>) -> Self {
        let mut secret = Scalar::weighted_sum(terms.map(|(lambda, y)| (lambda, y.as_ref())));
        SecretScalar::new(&mut secret)
    }
}

macro_rules! impl_interpolate_for_group {
    ($($group:ty),+) => {$(
        impl Interpolate for $group {
            fn weighted_sum<'a>(terms: impl Iterator<Item = (Scalar, &'a Self)>) -> Self {
                terms.fold(<$group>::identity(), |acc, (lambda, y)| acc + y * lambda)
            }
        }
    )+};
}

impl_interpolate_for_group!(G1Projective, G2Projective);

/// Computes the interpolation coefficients $\lambda_i$ at zero for the list of identifiers
///
/// Output comes in the same order as `ids`. Returns error if identifiers aren't distinct.
pub fn lagrange_coefficients(ids: &[Identifier]) -> Result<Vec<Scalar>, RecoveryError> {
    ensure_distinct(ids.iter())?;

    ids.iter()
        .map(|x_i| {
            let mut num = Scalar::one();
            let mut denom = Scalar::one();
            for x_j in ids.iter().filter(|x_j| *x_j != x_i) {
                num *= x_j.as_scalar();
                denom *= x_j.as_scalar() - x_i.as_scalar();
            }
            // Denominator is nonzero as identifiers are distinct
            Option::<Scalar>::from(denom.invert())
                .map(|denom_inv| num * denom_inv)
                .ok_or(RecoveryError::DuplicateOrZeroIdentifier(x_i.participant_id()))
        })
        .collect()
}

/// Recovers the value at zero from `(identifier, value)` pairs
///
/// At least `threshold` pairs must be given. All identifiers are checked to be distinct and
/// nonzero, then the first `threshold` pairs are used.
pub fn recover<'a, V: Interpolate + 'a>(
    threshold: Threshold,
    points: impl IntoIterator<Item = (&'a Identifier, &'a V)>,
) -> Result<V, RecoveryError> {
    if threshold == 0 {
        return Err(RecoveryError::ZeroThreshold);
    }
    let points = points.into_iter().collect::<Vec<_>>();
    if points.len() < usize::from(threshold) {
        return Err(RecoveryError::InsufficientShares {
            threshold,
            provided: points.len(),
        });
    }
    ensure_distinct(points.iter().map(|(id, _)| *id))?;

    let points = &points[..usize::from(threshold)];
    let ids = points.iter().map(|(id, _)| **id).collect::<Vec<_>>();
    let lambdas = lagrange_coefficients(&ids)?;

    Ok(V::weighted_sum(
        lambdas.into_iter().zip(points.iter().map(|(_, y)| *y)),
    ))
}

/// Recovers the master secret key from secret key shares
pub fn recover_secret<C: Ciphersuite>(
    threshold: Threshold,
    key_shares: &[KeyShare<C>],
) -> Result<SecretScalar, RecoveryError> {
    recover(threshold, key_shares.iter().map(|s| (&s.id, &s.secret)))
}

/// Recovers the master public key from public key shares
pub fn recover_public_key<C: Ciphersuite>(
    threshold: Threshold,
    public_shares: &[PublicKeyShare<C>],
) -> Result<C::PublicKey, RecoveryError> {
    recover(threshold, public_shares.iter().map(|s| (&s.id, &s.public)))
}

/// Recovers the master signature from signature shares
pub fn recover_signature<C: Ciphersuite>(
    threshold: Threshold,
    sig_shares: &[SignatureShare<C>],
) -> Result<C::Signature, RecoveryError> {
    recover(threshold, sig_shares.iter().map(|s| (&s.id, &s.signature)))
}

fn ensure_distinct<'a>(ids: impl Iterator<Item = &'a Identifier>) -> Result<(), RecoveryError> {
    let mut ids = ids.collect::<Vec<_>>();
    if let Some(zero) = ids.iter().find(|id| bool::from(id.as_scalar().is_zero())) {
        return Err(RecoveryError::DuplicateOrZeroIdentifier(
            zero.participant_id(),
        ));
    }
    ids.sort_unstable();
    match ids.windows(2).find(|win| win[0] == win[1]) {
        Some(dup) => Err(RecoveryError::DuplicateOrZeroIdentifier(
            dup[0].participant_id(),
        )),
        None => Ok(()),
    }
}

/// Recovery error
///
/// Reported to the caller only: a failed recovery doesn't affect any other recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryError {
    /// Threshold must be at least 1
    ZeroThreshold,
    /// Fewer than `threshold` shares were provided
    InsufficientShares {
        /// Threshold of the split
        threshold: Threshold,
        /// Number of provided shares
        provided: usize,
    },
    /// Identifier of this participant is zero or appears more than once
    DuplicateOrZeroIdentifier(ParticipantId),
}

impl fmt::Display for RecoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroThreshold => f.write_str("threshold must be at least 1"),
            Self::InsufficientShares {
                threshold,
                provided,
            } => write!(
                f,
                "{provided} shares provided, although at least {threshold} are required"
            ),
            Self::DuplicateOrZeroIdentifier(id) => write!(
                f,
                "identifier of participant {id} is either zero or appears more than once"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RecoveryError {}
