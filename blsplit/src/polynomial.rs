//! Secret sharing polynomial

use alloc::vec::Vec;

use ff::Field;
use group::Group;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::{
    commitment::VerificationVector, config::ConfigError, Ciphersuite, Identifier, Scalar,
    SecretScalar, Threshold,
};

/// Polynomial $f(x) = a_0 + a_1 x + \dots + a_{t-1} x^{t-1}$ where $a_0$ is the master secret
///
/// Anyone who learns the polynomial learns the master secret, so it's a single-owner value: it
/// can't be cloned, and its coefficients are erased on drop.
pub struct Polynomial {
    coefficients: Vec<Scalar>,
    threshold: Threshold,
}

impl Polynomial {
    /// Builds a polynomial of degree `threshold - 1` with `master_secret` as constant term and
    /// random other coefficients
    pub fn generate(
        rng: &mut (impl RngCore + CryptoRng),
        master_secret: SecretScalar,
        threshold: Threshold,
    ) -> Result<Self, ConfigError> {
        if threshold == 0 {
            return Err(ConfigError::InvalidThreshold {
                threshold,
                participants: 0,
            });
        }

        let mut coefficients = Vec::with_capacity(threshold.into());
        coefficients.push(*master_secret.as_ref());
        coefficients.extend((1..threshold).map(|_| Scalar::random(&mut *rng)));

        Ok(Self {
            coefficients,
            threshold,
        })
    }

    /// Threshold `t`, equals to number of coefficients
    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Evaluates the polynomial at the identifier using Horner's method
    pub fn evaluate(&self, x: &Identifier) -> SecretScalar {
        let mut y = self
            .coefficients
            .iter()
            .rev()
            .fold(Scalar::zero(), |acc, a_i| acc * x.as_scalar() + a_i);
        SecretScalar::new(&mut y)
    }

    /// Commits to coefficients, producing the verification vector
    ///
    /// The first entry of the vector is the master public key.
    pub fn commit<C: Ciphersuite>(&self) -> VerificationVector<C> {
        let commitments = self
            .coefficients
            .iter()
            .map(|a_i| C::PublicKey::generator() * a_i)
            .collect();
        VerificationVector::from_commitments_unchecked(commitments)
    }
}

impl Drop for Polynomial {
    fn drop(&mut self) {
        self.coefficients.zeroize()
    }
}
