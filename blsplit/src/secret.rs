//! Secret scalar

use core::fmt;

use ff::Field;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::{errors::CryptoError, Scalar};

/// Scalar that holds secret material: a master secret key, a secret key share, or a recovered
/// secret key
///
/// The value is erased from memory on drop, and `Debug` never prints it.
#[derive(Clone)]
pub struct SecretScalar(Scalar);

impl SecretScalar {
    /// Wraps the scalar, erasing the original
    pub fn new(scalar: &mut Scalar) -> Self {
        let secret = Self(*scalar);
        scalar.zeroize();
        secret
    }

    /// Samples a random nonzero secret
    pub fn random(rng: &mut (impl RngCore + CryptoRng)) -> Self {
        loop {
            let mut scalar = Scalar::random(&mut *rng);
            if !bool::from(scalar.is_zero()) {
                return Self::new(&mut scalar);
            }
        }
    }

    /// Wraps the scalar, refusing zero
    ///
    /// A zero secret key has the identity as its public key, which never verifies.
    pub fn non_zero(scalar: &mut Scalar) -> Result<Self, CryptoError> {
        if bool::from(scalar.is_zero()) {
            return Err(CryptoError::zero_secret());
        }
        Ok(Self::new(scalar))
    }

    /// Serializes the secret as 32 bytes little-endian
    pub fn to_bytes(&self) -> zeroize::Zeroizing<[u8; 32]> {
        zeroize::Zeroizing::new(self.0.to_bytes())
    }
}

impl AsRef<Scalar> for SecretScalar {
    fn as_ref(&self) -> &Scalar {
        &self.0
    }
}

impl PartialEq for SecretScalar {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for SecretScalar {}

impl Drop for SecretScalar {
    fn drop(&mut self) {
        self.0.zeroize()
    }
}

impl fmt::Debug for SecretScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretScalar(***)")
    }
}
