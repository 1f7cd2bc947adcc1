//! Participant key shares

use core::fmt;

use crate::{
    commitment::VerificationVector, polynomial::Polynomial, Ciphersuite, Identifier,
    SecretScalar,
};

/// Key share of one participant
///
/// Secret part is the sharing polynomial evaluated at participant's identifier, public part is
/// the verification vector evaluated at the same identifier.
#[derive(Clone)]
pub struct KeyShare<C: Ciphersuite> {
    /// Identifier at which the share was evaluated
    pub id: Identifier,
    /// Secret key share $f(x_i)$
    pub secret: SecretScalar,
    /// Public key share $f(x_i) \cdot G$
    pub public: C::PublicKey,
}

/// Public part of a key share
///
/// Can be computed by anyone who knows the verification vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKeyShare<C: Ciphersuite> {
    /// Identifier at which the share was evaluated
    pub id: Identifier,
    /// Public key share
    pub public: C::PublicKey,
}

impl<C: Ciphersuite> KeyShare<C> {
    /// Derives the key share of participant `id`
    pub fn derive(
        polynomial: &Polynomial,
        verification_vector: &VerificationVector<C>,
        id: Identifier,
    ) -> Self {
        Self {
            id,
            secret: polynomial.evaluate(&id),
            public: verification_vector.evaluate(&id),
        }
    }

    /// Public part of the share
    pub fn public_share(&self) -> PublicKeyShare<C> {
        PublicKeyShare {
            id: self.id,
            public: self.public,
        }
    }

    /// Checks that the public key share matches the secret share
    pub fn is_consistent(&self) -> bool {
        C::public_key(&self.secret) == self.public
    }
}

impl<C: Ciphersuite> PublicKeyShare<C> {
    /// Derives the public key share of participant `id` from the verification vector alone
    pub fn derive(verification_vector: &VerificationVector<C>, id: Identifier) -> Self {
        Self {
            id,
            public: verification_vector.evaluate(&id),
        }
    }
}

impl<C: Ciphersuite> fmt::Debug for KeyShare<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyShare")
            .field("id", &self.id)
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}
