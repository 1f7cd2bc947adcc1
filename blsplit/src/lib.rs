//! Threshold BLS key splitting, derivation and recovery over BLS12-381
//!
//! The crate takes a master secret key and splits it into `n` key shares such that any `t` of them
//! can reconstruct the master secret, the master public key, and any master signature. It's meant
//! to provision a $t$-out-of-$n$ distributed signing wallet from a single trusted process.
//!
//! This crate provides:
//! * [Trusted dealer](trusted_dealer) \
//!   Runs the whole pipeline: builds a sharing [polynomial](polynomial::Polynomial), commits to it with
//!   a [verification vector](commitment::VerificationVector), derives [key shares](key_share::KeyShare),
//!   and validates the split by [recovering](recovery) secret, public key and signature from subsets of
//!   shares.
//! * [Recovery engine](recovery) \
//!   Lagrange interpolation at zero of secret scalars, public keys or signatures. Can be used on its own
//!   to audit a completed split.
//! * [Wallet provisioning](wallet) \
//!   Capability traits a wallet store implements, and [`wallet::provision`] which imports each
//!   participant's share while making sure the wallet is locked again on every exit path.
//!
//! The curve layout and hash-to-curve domain are chosen by a [`Ciphersuite`]: [`MinPk`](ciphersuite::MinPk)
//! (public keys in G1, signatures in G2, as used by Ethereum) or [`MinSig`](ciphersuite::MinSig).
//!
//! This crate doesn't support:
//! * Distributed key generation: the master secret and polynomial are known to the dealer
//!
//! ## Example
//! Split a key into 2-out-of-3 shares and recover the master signature from two of them:
//! ```rust,no_run
//! # use rand_core::OsRng;
//! # let mut rng = OsRng;
//! use blsplit::{ciphersuite::MinPk, trusted_dealer::SubsetSelection};
//!
//! let split = blsplit::trusted_dealer::builder::<MinPk>([1, 2, 3])
//!     .set_threshold(Some(2))
//!     .split(&mut rng)?;
//! let split = split.validate(b"abc", SubsetSelection::All, &mut rng)?;
//!
//! let sig_shares = split.sign(b"abc");
//! let sig = blsplit::recovery::recover_signature::<MinPk>(2, &sig_shares[1..])?;
//! assert!(blsplit::signing::verify::<MinPk>(&sig, &split.master_public_key(), b"abc"));
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code, unused_crate_dependencies)]
#![deny(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
#![deny(missing_docs)]
#![allow(clippy::type_complexity)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub use bls12_381;

pub mod ciphersuite;
pub mod commitment;
pub mod config;
pub mod errors;
pub mod identifier;
pub mod key_share;
pub mod polynomial;
pub mod recovery;
pub mod secret;
pub mod signing;
pub mod trusted_dealer;
pub mod wallet;

pub use self::{
    ciphersuite::Ciphersuite,
    commitment::VerificationVector,
    identifier::Identifier,
    key_share::{KeyShare, PublicKeyShare},
    secret::SecretScalar,
    signing::SignatureShare,
};

/// Element of the BLS12-381 scalar field
pub type Scalar = bls12_381::Scalar;

/// Participant identifier as it appears in configuration and wallets
pub type ParticipantId = u64;

/// Threshold and participant counts
pub type Threshold = u16;
