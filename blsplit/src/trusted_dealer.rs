//! Trusted dealer
//!
//! Trusted dealer splits a master secret key into key shares in one place. Note that it creates
//! SPOF/T (single point of failure/trust): the dealer knows the master secret and the whole sharing
//! polynomial. It's meant to import an existing key into a distributed wallet.
//!
//! The pipeline is linear: [split](DealerBuilder::split) builds the polynomial, commits to it and
//! derives a key share per participant, then [validate](Split::validate) signs a message with every
//! share and recovers the master secret, master public key and master signature from subsets of
//! shares. Only a [`VerifiedSplit`] can be [provisioned](crate::wallet::provision) into wallets.
//!
//! ## Example
//! Import a key into 3-out-of-5 wallet:
//! ```rust,no_run
//! # use rand_core::OsRng;
//! # let mut rng = OsRng;
//! use blsplit::{ciphersuite::MinPk, trusted_dealer::SubsetSelection, SecretScalar};
//!
//! let secret_key_to_be_imported = SecretScalar::random(&mut rng);
//!
//! let split = blsplit::trusted_dealer::builder::<MinPk>([1, 2, 3, 4, 5])
//!     .set_threshold(Some(3))
//!     .set_master_secret(secret_key_to_be_imported)
//!     .split(&mut rng)?
//!     .validate(b"abc", SubsetSelection::Auto, &mut rng)?;
//! # Ok::<_, blsplit::trusted_dealer::DealerError>(())
//! ```

use alloc::{
    collections::{btree_set, BTreeSet},
    string::String,
    vec::Vec,
};
use core::{fmt, marker::PhantomData, num::NonZeroUsize};

use rand_core::{CryptoRng, RngCore};

use crate::{
    commitment::VerificationVector,
    config::{validate_threshold, ConfigError, DealerConfig},
    errors::CryptoError,
    identifier::issue_identifiers,
    key_share::PublicKeyShare,
    polynomial::Polynomial,
    recovery::{recover, RecoveryError},
    signing, Ciphersuite, Identifier, KeyShare, ParticipantId, SecretScalar, SignatureShare,
    Threshold,
};

/// Number of subsets [`SubsetSelection::Auto`] checks at most
pub const AUTO_SUBSETS_LIMIT: usize = 64;

/// Number of subsets [`Split::validate`] refuses to go beyond
pub const MAX_SUBSETS: usize = 1 << 16;

/// Constructs a trusted dealer builder for the given list of participants
///
/// By default, threshold equals to number of participants, and master secret is sampled at random.
pub fn builder<C: Ciphersuite>(
    participants: impl IntoIterator<Item = ParticipantId>,
) -> DealerBuilder<C> {
    DealerBuilder {
        participants: participants.into_iter().collect(),
        threshold: None,
        master_secret: None,
        _ciphersuite: PhantomData,
    }
}

/// Trusted dealer builder
pub struct DealerBuilder<C: Ciphersuite> {
    participants: Vec<ParticipantId>,
    threshold: Option<Threshold>,
    master_secret: Option<SecretScalar>,
    _ciphersuite: PhantomData<C>,
}

impl<C: Ciphersuite> DealerBuilder<C> {
    /// Constructs a builder from the split configuration
    pub fn from_config(config: &DealerConfig) -> Self {
        builder(config.participants.iter().map(|p| p.id)).set_threshold(Some(config.threshold))
    }

    /// Sets threshold, `None` means `threshold = n`
    pub fn set_threshold(self, threshold: Option<Threshold>) -> Self {
        Self { threshold, ..self }
    }

    /// Sets the master secret key to be split
    pub fn set_master_secret(self, master_secret: SecretScalar) -> Self {
        Self {
            master_secret: Some(master_secret),
            ..self
        }
    }

    /// Splits the master secret
    ///
    /// Validates the configuration, builds the sharing polynomial, commits to it, and derives a key
    /// share for every participant. The polynomial is erased before this function returns.
    pub fn split(self, rng: &mut (impl RngCore + CryptoRng)) -> Result<Split<C>, DealerError> {
        let n = Threshold::try_from(self.participants.len())
            .map_err(|_| ConfigError::TooManyParticipants(self.participants.len()))?;
        let t = self.threshold.unwrap_or(n);
        validate_threshold(t, n)?;
        let ids = issue_identifiers(self.participants.iter().copied())?;

        let master_secret = match self.master_secret {
            Some(secret) if bool::from(ff::Field::is_zero(secret.as_ref())) => {
                return Err(CryptoError::zero_secret().into())
            }
            Some(secret) => secret,
            None => SecretScalar::random(rng),
        };

        let polynomial = Polynomial::generate(rng, master_secret, t)?;
        let verification_vector = polynomial.commit::<C>();
        tracing::debug!(
            ciphersuite = C::NAME,
            threshold = t,
            participants = n,
            "committed to sharing polynomial"
        );

        // Polynomial stays on this thread and is erased before public shares are computed
        let secret_shares = ids
            .iter()
            .map(|id| polynomial.evaluate(id))
            .collect::<Vec<_>>();
        drop(polynomial);

        let derive_public = |(id, secret): (&Identifier, SecretScalar)| KeyShare {
            id: *id,
            public: verification_vector.evaluate(id),
            secret,
        };
        #[cfg(feature = "parallel")]
        let key_shares = {
            use rayon::prelude::*;
            ids.par_iter()
                .zip(secret_shares)
                .map(derive_public)
                .collect::<Vec<_>>()
        };
        #[cfg(not(feature = "parallel"))]
        let key_shares = ids
            .iter()
            .zip(secret_shares)
            .map(derive_public)
            .collect::<Vec<_>>();

        tracing::debug!(shares = key_shares.len(), "derived key shares");

        Ok(Split {
            threshold: t,
            verification_vector,
            key_shares,
        })
    }
}

/// Output of the trusted dealer that hasn't been validated yet
pub struct Split<C: Ciphersuite> {
    threshold: Threshold,
    verification_vector: VerificationVector<C>,
    key_shares: Vec<KeyShare<C>>,
}

impl<C: Ciphersuite> Split<C> {
    /// Reassembles a split from previously issued key shares
    ///
    /// Threshold is taken from the verification vector. Used to [validate](Split::validate) key
    /// shares that were loaded back from wallets.
    pub fn from_parts(
        verification_vector: VerificationVector<C>,
        key_shares: Vec<KeyShare<C>>,
    ) -> Result<Self, DealerError> {
        let n = Threshold::try_from(key_shares.len())
            .map_err(|_| ConfigError::TooManyParticipants(key_shares.len()))?;
        let t = verification_vector.threshold();
        validate_threshold(t, n)?;
        issue_identifiers(key_shares.iter().map(|share| share.id.participant_id()))?;

        Ok(Self {
            threshold: t,
            verification_vector,
            key_shares,
        })
    }

    /// Threshold `t`
    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Verification vector shared by all participants
    pub fn verification_vector(&self) -> &VerificationVector<C> {
        &self.verification_vector
    }

    /// Master public key
    pub fn master_public_key(&self) -> C::PublicKey {
        self.verification_vector.master_public_key()
    }

    /// Key shares, in the same order as participants were given to the [builder]
    pub fn key_shares(&self) -> &[KeyShare<C>] {
        &self.key_shares
    }

    /// Public parts of the key shares
    pub fn public_shares(&self) -> Vec<PublicKeyShare<C>> {
        self.key_shares.iter().map(KeyShare::public_share).collect()
    }

    /// Key share of the participant
    pub fn key_share(&self, participant: ParticipantId) -> Option<&KeyShare<C>> {
        self.key_shares
            .iter()
            .find(|share| share.id.participant_id() == participant)
    }

    /// Name of the distributed account: first 8 hex characters of the master public key
    pub fn account_name(&self) -> String {
        let pk = C::serialize_public_key(&self.master_public_key());
        hex::encode(&pk.as_ref()[..4])
    }

    /// Signs the message with every key share
    pub fn sign(&self, msg: &[u8]) -> Vec<SignatureShare<C>> {
        #[cfg(feature = "parallel")]
        let sig_shares = {
            use rayon::prelude::*;
            self.key_shares
                .par_iter()
                .map(|share| signing::sign(share, msg))
                .collect()
        };
        #[cfg(not(feature = "parallel"))]
        let sig_shares = self
            .key_shares
            .iter()
            .map(|share| signing::sign(share, msg))
            .collect();
        sig_shares
    }

    /// Validates the split
    ///
    /// Checks that:
    /// 1. Each public key share matches its secret share and the verification vector
    /// 2. Each share's signature on `msg` verifies under its public key share
    /// 3. For each selected subset of `t` participants, the recovered secret key corresponds to
    ///    the master public key, the recovered public key is the master public key, and the
    ///    recovered signature verifies under the master public key, equals the signature
    ///    produced by the recovered secret, and is the same for all subsets
    ///
    /// Any failure means the split must not be trusted or persisted.
    pub fn validate(
        self,
        msg: &[u8],
        selection: SubsetSelection,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<VerifiedSplit<C>, DealerError> {
        let master_public_key = self.master_public_key();

        for share in &self.key_shares {
            let participant = share.id.participant_id();
            if !share.is_consistent() || self.verification_vector.evaluate(&share.id) != share.public
            {
                return Err(VerificationFailure::InconsistentKeyShare(participant).into());
            }
        }

        let sig_shares = self.sign(msg);
        for (share, sig_share) in self.key_shares.iter().zip(&sig_shares) {
            if !sig_share.verify(&share.public_share(), msg) {
                return Err(
                    VerificationFailure::InvalidSignatureShare(share.id.participant_id()).into(),
                );
            }
        }

        let n = self.key_shares.len();
        let t = usize::from(self.threshold);
        let subsets = select_subsets(n, t, selection, rng)?;

        let mut expected_sig = None;
        let mut checked = 0usize;
        for subset in subsets {
            let participants = || {
                subset
                    .iter()
                    .map(|&i| self.key_shares[i].id.participant_id())
                    .collect::<Vec<_>>()
            };
            let shares = || subset.iter().map(|&i| &self.key_shares[i]);
            let recovery_failed = |source| DealerError::Recovery {
                subset: participants(),
                source,
            };

            let secret: SecretScalar = recover(
                self.threshold,
                shares().map(|share| (&share.id, &share.secret)),
            )
            .map_err(recovery_failed)?;
            if C::public_key(&secret) != master_public_key {
                return Err(VerificationFailure::SecretMismatch(participants()).into());
            }

            let public_key: C::PublicKey = recover(
                self.threshold,
                shares().map(|share| (&share.id, &share.public)),
            )
            .map_err(recovery_failed)?;
            if public_key != master_public_key {
                return Err(VerificationFailure::PublicKeyMismatch(participants()).into());
            }

            let sig: C::Signature = recover(
                self.threshold,
                subset
                    .iter()
                    .map(|&i| (&sig_shares[i].id, &sig_shares[i].signature)),
            )
            .map_err(recovery_failed)?;
            if !signing::verify::<C>(&sig, &master_public_key, msg)
                || sig != signing::sign_with_secret::<C>(&secret, msg)
            {
                return Err(VerificationFailure::InvalidSignature(participants()).into());
            }
            match expected_sig {
                None => expected_sig = Some(sig),
                Some(expected) if expected != sig => {
                    return Err(VerificationFailure::SignatureMismatch(participants()).into())
                }
                Some(_) => (),
            }
            checked += 1;
        }

        if checked == 0 {
            return Err(DealerError::NoSubsets);
        }
        tracing::info!(subsets = checked, "split verified");
        Ok(VerifiedSplit(self))
    }
}

/// Split that passed [validation](Split::validate)
pub struct VerifiedSplit<C: Ciphersuite>(Split<C>);

impl<C: Ciphersuite> VerifiedSplit<C> {
    /// Returns the underlying split
    pub fn into_inner(self) -> Split<C> {
        self.0
    }
}

impl<C: Ciphersuite> core::ops::Deref for VerifiedSplit<C> {
    type Target = Split<C>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Which subsets of `t` participants [`Split::validate`] recovers from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubsetSelection {
    /// Every one of $\binom{n}{t}$ subsets
    ///
    /// Validation fails with [`DealerError::TooManySubsets`] if there are more than [`MAX_SUBSETS`].
    All,
    /// Given number of distinct subsets chosen at random, or every subset if there are fewer
    Random(NonZeroUsize),
    /// Every subset if there are at most [`AUTO_SUBSETS_LIMIT`], otherwise that many random subsets
    Auto,
}

/// Subsets of participant indices, enumerated lazily when every subset is checked
enum Subsets {
    Every(Combinations),
    Sampled(btree_set::IntoIter<Vec<usize>>),
}

impl Iterator for Subsets {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Every(combinations) => combinations.next(),
            Self::Sampled(sampled) => sampled.next(),
        }
    }
}

fn select_subsets(
    n: usize,
    t: usize,
    selection: SubsetSelection,
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<Subsets, DealerError> {
    let total = binomial(n, t);
    let requested = match selection {
        SubsetSelection::All => usize::MAX,
        SubsetSelection::Random(count) => count.get(),
        SubsetSelection::Auto => AUTO_SUBSETS_LIMIT,
    };
    let count = requested.min(total);
    if count > MAX_SUBSETS {
        return Err(DealerError::TooManySubsets {
            requested: count,
            limit: MAX_SUBSETS,
        });
    }
    if count == total {
        return Ok(Subsets::Every(Combinations::new(n, t)));
    }

    let mut subsets = BTreeSet::new();
    while subsets.len() < count {
        let mut subset = rand::seq::index::sample(rng, n, t).into_vec();
        subset.sort_unstable();
        subsets.insert(subset);
    }
    Ok(Subsets::Sampled(subsets.into_iter()))
}

/// $\binom{n}{k}$, saturates at `usize::MAX`
fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        // result * (n - i) is divisible by (i + 1) at every step
        result = match result.checked_mul((n - i) as u128) {
            Some(r) => r / (i as u128 + 1),
            None => return usize::MAX,
        };
    }
    usize::try_from(result).unwrap_or(usize::MAX)
}

/// Iterates over all `k`-subsets of `0..n` in lexicographic order
struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();

        let k = self.indices.len();
        // Rightmost index that can still be incremented
        match (0..k).rev().find(|&i| self.indices[i] < self.n - k + i) {
            Some(i) => {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }

        Some(current)
    }
}

/// Split doesn't verify
///
/// Each variant names the participant, or the subset of participants, that failed the check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationFailure {
    /// Public key share doesn't match the secret share or the verification vector
    InconsistentKeyShare(ParticipantId),
    /// Signature share doesn't verify under the public key share
    InvalidSignatureShare(ParticipantId),
    /// Secret recovered from the subset doesn't correspond to the master public key
    SecretMismatch(Vec<ParticipantId>),
    /// Public key recovered from the subset isn't the master public key
    PublicKeyMismatch(Vec<ParticipantId>),
    /// Signature recovered from the subset doesn't verify under the master public key
    InvalidSignature(Vec<ParticipantId>),
    /// Signature recovered from the subset differs from the one recovered from other subsets
    SignatureMismatch(Vec<ParticipantId>),
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InconsistentKeyShare(id) => {
                write!(f, "public key share of participant {id} is inconsistent")
            }
            Self::InvalidSignatureShare(id) => {
                write!(f, "signature share of participant {id} doesn't verify")
            }
            Self::SecretMismatch(subset) => write!(
                f,
                "secret recovered from participants {subset:?} doesn't match master public key"
            ),
            Self::PublicKeyMismatch(subset) => write!(
                f,
                "public key recovered from participants {subset:?} doesn't match master public key"
            ),
            Self::InvalidSignature(subset) => write!(
                f,
                "signature recovered from participants {subset:?} doesn't verify"
            ),
            Self::SignatureMismatch(subset) => write!(
                f,
                "signature recovered from participants {subset:?} differs from other subsets"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for VerificationFailure {}

/// Trusted dealer error
#[derive(Debug)]
pub enum DealerError {
    /// Invalid configuration
    Config(ConfigError),
    /// Malformed key material
    Crypto(CryptoError),
    /// Recovery from the subset of participants failed
    Recovery {
        /// Participants whose shares were used
        subset: Vec<ParticipantId>,
        /// Cause
        source: RecoveryError,
    },
    /// Split doesn't verify
    Verification(VerificationFailure),
    /// Validation would have to check more subsets than [`MAX_SUBSETS`]
    TooManySubsets {
        /// Number of subsets that would be checked, saturates at `usize::MAX`
        requested: usize,
        /// [`MAX_SUBSETS`]
        limit: usize,
    },
    /// No subset was checked
    NoSubsets,
}

impl From<ConfigError> for DealerError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}
impl From<CryptoError> for DealerError {
    fn from(err: CryptoError) -> Self {
        Self::Crypto(err)
    }
}
impl From<VerificationFailure> for DealerError {
    fn from(err: VerificationFailure) -> Self {
        Self::Verification(err)
    }
}

impl fmt::Display for DealerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(_) => f.write_str("invalid configuration"),
            Self::Crypto(_) => f.write_str("invalid key material"),
            Self::Recovery { subset, .. } => {
                write!(f, "recovery from participants {subset:?} failed")
            }
            Self::Verification(_) => f.write_str("split verification failed"),
            Self::TooManySubsets { requested, limit } => write!(
                f,
                "validation needs {requested} subsets to be checked, at most {limit} is allowed"
            ),
            Self::NoSubsets => f.write_str("no subset of participants was checked"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DealerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Crypto(err) => Some(err),
            Self::Recovery { source, .. } => Some(source),
            Self::Verification(err) => Some(err),
            Self::TooManySubsets { .. } | Self::NoSubsets => None,
        }
    }
}
