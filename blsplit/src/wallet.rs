//! Wallet provisioning
//!
//! Key shares end up in per-participant wallets. The crate doesn't know how wallets are stored or
//! encrypted: a store exposes only the capabilities needed here, [`Unlockable`] and
//! [`DistributedAccountImportable`].
//!
//! [`provision`] imports each participant's share into its wallet as `unlock → import → lock`.
//! The wallet is locked again on every exit path: the [`Unlocked`] guard locks it on drop if it
//! wasn't locked explicitly.

use alloc::{collections::BTreeMap, collections::BTreeSet, string::String, vec::Vec};
use core::fmt;

use zeroize::Zeroizing;

use crate::{
    config::Participant, trusted_dealer::VerifiedSplit, Ciphersuite, KeyShare, ParticipantId,
};

/// Wallet store
pub trait Wallet {
    /// Error returned by wallet operations
    type Error: fmt::Debug + fmt::Display;
}

/// Wallet that must be unlocked before accounts can be imported
pub trait Unlockable: Wallet {
    /// Unlocks the wallet
    fn unlock(&mut self) -> Result<(), Self::Error>;
    /// Locks the wallet
    fn lock(&mut self) -> Result<(), Self::Error>;
}

/// Wallet that can hold distributed accounts
pub trait DistributedAccountImportable: Wallet {
    /// Handle of imported account
    type Account;

    /// Imports a distributed account
    ///
    /// Wallet must be unlocked.
    fn import_distributed_account(
        &mut self,
        account: &DistributedAccount,
    ) -> Result<Self::Account, Self::Error>;
}

/// Everything a participant's wallet stores about its share of the distributed key
pub struct DistributedAccount {
    /// Account name, same for all participants
    pub name: String,
    /// Serialized secret key share
    pub secret_share: Zeroizing<Vec<u8>>,
    /// Threshold `t`
    pub threshold: u32,
    /// Serialized verification vector, one entry per polynomial coefficient
    pub verification_vector: Vec<Vec<u8>>,
    /// Participant ID → URI of all participants
    pub participants: BTreeMap<ParticipantId, String>,
    /// Passphrase protecting the account
    pub passphrase: Zeroizing<Vec<u8>>,
}

impl DistributedAccount {
    /// Builds the account of one participant
    pub fn new<C: Ciphersuite>(
        split: &VerifiedSplit<C>,
        key_share: &KeyShare<C>,
        passphrase: &str,
        participants: BTreeMap<ParticipantId, String>,
    ) -> Self {
        Self {
            name: split.account_name(),
            secret_share: Zeroizing::new(key_share.secret.to_bytes().to_vec()),
            threshold: u32::from(split.threshold()),
            verification_vector: split.verification_vector().to_bytes(),
            participants,
            passphrase: Zeroizing::new(passphrase.as_bytes().to_vec()),
        }
    }
}

impl fmt::Debug for DistributedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistributedAccount")
            .field("name", &self.name)
            .field("threshold", &self.threshold)
            .field("participants", &self.participants)
            .finish_non_exhaustive()
    }
}

/// Unlocked wallet
///
/// Locks the wallet when dropped, unless it was locked via [`Unlocked::lock`]. A lock failure on
/// drop can't be returned, so it's only logged.
pub struct Unlocked<'w, W: Unlockable> {
    wallet: &'w mut W,
    relocked: bool,
}

impl<'w, W: Unlockable> Unlocked<'w, W> {
    /// Unlocks the wallet
    pub fn unlock(wallet: &'w mut W) -> Result<Self, W::Error> {
        wallet.unlock()?;
        Ok(Self {
            wallet,
            relocked: false,
        })
    }

    /// Locks the wallet, returning the lock error if any
    pub fn lock(mut self) -> Result<(), W::Error> {
        self.relocked = true;
        self.wallet.lock()
    }
}

impl<W: Unlockable> core::ops::Deref for Unlocked<'_, W> {
    type Target = W;
    fn deref(&self) -> &W {
        self.wallet
    }
}
impl<W: Unlockable> core::ops::DerefMut for Unlocked<'_, W> {
    fn deref_mut(&mut self) -> &mut W {
        self.wallet
    }
}

impl<W: Unlockable> Drop for Unlocked<'_, W> {
    fn drop(&mut self) {
        if !self.relocked {
            if let Err(err) = self.wallet.lock() {
                tracing::warn!(%err, "failed to lock the wallet");
            }
        }
    }
}

/// Imports each participant's key share into its wallet
///
/// `open` returns the wallet of the participant, creating it if needed. Participants are
/// provisioned one by one; the first failure aborts the batch. Every participant is imported at
/// most once, and each wallet is locked again whatever the outcome.
///
/// Returns handles of imported accounts in the order of `participants`.
pub fn provision<C, W, O>(
    split: &VerifiedSplit<C>,
    participants: &[Participant],
    mut open: O,
) -> Result<Vec<W::Account>, ProvisionError<W::Error>>
where
    C: Ciphersuite,
    W: Unlockable + DistributedAccountImportable,
    O: FnMut(&Participant) -> Result<W, W::Error>,
{
    let mut seen = BTreeSet::new();
    let key_shares = participants
        .iter()
        .map(|p| {
            if !seen.insert(p.id) {
                return Err(ProvisionError::DuplicateParticipant(p.id));
            }
            split
                .key_share(p.id)
                .ok_or(ProvisionError::UnknownParticipant(p.id))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let participant_map = participants
        .iter()
        .map(|p| (p.id, p.uri.clone()))
        .collect::<BTreeMap<_, _>>();

    let mut accounts = Vec::with_capacity(participants.len());
    for (participant, key_share) in participants.iter().zip(key_shares) {
        let id = participant.id;
        let span = tracing::info_span!("provision", participant = id);
        let _enter = span.enter();

        let account = DistributedAccount::new(
            split,
            key_share,
            &participant.passphrase,
            participant_map.clone(),
        );

        let mut wallet = open(participant).map_err(|source| ProvisionError::Open {
            participant: id,
            source,
        })?;
        let mut unlocked = Unlocked::unlock(&mut wallet).map_err(|source| {
            ProvisionError::Unlock {
                participant: id,
                source,
            }
        })?;
        let handle = unlocked
            .import_distributed_account(&account)
            .map_err(|source| ProvisionError::Import {
                participant: id,
                source,
            })?;
        unlocked.lock().map_err(|source| ProvisionError::Lock {
            participant: id,
            source,
        })?;

        tracing::info!(account = %account.name, "imported distributed account");
        accounts.push(handle);
    }

    Ok(accounts)
}

/// Provisioning error
#[derive(Debug)]
pub enum ProvisionError<E> {
    /// Participant has no key share in the split
    UnknownParticipant(ParticipantId),
    /// Participant is listed more than once
    DuplicateParticipant(ParticipantId),
    /// Opening or creating the wallet failed
    Open {
        /// Participant whose wallet failed
        participant: ParticipantId,
        /// Cause
        source: E,
    },
    /// Unlocking the wallet failed
    Unlock {
        /// Participant whose wallet failed
        participant: ParticipantId,
        /// Cause
        source: E,
    },
    /// Importing the account failed
    Import {
        /// Participant whose wallet failed
        participant: ParticipantId,
        /// Cause
        source: E,
    },
    /// Account was imported, but locking the wallet afterwards failed
    Lock {
        /// Participant whose wallet failed
        participant: ParticipantId,
        /// Cause
        source: E,
    },
}

impl<E> ProvisionError<E> {
    /// Participant that caused the error
    pub fn participant(&self) -> ParticipantId {
        match self {
            Self::UnknownParticipant(id) | Self::DuplicateParticipant(id) => *id,
            Self::Open { participant, .. }
            | Self::Unlock { participant, .. }
            | Self::Import { participant, .. }
            | Self::Lock { participant, .. } => *participant,
        }
    }
}

impl<E: fmt::Display> fmt::Display for ProvisionError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownParticipant(id) => write!(f, "participant {id} has no key share"),
            Self::DuplicateParticipant(id) => {
                write!(f, "participant {id} is listed more than once")
            }
            Self::Open {
                participant,
                source,
            } => write!(f, "failed to open wallet of participant {participant}: {source}"),
            Self::Unlock {
                participant,
                source,
            } => write!(f, "failed to unlock wallet of participant {participant}: {source}"),
            Self::Import {
                participant,
                source,
            } => write!(
                f,
                "failed to import distributed account for participant {participant}: {source}"
            ),
            Self::Lock {
                participant,
                source,
            } => write!(f, "failed to lock wallet of participant {participant}: {source}"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: std::error::Error + 'static> std::error::Error for ProvisionError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnknownParticipant(_) | Self::DuplicateParticipant(_) => None,
            Self::Open { source, .. }
            | Self::Unlock { source, .. }
            | Self::Import { source, .. }
            | Self::Lock { source, .. } => Some(source),
        }
    }
}
