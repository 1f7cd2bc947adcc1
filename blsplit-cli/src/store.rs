//! Filesystem wallet store
//!
//! Each participant gets a wallet at `<root>/<participant id>/<wallet name>/`, with one JSON file
//! per account. Files are not encrypted; on Unix they're readable by the owner only.

use std::{
    collections::BTreeMap,
    fmt, fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use blsplit::{
    config::Participant,
    wallet::{DistributedAccount, DistributedAccountImportable, Unlockable, Wallet},
    ParticipantId,
};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Directory holding wallets of all participants
pub struct FsStore {
    root: PathBuf,
    wallet_name: String,
    ciphersuite: &'static str,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>, wallet_name: &str, ciphersuite: &'static str) -> Self {
        Self {
            root: root.into(),
            wallet_name: wallet_name.to_owned(),
            ciphersuite,
        }
    }

    pub fn wallet_dir(&self, participant: ParticipantId) -> PathBuf {
        self.root
            .join(participant.to_string())
            .join(&self.wallet_name)
    }

    /// Opens the participant's wallet, creating it if it doesn't exist
    ///
    /// Wallet is returned locked.
    pub fn open(&self, participant: &Participant) -> Result<FsWallet, StoreError> {
        let dir = self.wallet_dir(participant.id);
        if !dir.is_dir() {
            tracing::info!(path = %dir.display(), "creating wallet");
            fs::create_dir_all(&dir).map_err(|err| StoreError::io(&dir, err))?;
        }
        Ok(FsWallet {
            dir,
            participant: participant.id,
            ciphersuite: self.ciphersuite,
            unlocked: false,
        })
    }

    /// Loads the account of the participant
    ///
    /// If `name` is `None`, the wallet must hold exactly one account.
    pub fn load_account(
        &self,
        participant: ParticipantId,
        name: Option<&str>,
    ) -> Result<StoredAccount, StoreError> {
        let dir = self.wallet_dir(participant);
        let path = match name {
            Some(name) => dir.join(account_file_name(name)),
            None => {
                let mut accounts = list_accounts(&dir)?;
                match (accounts.pop(), accounts.is_empty()) {
                    (Some(path), true) => path,
                    (None, _) => return Err(StoreError::AccountNotFound(dir)),
                    (Some(_), false) => return Err(StoreError::AmbiguousAccount(dir)),
                }
            }
        };

        let bytes = Zeroizing::new(fs::read(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => StoreError::AccountNotFound(path.clone()),
            _ => StoreError::io(&path, err),
        })?);
        serde_json::from_slice(&bytes).map_err(StoreError::Json)
    }
}

/// Wallet of one participant
pub struct FsWallet {
    dir: PathBuf,
    participant: ParticipantId,
    ciphersuite: &'static str,
    unlocked: bool,
}

impl Wallet for FsWallet {
    type Error = StoreError;
}

impl Unlockable for FsWallet {
    fn unlock(&mut self) -> Result<(), StoreError> {
        self.unlocked = true;
        tracing::debug!(path = %self.dir.display(), "wallet unlocked");
        Ok(())
    }

    fn lock(&mut self) -> Result<(), StoreError> {
        self.unlocked = false;
        tracing::debug!(path = %self.dir.display(), "wallet locked");
        Ok(())
    }
}

impl DistributedAccountImportable for FsWallet {
    /// Path to the account file
    type Account = PathBuf;

    fn import_distributed_account(
        &mut self,
        account: &DistributedAccount,
    ) -> Result<PathBuf, StoreError> {
        if !self.unlocked {
            return Err(StoreError::Locked);
        }

        let stored = StoredAccount {
            name: account.name.clone(),
            ciphersuite: self.ciphersuite.to_owned(),
            participant: self.participant,
            threshold: account.threshold,
            secret_share: hex::encode(&*account.secret_share),
            verification_vector: account
                .verification_vector
                .iter()
                .map(hex::encode)
                .collect(),
            participants: account.participants.clone(),
        };
        let json = Zeroizing::new(serde_json::to_vec_pretty(&stored).map_err(StoreError::Json)?);

        let path = self.dir.join(account_file_name(&account.name));
        write_new(&path, &json)?;
        Ok(path)
    }
}

/// Account as it's stored on disk
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct StoredAccount {
    pub name: String,
    pub ciphersuite: String,
    pub participant: ParticipantId,
    pub threshold: u32,
    /// Hex-encoded secret key share
    pub secret_share: String,
    /// Hex-encoded commitments
    pub verification_vector: Vec<String>,
    #[zeroize(skip)]
    pub participants: BTreeMap<ParticipantId, String>,
}

impl StoredAccount {
    pub fn secret_share_bytes(&self) -> Result<Zeroizing<Vec<u8>>, hex::FromHexError> {
        hex::decode(&self.secret_share).map(Zeroizing::new)
    }

    pub fn verification_vector_bytes(&self) -> Result<Vec<Vec<u8>>, hex::FromHexError> {
        self.verification_vector.iter().map(hex::decode).collect()
    }
}

impl fmt::Debug for StoredAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredAccount")
            .field("name", &self.name)
            .field("ciphersuite", &self.ciphersuite)
            .field("participant", &self.participant)
            .field("threshold", &self.threshold)
            .field("participants", &self.participants)
            .finish_non_exhaustive()
    }
}

fn account_file_name(name: &str) -> String {
    format!("{name}.json")
}

fn list_accounts(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let entries = fs::read_dir(dir).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => StoreError::AccountNotFound(dir.to_owned()),
        _ => StoreError::io(dir, err),
    })?;
    let mut accounts = vec![];
    for entry in entries {
        let path = entry.map_err(|err| StoreError::io(dir, err))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            accounts.push(path);
        }
    }
    accounts.sort();
    Ok(accounts)
}

/// Writes the file, failing if it already exists
fn write_new(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|err| match err.kind() {
        io::ErrorKind::AlreadyExists => StoreError::AccountExists(path.to_owned()),
        _ => StoreError::io(path, err),
    })?;
    file.write_all(bytes)
        .and_then(|()| file.sync_all())
        .map_err(|err| StoreError::io(path, err))
}

#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: io::Error },
    Json(serde_json::Error),
    /// Import was attempted while the wallet is locked
    Locked,
    AccountExists(PathBuf),
    AccountNotFound(PathBuf),
    /// Wallet holds several accounts, and none was specified
    AmbiguousAccount(PathBuf),
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_owned(),
            source,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, .. } => write!(f, "i/o error at {}", path.display()),
            Self::Json(_) => f.write_str("malformed account file"),
            Self::Locked => f.write_str("wallet is locked"),
            Self::AccountExists(path) => write!(f, "account {} already exists", path.display()),
            Self::AccountNotFound(path) => write!(f, "no account found at {}", path.display()),
            Self::AmbiguousAccount(path) => write!(
                f,
                "wallet {} holds more than one account, specify which one to use",
                path.display()
            ),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::Locked
            | Self::AccountExists(_)
            | Self::AccountNotFound(_)
            | Self::AmbiguousAccount(_) => None,
        }
    }
}
