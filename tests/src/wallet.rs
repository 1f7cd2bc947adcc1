//! In-memory wallet store that records every operation and fails on request

use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    rc::Rc,
};

use anyhow::{bail, ensure};
use blsplit::{
    config::Participant,
    wallet::{DistributedAccount, DistributedAccountImportable, Unlockable, Wallet},
    ParticipantId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Open,
    Unlock,
    Import,
    Lock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAccount {
    pub name: String,
    pub secret_share: Vec<u8>,
    pub threshold: u32,
    pub verification_vector: Vec<Vec<u8>>,
    pub participants: BTreeMap<ParticipantId, String>,
    pub passphrase: Vec<u8>,
}

#[derive(Default)]
struct State {
    events: Vec<(ParticipantId, Step)>,
    faults: BTreeMap<ParticipantId, Step>,
    accounts: BTreeMap<ParticipantId, Vec<StoredAccount>>,
    unlocked: BTreeSet<ParticipantId>,
}

impl State {
    fn record(&mut self, participant: ParticipantId, step: Step) -> anyhow::Result<()> {
        self.events.push((participant, step));
        if self.faults.get(&participant) == Some(&step) {
            bail!("injected {step:?} failure for participant {participant}")
        }
        Ok(())
    }
}

/// Wallets of all participants
#[derive(Default, Clone)]
pub struct InMemoryWallets {
    state: Rc<RefCell<State>>,
}

impl InMemoryWallets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `step` fail for the participant
    pub fn fail_at(&self, participant: ParticipantId, step: Step) {
        self.state.borrow_mut().faults.insert(participant, step);
    }

    pub fn open(&self, participant: &Participant) -> anyhow::Result<InMemoryWallet> {
        self.state.borrow_mut().record(participant.id, Step::Open)?;
        Ok(InMemoryWallet {
            participant: participant.id,
            state: self.state.clone(),
        })
    }

    pub fn events(&self) -> Vec<(ParticipantId, Step)> {
        self.state.borrow().events.clone()
    }

    pub fn events_of(&self, participant: ParticipantId) -> Vec<Step> {
        self.state
            .borrow()
            .events
            .iter()
            .filter(|(p, _)| *p == participant)
            .map(|(_, step)| *step)
            .collect()
    }

    pub fn accounts(&self, participant: ParticipantId) -> Vec<StoredAccount> {
        self.state
            .borrow()
            .accounts
            .get(&participant)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_unlocked(&self, participant: ParticipantId) -> bool {
        self.state.borrow().unlocked.contains(&participant)
    }
}

pub struct InMemoryWallet {
    participant: ParticipantId,
    state: Rc<RefCell<State>>,
}

impl Wallet for InMemoryWallet {
    type Error = anyhow::Error;
}

impl Unlockable for InMemoryWallet {
    fn unlock(&mut self) -> anyhow::Result<()> {
        let mut state = self.state.borrow_mut();
        state.record(self.participant, Step::Unlock)?;
        state.unlocked.insert(self.participant);
        Ok(())
    }

    fn lock(&mut self) -> anyhow::Result<()> {
        let mut state = self.state.borrow_mut();
        state.record(self.participant, Step::Lock)?;
        state.unlocked.remove(&self.participant);
        Ok(())
    }
}

impl DistributedAccountImportable for InMemoryWallet {
    type Account = String;

    fn import_distributed_account(
        &mut self,
        account: &DistributedAccount,
    ) -> anyhow::Result<String> {
        let mut state = self.state.borrow_mut();
        ensure!(
            state.unlocked.contains(&self.participant),
            "wallet of participant {} is locked",
            self.participant
        );
        state.record(self.participant, Step::Import)?;

        let accounts = state.accounts.entry(self.participant).or_default();
        ensure!(
            accounts.iter().all(|a| a.name != account.name),
            "account {} already exists",
            account.name
        );
        accounts.push(StoredAccount {
            name: account.name.clone(),
            secret_share: account.secret_share.to_vec(),
            threshold: account.threshold,
            verification_vector: account.verification_vector.clone(),
            participants: account.participants.clone(),
            passphrase: account.passphrase.to_vec(),
        });
        Ok(account.name.clone())
    }
}
