use blsplit::{
    ciphersuite::MinPk,
    config::Participant,
    trusted_dealer::{self, SubsetSelection, VerifiedSplit},
    wallet::{provision, ProvisionError, Unlocked},
};
use blsplit_tests::wallet::{InMemoryWallets, Step};

fn participants(ids: impl IntoIterator<Item = u64>) -> Vec<Participant> {
    ids.into_iter()
        .map(|id| Participant {
            id,
            uri: format!("http://participant-{id}:9000"),
            passphrase: format!("passphrase of {id}"),
        })
        .collect()
}

fn verified_split(ids: &[u64]) -> VerifiedSplit<MinPk> {
    let mut rng = rand_dev::DevRng::new();
    trusted_dealer::builder::<MinPk>(ids.iter().copied())
        .set_threshold(Some(2))
        .split(&mut rng)
        .unwrap()
        .validate(b"abc", SubsetSelection::All, &mut rng)
        .unwrap()
}

const FULL_CYCLE: [Step; 4] = [Step::Open, Step::Unlock, Step::Import, Step::Lock];

#[test]
fn every_participant_gets_its_share() {
    let split = verified_split(&[1, 2, 3]);
    let participants = participants([1, 2, 3]);
    let wallets = InMemoryWallets::new();

    let accounts = provision(&split, &participants, |p| wallets.open(p)).unwrap();
    assert_eq!(accounts, vec![split.account_name(); 3]);

    for (participant, key_share) in participants.iter().zip(split.key_shares()) {
        assert_eq!(wallets.events_of(participant.id), FULL_CYCLE);
        assert!(!wallets.is_unlocked(participant.id));

        let stored = wallets.accounts(participant.id);
        assert_eq!(stored.len(), 1);
        let stored = &stored[0];
        assert_eq!(stored.name, split.account_name());
        assert_eq!(stored.secret_share, key_share.secret.to_bytes().to_vec());
        assert_eq!(stored.threshold, 2);
        assert_eq!(stored.verification_vector, split.verification_vector().to_bytes());
        assert_eq!(stored.passphrase, participant.passphrase.as_bytes());
        assert_eq!(
            stored.participants.keys().copied().collect::<Vec<_>>(),
            [1, 2, 3]
        );
        assert_eq!(stored.participants[&2], "http://participant-2:9000");
    }

    // Participants are provisioned one after another
    let order = wallets
        .events()
        .into_iter()
        .map(|(p, _)| p)
        .collect::<Vec<_>>();
    assert_eq!(order, [1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3]);
}

#[test]
fn import_failure_locks_wallet_and_aborts_batch() {
    let split = verified_split(&[1, 2, 3]);
    let participants = participants([1, 2, 3]);
    let wallets = InMemoryWallets::new();
    wallets.fail_at(2, Step::Import);

    let err = provision(&split, &participants, |p| wallets.open(p)).unwrap_err();
    assert!(
        matches!(err, ProvisionError::Import { participant: 2, .. }),
        "{err}"
    );
    assert_eq!(err.participant(), 2);

    assert_eq!(wallets.events_of(1), FULL_CYCLE);
    assert_eq!(wallets.events_of(2), FULL_CYCLE);
    assert!(!wallets.is_unlocked(2));
    assert!(wallets.accounts(2).is_empty());
    assert!(wallets.events_of(3).is_empty());
}

#[test]
fn unlock_failure_skips_import() {
    let split = verified_split(&[1, 2, 3]);
    let participants = participants([1, 2, 3]);
    let wallets = InMemoryWallets::new();
    wallets.fail_at(1, Step::Unlock);

    let err = provision(&split, &participants, |p| wallets.open(p)).unwrap_err();
    assert!(matches!(err, ProvisionError::Unlock { participant: 1, .. }));
    assert_eq!(wallets.events_of(1), [Step::Open, Step::Unlock]);
    assert!(wallets.events_of(2).is_empty());
}

#[test]
fn open_failure_aborts_batch() {
    let split = verified_split(&[1, 2, 3]);
    let participants = participants([1, 2, 3]);
    let wallets = InMemoryWallets::new();
    wallets.fail_at(3, Step::Open);

    let err = provision(&split, &participants, |p| wallets.open(p)).unwrap_err();
    assert!(matches!(err, ProvisionError::Open { participant: 3, .. }));
    assert_eq!(wallets.accounts(1).len(), 1);
    assert_eq!(wallets.accounts(2).len(), 1);
    assert_eq!(wallets.events_of(3), [Step::Open]);
}

#[test]
fn lock_failure_is_reported_once() {
    let split = verified_split(&[1, 2, 3]);
    let participants = participants([1, 2, 3]);
    let wallets = InMemoryWallets::new();
    wallets.fail_at(1, Step::Lock);

    let err = provision(&split, &participants, |p| wallets.open(p)).unwrap_err();
    assert!(matches!(err, ProvisionError::Lock { participant: 1, .. }));
    // Account was imported, lock was attempted exactly once
    assert_eq!(wallets.accounts(1).len(), 1);
    assert_eq!(wallets.events_of(1), FULL_CYCLE);
    assert!(wallets.events_of(2).is_empty());
}

#[test]
fn unknown_or_repeated_participants_are_rejected_upfront() {
    let split = verified_split(&[1, 2, 3]);
    let wallets = InMemoryWallets::new();

    let err = provision(&split, &participants([1, 9]), |p| wallets.open(p)).unwrap_err();
    assert!(matches!(err, ProvisionError::UnknownParticipant(9)));

    let err = provision(&split, &participants([1, 2, 1]), |p| wallets.open(p)).unwrap_err();
    assert!(matches!(err, ProvisionError::DuplicateParticipant(1)));

    assert!(wallets.events().is_empty());
}

#[test]
fn guard_locks_wallet_on_drop() {
    let participants = participants([5]);
    let wallets = InMemoryWallets::new();
    let mut wallet = wallets.open(&participants[0]).unwrap();

    {
        let _unlocked = Unlocked::unlock(&mut wallet).unwrap();
        assert!(wallets.is_unlocked(5));
    }
    assert!(!wallets.is_unlocked(5));

    // Lock failure on drop is only logged
    wallets.fail_at(5, Step::Lock);
    {
        let _unlocked = Unlocked::unlock(&mut wallet).unwrap();
    }
    assert_eq!(
        wallets.events_of(5),
        [
            Step::Open,
            Step::Unlock,
            Step::Lock,
            Step::Unlock,
            Step::Lock
        ]
    );
    assert!(wallets.is_unlocked(5));

    // Explicit lock returns the error
    let unlocked = Unlocked::unlock(&mut wallet).unwrap();
    unlocked.lock().unwrap_err();
    assert_eq!(wallets.events_of(5).len(), 7);
}
