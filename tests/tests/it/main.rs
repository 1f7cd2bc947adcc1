mod wallet;

#[generic_tests::define(attrs(test_case::case))]
mod generic {
    use std::{collections::BTreeSet, num::NonZeroUsize};

    use blsplit::{
        recovery::{self, RecoveryError},
        signing,
        trusted_dealer::{self, SubsetSelection, VerifiedSplit},
        Ciphersuite, KeyShare, ParticipantId, PublicKeyShare, SecretScalar,
    };
    use blsplit_tests::ExternalVerifier;
    use group::Group;
    use rand::{seq::SliceRandom, Rng, RngCore};

    fn random_ids(rng: &mut impl RngCore, n: u16) -> Vec<ParticipantId> {
        let mut ids = BTreeSet::new();
        while ids.len() < usize::from(n) {
            ids.insert(rng.gen_range(1..=u64::MAX));
        }
        let mut ids = ids.into_iter().collect::<Vec<_>>();
        ids.shuffle(rng);
        ids
    }

    fn random_message(rng: &mut impl RngCore) -> Vec<u8> {
        let mut message = vec![0u8; rng.gen_range(0..=100)];
        rng.fill_bytes(&mut message);
        message
    }

    fn dealer<C: Ciphersuite>(
        rng: &mut rand_dev::DevRng,
        t: Option<u16>,
        n: u16,
        master_secret: &SecretScalar,
        message: &[u8],
    ) -> VerifiedSplit<C> {
        let ids = random_ids(rng, n);
        trusted_dealer::builder::<C>(ids)
            .set_threshold(t)
            .set_master_secret(master_secret.clone())
            .split(rng)
            .expect("split failed")
            .validate(message, SubsetSelection::All, rng)
            .expect("split doesn't verify")
    }

    #[test_case::case(Some(1), 2; "t1n2")]
    #[test_case::case(Some(2), 3; "t2n3")]
    #[test_case::case(None, 3; "n3")]
    #[test_case::case(Some(3), 5; "t3n5")]
    #[test_case::case(Some(5), 7; "t5n7")]
    fn split_and_recover<C: Ciphersuite + ExternalVerifier>(t: Option<u16>, n: u16) {
        let mut rng = rand_dev::DevRng::new();
        let master_secret = SecretScalar::random(&mut rng);
        let master_pk = C::public_key(&master_secret);
        let message = random_message(&mut rng);

        let split = dealer::<C>(&mut rng, t, n, &master_secret, &message);
        let t = t.unwrap_or(n);
        assert_eq!(split.threshold(), t);
        assert_eq!(split.master_public_key(), master_pk);
        assert_eq!(split.verification_vector().commitments().len(), usize::from(t));
        assert_eq!(split.key_shares().len(), usize::from(n));

        // Choose `t` random key shares
        let mut key_shares = split.key_shares().to_vec();
        key_shares.shuffle(&mut rng);
        let key_shares = &key_shares[..usize::from(t)];

        let recovered = recovery::recover_secret::<C>(t, key_shares).unwrap();
        assert!(recovered == master_secret, "recovered secret differs");

        let public_shares = key_shares
            .iter()
            .map(KeyShare::public_share)
            .collect::<Vec<_>>();
        assert_eq!(
            recovery::recover_public_key::<C>(t, &public_shares).unwrap(),
            master_pk
        );

        let sig_shares = key_shares
            .iter()
            .map(|share| signing::sign(share, &message))
            .collect::<Vec<_>>();
        let sig = recovery::recover_signature::<C>(t, &sig_shares).unwrap();
        assert_eq!(sig, signing::sign_with_secret::<C>(&master_secret, &message));
        assert!(signing::verify::<C>(&sig, &master_pk, &message));

        C::verify_sig(&master_pk, &sig, &message).expect("external verifier: invalid signature");
        assert_eq!(
            C::serialize_signature(&sig).as_ref(),
            C::external_sign(&master_secret, &message).as_slice()
        );
    }

    #[test_case::case(Some(2), 3; "t2n3")]
    #[test_case::case(Some(3), 5; "t3n5")]
    #[test_case::case(Some(4), 4; "t4n4")]
    fn every_subset_recovers_same_signature<C: Ciphersuite + ExternalVerifier>(
        t: Option<u16>,
        n: u16,
    ) {
        let mut rng = rand_dev::DevRng::new();
        let master_secret = SecretScalar::random(&mut rng);
        let message = random_message(&mut rng);
        let split = dealer::<C>(&mut rng, t, n, &master_secret, &message);
        let t = t.unwrap_or(n);

        let sig_shares = split.sign(&message);
        let expected = signing::sign_with_secret::<C>(&master_secret, &message);

        for _ in 0..10 {
            let mut subset = sig_shares.clone();
            subset.shuffle(&mut rng);
            // Also pass more than `t` shares: only the first `t` are used
            let extra = rng.gen_range(0..=(n - t));
            let subset = &subset[..usize::from(t + extra)];
            assert_eq!(recovery::recover_signature::<C>(t, subset).unwrap(), expected);
        }
    }

    #[test_case::case(Some(2), 3; "t2n3")]
    #[test_case::case(Some(3), 5; "t3n5")]
    #[test_case::case(Some(5), 5; "t5n5")]
    fn fewer_than_t_shares_dont_recover<C: Ciphersuite + ExternalVerifier>(
        t: Option<u16>,
        n: u16,
    ) {
        let mut rng = rand_dev::DevRng::new();
        let master_secret = SecretScalar::random(&mut rng);
        let message = random_message(&mut rng);
        let split = dealer::<C>(&mut rng, t, n, &master_secret, &message);
        let t = t.unwrap_or(n);

        let mut key_shares = split.key_shares().to_vec();
        key_shares.shuffle(&mut rng);
        let key_shares = &key_shares[..usize::from(t - 1)];

        let err = recovery::recover_secret::<C>(t, key_shares).unwrap_err();
        assert_eq!(
            err,
            RecoveryError::InsufficientShares {
                threshold: t,
                provided: usize::from(t - 1)
            }
        );

        // Interpolating as if the threshold were lower yields an unrelated key
        let wrong = recovery::recover_secret::<C>(t - 1, key_shares).unwrap();
        assert!(wrong != master_secret);

        let sig_shares = key_shares
            .iter()
            .map(|share| signing::sign(share, &message))
            .collect::<Vec<_>>();
        let wrong_sig = recovery::recover_signature::<C>(t - 1, &sig_shares).unwrap();
        assert!(!signing::verify::<C>(
            &wrong_sig,
            &split.master_public_key(),
            &message
        ));
    }

    #[test_case::case(Some(2), 3; "t2n3")]
    #[test_case::case(Some(3), 5; "t3n5")]
    fn public_key_shares_follow_verification_vector<C: Ciphersuite + ExternalVerifier>(
        t: Option<u16>,
        n: u16,
    ) {
        let mut rng = rand_dev::DevRng::new();
        let master_secret = SecretScalar::random(&mut rng);
        let split = dealer::<C>(&mut rng, t, n, &master_secret, b"abc");
        let vv = split.verification_vector();

        for share in split.key_shares() {
            assert!(share.is_consistent());
            assert_eq!(C::public_key(&share.secret), vv.evaluate(&share.id));
            assert_eq!(PublicKeyShare::<C>::derive(vv, share.id), share.public_share());
        }
        assert_eq!(vv.commitments()[0], C::public_key(&master_secret));
    }

    #[test_case::case(b"abc"; "abc")]
    #[test_case::case(b""; "empty")]
    fn identity_public_key_never_verifies<C: Ciphersuite>(msg: &[u8]) {
        let identity = C::PublicKey::identity();
        // Identity signature satisfies the pairing equation for identity public key
        assert!(!C::verify(&identity, &C::Signature::identity(), msg));
        assert!(!signing::verify::<C>(&C::Signature::identity(), &identity, msg));

        let secret = SecretScalar::random(&mut rand_dev::DevRng::new());
        assert!(!C::verify(&identity, &C::sign(&secret, msg), msg));
        assert!(C::verify(&C::public_key(&secret), &C::sign(&secret, msg), msg));
    }

    #[test_case::case(Some(2), 3; "t2n3")]
    #[test_case::case(Some(3), 5; "t3n5")]
    fn altered_message_doesnt_verify<C: Ciphersuite + ExternalVerifier>(t: Option<u16>, n: u16) {
        let mut rng = rand_dev::DevRng::new();
        let master_secret = SecretScalar::random(&mut rng);
        let message = random_message(&mut rng);
        let split = dealer::<C>(&mut rng, t, n, &master_secret, &message);
        let t = t.unwrap_or(n);

        let mut altered = message.clone();
        altered.push(rng.gen());

        let sig_shares = split.sign(&message);
        let public_shares = split.public_shares();
        for (sig_share, public_share) in sig_shares.iter().zip(&public_shares) {
            assert!(sig_share.verify(public_share, &message));
            assert!(!sig_share.verify(public_share, &altered));
        }
        // Signature share checked against another participant's public key share
        assert!(!sig_shares[0].verify(&public_shares[1], &message));

        let sig = recovery::recover_signature::<C>(t, &sig_shares).unwrap();
        assert!(signing::verify::<C>(&sig, &split.master_public_key(), &message));
        assert!(!signing::verify::<C>(&sig, &split.master_public_key(), &altered));
        C::verify_sig(&split.master_public_key(), &sig, &altered).unwrap_err();
    }

    #[test_case::case(Some(3), 8; "t3n8")]
    #[test_case::case(Some(5), 12; "t5n12")]
    fn random_subset_selection<C: Ciphersuite + ExternalVerifier>(t: Option<u16>, n: u16) {
        let mut rng = rand_dev::DevRng::new();
        let ids = random_ids(&mut rng, n);

        let split = trusted_dealer::builder::<C>(ids)
            .set_threshold(t)
            .split(&mut rng)
            .unwrap()
            .validate(
                b"abc",
                SubsetSelection::Random(NonZeroUsize::new(5).unwrap()),
                &mut rng,
            )
            .unwrap()
            .into_inner()
            .validate(b"abc", SubsetSelection::Auto, &mut rng)
            .unwrap();

        let sig = recovery::recover_signature::<C>(t.unwrap_or(n), &split.sign(b"abc")).unwrap();
        C::verify_sig(&split.master_public_key(), &sig, b"abc")
            .expect("external verifier: invalid signature");
    }

    #[instantiate_tests(<blsplit::ciphersuite::MinPk>)]
    mod min_pk {}
    #[instantiate_tests(<blsplit::ciphersuite::MinSig>)]
    mod min_sig {}
}
