use blsplit::{Ciphersuite, SecretScalar};

pub mod wallet;

/// Independent BLS implementation used to cross-check signatures
pub trait ExternalVerifier: Ciphersuite {
    type InvalidSig: core::fmt::Debug;

    fn verify_sig(
        pk: &Self::PublicKey,
        sig: &Self::Signature,
        msg: &[u8],
    ) -> Result<(), Self::InvalidSig>;

    /// Signs the message with the external implementation, returns the compressed signature
    fn external_sign(sk: &SecretScalar, msg: &[u8]) -> Vec<u8>;
}

macro_rules! impl_external_verifier {
    ($suite:ty, $blst:ident) => {
        impl ExternalVerifier for $suite {
            type InvalidSig = blst::BLST_ERROR;

            fn verify_sig(
                pk: &Self::PublicKey,
                sig: &Self::Signature,
                msg: &[u8],
            ) -> Result<(), blst::BLST_ERROR> {
                let pk = blst::$blst::PublicKey::from_bytes(Self::serialize_public_key(pk).as_ref())?;
                let sig =
                    blst::$blst::Signature::from_bytes(Self::serialize_signature(sig).as_ref())?;
                match sig.verify(true, msg, Self::DST, &[], &pk, true) {
                    blst::BLST_ERROR::BLST_SUCCESS => Ok(()),
                    err => Err(err),
                }
            }

            fn external_sign(sk: &SecretScalar, msg: &[u8]) -> Vec<u8> {
                // blst takes secret keys big-endian
                let mut sk_bytes = *sk.to_bytes();
                sk_bytes.reverse();
                let sk = blst::$blst::SecretKey::from_bytes(&sk_bytes).expect("invalid secret key");
                sk.sign(msg, Self::DST, &[]).to_bytes().to_vec()
            }
        }
    };
}

impl_external_verifier!(blsplit::ciphersuite::MinPk, min_pk);
impl_external_verifier!(blsplit::ciphersuite::MinSig, min_sig);
