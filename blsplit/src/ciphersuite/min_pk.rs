use bls12_381::{
    hash_to_curve::{ExpandMsgXmd, HashToCurve},
    G1Affine, G1Projective, G2Affine, G2Prepared, G2Projective, Gt,
};

use crate::Ciphersuite;

/// BLS12-381 ciphersuite with public keys in G1 and signatures in G2
///
/// Matches `BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_` used by Ethereum validators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinPk;

impl Ciphersuite for MinPk {
    const NAME: &'static str = "BLS12381-MinPk-SHA256-SSWU-RO-POP";
    const DST: &'static [u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

    type PublicKey = G1Projective;
    type Signature = G2Projective;

    fn hash_to_curve(msg: &[u8]) -> Self::Signature {
        <G2Projective as HashToCurve<ExpandMsgXmd<sha2::Sha256>>>::hash_to_curve(msg, Self::DST)
    }

    fn verify(public_key: &Self::PublicKey, signature: &Self::Signature, msg: &[u8]) -> bool {
        if bool::from(public_key.is_identity()) {
            return false;
        }

        // e(pk, H(m)) * e(-g1, sig) == 1
        let pk = G1Affine::from(public_key);
        let h = G2Prepared::from(G2Affine::from(Self::hash_to_curve(msg)));
        let sig = G2Prepared::from(G2Affine::from(signature));

        bls12_381::multi_miller_loop(&[(&pk, &h), (&-G1Affine::generator(), &sig)])
            .final_exponentiation()
            == Gt::identity()
    }
}
