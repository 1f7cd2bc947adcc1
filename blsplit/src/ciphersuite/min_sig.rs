use bls12_381::{
    hash_to_curve::{ExpandMsgXmd, HashToCurve},
    G1Affine, G1Projective, G2Affine, G2Prepared, G2Projective, Gt,
};

use crate::Ciphersuite;

/// BLS12-381 ciphersuite with public keys in G2 and signatures in G1
///
/// Matches `BLS_SIG_BLS12381G1_XMD:SHA-256_SSWU_RO_POP_`. Signatures are half the size of
/// [`MinPk`](super::MinPk) ones, at the cost of larger public keys and verification vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinSig;

impl Ciphersuite for MinSig {
    const NAME: &'static str = "BLS12381-MinSig-SHA256-SSWU-RO-POP";
    const DST: &'static [u8] = b"BLS_SIG_BLS12381G1_XMD:SHA-256_SSWU_RO_POP_";

    type PublicKey = G2Projective;
    type Signature = G1Projective;

    fn hash_to_curve(msg: &[u8]) -> Self::Signature {
        <G1Projective as HashToCurve<ExpandMsgXmd<sha2::Sha256>>>::hash_to_curve(msg, Self::DST)
    }

    fn verify(public_key: &Self::PublicKey, signature: &Self::Signature, msg: &[u8]) -> bool {
        if bool::from(public_key.is_identity()) {
            return false;
        }

        // e(H(m), pk) * e(sig, -g2) == 1
        let h = G1Affine::from(Self::hash_to_curve(msg));
        let pk = G2Prepared::from(G2Affine::from(public_key));
        let sig = G1Affine::from(signature);
        let neg_g2 = G2Prepared::from(-G2Affine::generator());

        bls12_381::multi_miller_loop(&[(&h, &pk), (&sig, &neg_g2)]).final_exponentiation()
            == Gt::identity()
    }
}
