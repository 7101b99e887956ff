//! Modular arithmetic on arbitrary-precision scalars.
//!
//! Thin shim over `num-bigint` keeping every value in the canonical range
//! `[0, m)`; walk coefficients, store entries and recovered keys all pass
//! through these helpers.

use num_bigint::{BigInt, RandBigInt};
use num_integer::Integer;
use num_traits::One;
use rand::Rng;

/// Reduces `v` in place into the canonical range `[0, m)`.
pub fn reduce(v: &mut BigInt, m: &BigInt) {
    *v = v.mod_floor(m);
}

/// `a ← (a + b) mod m`.
pub fn add_mod(a: &mut BigInt, b: &BigInt, m: &BigInt) {
    *a += b;
    reduce(a, m);
}

/// `a ← −a mod m`.
pub fn neg_mod(a: &mut BigInt, m: &BigInt) {
    *a *= -1;
    reduce(a, m);
}

/// Multiplicative inverse of `a` modulo `m`, when `gcd(a, m) = 1`.
pub fn mod_inverse(a: &BigInt, m: &BigInt) -> Option<BigInt> {
    let e = a.extended_gcd(m);
    if e.gcd.is_one() {
        Some(e.x.mod_floor(m))
    } else {
        None
    }
}

/// Uniform integer in `[0, 2^bits)`.
pub fn random_bits<R: Rng + ?Sized>(rng: &mut R, bits: u64) -> BigInt {
    rng.gen_biguint(bits).into()
}

/// Uniform key in `[2^(bits−1), min(2^bits, n))`.
///
/// Keys are kept below the group order so that the residue recovered by the
/// solver equals the key exactly. The caller must ensure `n > 2^(bits−1)`,
/// which holds for every curve in the corpus.
pub fn random_key<R: Rng + ?Sized>(rng: &mut R, bits: u64, n: &BigInt) -> BigInt {
    let lo = BigInt::one() << (bits - 1);
    let hi = (BigInt::one() << bits).min(n.clone());
    debug_assert!(lo < hi);
    rng.gen_bigint_range(&lo, &hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::{Signed, Zero};
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn inverse_of_zero_is_none() {
        let m = BigInt::from(97);
        assert!(mod_inverse(&BigInt::zero(), &m).is_none());
        assert!(mod_inverse(&m, &m).is_none());
    }

    #[test]
    fn negation_is_canonical() {
        let m = BigInt::from(97);
        let mut a = BigInt::from(30);
        neg_mod(&mut a, &m);
        assert_eq!(a, BigInt::from(67));
        neg_mod(&mut a, &m);
        assert_eq!(a, BigInt::from(30));
    }

    #[test]
    fn key_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let n: BigInt = "34359484339".parse().unwrap();
        let lo = BigInt::one() << 34;
        for _ in 0..100 {
            let k = random_key(&mut rng, 35, &n);
            assert!(k >= lo && k < n);
        }
    }

    #[test]
    fn random_bits_width() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let v = random_bits(&mut rng, 35);
            assert!(!v.is_negative());
            assert!(v.bits() <= 35);
        }
    }

    proptest! {
        #[test]
        fn inverse_law(a in 1u64..) {
            let m: BigInt = "34359484339".parse().unwrap();
            let a = BigInt::from(a).mod_floor(&m);
            prop_assume!(!a.is_zero());
            let inv = mod_inverse(&a, &m).unwrap();
            prop_assert!(inv >= BigInt::zero() && inv < m);
            prop_assert_eq!((a * inv).mod_floor(&m), BigInt::one());
        }

        #[test]
        fn add_mod_stays_canonical(a in 0u64.., b in 0u64..) {
            let m = BigInt::from(0x7FFF_FFFFu64);
            let mut acc = BigInt::from(a).mod_floor(&m);
            add_mod(&mut acc, &BigInt::from(b), &m);
            prop_assert!(acc >= BigInt::zero() && acc < m);
            let expected = (BigInt::from(a) + BigInt::from(b)).mod_floor(&m);
            prop_assert_eq!(acc, expected);
        }
    }
}
