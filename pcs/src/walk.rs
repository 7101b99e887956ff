//! Adding walks: the partition hash, the precomputed step table, the
//! distinguished-point predicate and scalar reconstruction.

use core::array;

use num_bigint::{BigInt, RandBigInt};
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};
use rand::Rng;

use weierstrass::{scalar, AffinePoint, Curve};

/// Number of partitions (precomputed steps) in the adding walk.
pub const WALK_SETS: usize = 20;

/// Precomputed adding-walk table: `steps[i] = a[i]·P + b[i]·Q`.
///
/// Built once per run and shared read-only by every worker.
pub struct AddingWalk {
    /// `a` coefficients of the walk sets, in `[0, n)`.
    pub a: [BigInt; WALK_SETS],
    /// `b` coefficients of the walk sets, in `[0, n)`.
    pub b: [BigInt; WALK_SETS],
    /// The step points.
    pub steps: [AffinePoint; WALK_SETS],
}

impl AddingWalk {
    /// Draws the two coefficient sets uniformly below `max`.
    pub fn random_coefficients<R: Rng + ?Sized>(
        rng: &mut R,
        max: &BigInt,
    ) -> ([BigInt; WALK_SETS], [BigInt; WALK_SETS]) {
        let mut draw = || rng.gen_bigint_range(&BigInt::zero(), max);
        let a = array::from_fn(|_| draw());
        let b = array::from_fn(|_| draw());
        (a, b)
    }

    /// Precomputes the step table for base points `p` and `q`.
    pub fn new(
        curve: &Curve,
        p: &AffinePoint,
        q: &AffinePoint,
        a: [BigInt; WALK_SETS],
        b: [BigInt; WALK_SETS],
    ) -> Self {
        let steps = array::from_fn(|i| lin_comb(curve, p, q, &a[i], &b[i]));
        Self { a, b, steps }
    }

    /// Partition index `h(y) = y mod 20`, a pure function of the
    /// y-coordinate.
    pub fn partition(y: &BigInt) -> usize {
        (y % WALK_SETS as u32).to_usize().unwrap_or(0)
    }
}

/// The linear combination `a·P + b·Q`.
pub fn lin_comb(
    curve: &Curve,
    p: &AffinePoint,
    q: &AffinePoint,
    a: &BigInt,
    b: &BigInt,
) -> AffinePoint {
    let ap = curve.double_and_add(p, a);
    let bq = curve.double_and_add(q, b);
    curve.add(&ap, &bq)
}

/// Distinguished-point test: the suffix `x >> trailing_bits` when the low
/// `trailing_bits` bits of `x` are zero, `None` otherwise.
///
/// With `trailing_bits = 0` every point is distinguished and the suffix is
/// the full x-coordinate.
pub fn distinguished_suffix(x: &BigInt, trailing_bits: u32) -> Option<BigInt> {
    let low_zeros = x.trailing_zeros().unwrap_or(u64::MAX);
    if low_zeros >= u64::from(trailing_bits) {
        Some(x >> (trailing_bits as usize))
    } else {
        None
    }
}

/// Recovers the key from a collision of two coefficient pairs:
/// `k = (a₁ − a₂) · (b₂ − b₁)⁻¹ mod n`.
///
/// `b₁ = b₂` carries no information (both sides reduce to the same linear
/// combination) and yields `None`.
pub fn recover_key(
    a1: &BigInt,
    b1: &BigInt,
    a2: &BigInt,
    b2: &BigInt,
    n: &BigInt,
) -> Option<BigInt> {
    if b1 == b2 {
        return None;
    }
    let num = (a1 - a2).mod_floor(n);
    let den = (b2 - b1).mod_floor(n);
    let inv = scalar::mod_inverse(&den, n)?;
    Some((num * inv).mod_floor(n))
}
