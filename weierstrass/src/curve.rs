//! Curve parameters and the affine group law.

use core::fmt;
use core::mem;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};

use crate::scratch::Temps;
use crate::{scalar, AffinePoint, Scratch};

/// Short Weierstrass curve `y² = x³ + Ax + B` over the prime field `F_p`.
///
/// All parameters are runtime values; the curve is immutable once built and
/// is shared by reference between worker threads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Curve {
    /// Coefficient `A` in the curve equation.
    pub a: BigInt,
    /// Coefficient `B` in the curve equation.
    pub b: BigInt,
    /// Field prime `p`.
    pub p: BigInt,
}

impl Curve {
    /// Curve from its equation coefficients and field prime.
    pub fn new(a: BigInt, b: BigInt, p: BigInt) -> Self {
        Self { a, b, p }
    }

    /// Whether the discriminant `4A³ + 27B²` is nonzero mod `p`.
    pub fn is_nonsingular(&self) -> bool {
        let d = (&self.a * &self.a * &self.a * 4i64 + &self.b * &self.b * 27i64).mod_floor(&self.p);
        !d.is_zero()
    }

    /// Whether `point` satisfies the curve equation. The identity counts as
    /// a curve point.
    pub fn contains(&self, point: &AffinePoint) -> bool {
        if point.is_identity() {
            return true;
        }
        let lhs = (&point.y * &point.y).mod_floor(&self.p);
        let rhs = (&point.x * &point.x * &point.x + &self.a * &point.x + &self.b).mod_floor(&self.p);
        lhs == rhs
    }

    /// `p1 + p2`, allocating fresh scratch space.
    pub fn add(&self, p1: &AffinePoint, p2: &AffinePoint) -> AffinePoint {
        let mut out = AffinePoint::identity();
        let mut temps = Temps::default();
        self.add_core(&mut out, p1, p2, &mut temps);
        out
    }

    /// `p1 + p2` if both operands lie on the curve.
    pub fn checked_add(&self, p1: &AffinePoint, p2: &AffinePoint) -> Option<AffinePoint> {
        if self.contains(p1) && self.contains(p2) {
            Some(self.add(p1, p2))
        } else {
            None
        }
    }

    /// `out ← p1 + p2`, writing through the scratch arena.
    ///
    /// The borrow rules already forbid `out` aliasing either operand; walks
    /// keep two point slots and swap after each step.
    pub fn add_into(
        &self,
        out: &mut AffinePoint,
        p1: &AffinePoint,
        p2: &AffinePoint,
        scratch: &mut Scratch,
    ) {
        self.add_core(out, p1, p2, &mut scratch.temps);
    }

    /// `k · point` by right-to-left double-and-add.
    pub fn double_and_add(&self, point: &AffinePoint, k: &BigInt) -> AffinePoint {
        let mut out = AffinePoint::identity();
        self.double_and_add_into(&mut out, point, k, &mut Scratch::new());
        out
    }

    /// `out ← k · point`, writing through the scratch arena.
    ///
    /// Multiplying the identity, or by `k ≤ 0`, yields the identity.
    pub fn double_and_add_into(
        &self,
        out: &mut AffinePoint,
        point: &AffinePoint,
        k: &BigInt,
        scratch: &mut Scratch,
    ) {
        let Scratch {
            temps,
            sum,
            base,
            doubled,
        } = scratch;

        out.set_identity();
        if point.is_identity() || !k.is_positive() {
            return;
        }

        base.assign(point);
        let bits = k.bits();
        for i in 0..bits {
            if k.bit(i) {
                self.add_core(sum, base, out, temps);
                mem::swap(out, sum);
            }
            if i + 1 < bits {
                self.add_core(doubled, base, base, temps);
                mem::swap(base, doubled);
            }
        }
    }

    /// The affine chord-and-tangent law.
    ///
    /// Identity and same-x edges are settled before any field inversion, so
    /// the denominator below is always invertible mod `p`; an inversion
    /// failure is nevertheless answered with the identity rather than a
    /// panic.
    fn add_core(&self, out: &mut AffinePoint, p1: &AffinePoint, p2: &AffinePoint, t: &mut Temps) {
        if p1.is_identity() {
            out.assign(p2);
            return;
        }
        if p2.is_identity() {
            out.assign(p1);
            return;
        }

        let p = &self.p;
        let Temps {
            num,
            den,
            lambda,
            acc,
        } = t;

        if p1.x == p2.x {
            if p1.y != p2.y || p1.y.is_zero() {
                // p2 = −p1, or a two-torsion point doubled
                out.set_identity();
                return;
            }
            // tangent slope (3x² + A) / 2y
            num.clone_from(&p1.x);
            *num *= &p1.x;
            *num *= 3;
            *num += &self.a;
            den.clone_from(&p1.y);
            *den *= 2;
        } else {
            // chord slope (y2 − y1) / (x2 − x1)
            num.clone_from(&p2.y);
            *num -= &p1.y;
            den.clone_from(&p2.x);
            *den -= &p1.x;
        }

        let Some(inv) = scalar::mod_inverse(den, p) else {
            out.set_identity();
            return;
        };
        *lambda = (&*num * &inv).mod_floor(p);

        // x3 = l² − x1 − x2
        acc.clone_from(lambda);
        *acc *= &*lambda;
        *acc -= &p1.x;
        *acc -= &p2.x;
        let x3 = acc.mod_floor(p);

        // y3 = l·(x1 − x3) − y1
        acc.clone_from(&p1.x);
        *acc -= &x3;
        *acc *= &*lambda;
        *acc -= &p1.y;
        let y3 = acc.mod_floor(p);

        out.set_coordinates(x3, y3);
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "y^2 = x^3 + {}*x + {} (mod {})", self.a, self.b, self.p)
    }
}
