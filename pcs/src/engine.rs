//! The parallel collision-search engine.
//!
//! N workers perform independent adding walks and meet through the shared
//! distinguished-point store. A store hit hands the worker the colliding
//! trail's starting scalar; re-walking both trails yields two linear
//! combinations of `P` and `Q` that intersect, and with them the key.

use core::mem;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use num_bigint::BigInt;
use num_traits::Zero;
use parking_lot::Mutex;
use rand::{rngs::StdRng, SeedableRng};
use tracing::debug;

use dpstore::{build, DpStore, StoreKind, StoreParams, StoreStats};
use weierstrass::{scalar, AffinePoint, Curve, Scratch};

use crate::walk::{self, AddingWalk, WALK_SETS};

/// Engine tuning knobs.
#[derive(Clone, Debug)]
pub struct PcsParams {
    /// Curve bit size; starting scalars are drawn this wide.
    pub nb_bits: u32,
    /// Zero bits required of a distinguished x-coordinate.
    pub trailing_bits: u32,
    /// Distinguished-point store back-end.
    pub store: StoreKind,
    /// Store level (PRTL radix prefix / hash table-size exponent).
    pub level: u8,
    /// Optional byte budget for the store.
    pub memory_cap: Option<u64>,
}

/// Shared state of one solver run: curve, base points, group order, walk
/// table and the store. Owned in one place and borrowed by the scoped
/// worker threads.
pub struct PcsContext {
    /// The curve under attack.
    pub curve: Curve,
    /// Base point `P` of prime order.
    pub p: AffinePoint,
    /// Target point `Q = kP`.
    pub q: AffinePoint,
    /// Group order `n`.
    pub order: BigInt,
    /// Precomputed adding-walk table.
    pub walk: AddingWalk,
    nb_bits: u32,
    trailing_bits: u32,
    store: Box<dyn DpStore>,
}

impl PcsContext {
    /// Precomputes the walk-step points and builds the store.
    pub fn new(
        curve: Curve,
        p: AffinePoint,
        q: AffinePoint,
        order: BigInt,
        coeff_a: [BigInt; WALK_SETS],
        coeff_b: [BigInt; WALK_SETS],
        params: &PcsParams,
    ) -> Self {
        let walk = AddingWalk::new(&curve, &p, &q, coeff_a, coeff_b);
        let store = build(
            params.store,
            &StoreParams {
                nb_bits: params.nb_bits,
                trailing_bits: params.trailing_bits,
                level: params.level,
                order: order.clone(),
                memory_cap: params.memory_cap,
            },
        );
        Self {
            curve,
            p,
            q,
            order,
            walk,
            nb_bits: params.nb_bits,
            trailing_bits: params.trailing_bits,
            store,
        }
    }

    /// Runs `nb_threads` workers until `nb_collisions` collisions have been
    /// published, then returns the last published scalar.
    pub fn run(&self, nb_threads: usize, nb_collisions: u32) -> BigInt {
        let found = AtomicU32::new(0);
        let result = Mutex::new(BigInt::zero());
        let found_ref = &found;
        let result_ref = &result;
        thread::scope(|s| {
            for tid in 0..nb_threads {
                s.spawn(move || self.worker(tid, nb_collisions, found_ref, result_ref));
            }
        });
        result.into_inner()
    }

    /// Memory-occupancy snapshot of the distinguished-point store.
    pub fn store_stats(&self) -> StoreStats {
        self.store.stats()
    }

    fn worker(&self, tid: usize, nb_collisions: u32, found: &AtomicU32, result: &Mutex<BigInt>) {
        let mut rng = StdRng::seed_from_u64(unix_seconds() ^ (tid as u64 + 1));
        let mut scratch = Scratch::new();
        let mut cur = AffinePoint::identity();
        let mut next = AffinePoint::identity();
        let trail_max = (WALK_SETS as u64) << self.trailing_bits;

        let mut a_start = self.fresh_start(&mut rng, &mut cur, &mut scratch);
        let mut trail: u64 = 0;

        while found.load(Ordering::Acquire) < nb_collisions {
            let idx = AddingWalk::partition(&cur.y);
            self.curve
                .add_into(&mut next, &cur, &self.walk.steps[idx], &mut scratch);
            mem::swap(&mut cur, &mut next);
            trail += 1;

            if let Some(suffix) = walk::distinguished_suffix(&cur.x, self.trailing_bits) {
                if let Some(stored) = self.store.search_and_insert(&suffix, &a_start) {
                    if let Some(key) = self.verify_collision(&stored, &a_start, &mut scratch) {
                        let mut slot = result.lock();
                        *slot = key;
                        found.fetch_add(1, Ordering::Release);
                        debug!(worker = tid, "collision recorded");
                    }
                }
                a_start = self.fresh_start(&mut rng, &mut cur, &mut scratch);
                trail = 0;
            } else if trail > trail_max {
                // absorbing cycle with no distinguished point
                a_start = self.fresh_start(&mut rng, &mut cur, &mut scratch);
                trail = 0;
            }
        }
    }

    /// Starts a new trail: draws a nonzero `nb_bits`-wide scalar and
    /// positions the walk at `a_start·P`.
    ///
    /// Zero is excluded because an all-zero store record is
    /// indistinguishable from an empty slot.
    fn fresh_start(
        &self,
        rng: &mut StdRng,
        r: &mut AffinePoint,
        scratch: &mut Scratch,
    ) -> BigInt {
        loop {
            let a_start = scalar::random_bits(rng, u64::from(self.nb_bits));
            if a_start.is_zero() {
                continue;
            }
            self.curve
                .double_and_add_into(r, &self.p, &a_start, scratch);
            return a_start;
        }
    }

    /// Re-derives both trails from their starting scalars and recovers the
    /// key when the pair is usable.
    ///
    /// The walk partitions on `y`, so the two trails may in fact have met
    /// on inverse points (equal x, opposite y); comparing `a₁·P + b₁·Q`
    /// against the second trail's endpoint detects that case, and the
    /// second pair is negated before the final division.
    fn verify_collision(
        &self,
        a1_start: &BigInt,
        a2_start: &BigInt,
        scratch: &mut Scratch,
    ) -> Option<BigInt> {
        let (a1, b1, _) = self.rewalk(a1_start, scratch);
        let (a2, b2, meet) = self.rewalk(a2_start, scratch);
        if b1 == b2 {
            return None;
        }

        let probe = walk::lin_comb(&self.curve, &self.p, &self.q, &a1, &b1);
        let (a2, b2) = if probe.y == meet.y {
            (a2, b2)
        } else {
            let (mut a2, mut b2) = (a2, b2);
            scalar::neg_mod(&mut a2, &self.order);
            scalar::neg_mod(&mut b2, &self.order);
            (a2, b2)
        };

        walk::recover_key(&a1, &b1, &a2, &b2, &self.order)
    }

    /// Walks from `a_start·P` to its first distinguished point, tracking
    /// the full coefficient pair, and returns `(a, b, endpoint)` with
    /// `endpoint = a·P + b·Q`.
    fn rewalk(&self, a_start: &BigInt, scratch: &mut Scratch) -> (BigInt, BigInt, AffinePoint) {
        let mut a = a_start.clone();
        let mut b = BigInt::zero();
        let mut cur = AffinePoint::identity();
        let mut next = AffinePoint::identity();
        self.curve
            .double_and_add_into(&mut cur, &self.p, a_start, scratch);

        loop {
            let idx = AddingWalk::partition(&cur.y);
            scalar::add_mod(&mut a, &self.walk.a[idx], &self.order);
            scalar::add_mod(&mut b, &self.walk.b[idx], &self.order);
            self.curve
                .add_into(&mut next, &cur, &self.walk.steps[idx], scratch);
            mem::swap(&mut cur, &mut next);
            if walk::distinguished_suffix(&cur.x, self.trailing_bits).is_some() {
                break;
            }
        }
        (a, b, cur)
    }
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
