//! End-to-end solver scenarios on the 35-bit corpus curve.

use std::path::PathBuf;

use num_bigint::BigInt;
use rand::{rngs::StdRng, SeedableRng};

use dpstore::StoreKind;
use pcs::corpus;
use pcs::engine::{PcsContext, PcsParams};
use pcs::walk::AddingWalk;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join(name)
}

/// Builds a solver context for the first corpus curve and its first point,
/// with `Q = key·P` and deterministic walk coefficients.
fn context(trailing_bits: u32, store: StoreKind, level: u8, key: &BigInt) -> PcsContext {
    let record = corpus::load_curve(&fixture("curves"), 35).expect("curves fixture");
    let p = corpus::load_point(&fixture("points"), 35, 0, &record.curve).expect("points fixture");
    let q = record.curve.double_and_add(&p, key);

    let mut rng = StdRng::seed_from_u64(0xD15C0);
    let (a, b) = AddingWalk::random_coefficients(&mut rng, &record.order);

    PcsContext::new(
        record.curve,
        p,
        q,
        record.order,
        a,
        b,
        &PcsParams {
            nb_bits: 35,
            trailing_bits,
            store,
            level,
            memory_cap: None,
        },
    )
}

fn test_key() -> BigInt {
    // within [2^34, n) for the 35-bit corpus curve
    BigInt::from(23_456_789_012u64)
}

#[test]
fn scenario_a_single_thread_recovers_the_key() {
    let key = test_key();
    let ctx = context(8, StoreKind::Prtl, 7, &key);
    assert_eq!(ctx.run(1, 1), key);
    assert!(ctx.store_stats().points > 0);
}

#[test]
fn scenario_b_four_threads_prtl() {
    let key = test_key();
    let ctx = context(8, StoreKind::Prtl, 7, &key);
    assert_eq!(ctx.run(4, 1), key);
}

#[test]
fn scenario_c_four_threads_hash_auto_sized() {
    let key = test_key();
    let ctx = context(8, StoreKind::HashUnix, 0, &key);
    assert_eq!(ctx.run(4, 1), key);
}

#[test]
fn scenario_d_degenerate_distinguishing() {
    // every point is distinguished; trails are single steps and the store
    // absorbs one record per walk
    let key = test_key();
    let ctx = context(0, StoreKind::Prtl, 16, &key);
    assert_eq!(ctx.run(2, 1), key);
}

#[test]
fn scenario_e_multiple_collisions() {
    // every published collision recovers the unique discrete log, so the
    // last one still equals the key
    let key = test_key();
    let ctx = context(8, StoreKind::Prtl, 7, &key);
    assert_eq!(ctx.run(4, 3), key);
}

#[test]
fn both_backends_agree_on_the_recovered_key() {
    let key = BigInt::from(19_876_543_210u64);
    for (store, level) in [(StoreKind::Prtl, 7), (StoreKind::HashUnix, 0)] {
        let ctx = context(8, store, level, &key);
        assert_eq!(ctx.run(2, 1), key, "{store}");
    }
}
