//! Corpus fixture loading against the repository `curves`/`points` files.

use std::path::PathBuf;

use num_bigint::BigInt;

use pcs::corpus;
use pcs::error::Error;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join(name)
}

#[test]
fn first_record_is_the_35_bit_curve() {
    let record = corpus::load_curve(&fixture("curves"), 35).unwrap();
    assert_eq!(record.nb_bits, 35);
    assert_eq!(record.curve.a, BigInt::from(894));
    assert_eq!(record.curve.b, BigInt::from(25));
    assert_eq!(record.curve.p, "34359738319".parse::<BigInt>().unwrap());
    assert_eq!(record.order, "34359484339".parse::<BigInt>().unwrap());
    assert!(record.curve.is_nonsingular());
}

#[test]
fn second_record_is_the_40_bit_curve() {
    let record = corpus::load_curve(&fixture("curves"), 40).unwrap();
    assert_eq!(record.nb_bits, 40);
    assert_eq!(record.curve.p, "1099511627563".parse::<BigInt>().unwrap());
    assert_eq!(record.order, "1099509993643".parse::<BigInt>().unwrap());
}

#[test]
fn every_point_of_a_group_lies_on_its_curve() {
    for nb_bits in [35u32, 40] {
        let record = corpus::load_curve(&fixture("curves"), nb_bits).unwrap();
        for index in 0..corpus::POINTS_PER_CURVE {
            let point =
                corpus::load_point(&fixture("points"), nb_bits, index, &record.curve).unwrap();
            assert!(
                record.curve.contains(&point),
                "{nb_bits}-bit point {index}"
            );
        }
    }
}

#[test]
fn order_annihilates_every_base_point() {
    let record = corpus::load_curve(&fixture("curves"), 35).unwrap();
    for index in 0..corpus::POINTS_PER_CURVE {
        let point = corpus::load_point(&fixture("points"), 35, index, &record.curve).unwrap();
        assert!(record
            .curve
            .double_and_add(&point, &record.order)
            .is_identity());
    }
}

#[test]
fn absent_bit_sizes_fail_to_load() {
    // the fixture corpus carries 35- and 40-bit records only, so a 45-bit
    // request runs past the end of the file
    let err = corpus::load_curve(&fixture("curves"), 45).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}
