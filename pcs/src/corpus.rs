//! Fixed-width curve/point corpus files.
//!
//! `curves` holds one 84-byte record per supported bit size with the fields
//! `f A B p n` in decimal ASCII; `points` holds 80-byte records in groups
//! of eleven per curve (a header line followed by ten points `X Y`). Record
//! offsets are computed from the bit size, never searched for, so the
//! record widths are part of the format.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use num_bigint::BigInt;

use weierstrass::{AffinePoint, Curve};

use crate::error::{Error, Result};

/// Byte width of one `curves` record.
pub const CURVE_RECORD_LEN: u64 = 84;
/// Byte width of one `points` record.
pub const POINT_RECORD_LEN: u64 = 80;
/// Usable point records per curve group (the group also carries a header).
pub const POINTS_PER_CURVE: u64 = 10;

/// One `curves` record.
#[derive(Clone, Debug)]
pub struct CurveRecord {
    /// Curve bit size `f`.
    pub nb_bits: u32,
    /// The curve.
    pub curve: Curve,
    /// Prime order of the base points in this curve's group.
    pub order: BigInt,
}

/// Record index of an `f`-bit curve: sizes run 35, 40, … in steps of five.
fn curve_index(nb_bits: u32) -> u64 {
    u64::from(nb_bits) / 5 - 3
}

fn read_record(path: &Path, offset: u64, len: u64) -> Result<String> {
    let io_err = |source| Error::Io {
        path: path.to_owned(),
        source,
    };
    let mut file = File::open(path).map_err(io_err)?;
    file.seek(SeekFrom::Start(offset)).map_err(io_err)?;
    let mut buf = vec![0u8; len as usize];
    file.read_exact(&mut buf).map_err(io_err)?;
    String::from_utf8(buf).map_err(|_| Error::MalformedRecord {
        path: path.to_owned(),
        reason: "record is not ASCII".into(),
    })
}

fn parse_field<T: std::str::FromStr>(path: &Path, field: &str, raw: Option<&str>) -> Result<T> {
    raw.and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::MalformedRecord {
            path: path.to_owned(),
            reason: format!("missing or invalid `{field}` field"),
        })
}

/// Loads and validates the record for an `f`-bit curve.
pub fn load_curve(path: &Path, nb_bits: u32) -> Result<CurveRecord> {
    let record = read_record(path, curve_index(nb_bits) * CURVE_RECORD_LEN, CURVE_RECORD_LEN)?;
    let mut fields = record.split_whitespace();

    let f: u32 = parse_field(path, "f", fields.next())?;
    let a: BigInt = parse_field(path, "A", fields.next())?;
    let b: BigInt = parse_field(path, "B", fields.next())?;
    let p: BigInt = parse_field(path, "p", fields.next())?;
    let order: BigInt = parse_field(path, "n", fields.next())?;

    if f != nb_bits {
        return Err(Error::MalformedRecord {
            path: path.to_owned(),
            reason: format!("record says {f} bits where {nb_bits} were requested"),
        });
    }

    let curve = Curve::new(a, b, p);
    if !curve.is_nonsingular() {
        return Err(Error::MalformedRecord {
            path: path.to_owned(),
            reason: "singular curve".into(),
        });
    }

    Ok(CurveRecord {
        nb_bits,
        curve,
        order,
    })
}

/// Loads point `index` (0-based, below [`POINTS_PER_CURVE`]) of the `f`-bit
/// group and checks it against the curve equation.
pub fn load_point(path: &Path, nb_bits: u32, index: u64, curve: &Curve) -> Result<AffinePoint> {
    let group = curve_index(nb_bits) * (POINTS_PER_CURVE + 1);
    let offset = (group + 1 + index) * POINT_RECORD_LEN;
    let record = read_record(path, offset, POINT_RECORD_LEN)?;
    let mut fields = record.split_whitespace();

    let x: BigInt = parse_field(path, "X", fields.next())?;
    let y: BigInt = parse_field(path, "Y", fields.next())?;

    let point = AffinePoint::new(x, y);
    if !curve.contains(&point) {
        return Err(Error::MalformedRecord {
            path: path.to_owned(),
            reason: format!("point {index} is not on the curve"),
        });
    }
    Ok(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_indices_step_by_five_bits() {
        assert_eq!(curve_index(35), 0);
        assert_eq!(curve_index(40), 1);
        assert_eq!(curve_index(115), 16);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_curve(Path::new("no-such-corpus"), 35).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
