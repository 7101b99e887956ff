#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]
#![doc = include_str!("../README.md")]

mod affine;
mod curve;
mod scratch;

pub mod scalar;

pub use crate::{affine::AffinePoint, curve::Curve, scratch::Scratch};
pub use num_bigint::{self, BigInt};
