//! Per-worker scratch space for the group operations.

use num_bigint::BigInt;

use crate::AffinePoint;

/// Big-integer temporaries consumed by a single group operation.
#[derive(Default)]
pub(crate) struct Temps {
    pub(crate) num: BigInt,
    pub(crate) den: BigInt,
    pub(crate) lambda: BigInt,
    pub(crate) acc: BigInt,
}

/// Reusable arena of big-integer and point slots.
///
/// Every walking thread owns one `Scratch` for the lifetime of its walk; the
/// `_into` operations on [`Curve`](crate::Curve) write through it so the hot
/// path reuses the slots' backing buffers instead of allocating temporaries
/// on every step.
#[derive(Default)]
pub struct Scratch {
    pub(crate) temps: Temps,
    pub(crate) sum: AffinePoint,
    pub(crate) base: AffinePoint,
    pub(crate) doubled: AffinePoint,
}

impl Scratch {
    /// Fresh scratch space with all slots zeroed.
    pub fn new() -> Self {
        Self::default()
    }
}
