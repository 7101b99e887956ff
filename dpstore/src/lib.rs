#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]
#![doc = include_str!("../README.md")]

pub mod bitvec;

mod hash;
mod prtl;

pub use crate::{
    bitvec::BitVec,
    hash::{elf_hash, HashStore},
    prtl::Prtl,
};

use core::fmt;
use core::str::FromStr;

use num_bigint::BigInt;

/// First-writer-wins distinguished-point storage.
///
/// Implementations are shared by reference between worker threads; every
/// bucket is guarded by its own lock, so concurrent calls on distinct
/// buckets proceed independently.
pub trait DpStore: Send + Sync {
    /// Looks up `suffix`, inserting `(suffix, a)` when absent.
    ///
    /// Returns `None` on a miss (the pair is now stored) and
    /// `Some(stored_a)` on a hit; a stored pair is never mutated or
    /// evicted, so concurrent duplicate inserts agree on a single winner.
    fn search_and_insert(&self, suffix: &BigInt, a: &BigInt) -> Option<BigInt>;

    /// Memory-occupancy snapshot of the store.
    fn stats(&self) -> StoreStats;
}

/// Memory-occupancy counters reported by [`DpStore::stats`].
#[derive(Clone, Debug)]
pub struct StoreStats {
    /// Total allocated bytes, table and chain nodes included.
    pub bytes: u64,
    /// Number of stored records.
    pub points: u64,
    /// Percentage of allocated memory backing actual records.
    pub rate_of_use: f64,
    /// Percentage of table slots holding at least one record.
    pub rate_slots: f64,
}

/// Store back-end selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    /// Packed radix-tree-list.
    Prtl,
    /// Chained hash table with the UNIX ELF hash.
    HashUnix,
}

impl StoreKind {
    /// Canonical name, as used on the command line and in result logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Prtl => "PRTL",
            StoreKind::HashUnix => "hash_unix",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PRTL" => Ok(StoreKind::Prtl),
            "hash_unix" => Ok(StoreKind::HashUnix),
            other => Err(format!("unknown storage structure `{other}`")),
        }
    }
}

/// Sizing parameters shared by both back-ends.
#[derive(Clone, Debug)]
pub struct StoreParams {
    /// Bit width of the stored scalars (and of the full x-coordinates).
    pub nb_bits: u32,
    /// Zero bits dropped from a distinguished x-coordinate.
    pub trailing_bits: u32,
    /// Table-size exponent. For the PRTL this many low suffix bits form the
    /// bucket index; for the hash table `0` means "auto-size from the
    /// expected number of distinguished points".
    pub level: u8,
    /// Group order, used by the hash back-end when auto-sizing.
    pub order: BigInt,
    /// Optional byte budget; once the gauge would pass it, chain-node
    /// allocation is skipped and the insert reports a miss.
    pub memory_cap: Option<u64>,
}

/// Builds the selected back-end.
pub fn build(kind: StoreKind, params: &StoreParams) -> Box<dyn DpStore> {
    match kind {
        StoreKind::Prtl => Box::new(Prtl::new(params)),
        StoreKind::HashUnix => Box::new(HashStore::new(params)),
    }
}
