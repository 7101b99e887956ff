//! Packed radix-tree-list back-end.
//!
//! The low `level` bits of a suffix select a bucket; only the remaining
//! `suffix_len` bits plus the accompanying scalar are stored, bit-packed
//! into one buffer per record. Each bucket keeps its records in ascending
//! remainder order with the smallest record inlined in the table slot, so
//! the common singleton bucket costs no pointer chase.

use core::cmp::Ordering;
use core::mem;
use std::sync::atomic::{AtomicU64, Ordering as MemOrder};

use num_bigint::BigInt;
use parking_lot::Mutex;

use crate::{bitvec::BitVec, DpStore, StoreParams, StoreStats};

struct Node {
    packed: BitVec,
    next: Option<Box<Node>>,
}

/// Bucket slot: head record inlined, overflow chained. An all-zero head
/// marks an empty bucket.
struct Bucket {
    head: BitVec,
    rest: Option<Box<Node>>,
}

/// Packed radix-tree-list store.
pub struct Prtl {
    level: usize,
    suffix_len: usize,
    nb_bits: usize,
    index_mask: u64,
    buckets: Vec<Mutex<Bucket>>,
    gauge: AtomicU64,
    cap: Option<u64>,
    slot_bytes: u64,
    node_bytes: u64,
}

impl Prtl {
    /// Allocates the bucket table for the given sizing parameters.
    ///
    /// `level` must not exceed `nb_bits − trailing_bits`; the remaining
    /// `suffix_len = nb_bits − trailing_bits − level` bits of each suffix
    /// are stored explicitly, followed by the `nb_bits`-wide scalar.
    pub fn new(params: &StoreParams) -> Self {
        let level = params.level as usize;
        let word_len = (params.nb_bits - params.trailing_bits) as usize;
        assert!(level <= word_len, "level exceeds the stored word length");

        let suffix_len = word_len - level;
        let nb_bits = params.nb_bits as usize;
        let entry_bits = suffix_len + nb_bits;
        let table_size = 1usize << level;

        let buckets: Vec<Mutex<Bucket>> = (0..table_size)
            .map(|_| {
                Mutex::new(Bucket {
                    head: BitVec::zeroed(entry_bits),
                    rest: None,
                })
            })
            .collect();

        let entry_bytes = entry_bits.div_ceil(8) as u64;
        let slot_bytes = mem::size_of::<Mutex<Bucket>>() as u64 + entry_bytes;
        let node_bytes = mem::size_of::<Node>() as u64 + entry_bytes;

        Self {
            level,
            suffix_len,
            nb_bits,
            index_mask: (table_size as u64) - 1,
            gauge: AtomicU64::new(slot_bytes * table_size as u64),
            buckets,
            cap: params.memory_cap,
            slot_bytes,
            node_bytes,
        }
    }

    fn entry_bits(&self) -> usize {
        self.suffix_len + self.nb_bits
    }

    fn bucket_index(&self, suffix: &BigInt) -> usize {
        let low = suffix.iter_u64_digits().next().unwrap_or(0);
        (low & self.index_mask) as usize
    }

    fn write_record(&self, packed: &mut BitVec, suffix: &BigInt, a: &BigInt) {
        packed.set_bigint(0, self.suffix_len, suffix, self.level);
        packed.set_bigint(self.suffix_len, self.nb_bits, a, 0);
    }

    fn stored_scalar(&self, packed: &BitVec) -> BigInt {
        packed.get_bigint(self.suffix_len, self.nb_bits)
    }

    fn remainder_cmp(&self, packed: &BitVec, suffix: &BigInt) -> Ordering {
        packed.cmp_bigint(0, self.suffix_len, suffix, self.level)
    }

    fn reserve_node(&self) -> bool {
        match self.cap {
            None => {
                self.gauge.fetch_add(self.node_bytes, MemOrder::Relaxed);
                true
            }
            Some(cap) => {
                let prev = self.gauge.fetch_add(self.node_bytes, MemOrder::Relaxed);
                if prev + self.node_bytes > cap {
                    self.gauge.fetch_sub(self.node_bytes, MemOrder::Relaxed);
                    false
                } else {
                    true
                }
            }
        }
    }

    /// Ascending-order insert into the overflow chain hanging off a bucket
    /// head. Chains are short (singleton buckets are the common case), so
    /// the recursion stays shallow.
    fn chain_insert(
        &self,
        slot: &mut Option<Box<Node>>,
        suffix: &BigInt,
        a: &BigInt,
    ) -> Option<BigInt> {
        if let Some(node) = slot {
            match self.remainder_cmp(&node.packed, suffix) {
                Ordering::Equal => return Some(self.stored_scalar(&node.packed)),
                Ordering::Less => return self.chain_insert(&mut node.next, suffix, a),
                Ordering::Greater => {}
            }
        }
        if !self.reserve_node() {
            return None;
        }
        let mut packed = BitVec::zeroed(self.entry_bits());
        self.write_record(&mut packed, suffix, a);
        let next = slot.take();
        *slot = Some(Box::new(Node { packed, next }));
        None
    }
}

impl DpStore for Prtl {
    fn search_and_insert(&self, suffix: &BigInt, a: &BigInt) -> Option<BigInt> {
        let index = self.bucket_index(suffix);
        let mut guard = self.buckets[index].lock();
        let bucket = &mut *guard;

        if bucket.head.is_zero() {
            self.write_record(&mut bucket.head, suffix, a);
            return None;
        }

        match self.remainder_cmp(&bucket.head, suffix) {
            Ordering::Equal => Some(self.stored_scalar(&bucket.head)),
            Ordering::Greater => {
                // incoming sorts before the head: move the head record into
                // a fresh chain node so the slot keeps the smallest key
                if !self.reserve_node() {
                    return None;
                }
                let moved = Box::new(Node {
                    packed: bucket.head.clone(),
                    next: bucket.rest.take(),
                });
                bucket.head.clear();
                self.write_record(&mut bucket.head, suffix, a);
                bucket.rest = Some(moved);
                None
            }
            Ordering::Less => self.chain_insert(&mut bucket.rest, suffix, a),
        }
    }

    fn stats(&self) -> StoreStats {
        let mut points = 0u64;
        let mut empty_slots = 0u64;
        for bucket in &self.buckets {
            let bucket = bucket.lock();
            if bucket.head.is_zero() {
                empty_slots += 1;
                continue;
            }
            points += 1;
            let mut cur = &bucket.rest;
            while let Some(node) = cur {
                points += 1;
                cur = &node.next;
            }
        }

        let bytes = self.gauge.load(MemOrder::Relaxed);
        let lost = empty_slots * self.slot_bytes;
        StoreStats {
            bytes,
            points,
            rate_of_use: (1.0 - lost as f64 / bytes as f64) * 100.0,
            rate_slots: (1.0 - empty_slots as f64 / self.buckets.len() as f64) * 100.0,
        }
    }
}
