//! Error kinds and their exit codes.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Driver-level result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop a run before or during an experiment.
///
/// Parameter and corpus problems abort the process before any compute;
/// verification failures and result mismatches are handled inline by the
/// engine and the driver and never surface here.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested curve size has no corpus record.
    #[error(
        "no example curve of {0} bits is available; \
         choose a multiple of 5 in 35..=115"
    )]
    UnsupportedBitSize(u32),

    /// Worker count outside the supported interval.
    #[error("can not use {0} threads; choose a value in the [1;2000] interval")]
    ThreadCount(usize),

    /// Non-positive repetition count.
    #[error("invalid number of runs: {0}")]
    Runs(usize),

    /// More distinguishing zeros than x-coordinate bits.
    #[error(
        "the number of trailing zero bits ({trailing_bits}) can not be greater \
         than the number of bits of the x-coordinate ({nb_bits})"
    )]
    TrailingBits {
        /// Requested distinguishing-zero count.
        trailing_bits: u32,
        /// Curve bit size.
        nb_bits: u32,
    },

    /// PRTL prefix longer than the stored word.
    #[error("the level (prefix) can not be greater than the length of a stored word: {word_len}")]
    Level {
        /// Requested level.
        level: u8,
        /// `nb_bits − trailing_bits`.
        word_len: u32,
    },

    /// Non-positive collision target.
    #[error("invalid number of collisions: {0}")]
    Collisions(u32),

    /// File-system failure on a corpus or results path.
    #[error("can not access {path}: {source}")]
    Io {
        /// The offending path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A fixed-width record did not parse or validate.
    #[error("malformed record in {path}: {reason}")]
    MalformedRecord {
        /// The corpus file.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },
}

impl Error {
    /// Process exit code: 1 for every input/IO failure. Code 2 stays
    /// reserved for an incorrect recovered scalar, which is currently only
    /// logged.
    pub fn exit_code(&self) -> u8 {
        1
    }
}
