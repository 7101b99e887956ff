#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]
#![doc = include_str!("../README.md")]

pub mod corpus;
pub mod engine;
pub mod error;
pub mod results;
pub mod walk;

pub use crate::{
    engine::{PcsContext, PcsParams},
    error::Error,
};
