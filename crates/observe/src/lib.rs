//! This crate contains the code required to observe the pool engine and the
//! binaries built on top of it: logging initialization and helpers.
pub mod tracing;
