//! Simulates a liquidity bootstrapping presale on an in-memory smart pool.

mod cli;
pub mod config;
mod run;

pub use self::run::{Report, run, start};
