//! Weight scheduling and price stability engine for Balancer smart pools.
//!
//! A [`SmartPool`] controls an underlying [`Ledger`] the way a configurable
//! rights pool controls its Balancer pool: it changes weights one token at a
//! time or gradually over a block range, and elastic supply pools absorb
//! rebases by resynchronizing weights without moving the spot price.

pub mod constants;
pub mod curve;
pub mod error;
pub mod ledger;
pub mod math;
pub mod pool;
pub mod rights;
pub mod schedule;
pub mod wallet;

pub use self::{
    curve::ExponentialCurve,
    error::{Asset, Error},
    ledger::{Ledger, MemoryLedger, Record, Resync},
    math::Transfer,
    pool::{PoolParams, ShareChange, SmartPool, WeightChange},
    rights::{Capabilities, Operation, PoolKind, Rights},
    schedule::GradualUpdate,
    wallet::Wallet,
};

/// Tokens are identified by their contract address.
pub type TokenId = alloy_primitives::Address;
