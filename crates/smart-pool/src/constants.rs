//! Bounds enforced by the Balancer pools and the configurable rights pool
//! controller. Amounts are denominated in whole tokens with 18 decimals.

use {alloy_primitives::U256, number::Bfp};

const fn wei(amount: u64) -> Bfp {
    Bfp::from_wei(U256::from_limbs([amount, 0, 0, 0]))
}

const fn tokens(amount: u64) -> Bfp {
    let raw = amount as u128 * 1_000_000_000_000_000_000;
    Bfp::from_wei(U256::from_limbs([raw as u64, (raw >> 64) as u64, 0, 0]))
}

pub const MIN_WEIGHT: Bfp = tokens(1);
pub const MAX_WEIGHT: Bfp = tokens(50);
pub const MAX_TOTAL_WEIGHT: Bfp = tokens(50);

/// `10^-12` tokens.
pub const MIN_BALANCE: Bfp = wei(1_000_000);

/// 0.0001%.
pub const MIN_FEE: Bfp = wei(1_000_000_000_000);
/// 10%.
pub const MAX_FEE: Bfp = wei(100_000_000_000_000_000);

pub const MIN_ASSET_LIMIT: usize = 2;
pub const MAX_ASSET_LIMIT: usize = 8;

pub const MIN_POOL_SUPPLY: Bfp = tokens(100);
pub const MAX_POOL_SUPPLY: Bfp = tokens(1_000_000_000);

pub const DEFAULT_MIN_WEIGHT_CHANGE_BLOCK_PERIOD: u64 = 90;
pub const DEFAULT_ADD_TOKEN_TIME_LOCK_IN_BLOCKS: u64 = 90;
