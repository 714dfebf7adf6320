use {
    crate::{TokenId, rights::Operation},
    number::Bfp,
};

/// Errors returned by the pool engine. Every failing operation leaves the
/// pool state untouched.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("operation {0} is not supported by this pool")]
    CapabilityDenied(Operation),
    #[error("end block {end} is before start block {start}")]
    InvalidRange { start: u64, end: u64 },
    #[error("block {block} is before the last seen block {last}")]
    StaleBlock { block: u64, last: u64 },
    #[error("no gradual weight update was scheduled")]
    NoActiveSchedule,
    #[error("balance of token {0} did not change since it was last recorded")]
    StaleResync(TokenId),
    #[error("weight update period of {actual} blocks is below the minimum of {minimum}")]
    WeightChangeTooFast { actual: u64, minimum: u64 },
    #[error("weights can not be updated manually while a gradual update is pending")]
    GradualUpdateInProgress,
    #[error("weight {0} is out of bounds")]
    WeightOutOfBounds(Bfp),
    #[error("total weight {0} exceeds the maximum")]
    MaxTotalWeight(Bfp),
    #[error("balance of token {0} would drop below the minimum")]
    MinBalance(TokenId),
    #[error("controller does not own {required} of {asset}")]
    InsufficientFunds { asset: Asset, required: Bfp },
    #[error("pool share supply would exceed the cap of {0}")]
    CapExceeded(Bfp),
    #[error("swap fee {0} is out of bounds")]
    SwapFeeOutOfBounds(Bfp),
    #[error("initial supply {0} is out of bounds")]
    InvalidSupply(Bfp),
    #[error("add token time lock must not exceed the minimum weight change period")]
    InconsistentTimeLock,
    #[error("expected {expected} entries but got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("pools hold between {min} and {max} tokens, got {actual}")]
    AssetLimit { min: usize, max: usize, actual: usize },
    #[error("token {0} is not part of the pool")]
    UnknownToken(TokenId),
    #[error("token {0} is listed more than once")]
    DuplicateToken(TokenId),
    #[error("the pool has not been created yet")]
    PoolNotCreated,
    #[error("the pool has already been created")]
    PoolAlreadyCreated,
    #[error("invalid curve parameters: {0}")]
    InvalidCurve(&'static str),
    #[error(transparent)]
    Math(#[from] number::Error),
}

/// An asset held by the pool controller.
#[derive(Clone, Copy, Debug, Eq, PartialEq, derive_more::Display)]
pub enum Asset {
    #[display("token {_0}")]
    Token(TokenId),
    #[display("pool shares")]
    PoolShares,
}
