//! The ledger is the pool contract holding the tokens: it records a balance
//! and a denormalized weight per bound token and prices swaps from them. It
//! is the single source of truth for pool state; nothing in this crate
//! caches ledger values across calls.

mod memory;

pub use self::memory::MemoryLedger;
use {
    crate::{
        TokenId,
        error::Error,
        math::{self, Transfer},
    },
    number::Bfp,
};

/// What the ledger records for a bound token.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Record {
    /// Balance used for pricing. It only changes through `bind`, `rebind`
    /// and `gulp`.
    pub balance: Bfp,
    /// Denormalized weight.
    pub weight: Bfp,
}

/// Outcome of resynchronizing a token's weight with its held balance.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Resync {
    pub token: TokenId,
    pub before: Record,
    pub after: Record,
}

pub trait Ledger {
    /// Bound tokens in binding order.
    fn tokens(&self) -> Vec<TokenId>;

    fn record(&self, token: TokenId) -> Result<Record, Error>;

    /// Amount of `token` the pool actually owns. This differs from the
    /// recorded balance after transfers that bypassed the pool.
    fn holdings(&self, token: TokenId) -> Result<Bfp, Error>;

    fn swap_fee(&self) -> Bfp;

    fn public_swap(&self) -> bool;

    /// Adds a token, pulling `record.balance` into the pool.
    fn bind(&mut self, token: TokenId, record: Record) -> Result<(), Error>;

    /// Overwrites a token's record. The difference between the new and the
    /// recorded balance is pulled into or pushed out of the pool.
    fn rebind(&mut self, token: TokenId, record: Record) -> Result<Transfer, Error>;

    /// Sets the recorded balance of `token` to its holdings without moving
    /// any tokens.
    fn gulp(&mut self, token: TokenId) -> Result<(), Error>;

    fn set_swap_fee(&mut self, swap_fee: Bfp) -> Result<(), Error>;

    fn set_public_swap(&mut self, public: bool);

    fn balance(&self, token: TokenId) -> Result<Bfp, Error> {
        Ok(self.record(token)?.balance)
    }

    fn weight(&self, token: TokenId) -> Result<Bfp, Error> {
        Ok(self.record(token)?.weight)
    }

    /// Sum of all denormalized weights.
    fn total_weight(&self) -> Result<Bfp, Error> {
        let weights = self
            .tokens()
            .into_iter()
            .map(|token| self.weight(token))
            .collect::<Result<Vec<_>, _>>()?;
        math::total(weights)
    }

    fn normalized_weight(&self, token: TokenId) -> Result<Bfp, Error> {
        Ok(self.weight(token)?.div_down(self.total_weight()?)?)
    }

    /// Price of `token_out` in units of `token_in`, including the swap fee.
    fn spot_price(&self, token_in: TokenId, token_out: TokenId) -> Result<Bfp, Error> {
        let (token_in, token_out) = (self.record(token_in)?, self.record(token_out)?);
        math::spot_price(
            token_in.balance,
            token_in.weight,
            token_out.balance,
            token_out.weight,
            self.swap_fee(),
        )
    }

    fn spot_price_sans_fee(&self, token_in: TokenId, token_out: TokenId) -> Result<Bfp, Error> {
        let (token_in, token_out) = (self.record(token_in)?, self.record(token_out)?);
        math::spot_price_sans_fee(
            token_in.balance,
            token_in.weight,
            token_out.balance,
            token_out.weight,
        )
    }

    /// Changes the weight of `token`, moving tokens so that its balance
    /// scales with the weight.
    fn apply_weight_change(&mut self, token: TokenId, weight: Bfp) -> Result<Transfer, Error> {
        let record = self.record(token)?;
        let (balance, _) = math::rebalance(record.balance, record.weight, weight)?;
        self.rebind(token, Record { balance, weight })
    }

    /// Absorbs an out-of-band balance change of `token` by scaling its weight
    /// with the balance, which leaves every spot price involving `token`
    /// unchanged. No tokens are moved.
    fn apply_resync(&mut self, token: TokenId) -> Result<Resync, Error> {
        let before = self.record(token)?;
        let held = self.holdings(token)?;
        if held == before.balance {
            return Err(Error::StaleResync(token));
        }

        let weight = math::resynced_weight(before.weight, before.balance, held)?;
        math::ensure_weight(weight)?;
        math::ensure_balance(token, held)?;
        math::ensure_total_weight(self.total_weight()?.sub(before.weight)?.add(weight)?)?;

        self.gulp(token)?;
        let after = Record {
            balance: held,
            weight,
        };
        let transfer = self.rebind(token, after)?;
        debug_assert_eq!(transfer, Transfer::None);
        Ok(Resync {
            token,
            before,
            after,
        })
    }
}
