//! Arithmetic behind weight changes and resyncs, plus the bound checks the
//! underlying pool enforces.
//!
//! Rounding always favours the pool: tokens leaving the pool and pool shares
//! minted to the controller round down, tokens entering the pool and pool
//! shares burned from the controller round up.

use {
    crate::{TokenId, constants::*, error::Error},
    number::Bfp,
};

/// Tokens moved between the controller and the pool by a weight change.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Transfer {
    None,
    /// Tokens pulled from the controller into the pool.
    Deposit(Bfp),
    /// Tokens pushed from the pool to the controller.
    Withdrawal(Bfp),
}

/// Computes the balance of a token whose weight moves from `old_weight` to
/// `new_weight`. The balance is scaled by `new_weight / old_weight`, which
/// keeps the balance to weight ratio, and therefore the spot price against
/// every other token, unchanged.
pub fn rebalance(
    balance: Bfp,
    old_weight: Bfp,
    new_weight: Bfp,
) -> Result<(Bfp, Transfer), Error> {
    if new_weight < old_weight {
        let delta = balance.mul_div_down(old_weight.sub(new_weight)?, old_weight)?;
        Ok((balance.sub(delta)?, Transfer::Withdrawal(delta)))
    } else if new_weight > old_weight {
        let delta = balance.mul_div_up(new_weight.sub(old_weight)?, old_weight)?;
        Ok((balance.add(delta)?, Transfer::Deposit(delta)))
    } else {
        Ok((balance, Transfer::None))
    }
}

/// Pool shares minted for a weight increase of `delta_weight`:
/// `total_supply * delta_weight / total_weight`.
pub fn shares_to_mint(
    total_supply: Bfp,
    delta_weight: Bfp,
    total_weight: Bfp,
) -> Result<Bfp, Error> {
    Ok(total_supply.mul_div_down(delta_weight, total_weight)?)
}

/// Pool shares burned for a weight decrease of `delta_weight`.
pub fn shares_to_burn(
    total_supply: Bfp,
    delta_weight: Bfp,
    total_weight: Bfp,
) -> Result<Bfp, Error> {
    Ok(total_supply.mul_div_up(delta_weight, total_weight)?)
}

/// Weight that keeps the spot price of a token constant after its balance
/// moved from `recorded` to `held` without the pool being involved.
pub fn resynced_weight(weight: Bfp, recorded: Bfp, held: Bfp) -> Result<Bfp, Error> {
    Ok(weight.mul_div_down(held, recorded)?)
}

/// Spot price of `token_out` denominated in `token_in`, ignoring fees:
/// `(balance_in / weight_in) / (balance_out / weight_out)`.
pub fn spot_price_sans_fee(
    balance_in: Bfp,
    weight_in: Bfp,
    balance_out: Bfp,
    weight_out: Bfp,
) -> Result<Bfp, Error> {
    let numer = balance_in.div_down(weight_in)?;
    let denom = balance_out.div_down(weight_out)?;
    Ok(numer.div_down(denom)?)
}

/// Spot price including the swap fee: the fee free price scaled by
/// `1 / (1 - swap_fee)`.
pub fn spot_price(
    balance_in: Bfp,
    weight_in: Bfp,
    balance_out: Bfp,
    weight_out: Bfp,
    swap_fee: Bfp,
) -> Result<Bfp, Error> {
    let ratio = spot_price_sans_fee(balance_in, weight_in, balance_out, weight_out)?;
    let scale = Bfp::one().div_down(swap_fee.complement())?;
    Ok(ratio.mul_down(scale)?)
}

pub fn ensure_weight(weight: Bfp) -> Result<(), Error> {
    if (MIN_WEIGHT..=MAX_WEIGHT).contains(&weight) {
        Ok(())
    } else {
        Err(Error::WeightOutOfBounds(weight))
    }
}

pub fn ensure_total_weight(total_weight: Bfp) -> Result<(), Error> {
    if total_weight <= MAX_TOTAL_WEIGHT {
        Ok(())
    } else {
        Err(Error::MaxTotalWeight(total_weight))
    }
}

pub fn ensure_balance(token: TokenId, balance: Bfp) -> Result<(), Error> {
    if balance >= MIN_BALANCE {
        Ok(())
    } else {
        Err(Error::MinBalance(token))
    }
}

pub fn ensure_swap_fee(swap_fee: Bfp) -> Result<(), Error> {
    if (MIN_FEE..=MAX_FEE).contains(&swap_fee) {
        Ok(())
    } else {
        Err(Error::SwapFeeOutOfBounds(swap_fee))
    }
}

/// Sums a list of weights.
pub fn total(weights: impl IntoIterator<Item = Bfp>) -> Result<Bfp, Error> {
    weights
        .into_iter()
        .try_fold(Bfp::zero(), |total, weight| total.add(weight))
        .map_err(Error::from)
}
