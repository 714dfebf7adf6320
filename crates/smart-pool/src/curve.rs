//! Exponential weight curve for liquidity bootstrapping presales.
//!
//! The share of the selling token decays as
//!
//! ```text
//! pct(i) = initial_pct * base^(-i / (period * steepness))
//! ```
//!
//! where `i` is the number of elapsed steps (blocks). Higher steepness
//! values flatten the curve. The evaluator is pure: it never reads a clock,
//! so the same inputs always yield bit for bit identical weights.

use {
    crate::{error::Error, math},
    number::Bfp,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ExponentialCurve {
    initial_pct: Bfp,
    steepness: Bfp,
    base: Bfp,
    period: u64,
    precision: u32,
}

impl ExponentialCurve {
    pub fn new(
        initial_pct: Bfp,
        steepness: Bfp,
        base: Bfp,
        period: u64,
        precision: u32,
    ) -> Result<Self, Error> {
        if initial_pct > Bfp::one() {
            return Err(Error::InvalidCurve("initial percentage exceeds 100%"));
        }
        if steepness.is_zero() {
            return Err(Error::InvalidCurve("steepness must be positive"));
        }
        if base <= Bfp::one() {
            return Err(Error::InvalidCurve("base must be greater than one"));
        }
        if period == 0 {
            return Err(Error::InvalidCurve("period must be positive"));
        }
        if precision > number::fixed_point::DECIMALS {
            return Err(Error::InvalidCurve("precision exceeds 18 decimals"));
        }
        Ok(Self {
            initial_pct,
            steepness,
            base,
            period,
            precision,
        })
    }

    pub fn initial_pct(&self) -> Bfp {
        self.initial_pct
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Share of the selling token after `step` steps, before truncation.
    pub fn exact_percentage(&self, step: u64) -> Result<Bfp, Error> {
        if step == 0 {
            return Ok(self.initial_pct);
        }
        let scale = Bfp::from(self.period).mul_down(self.steepness)?;
        let exponent = Bfp::from(step).div_down(scale)?;
        let divisor = match self.base.pow(exponent) {
            Ok(divisor) => divisor,
            // The base is greater than one and the exponent positive, so the
            // only way out of the supported range is a power above e^130.
            // The percentage is then far below the smallest representable
            // value.
            Err(number::Error::YOutOfBounds | number::Error::ProductOutOfBounds) => {
                return Ok(Bfp::zero());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(self.initial_pct.div_down(divisor)?)
    }

    /// Share of the selling token after `step` steps, floored to the curve's
    /// precision. Flooring biases the share towards zero at every step.
    pub fn percentage(&self, step: u64) -> Result<Bfp, Error> {
        Ok(self.exact_percentage(step)?.truncate(self.precision))
    }

    /// Target denormalized weights after `step` steps.
    ///
    /// The total of `current` is preserved: the selling token receives
    /// `percentage(step)` of it and the rest is split between the other
    /// tokens in proportion to their current weights. With two tokens the
    /// other token simply receives the complement.
    pub fn weights(&self, step: u64, current: &[Bfp], selling: usize) -> Result<Vec<Bfp>, Error> {
        if current.len() < 2 {
            return Err(Error::InvalidCurve("at least two tokens are required"));
        }
        let selling_weight = *current
            .get(selling)
            .ok_or(Error::InvalidCurve("selling token index out of range"))?;

        let total = math::total(current.iter().copied())?;
        let target = total.mul_down(self.percentage(step)?)?;
        let remaining = total.sub(target)?;
        let others = total.sub(selling_weight)?;

        current
            .iter()
            .enumerate()
            .map(|(i, weight)| {
                if i == selling {
                    Ok(target)
                } else {
                    Ok(weight.mul_div_down(remaining, others)?)
                }
            })
            .collect()
    }
}
