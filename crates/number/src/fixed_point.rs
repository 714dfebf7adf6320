//! Fixed point number type with 18 decimals, mirroring `FixedPoint.sol` from
//! the Balancer contracts. Every operation is checked and reports the same
//! error the contracts would revert with.

mod logexpmath;

use {
    super::error::Error,
    alloy_primitives::U256,
    anyhow::{Context, Result, ensure},
    std::{
        fmt::{self, Debug, Display, Formatter},
        str::FromStr,
    },
};

/// Number of decimals stored by a [`Bfp`].
pub const DECIMALS: u32 = 18;

const ONE_18: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Fixed point number stored in a type of bit size 256 that stores exactly 18
/// decimal digits.
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Bfp(U256);

impl Bfp {
    pub const fn zero() -> Self {
        Self(U256::ZERO)
    }

    pub const fn one() -> Self {
        Self(ONE_18)
    }

    /// Wraps a raw integer amount already scaled by `10^18`.
    pub const fn from_wei(num: U256) -> Self {
        Self(num)
    }

    pub const fn as_uint256(self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn add(self, other: Self) -> Result<Self, Error> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(Error::AddOverflow)
    }

    pub fn sub(self, other: Self) -> Result<Self, Error> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(Error::SubOverflow)
    }

    pub fn mul_down(self, other: Self) -> Result<Self, Error> {
        let product = self.0.checked_mul(other.0).ok_or(Error::MulOverflow)?;
        Ok(Self(product / ONE_18))
    }

    pub fn div_down(self, other: Self) -> Result<Self, Error> {
        if other.is_zero() {
            return Err(Error::ZeroDivision);
        }
        let inflated = self.0.checked_mul(ONE_18).ok_or(Error::DivInternal)?;
        Ok(Self(inflated / other.0))
    }

    /// Computes `self * numerator / denominator` on the raw values, rounding
    /// down. The intermediate product is never truncated, so
    /// `x.mul_div_down(y, y) == x` holds exactly.
    pub fn mul_div_down(self, numerator: Self, denominator: Self) -> Result<Self, Error> {
        if denominator.is_zero() {
            return Err(Error::ZeroDivision);
        }
        let product = self.0.checked_mul(numerator.0).ok_or(Error::MulOverflow)?;
        Ok(Self(product / denominator.0))
    }

    /// Like [`Bfp::mul_div_down`] but rounding up.
    pub fn mul_div_up(self, numerator: Self, denominator: Self) -> Result<Self, Error> {
        if denominator.is_zero() {
            return Err(Error::ZeroDivision);
        }
        let product = self.0.checked_mul(numerator.0).ok_or(Error::MulOverflow)?;
        let (quotient, remainder) = (product / denominator.0, product % denominator.0);
        if remainder.is_zero() {
            Ok(Self(quotient))
        } else {
            quotient
                .checked_add(U256::from(1))
                .map(Self)
                .ok_or(Error::AddOverflow)
        }
    }

    /// Returns `1 - self`, saturating at zero.
    pub fn complement(self) -> Self {
        if self.0 < ONE_18 {
            Self(ONE_18 - self.0)
        } else {
            Self::zero()
        }
    }

    /// Raises `self` to the (fractional) power `exp`.
    pub fn pow(self, exp: Self) -> Result<Self, Error> {
        logexpmath::pow(self.0, exp.0).map(Self)
    }

    /// Floors the value to `decimals` decimal digits. Values with 18 or more
    /// decimals are returned unchanged.
    pub fn truncate(self, decimals: u32) -> Self {
        if decimals >= DECIMALS {
            return self;
        }
        let unit = U256::from(10).pow(U256::from(DECIMALS - decimals));
        Self(self.0 / unit * unit)
    }
}

impl From<u64> for Bfp {
    fn from(num: u64) -> Self {
        // `u64::MAX * 10^18` always fits into 256 bits.
        Self(U256::from(num) * ONE_18)
    }
}

impl FromStr for Bfp {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (int, frac) = s.split_once('.').unwrap_or((s, ""));
        ensure!(
            !int.is_empty() && int.bytes().all(|b| b.is_ascii_digit()),
            "invalid integer part in {s:?}"
        );
        ensure!(
            frac.bytes().all(|b| b.is_ascii_digit()),
            "invalid fractional part in {s:?}"
        );
        ensure!(
            frac.len() <= DECIMALS as usize,
            "too many decimals in {s:?}"
        );
        let int = U256::from_str_radix(int, 10).context("integer part out of range")?;
        let frac = if frac.is_empty() {
            U256::ZERO
        } else {
            let padded = format!("{frac:0<width$}", width = DECIMALS as usize);
            U256::from_str_radix(&padded, 10).context("fractional part out of range")?
        };
        let raw = int
            .checked_mul(ONE_18)
            .and_then(|int| int.checked_add(frac))
            .context("fixed point number too large")?;
        Ok(Self(raw))
    }
}

impl Display for Bfp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let (int, frac) = (self.0 / ONE_18, self.0 % ONE_18);
        if frac.is_zero() {
            return write!(f, "{int}");
        }
        let frac = format!("{:0>width$}", frac.to_string(), width = DECIMALS as usize);
        write!(f, "{int}.{}", frac.trim_end_matches('0'))
    }
}

impl Debug for Bfp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing() {
        assert_eq!("1".parse::<Bfp>().unwrap(), Bfp::one());
        assert_eq!(
            "0.1".parse::<Bfp>().unwrap(),
            Bfp::from_wei(U256::from(100_000_000_000_000_000u64))
        );
        assert_eq!(
            "1.000000000000000001".parse::<Bfp>().unwrap(),
            Bfp::from_wei(U256::from(1_000_000_000_000_000_001u64))
        );
        assert_eq!("36".parse::<Bfp>().unwrap(), Bfp::from(36u64));

        assert!("".parse::<Bfp>().is_err());
        assert!(".5".parse::<Bfp>().is_err());
        assert!("1.5.0".parse::<Bfp>().is_err());
        assert!("-1".parse::<Bfp>().is_err());
        assert!("0.0000000000000000001".parse::<Bfp>().is_err());
    }

    #[test]
    fn formatting() {
        assert_eq!(bfp!("1.1").to_string(), "1.1");
        assert_eq!(bfp!("2").to_string(), "2");
        assert_eq!(bfp!("0.000000000000000001").to_string(), "0.000000000000000001");
        assert_eq!(format!("{:?}", bfp!("35.996")), "35.996");
    }

    #[test]
    fn add_sub() {
        assert_eq!(bfp!("1.5").add(bfp!("2.5")).unwrap(), bfp!("4"));
        assert_eq!(bfp!("4").sub(bfp!("2.5")).unwrap(), bfp!("1.5"));
        assert_eq!(
            Bfp::one().sub(bfp!("2")).unwrap_err().to_string(),
            "BAL#001: SubOverflow"
        );
        assert_eq!(
            Bfp::from_wei(U256::MAX).add(Bfp::one()).unwrap_err(),
            Error::AddOverflow
        );
    }

    #[test]
    fn mul_rounding() {
        let tiny = Bfp::from_wei(U256::from(1));
        assert_eq!(tiny.mul_down(bfp!("0.5")).unwrap(), Bfp::zero());
        assert_eq!(bfp!("2").mul_down(bfp!("3.5")).unwrap(), bfp!("7"));
        assert_eq!(
            Bfp::from_wei(U256::MAX).mul_down(bfp!("2")).unwrap_err(),
            Error::MulOverflow
        );
    }

    #[test]
    fn div_rounding() {
        assert_eq!(
            Bfp::one().div_down(bfp!("3")).unwrap(),
            bfp!("0.333333333333333333")
        );
        assert_eq!(
            Bfp::one().div_down(Bfp::zero()).unwrap_err().to_string(),
            "BAL#004: ZeroDivision"
        );
        assert_eq!(
            Bfp::from_wei(U256::MAX).div_down(Bfp::one()).unwrap_err(),
            Error::DivInternal
        );
    }

    #[test]
    fn mul_div_is_exact_for_equal_ratios() {
        let x = bfp!("35.996");
        let y = bfp!("4.004");
        assert_eq!(x.mul_div_down(y, y).unwrap(), x);
        assert_eq!(
            bfp!("1").mul_div_down(bfp!("11000"), bfp!("10000")).unwrap(),
            bfp!("1.1")
        );
        assert_eq!(
            Bfp::one().mul_div_up(bfp!("1"), bfp!("3")).unwrap(),
            bfp!("0.333333333333333334")
        );
        assert_eq!(
            Bfp::one().mul_div_down(Bfp::one(), Bfp::zero()).unwrap_err(),
            Error::ZeroDivision
        );
    }

    #[test]
    fn complement() {
        assert_eq!(bfp!("0.9").complement(), bfp!("0.1"));
        assert_eq!(bfp!("1").complement(), Bfp::zero());
        assert_eq!(bfp!("1.5").complement(), Bfp::zero());
    }

    #[test]
    fn truncation_floors() {
        assert_eq!(bfp!("0.899969581").truncate(4), bfp!("0.8999"));
        assert_eq!(bfp!("0.99999").truncate(0), Bfp::zero());
        assert_eq!(bfp!("1.23").truncate(18), bfp!("1.23"));
        assert_eq!(bfp!("1.23").truncate(30), bfp!("1.23"));
    }

    #[test]
    fn pow() {
        assert_eq!(bfp!("2").pow(bfp!("2")).unwrap(), bfp!("3.999999999999999996"));
        assert_eq!(bfp!("3").pow(Bfp::zero()).unwrap(), Bfp::one());
    }
}
