//! Fixed point arithmetic emulating the math found in the Balancer smart
//! pool contracts. All amounts and weights handled by the pool engine are
//! [`Bfp`] values: 256-bit unsigned integers with exactly 18 decimals.

/// Parses a decimal literal into a [`Bfp`], panicking on invalid input.
///
/// Meant for tests and constants only.
#[macro_export]
macro_rules! bfp {
    ($val:literal) => {
        ($val).parse::<$crate::Bfp>().unwrap()
    };
}

pub mod error;
pub mod fixed_point;

pub use self::{error::Error, fixed_point::Bfp};
