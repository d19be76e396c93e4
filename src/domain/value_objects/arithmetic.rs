//! # Checked Arithmetic
//!
//! Safe decimal arithmetic and fixed-point conversion for on-chain amounts.
//!
//! This module provides:
//! - [`ArithmeticError`] - Error type for arithmetic failures
//! - [`CheckedArithmetic`] - Trait for safe arithmetic operations
//! - [`fixed_to_decimal`] - Conversion from on-chain fixed-point integers
//! - [`parse_amount`] - Conversion from user-entered decimals to on-chain integers
//!
//! On-chain token amounts are integers with [`TOKEN_DECIMALS`] implied decimal
//! places. APY values are integers in hundredths of a percent
//! ([`APY_DECIMALS`]). All display-level arithmetic happens after conversion
//! to [`Decimal`].
//!
//! # Examples
//!
//! ```
//! use vault_client::domain::value_objects::arithmetic::{TOKEN_DECIMALS, fixed_to_decimal};
//! use ethers::types::U256;
//! use rust_decimal::Decimal;
//!
//! let one_and_a_half = U256::from(1_500_000_000_000_000_000u128);
//! let value = fixed_to_decimal(one_and_a_half, TOKEN_DECIMALS).unwrap();
//! assert_eq!(value, Decimal::new(15, 1));
//! ```

use ethers::types::U256;
use rust_decimal::Decimal;
use thiserror::Error;

/// Implied decimal places of the vault token.
pub const TOKEN_DECIMALS: u32 = 18;

/// Implied decimal places of on-chain APY values (raw / 100 = percent).
pub const APY_DECIMALS: u32 = 2;

/// Largest mantissa a [`Decimal`] can hold (2^96 - 1).
const MAX_DECIMAL_MANTISSA: u128 = u128::MAX >> 32;

/// Error type for arithmetic operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ArithmeticError {
    /// Arithmetic operation resulted in overflow.
    #[error("arithmetic overflow")]
    Overflow,

    /// Division by zero attempted.
    #[error("division by zero")]
    DivisionByZero,

    /// Invalid value provided (e.g., negative when positive required).
    #[error("invalid value: {0}")]
    InvalidValue(&'static str),
}

/// Result type for arithmetic operations.
pub type ArithmeticResult<T> = Result<T, ArithmeticError>;

/// Trait for checked arithmetic operations.
///
/// Provides safe arithmetic methods that return `Result` instead of
/// panicking on overflow or division by zero.
pub trait CheckedArithmetic: Sized {
    /// Safely add two values.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Overflow` if the result would overflow.
    fn safe_add(self, rhs: Self) -> ArithmeticResult<Self>;

    /// Safely multiply two values.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Overflow` if the result would overflow.
    fn safe_mul(self, rhs: Self) -> ArithmeticResult<Self>;

    /// Safely divide two values.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::DivisionByZero` if the divisor is zero.
    fn safe_div(self, rhs: Self) -> ArithmeticResult<Self>;

    /// Divides, yielding zero when the divisor is zero.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Overflow` if the quotient would overflow.
    fn div_or_zero(self, rhs: Self) -> ArithmeticResult<Self>;
}

impl CheckedArithmetic for Decimal {
    #[inline]
    fn safe_add(self, rhs: Self) -> ArithmeticResult<Self> {
        self.checked_add(rhs).ok_or(ArithmeticError::Overflow)
    }

    #[inline]
    fn safe_mul(self, rhs: Self) -> ArithmeticResult<Self> {
        self.checked_mul(rhs).ok_or(ArithmeticError::Overflow)
    }

    #[inline]
    fn safe_div(self, rhs: Self) -> ArithmeticResult<Self> {
        if rhs.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        self.checked_div(rhs).ok_or(ArithmeticError::Overflow)
    }

    #[inline]
    fn div_or_zero(self, rhs: Self) -> ArithmeticResult<Self> {
        if rhs.is_zero() {
            return Ok(Decimal::ZERO);
        }
        self.safe_div(rhs)
    }
}

/// Converts an on-chain fixed-point integer into a [`Decimal`].
///
/// Values whose mantissa does not fit a `Decimal` lose trailing fractional
/// digits until they fit.
///
/// # Errors
///
/// Returns `ArithmeticError::Overflow` if the integer part alone does not fit.
pub fn fixed_to_decimal(raw: U256, decimals: u32) -> ArithmeticResult<Decimal> {
    let max = U256::from(MAX_DECIMAL_MANTISSA);
    let ten = U256::from(10u8);
    let mut value = raw;
    let mut scale = decimals;

    while value > max {
        if scale == 0 {
            return Err(ArithmeticError::Overflow);
        }
        value /= ten;
        scale -= 1;
    }

    let mantissa = i128::try_from(value.low_u128()).map_err(|_| ArithmeticError::Overflow)?;
    Decimal::try_from_i128_with_scale(mantissa, scale).map_err(|_| ArithmeticError::Overflow)
}

/// Converts a user-entered token amount (e.g. `"12.5"`) into its on-chain
/// integer representation with [`TOKEN_DECIMALS`] decimals.
///
/// # Errors
///
/// Returns `ArithmeticError::InvalidValue` if the input is empty, negative,
/// or not a decimal number with at most [`TOKEN_DECIMALS`] fractional digits.
pub fn parse_amount(input: &str) -> ArithmeticResult<U256> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ArithmeticError::InvalidValue("amount is empty"));
    }
    if trimmed.starts_with('-') {
        return Err(ArithmeticError::InvalidValue("amount must not be negative"));
    }

    ethers::utils::parse_units(trimmed, TOKEN_DECIMALS)
        .map(U256::from)
        .map_err(|_| ArithmeticError::InvalidValue("amount is not a valid decimal number"))
}
