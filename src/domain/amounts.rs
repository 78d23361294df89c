//! Token amount conversion between UI units and base units.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AmountError {
    #[error("Amount must be positive and finite, got {0}")]
    NotPositive(f64),
    #[error("Amount {amount} with {decimals} decimals overflows u64")]
    Overflow { amount: f64, decimals: u8 },
    #[error("Amount {0} is below the smallest unit")]
    BelowSmallestUnit(f64),
}

/// Convert a UI amount (e.g. 1.5 SOL) into base units (1_500_000_000 lamports).
/// The amount is first rounded to the mint's precision.
pub fn to_base_units(amount: f64, decimals: u8) -> Result<u64, AmountError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AmountError::NotPositive(amount));
    }

    let overflow = || AmountError::Overflow { amount, decimals };

    let ui = Decimal::from_f64(amount).ok_or_else(overflow)?;
    let scale = 10u64
        .checked_pow(u32::from(decimals))
        .map(Decimal::from)
        .ok_or_else(overflow)?;

    let base = ui
        .round_dp(u32::from(decimals))
        .checked_mul(scale)
        .ok_or_else(overflow)?
        .trunc()
        .to_u64()
        .ok_or_else(overflow)?;

    if base == 0 {
        return Err(AmountError::BelowSmallestUnit(amount));
    }
    Ok(base)
}

/// Convert base units back to a UI amount
pub fn to_ui_amount(base: u64, decimals: u8) -> f64 {
    base as f64 / 10f64.powi(i32::from(decimals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sol_to_lamports() {
        assert_eq!(to_base_units(1.0, 9).unwrap(), 1_000_000_000);
        assert_eq!(to_base_units(1.5, 9).unwrap(), 1_500_000_000);
        assert_eq!(to_base_units(0.1, 9).unwrap(), 100_000_000);
    }

    #[test]
    fn test_usdc_to_base_units() {
        assert_eq!(to_base_units(25.0, 6).unwrap(), 25_000_000);
        assert_eq!(to_base_units(0.3, 6).unwrap(), 300_000);
    }

    #[test]
    fn test_rejects_bad_amounts() {
        assert_eq!(to_base_units(0.0, 9), Err(AmountError::NotPositive(0.0)));
        assert!(matches!(to_base_units(-1.0, 9), Err(AmountError::NotPositive(_))));
        assert!(matches!(to_base_units(f64::NAN, 9), Err(AmountError::NotPositive(_))));
        assert!(matches!(to_base_units(f64::INFINITY, 9), Err(AmountError::NotPositive(_))));
    }

    #[test]
    fn test_below_smallest_unit() {
        assert!(matches!(
            to_base_units(0.0000001, 6),
            Err(AmountError::BelowSmallestUnit(_))
        ));
    }

    #[test]
    fn test_overflow() {
        assert!(matches!(
            to_base_units(1e30, 9),
            Err(AmountError::Overflow { .. })
        ));
    }

    #[test]
    fn test_float_noise_is_rounded_away() {
        let ui = Decimal::from_f64(0.1 + 0.2).unwrap();
        assert_eq!(ui.round_dp(6), dec!(0.3));
        assert_eq!(to_base_units(0.1 + 0.2, 6).unwrap(), 300_000);
        assert_eq!(to_base_units(2.675, 6).unwrap(), 2_675_000);
    }

    #[test]
    fn test_to_ui_amount() {
        assert_eq!(to_ui_amount(1_500_000_000, 9), 1.5);
        assert_eq!(to_ui_amount(0, 6), 0.0);
    }
}
