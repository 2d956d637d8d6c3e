use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::MortgageError;
use crate::types::{Money, Rate};
use crate::MortgageResult;

/// Compound growth factor `(1 + rate)^nper`.
pub fn growth_factor(rate: Rate, nper: u32) -> MortgageResult<Decimal> {
    (Decimal::ONE + rate)
        .checked_powi(i64::from(nper))
        .ok_or_else(|| MortgageError::InvalidInput {
            field: "rate".into(),
            reason: format!("Growth factor overflows over {nper} periods"),
        })
}

/// Level payment that retires `principal` over `nper` periods at `rate` per period.
///
/// Returned as a positive amount (the borrower's outflow). A zero rate falls
/// back to straight-line repayment `principal / nper`.
pub fn annuity_payment(rate: Rate, nper: u32, principal: Money) -> MortgageResult<Money> {
    if nper == 0 {
        return Err(MortgageError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }
    if rate < Decimal::ZERO {
        return Err(MortgageError::InvalidInput {
            field: "rate".into(),
            reason: "Periodic rate cannot be negative".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    let factor = growth_factor(rate, nper)?;
    let denominator = factor - Decimal::ONE;

    if denominator.is_zero() {
        return Err(MortgageError::DivisionByZero {
            context: "annuity payment denominator".into(),
        });
    }

    rate.checked_mul(factor)
        .and_then(|v| v.checked_div(denominator))
        .and_then(|per_unit| principal.checked_mul(per_unit))
        .ok_or_else(|| MortgageError::InvalidInput {
            field: "principal".into(),
            reason: "Payment overflows the decimal range".into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn approx_eq(a: Decimal, b: Decimal, tol: Decimal) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_annuity_payment_basic() {
        // 100k over 12 months at 1% per month ≈ 8,884.88
        let result = annuity_payment(dec!(0.01), 12, dec!(100_000)).unwrap();
        assert!(approx_eq(result, dec!(8884.88), dec!(0.01)));
    }

    #[test]
    fn test_annuity_payment_reference_mortgage() {
        // 2.4M over 240 months at 0.5% per month
        let result = annuity_payment(dec!(0.005), 240, dec!(2_400_000)).unwrap();
        assert!(approx_eq(result, dec!(17194.3454), dec!(0.0001)));
    }

    #[test]
    fn test_annuity_payment_zero_rate_is_straight_line() {
        let result = annuity_payment(dec!(0), 240, dec!(2_400_000)).unwrap();
        assert_eq!(result, dec!(10_000));
    }

    #[test]
    fn test_annuity_payment_rejects_zero_periods() {
        assert!(annuity_payment(dec!(0.005), 0, dec!(1000)).is_err());
    }

    #[test]
    fn test_annuity_payment_rejects_negative_rate() {
        assert!(annuity_payment(dec!(-0.01), 12, dec!(1000)).is_err());
    }

    #[test]
    fn test_growth_factor_one_period() {
        assert_eq!(growth_factor(dec!(0.005), 1).unwrap(), dec!(1.005));
    }
}
