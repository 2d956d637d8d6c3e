//! Validated calculator inputs.
//!
//! The down-payment percentage is the source of truth; the absolute amount
//! is always derived from it, so the two can never drift apart. Every setter
//! either clamps into range or rejects the value and keeps the previous one.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::calculator::engine::PaymentInput;
use crate::error::MortgageError;
use crate::types::{round_money, Money, Rate};
use crate::MortgageResult;

pub const MIN_DOWN_PAYMENT_PERCENT: u32 = 10;
pub const MAX_DOWN_PAYMENT_PERCENT: u32 = 90;
pub const DOWN_PAYMENT_SLIDER_STEP: u32 = 5;

pub const MIN_TERM_YEARS: u32 = 1;
pub const MAX_TERM_YEARS: u32 = 30;

pub const HOME_PRICE_SLIDER_MIN: Money = dec!(1_000_000);
pub const HOME_PRICE_SLIDER_MAX: Money = dec!(15_000_000);
pub const HOME_PRICE_SLIDER_STEP: Money = dec!(100_000);

pub const DEFAULT_HOME_PRICE: Money = dec!(3_000_000);
pub const DEFAULT_DOWN_PAYMENT_PERCENT: u32 = 20;
pub const DEFAULT_TERM_YEARS: u32 = 20;

/// Deserialisation goes through [`LoanInputs::new`], so stored values are
/// always clamped and validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLoanInputs")]
pub struct LoanInputs {
    home_price: Money,
    down_payment_percent: u32,
    term_years: u32,
}

#[derive(Deserialize)]
struct RawLoanInputs {
    home_price: Money,
    down_payment_percent: i64,
    term_years: i64,
}

impl TryFrom<RawLoanInputs> for LoanInputs {
    type Error = MortgageError;

    fn try_from(raw: RawLoanInputs) -> MortgageResult<Self> {
        Self::new(raw.home_price, raw.down_payment_percent, raw.term_years)
    }
}

impl Default for LoanInputs {
    fn default() -> Self {
        Self {
            home_price: DEFAULT_HOME_PRICE,
            down_payment_percent: DEFAULT_DOWN_PAYMENT_PERCENT,
            term_years: DEFAULT_TERM_YEARS,
        }
    }
}

impl LoanInputs {
    /// Build inputs from raw values, clamping percent and term and rejecting
    /// a non-positive price.
    pub fn new(home_price: Money, down_payment_percent: i64, term_years: i64) -> MortgageResult<Self> {
        let mut inputs = Self::default();
        inputs.set_home_price(home_price)?;
        inputs.set_percent(down_payment_percent);
        inputs.set_term_years(term_years);
        Ok(inputs)
    }

    pub fn home_price(&self) -> Money {
        self.home_price
    }

    pub fn down_payment_percent(&self) -> u32 {
        self.down_payment_percent
    }

    pub fn term_years(&self) -> u32 {
        self.term_years
    }

    /// `round(home_price × percent / 100)`.
    pub fn down_payment_amount(&self) -> Money {
        round_money(self.home_price * Decimal::from(self.down_payment_percent) / dec!(100))
    }

    /// Clamp `percent` into the allowed range and store it. Returns the stored value.
    pub fn set_percent(&mut self, percent: i64) -> u32 {
        self.down_payment_percent = clamp_percent(percent);
        self.down_payment_percent
    }

    /// Derive the percentage from an absolute down-payment amount.
    ///
    /// The implied percentage is rounded and clamped, so the resulting amount
    /// snaps back into range when the input implied less than 10% or more
    /// than 90%. Negative amounts are rejected.
    pub fn set_amount(&mut self, amount: Money) -> MortgageResult<u32> {
        if amount < Decimal::ZERO {
            return Err(MortgageError::invalid(
                "down_payment_amount",
                "Down payment cannot be negative",
            ));
        }
        // A ratio too large to represent is far above the maximum anyway.
        let implied = amount
            .checked_div(self.home_price)
            .and_then(|ratio| ratio.checked_mul(dec!(100)))
            .map(round_money)
            .unwrap_or(Decimal::MAX);
        let clamped = implied.clamp(
            Decimal::from(MIN_DOWN_PAYMENT_PERCENT),
            Decimal::from(MAX_DOWN_PAYMENT_PERCENT),
        );
        self.down_payment_percent = clamped.to_u32().unwrap_or(MIN_DOWN_PAYMENT_PERCENT);
        Ok(self.down_payment_percent)
    }

    /// Store a new price in whole rubles; the percentage is kept and the
    /// amount re-derived.
    pub fn set_home_price(&mut self, home_price: Money) -> MortgageResult<()> {
        if home_price <= Decimal::ZERO {
            return Err(MortgageError::invalid("home_price", "Home price must be positive"));
        }
        if !home_price.fract().is_zero() {
            return Err(MortgageError::invalid(
                "home_price",
                "Home price must be a whole number of rubles",
            ));
        }
        if home_price.checked_mul(dec!(100)).is_none() {
            return Err(MortgageError::invalid("home_price", "Home price is too large"));
        }
        // Drop any zero fraction so "2 000 000,00" stores and prints as 2000000.
        self.home_price = home_price.trunc();
        Ok(())
    }

    /// Clamp the term into `[1, 30]` years. Returns the stored value.
    pub fn set_term_years(&mut self, term_years: i64) -> u32 {
        let clamped = term_years.clamp(i64::from(MIN_TERM_YEARS), i64::from(MAX_TERM_YEARS));
        self.term_years = u32::try_from(clamped).unwrap_or(MIN_TERM_YEARS);
        self.term_years
    }

    pub fn parse_home_price(&mut self, text: &str) -> MortgageResult<()> {
        let value = parse_number("home_price", text)?;
        self.set_home_price(value)
    }

    pub fn parse_amount(&mut self, text: &str) -> MortgageResult<u32> {
        let value = parse_number("down_payment_amount", text)?;
        self.set_amount(value)
    }

    pub fn parse_percent(&mut self, text: &str) -> MortgageResult<u32> {
        let value = parse_whole("down_payment_percent", text)?;
        Ok(self.set_percent(value))
    }

    pub fn parse_term_years(&mut self, text: &str) -> MortgageResult<u32> {
        let value = parse_whole("term_years", text)?;
        Ok(self.set_term_years(value))
    }

    pub fn to_payment_input(&self, annual_rate: Rate) -> PaymentInput {
        PaymentInput {
            home_price: self.home_price,
            down_payment_percent: Decimal::from(self.down_payment_percent),
            term_years: self.term_years,
            annual_rate,
        }
    }
}

fn clamp_percent(percent: i64) -> u32 {
    let clamped = percent.clamp(
        i64::from(MIN_DOWN_PAYMENT_PERCENT),
        i64::from(MAX_DOWN_PAYMENT_PERCENT),
    );
    u32::try_from(clamped).unwrap_or(MIN_DOWN_PAYMENT_PERCENT)
}

/// Parse user-entered text as a number. Grouping spaces (including the
/// non-breaking ones produced by locale formatting) and underscores are
/// ignored, a comma is accepted as the decimal separator.
pub fn parse_number(field: &str, text: &str) -> MortgageResult<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '\u{202f}' && *c != '_')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() {
        return Err(MortgageError::invalid(field, "Value is empty"));
    }

    Decimal::from_str(&cleaned)
        .map_err(|_| MortgageError::invalid(field, format!("'{}' is not a number", text.trim())))
}

fn parse_whole(field: &str, text: &str) -> MortgageResult<i64> {
    let value = parse_number(field, text)?;
    round_money(value)
        .to_i64()
        .ok_or_else(|| MortgageError::invalid(field, "Value is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let inputs = LoanInputs::default();
        assert_eq!(inputs.home_price(), dec!(3_000_000));
        assert_eq!(inputs.down_payment_percent(), 20);
        assert_eq!(inputs.term_years(), 20);
        assert_eq!(inputs.down_payment_amount(), dec!(600_000));
    }

    #[test]
    fn test_set_percent_clamps() {
        let mut inputs = LoanInputs::default();
        assert_eq!(inputs.set_percent(5), 10);
        assert_eq!(inputs.set_percent(95), 90);
        assert_eq!(inputs.set_percent(-3), 10);
        assert_eq!(inputs.set_percent(35), 35);
        assert_eq!(inputs.down_payment_amount(), dec!(1_050_000));
    }

    #[test]
    fn test_set_amount_snaps_back_below_minimum() {
        let mut inputs = LoanInputs::default();
        // 150,000 of 3,000,000 implies 5%
        assert_eq!(inputs.set_amount(dec!(150_000)).unwrap(), 10);
        assert_eq!(inputs.down_payment_amount(), dec!(300_000));
    }

    #[test]
    fn test_set_amount_snaps_back_above_maximum() {
        let mut inputs = LoanInputs::default();
        assert_eq!(inputs.set_amount(dec!(3_000_000)).unwrap(), 90);
        assert_eq!(inputs.down_payment_amount(), dec!(2_700_000));
    }

    #[test]
    fn test_set_amount_rounds_percent() {
        let mut inputs = LoanInputs::default();
        // 1,000,000 / 3,000,000 = 33.33%
        assert_eq!(inputs.set_amount(dec!(1_000_000)).unwrap(), 33);
        assert_eq!(inputs.down_payment_amount(), dec!(990_000));
    }

    #[test]
    fn test_set_amount_huge_value_clamps() {
        let mut inputs = LoanInputs::default();
        inputs.set_home_price(dec!(1)).unwrap();
        assert_eq!(inputs.set_amount(Decimal::MAX).unwrap(), 90);
    }

    #[test]
    fn test_set_amount_rejects_negative() {
        let mut inputs = LoanInputs::default();
        assert!(inputs.set_amount(dec!(-1)).is_err());
        assert_eq!(inputs.down_payment_percent(), 20);
    }

    #[test]
    fn test_home_price_keeps_percent() {
        let mut inputs = LoanInputs::default();
        inputs.set_percent(30);
        inputs.set_home_price(dec!(5_000_000)).unwrap();
        assert_eq!(inputs.down_payment_percent(), 30);
        assert_eq!(inputs.down_payment_amount(), dec!(1_500_000));
    }

    #[test]
    fn test_home_price_rejects_non_positive() {
        let mut inputs = LoanInputs::default();
        assert!(inputs.set_home_price(Decimal::ZERO).is_err());
        assert!(inputs.set_home_price(dec!(-100)).is_err());
        assert!(inputs.set_home_price(Decimal::MAX).is_err());
        assert_eq!(inputs.home_price(), dec!(3_000_000));
    }

    #[test]
    fn test_fractional_home_price_rejected() {
        let mut inputs = LoanInputs::default();
        assert!(inputs.parse_home_price("2 000 000,50").is_err());
        assert!(inputs.set_home_price(dec!(1_500_000.01)).is_err());
        assert_eq!(inputs.home_price(), dec!(3_000_000));
    }

    #[test]
    fn test_term_clamps() {
        let mut inputs = LoanInputs::default();
        assert_eq!(inputs.set_term_years(0), 1);
        assert_eq!(inputs.set_term_years(45), 30);
        assert_eq!(inputs.set_term_years(7), 7);
    }

    #[test]
    fn test_parse_failures_keep_previous_value() {
        let mut inputs = LoanInputs::default();
        assert!(inputs.parse_home_price("abc").is_err());
        assert!(inputs.parse_home_price("").is_err());
        assert!(inputs.parse_term_years("NaN").is_err());
        assert!(inputs.parse_amount("1e").is_err());
        assert_eq!(inputs, LoanInputs::default());
    }

    #[test]
    fn test_parse_grouped_text() {
        let mut inputs = LoanInputs::default();
        inputs.parse_home_price("4\u{a0}500\u{a0}000").unwrap();
        assert_eq!(inputs.home_price(), dec!(4_500_000));
        inputs.parse_home_price("2 000 000,00").unwrap();
        assert_eq!(inputs.home_price(), dec!(2_000_000));
        assert_eq!(inputs.parse_term_years(" 25 ").unwrap(), 25);
        assert_eq!(inputs.parse_percent("12.6").unwrap(), 13);
    }

    #[test]
    fn test_new_clamps_and_validates() {
        let inputs = LoanInputs::new(dec!(2_000_000), 3, 50).unwrap();
        assert_eq!(inputs.down_payment_percent(), 10);
        assert_eq!(inputs.term_years(), 30);
        assert!(LoanInputs::new(dec!(-5), 20, 20).is_err());
    }
}
