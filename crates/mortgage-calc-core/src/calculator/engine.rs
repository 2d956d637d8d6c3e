//! Fixed-rate annuity engine.
//!
//! Computes the level monthly payment, total payback, principal and down
//! payment for a home purchase, plus a month-by-month amortisation schedule.
//! All math in `rust_decimal::Decimal`; currency outputs are rounded to whole
//! units, schedule rows to kopecks.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::calculator::inputs::MAX_TERM_YEARS;
use crate::error::MortgageError;
use crate::time_value::annuity_payment;
use crate::types::{round_cents, round_money, with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::MortgageResult;

const MONTHS_PER_YEAR: u32 = 12;

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

/// Loan parameters for a single payment calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentInput {
    /// Purchase price of the property.
    pub home_price: Money,
    /// Down payment as a whole percentage of the price (20 = 20%).
    pub down_payment_percent: Percent,
    /// Loan term in years.
    pub term_years: u32,
    /// Annual interest rate as a decimal (0.06 = 6%).
    pub annual_rate: Rate,
}

/// Result of a payment calculation. Monetary fields are whole currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanResult {
    pub monthly_payment: Money,
    pub total_paid: Money,
    pub loan_amount: Money,
    pub down_payment: Money,
    pub number_of_payments: u32,
    pub annual_rate: Rate,
}

impl LoanResult {
    /// Interest paid over the life of the loan.
    pub fn overpayment(&self) -> Money {
        self.total_paid - self.loan_amount
    }
}

/// One month of the amortisation schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub month: u32,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub rows: Vec<AmortizationRow>,
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_paid: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the monthly payment for a home purchase.
///
/// A zero-year term is treated as a single repayment of the whole loan
/// rather than dividing by zero; a zero rate repays the principal in equal
/// instalments.
pub fn compute_payment(
    home_price: Money,
    down_payment_percent: Percent,
    term_years: u32,
    annual_rate: Rate,
) -> MortgageResult<LoanResult> {
    validate(home_price, down_payment_percent, term_years, annual_rate)?;

    let down_payment = home_price
        .checked_mul(down_payment_percent)
        .map(|v| round_money(v / dec!(100)))
        .ok_or_else(|| MortgageError::invalid("home_price", "Home price is too large"))?;
    let loan_amount = home_price - down_payment;
    let number_of_payments = term_years * MONTHS_PER_YEAR;

    if number_of_payments == 0 {
        return Ok(LoanResult {
            monthly_payment: loan_amount,
            total_paid: loan_amount,
            loan_amount,
            down_payment,
            number_of_payments,
            annual_rate,
        });
    }

    let monthly_rate = annual_rate / Decimal::from(MONTHS_PER_YEAR);
    let exact_payment = annuity_payment(monthly_rate, number_of_payments, loan_amount)?;

    Ok(LoanResult {
        monthly_payment: round_money(exact_payment),
        total_paid: exact_payment
            .checked_mul(Decimal::from(number_of_payments))
            .map(round_money)
            .ok_or_else(|| MortgageError::invalid("home_price", "Total payback is too large"))?,
        loan_amount,
        down_payment,
        number_of_payments,
        annual_rate,
    })
}

/// Compute the monthly payment wrapped in the standard output envelope.
pub fn calculate_payment(input: &PaymentInput) -> MortgageResult<ComputationOutput<LoanResult>> {
    let start = Instant::now();

    let result = compute_payment(
        input.home_price,
        input.down_payment_percent,
        input.term_years,
        input.annual_rate,
    )?;
    let warnings = collect_warnings(input);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-rate annuity payment",
        input,
        warnings,
        elapsed,
        result,
    ))
}

/// Build the month-by-month amortisation schedule.
///
/// Every payment is the level annuity payment rounded to kopecks except the
/// last, which absorbs the rounding residue so the balance closes at zero.
pub fn amortization_schedule(
    input: &PaymentInput,
) -> MortgageResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();

    let loan = compute_payment(
        input.home_price,
        input.down_payment_percent,
        input.term_years,
        input.annual_rate,
    )?;
    let warnings = collect_warnings(input);

    let schedule = if loan.number_of_payments == 0 {
        single_repayment(loan.loan_amount)
    } else {
        build_schedule(loan.loan_amount, input.annual_rate, loan.number_of_payments)?
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-rate annuity amortisation schedule",
        input,
        warnings,
        elapsed,
        schedule,
    ))
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn validate(
    home_price: Money,
    down_payment_percent: Percent,
    term_years: u32,
    annual_rate: Rate,
) -> MortgageResult<()> {
    if home_price <= Decimal::ZERO {
        return Err(MortgageError::invalid("home_price", "Home price must be positive"));
    }
    // 0 stays allowed as the single-repayment case.
    if term_years > MAX_TERM_YEARS {
        return Err(MortgageError::invalid(
            "term_years",
            format!("Term cannot exceed {MAX_TERM_YEARS} years"),
        ));
    }
    if down_payment_percent < Decimal::ZERO || down_payment_percent > dec!(100) {
        return Err(MortgageError::invalid(
            "down_payment_percent",
            "Down payment must be between 0% and 100%",
        ));
    }
    if annual_rate < Decimal::ZERO {
        return Err(MortgageError::invalid("annual_rate", "Interest rate cannot be negative"));
    }
    Ok(())
}

fn collect_warnings(input: &PaymentInput) -> Vec<String> {
    let mut warnings = Vec::new();
    if input.term_years == 0 {
        warnings.push("Zero-year term: the whole loan is treated as a single repayment".into());
    }
    if input.annual_rate.is_zero() {
        warnings.push("Zero interest rate: principal is repaid in equal instalments".into());
    }
    if input.down_payment_percent < dec!(10) || input.down_payment_percent > dec!(90) {
        warnings.push(format!(
            "Down payment of {}% is outside the calculator's 10–90% range",
            input.down_payment_percent
        ));
    }
    warnings
}

fn single_repayment(loan_amount: Money) -> AmortizationSchedule {
    AmortizationSchedule {
        rows: vec![AmortizationRow {
            month: 1,
            payment: loan_amount,
            interest: Decimal::ZERO,
            principal: loan_amount,
            balance: Decimal::ZERO,
        }],
        total_interest: Decimal::ZERO,
        total_principal: loan_amount,
        total_paid: loan_amount,
    }
}

fn build_schedule(
    loan_amount: Money,
    annual_rate: Rate,
    number_of_payments: u32,
) -> MortgageResult<AmortizationSchedule> {
    let monthly_rate = annual_rate / Decimal::from(MONTHS_PER_YEAR);
    let level_payment = round_cents(annuity_payment(monthly_rate, number_of_payments, loan_amount)?);

    let mut rows = Vec::with_capacity(number_of_payments as usize);
    let mut balance = loan_amount;
    let mut total_interest = Decimal::ZERO;
    let mut total_principal = Decimal::ZERO;

    for month in 1..=number_of_payments {
        let interest = round_cents(balance * monthly_rate);
        let mut principal = level_payment - interest;
        if month == number_of_payments || principal > balance {
            principal = balance;
        }
        let payment = principal + interest;
        balance -= principal;

        total_interest += interest;
        total_principal += principal;
        rows.push(AmortizationRow {
            month,
            payment,
            interest,
            principal,
            balance,
        });
    }

    Ok(AmortizationSchedule {
        rows,
        total_interest,
        total_principal,
        total_paid: total_interest + total_principal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn reference_input() -> PaymentInput {
        PaymentInput {
            home_price: dec!(3_000_000),
            down_payment_percent: dec!(20),
            term_years: 20,
            annual_rate: dec!(0.06),
        }
    }

    #[test]
    fn test_reference_scenario() {
        let r = compute_payment(dec!(3_000_000), dec!(20), 20, dec!(0.06)).unwrap();
        assert_eq!(r.loan_amount, dec!(2_400_000));
        assert_eq!(r.down_payment, dec!(600_000));
        assert_eq!(r.monthly_payment, dec!(17194));
        assert_eq!(r.number_of_payments, 240);
        // 17,194.3454... × 240 = 4,126,642.9
        assert_eq!(r.total_paid, dec!(4_126_643));
        assert_eq!(r.overpayment(), dec!(1_726_643));
    }

    #[test]
    fn test_half_down_ten_years() {
        let r = compute_payment(dec!(5_000_000), dec!(50), 10, dec!(0.06)).unwrap();
        assert_eq!(r.loan_amount, dec!(2_500_000));
        assert_eq!(r.monthly_payment, dec!(27755));
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let r = compute_payment(dec!(3_000_000), dec!(20), 20, Decimal::ZERO).unwrap();
        assert_eq!(r.monthly_payment, dec!(10_000));
        assert_eq!(r.total_paid, r.loan_amount);
        assert_eq!(r.overpayment(), Decimal::ZERO);
    }

    #[test]
    fn test_zero_term_is_single_repayment() {
        let r = compute_payment(dec!(3_000_000), dec!(20), 0, dec!(0.06)).unwrap();
        assert_eq!(r.number_of_payments, 0);
        assert_eq!(r.monthly_payment, dec!(2_400_000));
        assert_eq!(r.total_paid, dec!(2_400_000));
    }

    #[test]
    fn test_full_down_payment_means_no_loan() {
        let r = compute_payment(dec!(3_000_000), dec!(100), 20, dec!(0.06)).unwrap();
        assert_eq!(r.loan_amount, Decimal::ZERO);
        assert_eq!(r.monthly_payment, Decimal::ZERO);
        assert_eq!(r.total_paid, Decimal::ZERO);
    }

    #[test]
    fn test_rejects_non_positive_price() {
        assert!(compute_payment(Decimal::ZERO, dec!(20), 20, dec!(0.06)).is_err());
        assert!(compute_payment(dec!(-1), dec!(20), 20, dec!(0.06)).is_err());
    }

    #[test]
    fn test_rejects_negative_rate() {
        let err = compute_payment(dec!(3_000_000), dec!(20), 20, dec!(-0.01)).unwrap_err();
        assert!(matches!(err, MortgageError::InvalidInput { ref field, .. } if field == "annual_rate"));
    }

    #[test]
    fn test_rejects_term_above_thirty_years() {
        assert!(compute_payment(dec!(3_000_000), dec!(20), 30, dec!(0.06)).is_ok());
        let err = compute_payment(dec!(3_000_000), dec!(20), 31, dec!(0.06)).unwrap_err();
        assert!(matches!(err, MortgageError::InvalidInput { ref field, .. } if field == "term_years"));
    }

    #[test]
    fn test_schedule_rejects_huge_term_before_allocating() {
        let mut input = reference_input();
        input.term_years = 300_000_000;
        input.annual_rate = Decimal::ZERO;
        assert!(amortization_schedule(&input).is_err());
        assert!(calculate_payment(&input).is_err());
    }

    #[test]
    fn test_rejects_percent_above_hundred() {
        assert!(compute_payment(dec!(3_000_000), dec!(101), 20, dec!(0.06)).is_err());
    }

    #[test]
    fn test_conservation_with_odd_price() {
        // 15% of 1,000,005 = 150,000.75; halves must not leak a unit
        let r = compute_payment(dec!(1_000_005), dec!(15), 15, dec!(0.06)).unwrap();
        assert_eq!(r.loan_amount + r.down_payment, dec!(1_000_005));
        let r = compute_payment(dec!(1_000_010), dec!(15), 15, dec!(0.06)).unwrap();
        assert_eq!(r.loan_amount + r.down_payment, dec!(1_000_010));
    }

    #[test]
    fn test_envelope_warnings() {
        let mut input = reference_input();
        assert!(calculate_payment(&input).unwrap().warnings.is_empty());

        input.annual_rate = Decimal::ZERO;
        input.down_payment_percent = dec!(5);
        let out = calculate_payment(&input).unwrap();
        assert_eq!(out.warnings.len(), 2);
        assert_eq!(out.methodology, "Fixed-rate annuity payment");
    }

    #[test]
    fn test_schedule_closes_at_zero() {
        let out = amortization_schedule(&reference_input()).unwrap();
        let s = &out.result;
        assert_eq!(s.rows.len(), 240);
        assert_eq!(s.rows.last().unwrap().balance, Decimal::ZERO);
        assert_eq!(s.total_principal, dec!(2_400_000));
        assert_eq!(s.total_paid, s.total_interest + s.total_principal);
    }

    #[test]
    fn test_schedule_first_month_split() {
        let out = amortization_schedule(&reference_input()).unwrap();
        let first = &out.result.rows[0];
        // Interest: 2,400,000 × 0.5% = 12,000
        assert_eq!(first.interest, dec!(12_000));
        assert_eq!(first.payment, dec!(17194.35));
        assert_eq!(first.principal, dec!(5194.35));
        assert_eq!(first.balance, dec!(2_394_805.65));
    }

    #[test]
    fn test_schedule_total_close_to_loan_result() {
        let input = reference_input();
        let loan = calculate_payment(&input).unwrap().result;
        let schedule = amortization_schedule(&input).unwrap().result;
        assert!((schedule.total_paid - loan.total_paid).abs() < dec!(5));
    }

    #[test]
    fn test_schedule_zero_term_single_row() {
        let mut input = reference_input();
        input.term_years = 0;
        let out = amortization_schedule(&input).unwrap();
        assert_eq!(out.result.rows.len(), 1);
        assert_eq!(out.result.rows[0].payment, dec!(2_400_000));
        assert_eq!(out.warnings.len(), 1);
    }
}
