//! Interactive calculator state.
//!
//! A session owns the validated inputs, the injected program table and rate
//! policy, and the latest [`LoanResult`]. Every mutation recomputes the
//! result synchronously; there is no debounce and no background work. A
//! mutation the engine rejects returns the error and changes nothing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculator::display::DisplayFormat;
use crate::calculator::engine::{
    amortization_schedule, calculate_payment, compute_payment, AmortizationSchedule, LoanResult,
    PaymentInput,
};
use crate::calculator::inputs::{LoanInputs, MAX_DOWN_PAYMENT_PERCENT, MIN_DOWN_PAYMENT_PERCENT};
use crate::calculator::programs::{Program, ProgramTable, RatePolicy};
use crate::config::MortgageConfig;
use crate::types::{round_money, ComputationOutput, Money, Rate};
use crate::MortgageResult;

const DEFAULT_PROGRAM_ID: &str = "family";

/// Formatted strings for every value the calculator shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatorView {
    pub program_id: String,
    pub program_name: String,
    pub program_rate: String,
    pub home_price: String,
    pub down_payment_percent: u32,
    pub down_payment: String,
    pub min_down_payment_hint: String,
    pub max_down_payment_hint: String,
    pub term: String,
    pub monthly_payment: String,
    pub loan_amount: String,
    pub overpayment: String,
    pub total_paid: String,
}

/// Plain, serialisable copy of the calculator state handed to lead submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorSnapshot {
    pub program_id: String,
    pub home_price: Money,
    pub down_payment_percent: u32,
    pub term_years: u32,
    pub monthly_payment: Money,
    pub annual_rate: Rate,
    pub result: LoanResult,
}

/// Values for the calculator's controls, as a front end or command line
/// supplies them. Text fields go through the same parsing as typed input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorControls {
    pub program: Option<String>,
    pub home_price: Option<String>,
    pub down_payment_percent: Option<i64>,
    /// Applied after the percentage, so it wins when both are given.
    pub down_payment_amount: Option<String>,
    pub term_years: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CalculatorSession {
    inputs: LoanInputs,
    programs: ProgramTable,
    selected_program: String,
    rate_policy: RatePolicy,
    format: DisplayFormat,
    result: LoanResult,
}

impl CalculatorSession {
    /// Start a session with default inputs and the `family` program selected
    /// (or the first program when the table has no `family` entry).
    pub fn new(
        programs: ProgramTable,
        rate_policy: RatePolicy,
        format: DisplayFormat,
    ) -> MortgageResult<Self> {
        let selected_program = programs
            .get(DEFAULT_PROGRAM_ID)
            .unwrap_or_else(|| programs.first())
            .id
            .clone();
        Self::with_inputs(LoanInputs::default(), programs, selected_program, rate_policy, format)
    }

    pub fn from_config(config: &MortgageConfig) -> MortgageResult<Self> {
        let programs = config.program_table()?;
        let inputs = config.default_inputs()?;
        let selected_program = match &config.calculator.default_program {
            Some(id) => programs.require(id)?.id.clone(),
            None => programs
                .get(DEFAULT_PROGRAM_ID)
                .unwrap_or_else(|| programs.first())
                .id
                .clone(),
        };
        Self::with_inputs(
            inputs,
            programs,
            selected_program,
            config.rate_policy(),
            config.display_format(),
        )
    }

    fn with_inputs(
        inputs: LoanInputs,
        programs: ProgramTable,
        selected_program: String,
        rate_policy: RatePolicy,
        format: DisplayFormat,
    ) -> MortgageResult<Self> {
        let rate = rate_policy.effective_rate(programs.require(&selected_program)?);
        let result = compute_payment(
            inputs.home_price(),
            Decimal::from(inputs.down_payment_percent()),
            inputs.term_years(),
            rate,
        )?;
        Ok(Self {
            inputs,
            programs,
            selected_program,
            rate_policy,
            format,
            result,
        })
    }

    pub fn inputs(&self) -> &LoanInputs {
        &self.inputs
    }

    pub fn result(&self) -> &LoanResult {
        &self.result
    }

    pub fn programs(&self) -> &ProgramTable {
        &self.programs
    }

    pub fn selected_program(&self) -> &Program {
        // The selected id is always validated against the table.
        self.programs
            .get(&self.selected_program)
            .unwrap_or_else(|| self.programs.first())
    }

    pub fn annual_rate(&self) -> Rate {
        self.rate_policy.effective_rate(self.selected_program())
    }

    pub fn select_program(&mut self, id: &str) -> MortgageResult<()> {
        let inputs = self.inputs.clone();
        self.commit(inputs, id)
    }

    pub fn set_home_price(&mut self, home_price: Money) -> MortgageResult<()> {
        self.update(|inputs| inputs.set_home_price(home_price))
    }

    pub fn set_down_payment_percent(&mut self, percent: i64) -> MortgageResult<u32> {
        self.update(|inputs| Ok(inputs.set_percent(percent)))
    }

    pub fn set_down_payment_amount(&mut self, amount: Money) -> MortgageResult<u32> {
        self.update(|inputs| inputs.set_amount(amount))
    }

    pub fn set_term_years(&mut self, years: i64) -> MortgageResult<u32> {
        self.update(|inputs| Ok(inputs.set_term_years(years)))
    }

    /// Text-field entry for the price; on a parse failure nothing changes.
    pub fn enter_home_price(&mut self, text: &str) -> MortgageResult<()> {
        self.update(|inputs| inputs.parse_home_price(text))
    }

    pub fn enter_down_payment_amount(&mut self, text: &str) -> MortgageResult<u32> {
        self.update(|inputs| inputs.parse_amount(text))
    }

    pub fn enter_term_years(&mut self, text: &str) -> MortgageResult<u32> {
        self.update(|inputs| inputs.parse_term_years(text))
    }

    /// Apply every control that is set, in the order a user would: program,
    /// price, down payment, term. All or nothing: on the first rejected
    /// value the session is left as it was.
    pub fn apply(&mut self, controls: &CalculatorControls) -> MortgageResult<()> {
        let mut next = self.clone();
        if let Some(id) = &controls.program {
            next.select_program(id)?;
        }
        if let Some(price) = &controls.home_price {
            next.enter_home_price(price)?;
        }
        if let Some(percent) = controls.down_payment_percent {
            next.set_down_payment_percent(percent)?;
        }
        if let Some(amount) = &controls.down_payment_amount {
            next.enter_down_payment_amount(amount)?;
        }
        if let Some(term) = &controls.term_years {
            next.enter_term_years(term)?;
        }
        *self = next;
        Ok(())
    }

    /// Edit a copy of the inputs and commit it only if the engine accepts it.
    fn update<T>(
        &mut self,
        edit: impl FnOnce(&mut LoanInputs) -> MortgageResult<T>,
    ) -> MortgageResult<T> {
        let mut inputs = self.inputs.clone();
        let stored = edit(&mut inputs)?;
        let program = self.selected_program.clone();
        self.commit(inputs, &program)?;
        Ok(stored)
    }

    /// Compute the result for `inputs` under `program_id`, then store all
    /// three together. Inputs and result never disagree.
    fn commit(&mut self, inputs: LoanInputs, program_id: &str) -> MortgageResult<()> {
        let rate = self
            .rate_policy
            .effective_rate(self.programs.require(program_id)?);
        let result = compute_payment(
            inputs.home_price(),
            Decimal::from(inputs.down_payment_percent()),
            inputs.term_years(),
            rate,
        )
        .inspect_err(|e| warn!(error = %e, "recompute rejected; keeping previous state"))?;

        debug!(
            program = program_id,
            home_price = %inputs.home_price(),
            term_years = inputs.term_years(),
            monthly_payment = %result.monthly_payment,
            "calculator recomputed"
        );
        self.inputs = inputs;
        self.selected_program = program_id.to_string();
        self.result = result;
        Ok(())
    }

    pub fn payment_input(&self) -> PaymentInput {
        self.inputs.to_payment_input(self.annual_rate())
    }

    /// Current result in the standard envelope, flagging a selected program
    /// whose advertised rate is not the one being computed with.
    pub fn calculate(&self) -> MortgageResult<ComputationOutput<LoanResult>> {
        let mut output = calculate_payment(&self.payment_input())?;
        if let Some(warning) = self.rate_mismatch() {
            output.warnings.push(warning);
        }
        Ok(output)
    }

    pub fn schedule(&self) -> MortgageResult<ComputationOutput<AmortizationSchedule>> {
        let mut output = amortization_schedule(&self.payment_input())?;
        if let Some(warning) = self.rate_mismatch() {
            output.warnings.push(warning);
        }
        Ok(output)
    }

    fn rate_mismatch(&self) -> Option<String> {
        let program = self.selected_program();
        let used = self.annual_rate();
        match program.annual_rate {
            Some(advertised) if advertised != used => Some(format!(
                "{} advertises {}, payment computed at {}%",
                program.name,
                program.display_rate,
                (used * Decimal::ONE_HUNDRED).normalize()
            )),
            None => Some(format!(
                "{} has no single advertised rate ({}), payment computed at {}%",
                program.name,
                program.display_rate,
                (used * Decimal::ONE_HUNDRED).normalize()
            )),
            _ => None,
        }
    }

    pub fn view(&self) -> CalculatorView {
        let program = self.selected_program();
        let price = self.inputs.home_price();
        let f = &self.format;
        let hint = |percent: u32| {
            let amount = round_money(price * Decimal::from(percent) / Decimal::ONE_HUNDRED);
            format!("{}% ({})", percent, f.money(amount))
        };

        CalculatorView {
            program_id: program.id.clone(),
            program_name: program.name.clone(),
            program_rate: program.display_rate.clone(),
            home_price: f.money(price),
            down_payment_percent: self.inputs.down_payment_percent(),
            down_payment: f.money(self.result.down_payment),
            min_down_payment_hint: hint(MIN_DOWN_PAYMENT_PERCENT),
            max_down_payment_hint: hint(MAX_DOWN_PAYMENT_PERCENT),
            term: f.term(self.inputs.term_years()),
            monthly_payment: f.money(self.result.monthly_payment),
            loan_amount: f.money(self.result.loan_amount),
            overpayment: f.money(self.result.overpayment()),
            total_paid: f.money(self.result.total_paid),
        }
    }

    pub fn snapshot(&self) -> CalculatorSnapshot {
        CalculatorSnapshot {
            program_id: self.selected_program.clone(),
            home_price: self.inputs.home_price(),
            down_payment_percent: self.inputs.down_payment_percent(),
            term_years: self.inputs.term_years(),
            monthly_payment: self.result.monthly_payment,
            annual_rate: self.result.annual_rate,
            result: self.result.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn session() -> CalculatorSession {
        CalculatorSession::new(
            ProgramTable::default(),
            RatePolicy::default(),
            DisplayFormat::russian(),
        )
        .unwrap()
    }

    #[test]
    fn test_initial_state() {
        let s = session();
        assert_eq!(s.selected_program().id, "family");
        assert_eq!(s.result().monthly_payment, dec!(17194));
        assert_eq!(s.annual_rate(), dec!(0.06));
    }

    #[test]
    fn test_every_setter_recomputes() {
        let mut s = session();
        s.set_home_price(dec!(5_000_000)).unwrap();
        s.set_down_payment_percent(50).unwrap();
        s.set_term_years(10).unwrap();
        assert_eq!(s.result().loan_amount, dec!(2_500_000));
        assert_eq!(s.result().monthly_payment, dec!(27755));
    }

    #[test]
    fn test_amount_entry_snaps_to_minimum() {
        let mut s = session();
        assert_eq!(s.enter_down_payment_amount("150 000").unwrap(), 10);
        assert_eq!(s.result().down_payment, dec!(300_000));
        assert_eq!(s.result().loan_amount, dec!(2_700_000));
    }

    #[test]
    fn test_bad_text_keeps_previous_result() {
        let mut s = session();
        let before = s.result().clone();
        assert!(s.enter_home_price("три миллиона").is_err());
        assert!(s.enter_home_price("-5").is_err());
        assert_eq!(s.result(), &before);
    }

    #[test]
    fn test_fixed_policy_ignores_selected_program() {
        let mut s = session();
        s.select_program("rural").unwrap();
        assert_eq!(s.annual_rate(), dec!(0.06));
        assert_eq!(s.result().monthly_payment, dec!(17194));
        assert_eq!(s.view().program_rate, "до 3%");
    }

    #[test]
    fn test_program_policy_follows_selected_program() {
        let mut s = CalculatorSession::new(
            ProgramTable::default(),
            RatePolicy::Program {
                fallback: dec!(0.06),
            },
            DisplayFormat::russian(),
        )
        .unwrap();
        s.select_program("rural").unwrap();
        assert_eq!(s.annual_rate(), dec!(0.03));
        assert!(s.result().monthly_payment < dec!(17194));
    }

    #[test]
    fn test_unknown_program_leaves_selection() {
        let mut s = session();
        assert!(s.select_program("nope").is_err());
        assert_eq!(s.selected_program().id, "family");
    }

    #[test]
    fn test_view_formatting() {
        let v = session().view();
        assert_eq!(v.monthly_payment, "17\u{a0}194 ₽");
        assert_eq!(v.loan_amount, "2\u{a0}400\u{a0}000 ₽");
        assert_eq!(v.down_payment, "600\u{a0}000 ₽");
        assert_eq!(v.overpayment, "1\u{a0}726\u{a0}643 ₽");
        assert_eq!(v.term, "20 лет");
        assert_eq!(v.min_down_payment_hint, "10% (300\u{a0}000 ₽)");
        assert_eq!(v.max_down_payment_hint, "90% (2\u{a0}700\u{a0}000 ₽)");
    }

    #[test]
    fn test_calculate_flags_rate_mismatch() {
        let mut s = session();
        assert!(s.calculate().unwrap().warnings.is_empty());

        s.select_program("rural").unwrap();
        let out = s.calculate().unwrap();
        assert_eq!(out.warnings, vec!["Сельская ипотека advertises до 3%, payment computed at 6%"]);
        assert_eq!(out.result, *s.result());
    }

    #[test]
    fn test_schedule_follows_session_inputs() {
        let mut s = session();
        s.set_term_years(5).unwrap();
        let out = s.schedule().unwrap();
        assert_eq!(out.result.rows.len(), 60);
    }

    #[test]
    fn test_apply_controls() {
        let mut s = session();
        let controls: CalculatorControls = serde_json::from_value(serde_json::json!({
            "program": "it",
            "home_price": "6 000 000",
            "down_payment_percent": 50,
            "down_payment_amount": "1 200 000",
            "term_years": "15"
        }))
        .unwrap();
        s.apply(&controls).unwrap();
        assert_eq!(s.selected_program().id, "it");
        assert_eq!(s.inputs().down_payment_percent(), 20);
        assert_eq!(s.inputs().term_years(), 15);

        let bad = CalculatorControls {
            program: Some("rural".into()),
            home_price: Some("abc".into()),
            ..CalculatorControls::default()
        };
        assert!(s.apply(&bad).is_err());
        assert_eq!(s.inputs().home_price(), dec!(6_000_000));
        assert_eq!(s.selected_program().id, "it");
    }

    #[test]
    fn test_rejected_recompute_keeps_inputs_and_result_together() {
        // 300% a year: 20 years still fits the decimal range, 30 does not
        let mut s = CalculatorSession::new(
            ProgramTable::default(),
            RatePolicy::Fixed {
                annual_rate: dec!(3),
            },
            DisplayFormat::russian(),
        )
        .unwrap();
        let before = s.result().clone();

        assert!(s.set_term_years(30).is_err());
        assert_eq!(s.inputs().term_years(), 20);
        assert_eq!(s.result(), &before);
        assert_eq!(s.view().term, "20 лет");

        assert!(s.enter_term_years("30").is_err());
        assert_eq!(s.snapshot().term_years, 20);
    }

    #[test]
    fn test_snapshot_matches_result() {
        let s = session();
        let snap = s.snapshot();
        assert_eq!(snap.program_id, "family");
        assert_eq!(snap.home_price, dec!(3_000_000));
        assert_eq!(snap.term_years, 20);
        assert_eq!(snap.monthly_payment, s.result().monthly_payment);
        assert!(serde_json::to_string(&snap).is_ok());
    }
}
