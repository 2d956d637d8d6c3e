use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_calc_core::calculator::{
    amortization_schedule, calculate_payment, CalculatorControls, CalculatorSession, PaymentInput,
    Program,
};
use mortgage_calc_core::config::{MortgageConfig, RatePolicyKind};
use mortgage_calc_core::MortgageResult;

use crate::input;

/// Calculator inputs. Anything omitted keeps the configured default.
#[derive(Args, Debug, Default)]
pub struct CalcArgs {
    /// Program id (family, it, military, rural or one from the config file)
    #[arg(long)]
    pub program: Option<String>,

    /// Home price in rubles; spaces and a decimal comma are accepted
    #[arg(long)]
    pub home_price: Option<String>,

    /// Down payment as a percentage of the price (clamped to 10..=90)
    #[arg(long, conflicts_with = "down_payment_amount")]
    pub down_payment_percent: Option<i64>,

    /// Down payment in rubles, converted to a whole percentage
    #[arg(long)]
    pub down_payment_amount: Option<String>,

    /// Loan term in years (clamped to 1..=30)
    #[arg(long)]
    pub term_years: Option<String>,

    /// Fixed annual rate as a fraction, e.g. 0.06; overrides the rate policy
    #[arg(long)]
    pub rate: Option<Decimal>,
}

impl CalcArgs {
    fn controls(&self) -> CalculatorControls {
        CalculatorControls {
            program: self.program.clone(),
            home_price: self.home_price.clone(),
            down_payment_percent: self.down_payment_percent,
            down_payment_amount: self.down_payment_amount.clone(),
            term_years: self.term_years.clone(),
        }
    }
}

/// Arguments for the payment and schedule commands
#[derive(Args)]
pub struct PaymentArgs {
    /// Path to a JSON payment input (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub calc: CalcArgs,
}

/// Build a session from the configuration and apply the flags the way the
/// calculator's own controls would.
pub fn build_session(config: &MortgageConfig, args: &CalcArgs) -> MortgageResult<CalculatorSession> {
    let mut session = match args.rate {
        Some(rate) => {
            let mut config = config.clone();
            config.calculator.rate_policy = RatePolicyKind::Fixed;
            config.calculator.fixed_annual_rate = rate;
            config.validate()?;
            CalculatorSession::from_config(&config)?
        }
        None => CalculatorSession::from_config(config)?,
    };

    session.apply(&args.controls())?;
    Ok(session)
}

/// A JSON payment input from `--input` or stdin, if one was given.
fn explicit_input(path: Option<&str>) -> Result<Option<PaymentInput>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        Ok(Some(input::file::read_json(path)?))
    } else {
        input::stdin::read_stdin()
    }
}

pub fn run_payment(config: &MortgageConfig, args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let output = match explicit_input(args.input.as_deref())? {
        Some(payment_input) => calculate_payment(&payment_input)?,
        None => build_session(config, &args.calc)?.calculate()?,
    };

    let mut value = serde_json::to_value(&output)?;
    if let Some(result) = value.get_mut("result").and_then(Value::as_object_mut) {
        result.insert(
            "overpayment".into(),
            serde_json::to_value(output.result.overpayment())?,
        );
    }
    Ok(value)
}

pub fn run_schedule(config: &MortgageConfig, args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let output = match explicit_input(args.input.as_deref())? {
        Some(payment_input) => amortization_schedule(&payment_input)?,
        None => build_session(config, &args.calc)?.schedule()?,
    };
    Ok(serde_json::to_value(output)?)
}

pub fn run_view(config: &MortgageConfig, args: CalcArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let session = build_session(config, &args)?;
    Ok(serde_json::to_value(session.view())?)
}

pub fn run_programs(config: &MortgageConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let table = config.program_table()?;
    let programs: Vec<&Program> = table.iter().collect();
    Ok(serde_json::to_value(programs)?)
}
