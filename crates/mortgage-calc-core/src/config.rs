//! TOML configuration.
//!
//! Every section is optional; a missing file section falls back to the
//! site calculator's behaviour (fixed 6% rate, Russian formatting, the
//! broker's four programs).
//!
//! ```
//! use mortgage_calc_core::config::MortgageConfig;
//! use mortgage_calc_core::calculator::RatePolicy;
//! use rust_decimal_macros::dec;
//!
//! let config = MortgageConfig::from_toml_str(r#"
//!     [calculator]
//!     rate_policy = "program"
//!     fixed_annual_rate = "0.065"
//!
//!     [lead]
//!     endpoint = "https://leads.example.com/submit"
//! "#).unwrap();
//!
//! assert_eq!(config.rate_policy(), RatePolicy::Program { fallback: dec!(0.065) });
//! assert_eq!(config.program_table().unwrap().len(), 4);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::calculator::display::{DisplayFormat, DisplayLocale};
use crate::calculator::inputs::{
    LoanInputs, DEFAULT_DOWN_PAYMENT_PERCENT, DEFAULT_HOME_PRICE, DEFAULT_TERM_YEARS,
};
use crate::calculator::programs::{
    Program, ProgramTable, RatePolicy, MAX_ANNUAL_RATE, REFERENCE_ANNUAL_RATE,
};
use crate::error::MortgageError;
use crate::types::{Money, Rate};
use crate::MortgageResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MortgageConfig {
    pub calculator: CalculatorSettings,
    pub display: DisplaySettings,
    pub lead: LeadSettings,
    /// Replaces the built-in program table when non-empty.
    pub programs: Vec<Program>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatePolicyKind {
    #[default]
    Fixed,
    Program,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorSettings {
    pub rate_policy: RatePolicyKind,
    /// Rate for the fixed policy, and the fallback for programs without one.
    pub fixed_annual_rate: Rate,
    pub default_home_price: Money,
    pub default_down_payment_percent: u32,
    pub default_term_years: u32,
    pub default_program: Option<String>,
}

impl Default for CalculatorSettings {
    fn default() -> Self {
        Self {
            rate_policy: RatePolicyKind::Fixed,
            fixed_annual_rate: REFERENCE_ANNUAL_RATE,
            default_home_price: DEFAULT_HOME_PRICE,
            default_down_payment_percent: DEFAULT_DOWN_PAYMENT_PERCENT,
            default_term_years: DEFAULT_TERM_YEARS,
            default_program: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub locale: DisplayLocale,
    pub currency_suffix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadSettings {
    pub endpoint: Option<String>,
    pub registration_endpoint: Option<String>,
    pub timeout_secs: u64,
    /// Value of the `source` field on submitted leads.
    pub source: String,
    /// Phone number offered to the user when a submission fails.
    pub contact_phone: String,
}

impl Default for LeadSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            registration_endpoint: None,
            timeout_secs: 30,
            source: "calculator".into(),
            contact_phone: "+7 978 128-18-50".into(),
        }
    }
}

impl LeadSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl MortgageConfig {
    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> MortgageResult<Self> {
        Self::from_toml_file(path)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> MortgageResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            MortgageError::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(s: &str) -> MortgageResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MortgageResult<()> {
        let rate = self.calculator.fixed_annual_rate;
        if rate < Decimal::ZERO || rate > MAX_ANNUAL_RATE {
            return Err(MortgageError::Config(format!(
                "calculator.fixed_annual_rate must be between 0 and {MAX_ANNUAL_RATE}"
            )));
        }
        if self.calculator.default_home_price <= Decimal::ZERO {
            return Err(MortgageError::Config(
                "calculator.default_home_price must be positive".into(),
            ));
        }
        if self.lead.timeout_secs == 0 {
            return Err(MortgageError::Config("lead.timeout_secs must be > 0".into()));
        }
        let table = self.program_table()?;
        if let Some(id) = &self.calculator.default_program {
            table.require(id)?;
        }
        Ok(())
    }

    pub fn program_table(&self) -> MortgageResult<ProgramTable> {
        if self.programs.is_empty() {
            Ok(ProgramTable::default())
        } else {
            ProgramTable::new(self.programs.clone())
        }
    }

    pub fn rate_policy(&self) -> RatePolicy {
        let rate = self.calculator.fixed_annual_rate;
        match self.calculator.rate_policy {
            RatePolicyKind::Fixed => RatePolicy::Fixed { annual_rate: rate },
            RatePolicyKind::Program => RatePolicy::Program { fallback: rate },
        }
    }

    pub fn display_format(&self) -> DisplayFormat {
        let mut format = DisplayFormat::for_locale(self.display.locale);
        if let Some(suffix) = &self.display.currency_suffix {
            format.currency_suffix = suffix.clone();
        }
        format
    }

    /// Initial calculator inputs, clamped into the calculator's ranges.
    pub fn default_inputs(&self) -> MortgageResult<LoanInputs> {
        LoanInputs::new(
            self.calculator.default_home_price,
            i64::from(self.calculator.default_down_payment_percent),
            i64::from(self.calculator.default_term_years),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_config_is_site_default() {
        let config = MortgageConfig::from_toml_str("").unwrap();
        assert_eq!(config, MortgageConfig::default());
        assert_eq!(
            config.rate_policy(),
            RatePolicy::Fixed {
                annual_rate: dec!(0.06)
            }
        );
        assert_eq!(config.display_format(), DisplayFormat::russian());
        assert_eq!(config.lead.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_custom_programs_replace_defaults() {
        let config = MortgageConfig::from_toml_str(
            r#"
            [calculator]
            default_program = "standard"

            [[programs]]
            id = "standard"
            name = "Стандартная ипотека"
            display_rate = "от 18%"
            annual_rate = "0.18"
            "#,
        )
        .unwrap();
        let table = config.program_table().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.first().annual_rate, Some(dec!(0.18)));
    }

    #[test]
    fn test_unknown_default_program_is_rejected() {
        let err = MortgageConfig::from_toml_str(
            r#"
            [calculator]
            default_program = "missing"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, MortgageError::UnknownProgram(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(MortgageConfig::from_toml_str("[lead]\ntimeout_secs = 0").is_err());
        assert!(MortgageConfig::from_toml_str("[calculator]\nfixed_annual_rate = \"-0.01\"").is_err());
        assert!(MortgageConfig::from_toml_str("[calculator]\nfixed_annual_rate = \"3.0\"").is_err());
        assert!(MortgageConfig::from_toml_str("not toml at all =").is_err());
    }

    #[test]
    fn test_english_display_with_custom_suffix() {
        let config = MortgageConfig::from_toml_str(
            r#"
            [display]
            locale = "en"
            currency_suffix = " RUB"
            "#,
        )
        .unwrap();
        let format = config.display_format();
        assert_eq!(format.money(dec!(17194)), "17,194 RUB");
    }

    #[test]
    fn test_default_inputs_are_clamped() {
        let config = MortgageConfig::from_toml_str(
            r#"
            [calculator]
            default_down_payment_percent = 95
            default_term_years = 40
            "#,
        )
        .unwrap();
        let inputs = config.default_inputs().unwrap();
        assert_eq!(inputs.down_payment_percent(), 90);
        assert_eq!(inputs.term_years(), 30);
    }
}
