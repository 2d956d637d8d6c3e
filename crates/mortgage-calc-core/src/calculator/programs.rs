//! Mortgage programs and the rate policy that turns a selected program into
//! the rate the engine actually uses.

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::MortgageError;
use crate::types::Rate;
use crate::MortgageResult;

/// Rate the site calculator applies regardless of the selected program.
pub const REFERENCE_ANNUAL_RATE: Rate = dec!(0.06);

/// Highest configurable annual rate (100%). Keeps a 30-year growth factor
/// well inside the decimal range.
pub const MAX_ANNUAL_RATE: Rate = dec!(1);

/// A named mortgage product as advertised on the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: String,
    pub name: String,
    /// Advertised rate exactly as displayed, e.g. "6%" or "до 3%".
    pub display_rate: String,
    /// Numeric rate for [`RatePolicy::Program`]; `None` when the program has
    /// no single rate (e.g. military savings schemes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_rate: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down_payment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Ordered, id-unique set of programs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramTable {
    programs: Vec<Program>,
}

impl ProgramTable {
    pub fn new(programs: Vec<Program>) -> MortgageResult<Self> {
        if programs.is_empty() {
            return Err(MortgageError::Config(
                "Program table must contain at least one program".into(),
            ));
        }
        let mut seen = HashSet::new();
        for program in &programs {
            if program.id.trim().is_empty() {
                return Err(MortgageError::Config("Program id cannot be empty".into()));
            }
            if !seen.insert(program.id.as_str()) {
                return Err(MortgageError::Config(format!(
                    "Duplicate program id '{}'",
                    program.id
                )));
            }
            if matches!(program.annual_rate, Some(r) if r.is_sign_negative() || r > MAX_ANNUAL_RATE) {
                return Err(MortgageError::Config(format!(
                    "Program '{}' rate must be between 0 and {}",
                    program.id, MAX_ANNUAL_RATE
                )));
            }
        }
        Ok(Self { programs })
    }

    pub fn get(&self, id: &str) -> Option<&Program> {
        self.programs.iter().find(|p| p.id == id)
    }

    pub fn require(&self, id: &str) -> MortgageResult<&Program> {
        self.get(id)
            .ok_or_else(|| MortgageError::UnknownProgram(id.to_string()))
    }

    pub fn first(&self) -> &Program {
        // Non-empty by construction.
        &self.programs[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Program> {
        self.programs.iter()
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

impl Default for ProgramTable {
    fn default() -> Self {
        Self {
            programs: default_programs(),
        }
    }
}

/// How the calculator picks the rate for the selected program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RatePolicy {
    /// Always use the same rate, whatever program is selected.
    Fixed { annual_rate: Rate },
    /// Use the program's own rate, or `fallback` when it has none.
    Program { fallback: Rate },
}

impl Default for RatePolicy {
    fn default() -> Self {
        RatePolicy::Fixed {
            annual_rate: REFERENCE_ANNUAL_RATE,
        }
    }
}

impl RatePolicy {
    pub fn effective_rate(&self, program: &Program) -> Rate {
        match self {
            RatePolicy::Fixed { annual_rate } => *annual_rate,
            RatePolicy::Program { fallback } => program.annual_rate.unwrap_or(*fallback),
        }
    }
}

/// Programs offered by the broker.
pub fn default_programs() -> Vec<Program> {
    vec![
        Program {
            id: "family".into(),
            name: "Семейная ипотека".into(),
            display_rate: "6%".into(),
            annual_rate: Some(dec!(0.06)),
            max_amount: Some("12 млн ₽".into()),
            down_payment: Some("от 20%".into()),
            term: Some("до 30 лет".into()),
            description: Some("Для семей с детьми".into()),
        },
        Program {
            id: "it".into(),
            name: "IT-ипотека".into(),
            display_rate: "6%".into(),
            annual_rate: Some(dec!(0.06)),
            max_amount: Some("9 млн ₽".into()),
            down_payment: Some("от 20%".into()),
            term: Some("до 30 лет".into()),
            description: Some("Для IT-специалистов".into()),
        },
        Program {
            id: "military".into(),
            name: "Военная ипотека".into(),
            display_rate: "По НИС".into(),
            annual_rate: None,
            max_amount: Some("1,58 млн ₽".into()),
            down_payment: Some("от 20,1%".into()),
            term: Some("до 25 лет".into()),
            description: Some("Для военнослужащих".into()),
        },
        Program {
            id: "rural".into(),
            name: "Сельская ипотека".into(),
            display_rate: "до 3%".into(),
            annual_rate: Some(dec!(0.03)),
            max_amount: Some("6 млн ₽".into()),
            down_payment: Some("от 20%".into()),
            term: Some("до 25 лет".into()),
            description: Some("Для жителей сельских районов".into()),
        },
    ]
}
