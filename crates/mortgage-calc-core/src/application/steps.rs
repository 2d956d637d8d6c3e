//! The four steps of the mortgage application form, one struct per step.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MortgageError;
use crate::types::Money;
use crate::MortgageResult;

/// Credit terms offered on the application form, in years.
pub const CREDIT_TERM_OPTIONS: [u32; 6] = [5, 10, 15, 20, 25, 30];

/// Validation applied when leaving a step.
pub trait StepValidation {
    /// Field names that fail validation, empty when the step is complete.
    fn invalid_fields(&self) -> Vec<&'static str>;

    fn validate(&self) -> MortgageResult<()> {
        let invalid = self.invalid_fields();
        if invalid.is_empty() {
            Ok(())
        } else {
            Err(MortgageError::Validation(format!(
                "Invalid or missing fields: {}",
                invalid.join(", ")
            )))
        }
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn digit_count(value: &str) -> usize {
    value.chars().filter(|c| c.is_ascii_digit()).count()
}

fn only_digits(value: &str, len: usize) -> bool {
    let trimmed = value.trim();
    trimmed.len() == len && trimmed.chars().all(|c| c.is_ascii_digit())
}

fn plausible_email(value: &str) -> bool {
    match value.trim().split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Step 1: personal details
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalStep {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub birth_date: Option<NaiveDate>,
    pub birth_place: String,
}

impl StepValidation for PersonalStep {
    fn invalid_fields(&self) -> Vec<&'static str> {
        let mut invalid = Vec::new();
        if blank(&self.full_name) {
            invalid.push("full_name");
        }
        if digit_count(&self.phone) < 10 {
            invalid.push("phone");
        }
        if !plausible_email(&self.email) {
            invalid.push("email");
        }
        if self.birth_date.is_none() {
            invalid.push("birth_date");
        }
        if blank(&self.birth_place) {
            invalid.push("birth_place");
        }
        invalid
    }
}

// ---------------------------------------------------------------------------
// Step 2: passport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassportStep {
    /// Four digits.
    pub series: String,
    /// Six digits.
    pub number: String,
    pub issue_date: Option<NaiveDate>,
    pub issuer: String,
    pub registration_address: String,
    /// Optional; twelve digits for an individual when given.
    pub inn: String,
    /// Optional; eleven digits when given.
    pub snils: String,
}

impl StepValidation for PassportStep {
    fn invalid_fields(&self) -> Vec<&'static str> {
        let mut invalid = Vec::new();
        if !only_digits(&self.series.replace(' ', ""), 4) {
            invalid.push("series");
        }
        if !only_digits(&self.number, 6) {
            invalid.push("number");
        }
        if self.issue_date.is_none() {
            invalid.push("issue_date");
        }
        if blank(&self.issuer) {
            invalid.push("issuer");
        }
        if blank(&self.registration_address) {
            invalid.push("registration_address");
        }
        if !blank(&self.inn) && !only_digits(&self.inn, 12) {
            invalid.push("inn");
        }
        if !blank(&self.snils) && digit_count(&self.snils) != 11 {
            invalid.push("snils");
        }
        invalid
    }
}

// ---------------------------------------------------------------------------
// Step 3: family and employment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaritalStatus {
    #[default]
    Single,
    Married,
    Divorced,
    Widowed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Children {
    #[default]
    #[serde(rename = "0")]
    None,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4+")]
    FourOrMore,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Employment {
    #[default]
    Employed,
    SelfEmployed,
    Business,
    Unemployed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmploymentStep {
    pub marital_status: MaritalStatus,
    pub children: Children,
    pub employment: Employment,
    pub employer: String,
    pub position: String,
    pub work_experience_years: Option<u32>,
    pub monthly_income: Option<Money>,
}

impl StepValidation for EmploymentStep {
    fn invalid_fields(&self) -> Vec<&'static str> {
        let mut invalid = Vec::new();
        if self.employment == Employment::Unemployed {
            return invalid;
        }
        if blank(&self.employer) {
            invalid.push("employer");
        }
        if blank(&self.position) {
            invalid.push("position");
        }
        if self.work_experience_years.is_none() {
            invalid.push("work_experience_years");
        }
        if !matches!(self.monthly_income, Some(income) if income > Decimal::ZERO) {
            invalid.push("monthly_income");
        }
        invalid
    }
}

// ---------------------------------------------------------------------------
// Step 4: the property
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    Apartment,
    House,
    Townhouse,
    Land,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyStep {
    pub property_type: PropertyType,
    pub property_address: String,
    pub property_cost: Option<Money>,
    pub initial_payment: Option<Money>,
    pub credit_term_years: u32,
    pub additional_info: String,
}

impl Default for PropertyStep {
    fn default() -> Self {
        Self {
            property_type: PropertyType::Apartment,
            property_address: String::new(),
            property_cost: None,
            initial_payment: None,
            credit_term_years: 20,
            additional_info: String::new(),
        }
    }
}

impl StepValidation for PropertyStep {
    fn invalid_fields(&self) -> Vec<&'static str> {
        let mut invalid = Vec::new();
        if blank(&self.property_address) {
            invalid.push("property_address");
        }
        match self.property_cost {
            Some(cost) if cost > Decimal::ZERO => {
                if !matches!(self.initial_payment, Some(p) if p >= Decimal::ZERO && p < cost) {
                    invalid.push("initial_payment");
                }
            }
            _ => {
                invalid.push("property_cost");
                if self.initial_payment.is_none() {
                    invalid.push("initial_payment");
                }
            }
        }
        if !CREDIT_TERM_OPTIONS.contains(&self.credit_term_years) {
            invalid.push("credit_term_years");
        }
        invalid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_personal_requires_everything() {
        let step = PersonalStep::default();
        assert_eq!(
            step.invalid_fields(),
            vec!["full_name", "phone", "email", "birth_date", "birth_place"]
        );
    }

    #[test]
    fn test_personal_accepts_formatted_phone() {
        let step = PersonalStep {
            full_name: "Иванов Иван Иванович".into(),
            phone: "+7 (999) 123-45-67".into(),
            email: "example@mail.ru".into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 17),
            birth_place: "г. Симферополь".into(),
        };
        assert!(step.validate().is_ok());
    }

    #[test]
    fn test_email_shapes() {
        assert!(plausible_email("a@b.ru"));
        assert!(!plausible_email("a@b"));
        assert!(!plausible_email("@b.ru"));
        assert!(!plausible_email("ab.ru"));
        assert!(!plausible_email("a@b."));
    }

    #[test]
    fn test_passport_optional_ids() {
        let mut step = PassportStep {
            series: "39 15".into(),
            number: "123456".into(),
            issue_date: NaiveDate::from_ymd_opt(2015, 3, 1),
            issuer: "ОУФМС".into(),
            registration_address: "Ялта, ул. Морская, 1".into(),
            inn: String::new(),
            snils: String::new(),
        };
        assert!(step.validate().is_ok());

        step.inn = "123".into();
        step.snils = "112-233-445 95".into();
        assert_eq!(step.invalid_fields(), vec!["inn"]);
    }

    #[test]
    fn test_unemployed_skips_job_fields() {
        let step = EmploymentStep {
            employment: Employment::Unemployed,
            ..EmploymentStep::default()
        };
        assert!(step.validate().is_ok());

        let step = EmploymentStep::default();
        assert_eq!(
            step.invalid_fields(),
            vec!["employer", "position", "work_experience_years", "monthly_income"]
        );
    }

    #[test]
    fn test_property_payment_must_be_below_cost() {
        let mut step = PropertyStep {
            property_address: "Севастополь".into(),
            property_cost: Some(dec!(5_000_000)),
            initial_payment: Some(dec!(5_000_000)),
            ..PropertyStep::default()
        };
        assert_eq!(step.invalid_fields(), vec!["initial_payment"]);

        step.initial_payment = Some(dec!(1_000_000));
        assert!(step.validate().is_ok());

        step.credit_term_years = 12;
        assert_eq!(step.invalid_fields(), vec!["credit_term_years"]);
    }

    #[test]
    fn test_children_wire_values() {
        assert_eq!(serde_json::to_string(&Children::FourOrMore).unwrap(), "\"4+\"");
        assert_eq!(serde_json::to_string(&Employment::SelfEmployed).unwrap(), "\"self-employed\"");
    }
}
