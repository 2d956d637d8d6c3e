//! Step-by-step mortgage application.
//!
//! Moving forward validates the step being left; moving back never does.
//! Submission re-validates every step and produces the registration
//! endpoint's payload.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::steps::{
    EmploymentStep, PassportStep, PersonalStep, PropertyStep, StepValidation,
};
use crate::error::MortgageError;
use crate::MortgageResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    #[default]
    Personal,
    Passport,
    Employment,
    Property,
}

impl WizardStep {
    pub const COUNT: u8 = 4;

    /// 1-based position shown in the step indicator.
    pub fn number(self) -> u8 {
        match self {
            WizardStep::Personal => 1,
            WizardStep::Passport => 2,
            WizardStep::Employment => 3,
            WizardStep::Property => 4,
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            WizardStep::Personal => Some(WizardStep::Passport),
            WizardStep::Passport => Some(WizardStep::Employment),
            WizardStep::Employment => Some(WizardStep::Property),
            WizardStep::Property => None,
        }
    }

    fn previous(self) -> Option<Self> {
        match self {
            WizardStep::Personal => None,
            WizardStep::Passport => Some(WizardStep::Personal),
            WizardStep::Employment => Some(WizardStep::Passport),
            WizardStep::Property => Some(WizardStep::Employment),
        }
    }
}

/// Everything entered so far, complete or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationDraft {
    pub personal: PersonalStep,
    pub passport: PassportStep,
    pub employment: EmploymentStep,
    pub property: PropertyStep,
}

impl ApplicationDraft {
    fn validate_step(&self, step: WizardStep) -> MortgageResult<()> {
        let result = match step {
            WizardStep::Personal => self.personal.validate(),
            WizardStep::Passport => self.passport.validate(),
            WizardStep::Employment => self.employment.validate(),
            WizardStep::Property => self.property.validate(),
        };
        result.map_err(|e| match e {
            MortgageError::Validation(msg) => MortgageError::Validation(format!(
                "step {} of {}: {}",
                step.number(),
                WizardStep::COUNT,
                msg
            )),
            other => other,
        })
    }
}

/// Body POSTed to the registration endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub passport_series: String,
    pub passport_number: String,
    pub passport_date: String,
    pub passport_issuer: String,
    pub birth_date: String,
    pub birth_place: String,
    pub registration_address: String,
    pub inn: String,
    pub snils: String,
    pub marital_status: String,
    pub children: String,
    pub employment: String,
    pub employer: String,
    pub position: String,
    pub work_experience: String,
    pub monthly_income: String,
    pub property_type: String,
    pub property_address: String,
    pub property_cost: String,
    pub initial_payment: String,
    pub credit_term: String,
    pub additional_info: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationWizard {
    step: WizardStep,
    draft: ApplicationDraft,
}

impl ApplicationWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_draft(draft: ApplicationDraft) -> Self {
        Self {
            step: WizardStep::Personal,
            draft,
        }
    }

    pub fn current_step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &ApplicationDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ApplicationDraft {
        &mut self.draft
    }

    /// Validate the current step and move to the next one. On the last step
    /// a successful validation leaves the wizard where it is.
    pub fn advance(&mut self) -> MortgageResult<WizardStep> {
        let current = self.current_step();
        self.draft.validate_step(current)?;
        let next = current.next().unwrap_or(current);
        debug!(from = current.number(), to = next.number(), "application step advanced");
        self.step = next;
        Ok(next)
    }

    pub fn back(&mut self) -> WizardStep {
        let current = self.current_step();
        let previous = current.previous().unwrap_or(current);
        self.step = previous;
        previous
    }

    /// Walk forward until the last step, stopping at the first invalid one.
    pub fn advance_to_end(&mut self) -> MortgageResult<WizardStep> {
        while self.current_step() != WizardStep::Property {
            self.advance()?;
        }
        Ok(WizardStep::Property)
    }

    /// Build the registration payload. Only possible from the last step and
    /// only when every step validates.
    pub fn submit(&self, submitted_at: DateTime<Utc>) -> MortgageResult<RegistrationPayload> {
        if self.current_step() != WizardStep::Property {
            return Err(MortgageError::Validation(format!(
                "application is on step {} of {}",
                self.current_step().number(),
                WizardStep::COUNT
            )));
        }
        for step in [
            WizardStep::Personal,
            WizardStep::Passport,
            WizardStep::Employment,
            WizardStep::Property,
        ] {
            self.draft.validate_step(step)?;
        }

        let d = &self.draft;
        Ok(RegistrationPayload {
            kind: "registration".into(),
            full_name: d.personal.full_name.trim().to_string(),
            phone: d.personal.phone.trim().to_string(),
            email: d.personal.email.trim().to_string(),
            passport_series: d.passport.series.trim().to_string(),
            passport_number: d.passport.number.trim().to_string(),
            passport_date: date_text(d.passport.issue_date),
            passport_issuer: d.passport.issuer.trim().to_string(),
            birth_date: date_text(d.personal.birth_date),
            birth_place: d.personal.birth_place.trim().to_string(),
            registration_address: d.passport.registration_address.trim().to_string(),
            inn: d.passport.inn.trim().to_string(),
            snils: d.passport.snils.trim().to_string(),
            marital_status: wire_name(&d.employment.marital_status),
            children: wire_name(&d.employment.children),
            employment: wire_name(&d.employment.employment),
            employer: d.employment.employer.trim().to_string(),
            position: d.employment.position.trim().to_string(),
            work_experience: d
                .employment
                .work_experience_years
                .map(|y| y.to_string())
                .unwrap_or_default(),
            monthly_income: d
                .employment
                .monthly_income
                .map(|m| m.to_string())
                .unwrap_or_default(),
            property_type: wire_name(&d.property.property_type),
            property_address: d.property.property_address.trim().to_string(),
            property_cost: d.property.property_cost.map(|m| m.to_string()).unwrap_or_default(),
            initial_payment: d
                .property
                .initial_payment
                .map(|m| m.to_string())
                .unwrap_or_default(),
            credit_term: d.property.credit_term_years.to_string(),
            additional_info: d.property.additional_info.trim().to_string(),
            timestamp: submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

fn date_text(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// The serde name of a unit enum variant, e.g. `"self-employed"`.
fn wire_name<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}
