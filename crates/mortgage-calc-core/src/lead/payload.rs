//! Wire shapes for the external lead endpoint.

use serde::{Deserialize, Serialize};

use crate::calculator::display::DisplayFormat;
use crate::calculator::session::CalculatorSnapshot;
use crate::error::MortgageError;
use crate::MortgageResult;

/// Contact details typed into the application dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub comment: String,
}

impl LeadForm {
    /// Name, phone and email are required.
    pub fn validate(&self) -> MortgageResult<()> {
        let missing: Vec<&str> = [
            ("name", &self.name),
            ("phone", &self.phone),
            ("email", &self.email),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(MortgageError::Validation(format!(
                "Required fields missing: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Body POSTed to the lead endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRequest {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub city: String,
    pub service_type: String,
    pub message: String,
    pub source: String,
}

impl LeadRequest {
    /// Package a calculator snapshot and contact form into the endpoint's
    /// format. Loan terms travel only inside the human-readable `message`.
    pub fn from_calculator(
        snapshot: &CalculatorSnapshot,
        form: &LeadForm,
        source: &str,
    ) -> MortgageResult<Self> {
        form.validate()?;
        Ok(Self {
            name: form.name.trim().to_string(),
            phone: form.phone.trim().to_string(),
            email: form.email.trim().to_string(),
            city: String::new(),
            service_type: format!("Программа: {}", snapshot.program_id),
            message: format!(
                "Сумма: {} ₽, Срок: {} лет. {}",
                DisplayFormat::russian().group(snapshot.home_price),
                snapshot.term_years,
                form.comment
            ),
            source: source.to_string(),
        })
    }
}

/// Endpoint reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}
