//! HTTP client for the lead and registration endpoints.

use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

use crate::calculator::session::CalculatorSnapshot;
use crate::config::LeadSettings;
use crate::error::MortgageError;
use crate::lead::notification::Notification;
use crate::lead::payload::{LeadForm, LeadRequest, LeadResponse};
use crate::MortgageResult;

#[cfg(feature = "application")]
use crate::application::RegistrationPayload;

const DEFAULT_REJECTION: &str = "Ошибка отправки";

/// Posts leads and applications. Each call is one independent request with
/// no retry.
#[derive(Debug, Clone)]
pub struct LeadClient {
    client: Client,
    endpoint: String,
    registration_endpoint: Option<String>,
}

impl LeadClient {
    pub fn new(endpoint: &str, timeout: Duration) -> MortgageResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, endpoint))
    }

    /// Wrap an already configured `reqwest::Client`.
    pub fn with_client(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.trim().to_string(),
            registration_endpoint: None,
        }
    }

    pub fn from_settings(settings: &LeadSettings) -> MortgageResult<Self> {
        let endpoint = settings
            .endpoint
            .as_deref()
            .ok_or_else(|| MortgageError::Config("lead.endpoint is not configured".into()))?;
        let mut client = Self::new(endpoint, settings.timeout())?;
        client.registration_endpoint = settings.registration_endpoint.clone();
        Ok(client)
    }

    pub fn with_registration_endpoint(mut self, endpoint: &str) -> Self {
        self.registration_endpoint = Some(endpoint.trim().to_string());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST a lead. The endpoint answers `{success, error?}`; anything other
    /// than `success: true` is an error.
    pub async fn submit(&self, request: &LeadRequest) -> MortgageResult<()> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let reply: LeadResponse = serde_json::from_str(&body).map_err(|_| {
            MortgageError::Http(format!("Unexpected response from lead endpoint ({status})"))
        })?;

        if reply.success {
            Ok(())
        } else {
            Err(MortgageError::LeadRejected(
                reply.error.unwrap_or_else(|| DEFAULT_REJECTION.to_string()),
            ))
        }
    }

    /// POST a completed mortgage application. Success is judged by HTTP status.
    #[cfg(feature = "application")]
    pub async fn submit_application(&self, payload: &RegistrationPayload) -> MortgageResult<()> {
        let url = self.registration_endpoint.as_deref().ok_or_else(|| {
            MortgageError::Config("lead.registration_endpoint is not configured".into())
        })?;
        let response = self.client.post(url).json(payload).send().await?;
        let status = response.status();

        if status.is_success() {
            info!(%status, "application submitted");
            Ok(())
        } else {
            Err(MortgageError::Http(format!(
                "Registration endpoint returned {}",
                status.as_u16()
            )))
        }
    }
}

/// Validate, package and send a calculator lead, reducing every outcome to a
/// user-facing notification. Never fails; the calculator stays usable.
pub async fn submit_lead(
    client: &LeadClient,
    settings: &LeadSettings,
    snapshot: &CalculatorSnapshot,
    form: &LeadForm,
) -> Notification {
    let request = match LeadRequest::from_calculator(snapshot, form, &settings.source) {
        Ok(request) => request,
        Err(_) => return Notification::missing_fields(),
    };

    match client.submit(&request).await {
        Ok(()) => {
            info!(
                program = %snapshot.program_id,
                monthly_payment = %snapshot.monthly_payment,
                "lead submitted"
            );
            Notification::submitted(&form.name)
        }
        Err(e) => {
            warn!(error = %e, endpoint = %client.endpoint(), "lead submission failed");
            Notification::failed(&settings.contact_phone)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings_requires_endpoint() {
        let err = LeadClient::from_settings(&LeadSettings::default()).unwrap_err();
        assert!(matches!(err, MortgageError::Config(_)));
    }

    #[test]
    fn test_endpoint_is_trimmed() {
        let settings = LeadSettings {
            endpoint: Some(" https://leads.example.com/submit ".into()),
            ..LeadSettings::default()
        };
        let client = LeadClient::from_settings(&settings).unwrap();
        assert_eq!(client.endpoint(), "https://leads.example.com/submit");
    }
}
