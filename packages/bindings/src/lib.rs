use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use mortgage_calc_core::calculator::{
    calculate_payment, CalculatorControls, CalculatorSession, PaymentInput,
};
use mortgage_calc_core::config::MortgageConfig;
use mortgage_calc_core::lead::{LeadForm, LeadRequest};
use mortgage_calc_core::MortgageResult;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Calculator state sent from the page: optional configuration plus the
/// current control values.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CalculatorRequest {
    config: MortgageConfig,
    #[serde(flatten)]
    controls: CalculatorControls,
}

impl CalculatorRequest {
    fn session(&self) -> MortgageResult<CalculatorSession> {
        self.config.validate()?;
        let mut session = CalculatorSession::from_config(&self.config)?;
        session.apply(&self.controls)?;
        Ok(session)
    }
}

#[derive(Debug, Deserialize)]
struct LeadBuildRequest {
    #[serde(default)]
    calculator: CalculatorRequest,
    form: LeadForm,
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_payment(input_json: String) -> NapiResult<String> {
    let input: PaymentInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = calculate_payment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: PaymentInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        mortgage_calc_core::calculator::amortization_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculator_view(input_json: String) -> NapiResult<String> {
    let request: CalculatorRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let session = request.session().map_err(to_napi_error)?;
    serde_json::to_string(&session.view()).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Lead
// ---------------------------------------------------------------------------

#[napi]
pub fn build_lead_request(input_json: String) -> NapiResult<String> {
    let request: LeadBuildRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let session = request.calculator.session().map_err(to_napi_error)?;
    let lead = LeadRequest::from_calculator(
        &session.snapshot(),
        &request.form,
        &request.calculator.config.lead.source,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&lead).map_err(to_napi_error)
}
