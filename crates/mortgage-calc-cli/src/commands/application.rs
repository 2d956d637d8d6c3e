use chrono::Utc;
use clap::Args;
use serde_json::{json, Value};

use mortgage_calc_core::application::{ApplicationDraft, ApplicationWizard};
use mortgage_calc_core::config::MortgageConfig;
use mortgage_calc_core::lead::LeadClient;

use crate::commands::runtime;
use crate::input;

/// Arguments for submitting a mortgage application
#[derive(Args)]
pub struct ApplyArgs {
    /// Path to the JSON application (personal, passport, employment, property)
    #[arg(long)]
    pub input: Option<String>,

    /// Registration endpoint URL (overrides lead.registration_endpoint)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Validate and print the payload without sending it
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run_apply(config: &MortgageConfig, args: ApplyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let draft: ApplicationDraft = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(draft) = input::stdin::read_stdin()? {
        draft
    } else {
        return Err("--input file is required for an application (or pipe JSON on stdin)".into());
    };

    let mut wizard = ApplicationWizard::from_draft(draft);
    wizard.advance_to_end()?;
    let payload = wizard.submit(Utc::now())?;

    if args.dry_run {
        return Ok(serde_json::to_value(payload)?);
    }

    let url = args
        .endpoint
        .or_else(|| config.lead.registration_endpoint.clone())
        .ok_or("--endpoint is required (or set lead.registration_endpoint)")?;
    let lead_endpoint = config.lead.endpoint.as_deref().unwrap_or_default();
    let client = LeadClient::new(lead_endpoint, config.lead.timeout())?.with_registration_endpoint(&url);
    runtime()?.block_on(client.submit_application(&payload))?;

    Ok(json!({
        "submitted": true,
        "full_name": payload.full_name,
        "timestamp": payload.timestamp,
    }))
}
