use clap::Args;
use serde_json::Value;

use mortgage_calc_core::config::MortgageConfig;
use mortgage_calc_core::lead::{submit_lead, LeadClient, LeadForm, LeadRequest};

use crate::commands::calculator::{build_session, CalcArgs};
use crate::commands::runtime;

/// Arguments for submitting a calculator lead
#[derive(Args)]
pub struct LeadArgs {
    #[command(flatten)]
    pub calc: CalcArgs,

    /// Contact name
    #[arg(long, default_value = "")]
    pub name: String,

    /// Contact phone
    #[arg(long, default_value = "")]
    pub phone: String,

    /// Contact email
    #[arg(long, default_value = "")]
    pub email: String,

    /// Free-text comment appended to the message
    #[arg(long, default_value = "")]
    pub comment: String,

    /// Lead endpoint URL (overrides lead.endpoint from the config)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Print the request instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run_lead(config: &MortgageConfig, args: LeadArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let snapshot = build_session(config, &args.calc)?.snapshot();
    let form = LeadForm {
        name: args.name,
        phone: args.phone,
        email: args.email,
        comment: args.comment,
    };

    if args.dry_run {
        let request = LeadRequest::from_calculator(&snapshot, &form, &config.lead.source)?;
        return Ok(serde_json::to_value(request)?);
    }

    let mut settings = config.lead.clone();
    if let Some(endpoint) = args.endpoint {
        settings.endpoint = Some(endpoint);
    }
    let client = LeadClient::from_settings(&settings)?;
    let notification = runtime()?.block_on(submit_lead(&client, &settings, &snapshot, &form));

    if notification.is_success() {
        Ok(serde_json::to_value(notification)?)
    } else {
        Err(format!("{}. {}", notification.title, notification.description).into())
    }
}
