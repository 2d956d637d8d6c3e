//! Lead submission: turns the calculator's state and the contact form into
//! the external endpoint's request and its reply into a notification.

pub mod client;
pub mod notification;
pub mod payload;

pub use client::{submit_lead, LeadClient};
pub use notification::{Notification, NotificationVariant};
pub use payload::{LeadForm, LeadRequest, LeadResponse};
