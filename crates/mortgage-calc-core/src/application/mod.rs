//! Multi-step mortgage application form.

pub mod steps;
pub mod wizard;

pub use steps::{
    Children, Employment, EmploymentStep, MaritalStatus, PassportStep, PersonalStep,
    PropertyStep, PropertyType, StepValidation, CREDIT_TERM_OPTIONS,
};
pub use wizard::{ApplicationDraft, ApplicationWizard, RegistrationPayload, WizardStep};
