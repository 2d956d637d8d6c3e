//! Mortgage affordability calculator: annuity engine, input constraints,
//! program table and the formatted view.

pub mod display;
pub mod engine;
pub mod inputs;
pub mod programs;
pub mod session;

pub use display::{DisplayFormat, DisplayLocale, TermWords};
pub use engine::{
    amortization_schedule, calculate_payment, compute_payment, AmortizationRow,
    AmortizationSchedule, LoanResult, PaymentInput,
};
pub use inputs::LoanInputs;
pub use programs::{Program, ProgramTable, RatePolicy};
pub use session::{CalculatorControls, CalculatorSession, CalculatorSnapshot, CalculatorView};
