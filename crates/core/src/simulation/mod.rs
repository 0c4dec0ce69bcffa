//! Run orchestration
//!
//! `Stepper` advances the grid through time on whichever executor the solver
//! factory picked; `FieldSummary` condenses the final field for reporting.

mod stepper;
mod summary;

pub use stepper::{RunReport, Stepper, StepperState, DEFAULT_REPORT_INTERVAL};
pub use summary::FieldSummary;
