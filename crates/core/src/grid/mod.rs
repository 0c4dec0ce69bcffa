//! Grid fields and initial state

mod field;
mod state;

pub use field::ScalarField;
pub use state::GridState;
