//! Application orchestration layer
//!
//! Coordinates between the domain, storage and UI layers. Holds the wizard
//! state machine and the controller that owns the plan for a session.

pub mod controller;
pub mod state;

pub use controller::{AppError, ExportReport, PlanController};
pub use state::{StepEvent, StepMachine, WizardState, WizardStep};
