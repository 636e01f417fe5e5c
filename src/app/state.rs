//! Wizard state management
//!
//! Defines the step cursor and the transitions between steps. The cursor is
//! always clamped to the available steps; once the plan is finished the state
//! no longer changes.

use crate::domain::plan::PlanSection;

/// Number of steps in the wizard, one per plan section
pub const STEP_COUNT: usize = PlanSection::ALL.len();

/// 1-based step cursor, always within `1..=STEP_COUNT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WizardStep(usize);

impl WizardStep {
    pub const FIRST: WizardStep = WizardStep(1);
    pub const LAST: WizardStep = WizardStep(STEP_COUNT);

    /// Creates a step, clamping out-of-range values
    pub fn new(step: usize) -> Self {
        Self(step.clamp(1, STEP_COUNT))
    }

    pub fn number(self) -> usize {
        self.0
    }

    pub fn is_last(self) -> bool {
        self == Self::LAST
    }

    /// Section edited on this step
    pub fn section(self) -> PlanSection {
        PlanSection::ALL[self.0 - 1]
    }

    /// Fraction of the wizard completed, for a progress bar
    pub fn progress(self) -> f32 {
        self.0 as f32 / STEP_COUNT as f32
    }

    fn next(self) -> Self {
        Self::new(self.0 + 1)
    }

    fn previous(self) -> Self {
        Self::new(self.0.saturating_sub(1))
    }
}

impl Default for WizardStep {
    fn default() -> Self {
        Self::FIRST
    }
}

/// Wizard state - editing a step, or finished and frozen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    /// User is filling in the given step
    Editing(WizardStep),
    /// Export has begun; the plan no longer changes
    Finished,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::Editing(WizardStep::FIRST)
    }
}

impl WizardState {
    pub fn step(&self) -> Option<WizardStep> {
        match self {
            WizardState::Editing(step) => Some(*step),
            WizardState::Finished => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, WizardState::Finished)
    }

    /// Event bound to the wizard's forward button on the current step
    pub fn primary_action(&self) -> Option<StepEvent> {
        match self {
            WizardState::Editing(step) if step.is_last() => Some(StepEvent::Finish),
            WizardState::Editing(_) => Some(StepEvent::Next),
            WizardState::Finished => None,
        }
    }
}

/// Possible state transition events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    /// Move to the next step
    Next,
    /// Move to the previous step
    Previous,
    /// Complete the plan and export it
    Finish,
}

/// State machine for wizard transitions
pub struct StepMachine;

impl StepMachine {
    /// Processes an event and returns the new state
    ///
    /// `Finish` only completes the wizard from the last step; anywhere else
    /// it is ignored, as are all events once finished.
    pub fn process_event(current: WizardState, event: StepEvent) -> WizardState {
        let next = match (current, event) {
            (WizardState::Editing(step), StepEvent::Next) => WizardState::Editing(step.next()),
            (WizardState::Editing(step), StepEvent::Previous) => {
                WizardState::Editing(step.previous())
            }
            (WizardState::Editing(step), StepEvent::Finish) if step.is_last() => {
                WizardState::Finished
            }
            (state, _) => state,
        };

        if next != current {
            tracing::debug!(from = ?current, to = ?next, ?event, "wizard transition");
        }
        next
    }
}
