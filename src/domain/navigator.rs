use tracing::debug;

use crate::domain::{ChangeRequestForm, Step, StepValidation};

/// Signals emitted for the UI layer to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationEvent {
    /// Return the viewport to the top of the page.
    ScrollToTop,
}

/// The result of trying to move forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The navigator moved to the given step.
    Moved(Step),
    /// The current step did not validate.
    Blocked(StepValidation),
    /// Already on the last step.
    AtLastStep,
}

impl Advance {
    /// Whether the navigator moved.
    #[must_use]
    pub const fn moved(&self) -> bool {
        matches!(self, Self::Moved(_))
    }
}

/// Linear navigator over the nine form steps.
///
/// Going forward is gated on the current step's validator; going backward is
/// never gated. Out-of-range targets are ignored rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepNavigator {
    current: Step,
    events: Vec<NavigationEvent>,
}

impl Default for StepNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl StepNavigator {
    /// A navigator positioned on the first step.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: Step::Identification,
            events: Vec::new(),
        }
    }

    /// The step currently shown.
    #[must_use]
    pub const fn current(&self) -> Step {
        self.current
    }

    /// The total number of steps.
    #[must_use]
    pub const fn total_steps(&self) -> u8 {
        Step::TOTAL
    }

    /// Jumps to step `number`.
    ///
    /// Returns `false` and does nothing when `number` is outside `1..=9`.
    pub fn go_to_step(&mut self, number: u8) -> bool {
        let Some(step) = Step::from_number(number) else {
            debug!(number, "ignoring out-of-range step");
            return false;
        };
        self.move_to(step);
        true
    }

    /// Advances one step if the current one validates.
    pub fn next_step(&mut self, form: &ChangeRequestForm) -> Advance {
        let Some(next) = self.current.next() else {
            return Advance::AtLastStep;
        };
        let validation = self.current.validate(form);
        if !validation.valid {
            debug!(step = %self.current, reasons = ?validation.reasons, "step blocked");
            return Advance::Blocked(validation);
        }
        self.move_to(next);
        Advance::Moved(next)
    }

    /// Goes back one step. Returns `false` on the first step.
    pub fn previous_step(&mut self) -> bool {
        match self.current.previous() {
            Some(previous) => {
                self.move_to(previous);
                true
            }
            None => false,
        }
    }

    /// Whether step `number` currently validates.
    ///
    /// Numbers that name no step are reported as valid.
    #[must_use]
    pub fn is_step_valid(&self, number: u8, form: &ChangeRequestForm) -> bool {
        Step::from_number(number).is_none_or(|step| step.validate(form).valid)
    }

    /// Returns to the first step.
    pub fn reset(&mut self) {
        self.move_to(Step::Identification);
    }

    /// Drains the events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<NavigationEvent> {
        std::mem::take(&mut self.events)
    }

    fn move_to(&mut self, step: Step) {
        self.current = step;
        self.events.push(NavigationEvent::ScrollToTop);
    }
}
