use std::fmt;

use serde::Serialize;

use crate::domain::ChangeRequestForm;

/// One of the nine ordered steps of the change-request form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    /// Type and title.
    Identification = 1,
    /// Objective or solution.
    Solution = 2,
    /// Categorisation.
    Category = 3,
    /// Impact.
    ImpactCategory = 4,
    /// Deployment window.
    DeploymentWindow = 5,
    /// Communication plan.
    PlanCommunication = 6,
    /// Implementation phases.
    Phases = 7,
    /// Execution and remediation planning.
    Planning = 8,
    /// Attachments.
    Attachments = 9,
}

impl Step {
    /// The number of steps.
    pub const TOTAL: u8 = 9;

    /// Every step, in order.
    pub const ALL: [Self; 9] = [
        Self::Identification,
        Self::Solution,
        Self::Category,
        Self::ImpactCategory,
        Self::DeploymentWindow,
        Self::PlanCommunication,
        Self::Phases,
        Self::Planning,
        Self::Attachments,
    ];

    /// Looks up a step by its 1-based number.
    #[must_use]
    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.get(usize::from(number).checked_sub(1)?).copied()
    }

    /// The 1-based step number.
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// The label shown in the step indicator.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Identification => "Identificação",
            Self::Solution => "Objetivo",
            Self::Category => "Categorização",
            Self::ImpactCategory => "Impacto",
            Self::DeploymentWindow => "Janela",
            Self::PlanCommunication => "Comunicação",
            Self::Phases => "Fases",
            Self::Planning => "Planejamento",
            Self::Attachments => "Anexos",
        }
    }

    /// The form section key this step edits.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Identification => "identification",
            Self::Solution => "solution",
            Self::Category => "category",
            Self::ImpactCategory => "impactCategory",
            Self::DeploymentWindow => "deploymentWindow",
            Self::PlanCommunication => "planComunication",
            Self::Phases => "phases",
            Self::Planning => "planning",
            Self::Attachments => "attachments",
        }
    }

    /// The step after this one, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    /// The step before this one, if any.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        Self::from_number(self.number().checked_sub(1)?)
    }

    /// Runs this step's validator against the form.
    ///
    /// Only the identification and solution steps have blocking rules; the
    /// remaining sections are optional.
    #[must_use]
    pub fn validate(self, form: &ChangeRequestForm) -> StepValidation {
        match self {
            Self::Identification => {
                let mut reasons = Vec::new();
                if form.identification.title.trim().is_empty() {
                    reasons.push("identification.title is required".to_string());
                }
                if form.identification.kind.is_empty() {
                    reasons.push("identification.type is required".to_string());
                }
                StepValidation::from_reasons(reasons)
            }
            Self::Solution => {
                if form.solution.objective_or_solution.trim().is_empty() {
                    StepValidation::invalid("solution.objectiveOrSolution is required")
                } else {
                    StepValidation::valid()
                }
            }
            Self::Category
            | Self::ImpactCategory
            | Self::DeploymentWindow
            | Self::PlanCommunication
            | Self::Phases
            | Self::Planning
            | Self::Attachments => StepValidation::valid(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.number(), self.label())
    }
}

/// The outcome of validating a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepValidation {
    /// Whether the step may be left going forward.
    pub valid: bool,
    /// Human-readable reasons when it may not.
    pub reasons: Vec<String>,
}

impl StepValidation {
    /// A passing validation.
    #[must_use]
    pub const fn valid() -> Self {
        Self {
            valid: true,
            reasons: Vec::new(),
        }
    }

    /// A failing validation with a single reason.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reasons: vec![reason.into()],
        }
    }

    fn from_reasons(reasons: Vec<String>) -> Self {
        Self {
            valid: reasons.is_empty(),
            reasons,
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn numbers_round_trip() {
        for step in Step::ALL {
            assert_eq!(Step::from_number(step.number()), Some(step));
        }
        assert_eq!(Step::from_number(0), None);
        assert_eq!(Step::from_number(10), None);
    }

    #[test]
    fn neighbours() {
        assert_eq!(Step::Identification.previous(), None);
        assert_eq!(Step::Identification.next(), Some(Step::Solution));
        assert_eq!(Step::Attachments.next(), None);
        assert_eq!(Step::Attachments.previous(), Some(Step::Planning));
    }

    #[test_case("", "", false; "both missing")]
    #[test_case("x", "", false; "type missing")]
    #[test_case("   ", "Normal", false; "blank title")]
    #[test_case("x", "Normal", true; "complete")]
    fn identification_rules(title: &str, kind: &str, expected: bool) {
        let mut form = ChangeRequestForm::empty();
        form.identification.title = title.to_string();
        form.identification.kind = kind.to_string();
        assert_eq!(Step::Identification.validate(&form).valid, expected);
    }

    #[test]
    fn solution_rule_trims() {
        let mut form = ChangeRequestForm::empty();
        form.solution.objective_or_solution = " \t".to_string();
        let validation = Step::Solution.validate(&form);
        assert!(!validation.valid);
        assert_eq!(validation.reasons.len(), 1);

        form.solution.objective_or_solution = "Replace switch".to_string();
        assert_eq!(Step::Solution.validate(&form), StepValidation::valid());
    }

    #[test]
    fn optional_steps_pass_on_empty_form() {
        let form = ChangeRequestForm::empty();
        for step in &Step::ALL[2..] {
            assert!(step.validate(&form).valid, "{step} should be optional");
        }
    }

    #[test]
    fn display_includes_number_and_label() {
        assert_eq!(Step::Phases.to_string(), "7. Fases");
    }
}
