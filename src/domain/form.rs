//! The canonical in-memory shape of a change request.
//!
//! Every leaf is a plain [`String`]. Controlled vocabularies (request type,
//! urgency, technology area, ...) are kept as strings rather than closed
//! types, because the backend round-trips whatever free text it was given.

use serde::{Deserialize, Serialize};

use crate::domain::{Attachment, Step, StepValidation};

/// A change request ("RDM") as captured by the multi-step form.
///
/// Instances are created empty with [`ChangeRequestForm::empty`] and are then
/// populated wholesale, either field by field from user input or by decoding
/// a record fetched from the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangeRequestForm {
    /// Section 1: what kind of change this is.
    pub identification: Identification,
    /// Section 2: the objective or proposed solution.
    pub solution: Solution,
    /// Section 3: categorisation.
    pub category: Category,
    /// Section 4: systems and services affected.
    pub impact_category: ImpactCategory,
    /// Section 5: the deployment window.
    pub deployment_window: DeploymentWindow,
    /// Section 6: who is told, when and how.
    pub plan_communication: PlanCommunication,
    /// Section 7: the four implementation phases.
    pub phases: Phases,
    /// Section 8a: the execution plan.
    pub planning_execution: PlanningDetails,
    /// Section 8b: the remediation (rollback) plan.
    pub planning_remediation: PlanningDetails,
    /// Section 9: an optional archive, only used when creating a request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
}

/// Type and title of the change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Identification {
    /// Request type (`Emergencial`, `Normal`, `Padrão`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Short title.
    pub title: String,
}

/// The objective of the change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Solution {
    /// Free-text objective or proposed solution.
    pub objective_or_solution: String,
}

/// Categorisation of the change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    /// Objective type.
    pub objective: String,
    /// Action type.
    pub action: String,
    /// Impact level.
    pub impact: String,
    /// Urgency level.
    pub urgency: String,
}

/// What the change touches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImpactCategory {
    /// The system being changed.
    pub change_system: String,
    /// The activity performed.
    pub activity: String,
    /// Services affected by the change.
    pub impacted_services: String,
    /// Target environment.
    pub environment: String,
    /// Configuration items affected.
    pub ics_impacted: String,
}

/// When the change is deployed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentWindow {
    /// Kind of impact expected during the window.
    pub impact_type: String,
}

/// Communication plan for the change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanCommunication {
    /// Who is notified.
    pub who_is_notified: String,
    /// When they are notified.
    pub moment: String,
    /// The channel used.
    pub communication_type: String,
    /// Responsible technology area.
    pub technology_area: String,
}

/// The four fixed implementation phases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Phases {
    /// Planning.
    pub planning: PhaseRecord,
    /// Test / homologation.
    pub test_homology: PhaseRecord,
    /// Execution.
    pub execute: PhaseRecord,
    /// Validation.
    pub validation: PhaseRecord,
}

impl Phases {
    /// The phases in wire order, paired with their backend key.
    #[must_use]
    pub fn iter(&self) -> std::array::IntoIter<(&'static str, &PhaseRecord), 4> {
        self.into_iter()
    }
}

impl<'a> IntoIterator for &'a Phases {
    type Item = (&'static str, &'a PhaseRecord);
    type IntoIter = std::array::IntoIter<Self::Item, 4>;

    fn into_iter(self) -> Self::IntoIter {
        [
            ("planning", &self.planning),
            ("testHomology", &self.test_homology),
            ("execute", &self.execute),
            ("validation", &self.validation),
        ]
        .into_iter()
    }
}

/// A single phase.
///
/// The fields are used polymorphically: `planning` uses `was_planned` and
/// `justification_planned`, `test_homology` uses `was_tested` and
/// `justification_test`, while `execute` and `validation` use `stage` and the
/// two dates.
///
/// Dates are held in local `YYYY-MM-DDTHH:mm` form while editing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhaseRecord {
    /// Whether planning took place.
    pub was_planned: String,
    /// Justification when planning was skipped.
    pub justification_planned: String,
    /// Whether testing took place.
    pub was_tested: String,
    /// Justification when testing was skipped.
    pub justification_test: String,
    /// The stage the phase happens in (`Antes`, `Durante`, `Depois`).
    pub stage: String,
    /// Local start date-time.
    pub start_date: String,
    /// Local end date-time.
    pub end_date: String,
}

/// Execution or remediation planning details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanningDetails {
    /// Description of the planned activity.
    pub activity: String,
    /// Responsible technology area.
    pub technology_area: String,
    /// Estimated probability of success.
    pub probability_of_success: String,
}

impl ChangeRequestForm {
    /// Creates a form with every leaf set to the empty string.
    ///
    /// Each call allocates a fresh, independent instance.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validates a single step against this form.
    #[must_use]
    pub fn validate_step(&self, step: Step) -> StepValidation {
        step.validate(self)
    }

    /// Whether the form may be submitted.
    ///
    /// Only steps 1 and 2 carry blocking rules.
    #[must_use]
    pub fn is_submittable(&self) -> bool {
        Step::ALL.iter().all(|step| step.validate(self).valid)
    }

    /// Collects the reasons that keep the form from being submitted.
    #[must_use]
    pub fn blocking_reasons(&self) -> Vec<String> {
        Step::ALL
            .iter()
            .flat_map(|step| step.validate(self).reasons)
            .collect()
    }
}
