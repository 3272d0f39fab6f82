use chrono::FixedOffset;
use serde::Serialize;

use crate::{
    codec::dates::local_to_iso,
    domain::{ChangeRequestForm, PhaseRecord, PlanningDetails},
};

/// The JSON body sent when an existing request is edited.
///
/// Keys follow the backend's record shape, misspellings included. Every leaf
/// is always present, and `attachments` is always `null` because edits never
/// resend files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayload {
    /// Type and title.
    pub identification: IdentificationPayload,
    /// Objective.
    pub solution: SolutionPayload,
    /// Categorisation.
    pub category: CategoryPayload,
    /// Affected systems.
    pub impact_category: ImpactCategoryPayload,
    /// Deployment window.
    pub deployment_window: DeploymentWindowPayload,
    /// Communication plan.
    #[serde(rename = "planComunication")]
    pub plan_communication: PlanCommunicationPayload,
    /// The four phases.
    pub phases: PhasesPayload,
    /// Execution plan.
    #[serde(rename = "planningExecutation")]
    pub planning_execution: PlanningPayload,
    /// Remediation plan.
    pub planning_remediation: PlanningPayload,
    /// Always `None`.
    pub attachments: Option<()>,
}

/// `identification` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentificationPayload {
    /// Request type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Title.
    pub title: String,
}

/// `solution` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionPayload {
    /// What the change sets out to do.
    pub objective_or_solution: String,
}

/// `category` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryPayload {
    /// Objective.
    pub objective: String,
    /// Action.
    pub action: String,
    /// Impact level.
    pub impact: String,
    /// Urgency level.
    pub urgency: String,
}

/// `impactCategory` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactCategoryPayload {
    /// System being changed.
    pub change_system: String,
    /// Kind of activity.
    pub activity: String,
    /// Services affected.
    pub impacted_services: String,
    /// Target environment.
    pub environment: String,
    /// Configuration items affected.
    #[serde(rename = "iCsImpacted")]
    pub ics_impacted: String,
}

/// `deploymentWindow` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentWindowPayload {
    /// Impact during the window.
    pub impact_type: String,
}

/// `planComunication` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanCommunicationPayload {
    /// Who is notified.
    #[serde(rename = "whosNotified")]
    pub who_is_notified: String,
    /// When they are notified.
    pub moment: String,
    /// Channel.
    #[serde(rename = "comunicationType")]
    pub communication_type: String,
    /// Responsible area.
    pub technology_area: String,
}

/// The four phases, each in its own shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhasesPayload {
    /// Planning.
    pub planning: PlannedPhase,
    /// Homologation testing.
    pub test_homology: TestedPhase,
    /// Execution.
    pub execute: ScheduledPhase,
    /// Validation.
    pub validation: ScheduledPhase,
}

/// The planning phase: whether it happened, and why not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedPhase {
    /// Whether planning took place.
    pub was_planned: String,
    /// Why not, when it did not.
    pub justification: String,
}

/// The test phase: whether it happened, and why not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestedPhase {
    /// Whether testing took place.
    pub was_tested: String,
    /// Why not, when it did not.
    pub justification: String,
}

/// A phase with a stage and a UTC time range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPhase {
    /// Stage.
    pub stage: String,
    /// UTC start, or empty.
    pub start_date: String,
    /// UTC end, or empty.
    pub end_date: String,
}

impl ScheduledPhase {
    fn from_record(record: &PhaseRecord, offset: FixedOffset) -> Self {
        Self {
            stage: record.stage.clone(),
            start_date: local_to_iso(&record.start_date, offset),
            end_date: local_to_iso(&record.end_date, offset),
        }
    }
}

/// `planningExecutation` or `planningRemediation` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningPayload {
    /// Planned activity.
    #[serde(rename = "ativity")]
    pub activity: String,
    /// Responsible area.
    pub technology_area: String,
    /// Estimated probability of success.
    pub probability_of_success: String,
}

impl From<&PlanningDetails> for PlanningPayload {
    fn from(details: &PlanningDetails) -> Self {
        Self {
            activity: details.activity.clone(),
            technology_area: details.technology_area.clone(),
            probability_of_success: details.probability_of_success.clone(),
        }
    }
}

/// Encodes a form as the JSON body of an edit.
///
/// Phase dates are converted to UTC; unparseable dates are sent empty.
#[must_use]
pub fn encode_update(form: &ChangeRequestForm, offset: FixedOffset) -> UpdatePayload {
    let phases = &form.phases;

    UpdatePayload {
        identification: IdentificationPayload {
            kind: form.identification.kind.clone(),
            title: form.identification.title.clone(),
        },
        solution: SolutionPayload {
            objective_or_solution: form.solution.objective_or_solution.clone(),
        },
        category: CategoryPayload {
            objective: form.category.objective.clone(),
            action: form.category.action.clone(),
            impact: form.category.impact.clone(),
            urgency: form.category.urgency.clone(),
        },
        impact_category: ImpactCategoryPayload {
            change_system: form.impact_category.change_system.clone(),
            activity: form.impact_category.activity.clone(),
            impacted_services: form.impact_category.impacted_services.clone(),
            environment: form.impact_category.environment.clone(),
            ics_impacted: form.impact_category.ics_impacted.clone(),
        },
        deployment_window: DeploymentWindowPayload {
            impact_type: form.deployment_window.impact_type.clone(),
        },
        plan_communication: PlanCommunicationPayload {
            who_is_notified: form.plan_communication.who_is_notified.clone(),
            moment: form.plan_communication.moment.clone(),
            communication_type: form.plan_communication.communication_type.clone(),
            technology_area: form.plan_communication.technology_area.clone(),
        },
        phases: PhasesPayload {
            planning: PlannedPhase {
                was_planned: phases.planning.was_planned.clone(),
                justification: phases.planning.justification_planned.clone(),
            },
            test_homology: TestedPhase {
                was_tested: phases.test_homology.was_tested.clone(),
                justification: phases.test_homology.justification_test.clone(),
            },
            execute: ScheduledPhase::from_record(&phases.execute, offset),
            validation: ScheduledPhase::from_record(&phases.validation, offset),
        },
        planning_execution: PlanningPayload::from(&form.planning_execution),
        planning_remediation: PlanningPayload::from(&form.planning_remediation),
        attachments: None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    #[test]
    fn empty_form_sends_every_leaf() {
        let value = serde_json::to_value(encode_update(&ChangeRequestForm::empty(), brt())).unwrap();

        assert_eq!(
            value,
            json!({
                "identification": {"type": "", "title": ""},
                "solution": {"objectiveOrSolution": ""},
                "category": {"objective": "", "action": "", "impact": "", "urgency": ""},
                "impactCategory": {
                    "changeSystem": "",
                    "activity": "",
                    "impactedServices": "",
                    "environment": "",
                    "iCsImpacted": ""
                },
                "deploymentWindow": {"impactType": ""},
                "planComunication": {
                    "whosNotified": "",
                    "moment": "",
                    "comunicationType": "",
                    "technologyArea": ""
                },
                "phases": {
                    "planning": {"wasPlanned": "", "justification": ""},
                    "testHomology": {"wasTested": "", "justification": ""},
                    "execute": {"stage": "", "startDate": "", "endDate": ""},
                    "validation": {"stage": "", "startDate": "", "endDate": ""}
                },
                "planningExecutation": {"ativity": "", "technologyArea": "", "probabilityOfSuccess": ""},
                "planningRemediation": {"ativity": "", "technologyArea": "", "probabilityOfSuccess": ""},
                "attachments": null
            })
        );
    }

    #[test]
    fn phase_fields_are_mapped() {
        let mut form = ChangeRequestForm::empty();
        form.phases.planning.justification_planned = "Hotfix".to_string();
        form.phases.test_homology.was_tested = "Sim".to_string();
        form.phases.validation.start_date = "2026-01-17T14:30".to_string();
        form.phases.validation.end_date = "not a date".to_string();

        let payload = encode_update(&form, brt());

        assert_eq!(payload.phases.planning.justification, "Hotfix");
        assert_eq!(payload.phases.test_homology.was_tested, "Sim");
        assert_eq!(
            payload.phases.validation.start_date,
            "2026-01-17T17:30:00.000Z"
        );
        assert_eq!(payload.phases.validation.end_date, "");
    }

    #[test]
    fn attachments_are_never_sent() {
        let mut form = ChangeRequestForm::empty();
        form.attachment = Some(crate::domain::Attachment::new("a.zip", 10));

        let value = serde_json::to_value(encode_update(&form, brt())).unwrap();
        assert!(value["attachments"].is_null());
    }
}
