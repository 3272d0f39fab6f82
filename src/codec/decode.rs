use chrono::FixedOffset;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    codec::dates::iso_to_local,
    domain::{ChangeRequestForm, PhaseRecord, PlanningDetails, normalize_technology_area},
};

type Object = Map<String, Value>;

/// Finds the first of `names` that holds an object.
fn section<'a>(record: &'a Value, names: &[&str]) -> Option<&'a Object> {
    names
        .iter()
        .find_map(|name| record.get(*name).and_then(Value::as_object))
}

/// Reads the first of `keys` that is present and not `null`, as text.
///
/// Numbers and booleans are stringified. Anything else reads as empty.
fn leaf(section: Option<&Object>, keys: &[&str]) -> String {
    let Some(section) = section else {
        return String::new();
    };
    let Some((key, value)) = keys
        .iter()
        .find_map(|key| section.get(*key).filter(|v| !v.is_null()).map(|v| (key, v)))
    else {
        return String::new();
    };

    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => {
            debug!(key, "Ignoring non-scalar value");
            String::new()
        }
    }
}

/// Hydrates a fresh form from a backend record.
///
/// Decoding never fails: missing sections, missing fields and `null` values
/// all read as empty strings. Section and field names are matched against
/// the spellings the backend is known to use. Technology areas are
/// normalised and phase dates are converted to local editing form.
#[must_use]
pub fn decode_record(record: &Value, offset: FixedOffset) -> ChangeRequestForm {
    let mut form = ChangeRequestForm::empty();

    let identification = section(record, &["identification", "Identification"]);
    form.identification.kind = leaf(identification, &["type", "Type"]);
    form.identification.title = leaf(identification, &["title", "Title"]);

    let solution = section(record, &["solution", "Solution"]);
    form.solution.objective_or_solution =
        leaf(solution, &["objectiveOrSolution", "ObjectiveOrSolution"]);

    let category = section(record, &["category", "Category"]);
    form.category.objective = leaf(category, &["objective", "Objective"]);
    form.category.action = leaf(category, &["action", "Action"]);
    form.category.impact = leaf(category, &["impact", "Impact"]);
    form.category.urgency = leaf(category, &["urgency", "Urgency"]);

    let impact = section(record, &["impactCategory", "ImpactCategory"]);
    let target = &mut form.impact_category;
    target.change_system = leaf(impact, &["changeSystem", "ChangeSystem"]);
    target.activity = leaf(impact, &["activity", "Activity"]);
    target.impacted_services = leaf(impact, &["impactedServices", "ImpactedServices"]);
    target.environment = leaf(impact, &["environment", "Environment"]);
    target.ics_impacted = leaf(impact, &["iCsImpacted", "ICsImpacted", "icsImpacted"]);

    let window = section(record, &["deploymentWindow", "DeploymentWindow"]);
    form.deployment_window.impact_type = leaf(window, &["impactType", "ImpactType"]);

    let plan = section(
        record,
        &["planComunication", "planCommunication", "PlanComunication"],
    );
    let target = &mut form.plan_communication;
    target.who_is_notified = leaf(plan, &["whosNotified", "WhosNotified"]);
    target.moment = leaf(plan, &["moment", "Moment"]);
    target.communication_type = leaf(
        plan,
        &["comunicationType", "ComunicationType", "communicationType"],
    );
    target.technology_area =
        normalize_technology_area(&leaf(plan, &["technologyArea", "TechnologyArea"]));

    if let Some(phases) = section(record, &["phases", "Phases"]) {
        decode_phases(phases, &mut form, offset);
    }

    form.planning_execution = decode_planning(section(
        record,
        &["planningExecutation", "planningExecution", "PlanningExecutation"],
    ));
    form.planning_remediation = decode_planning(section(
        record,
        &["planningRemediation", "PlanningRemediation"],
    ));

    form
}

fn decode_phases(phases: &Object, form: &mut ChangeRequestForm, offset: FixedOffset) {
    let phase = |names: &[&str]| {
        names
            .iter()
            .find_map(|name| phases.get(*name).and_then(Value::as_object))
    };

    let planning = phase(&["planning", "Planning"]);
    form.phases.planning.was_planned = leaf(planning, &["wasPlanned", "WasPlanned"]);
    form.phases.planning.justification_planned = leaf(
        planning,
        &[
            "justification",
            "Justification",
            "JustificationPlanned",
            "justificationPlanned",
        ],
    );

    let test = phase(&["testHomology", "TestHomology"]);
    form.phases.test_homology.was_tested = leaf(test, &["wasTested", "WasTested"]);
    form.phases.test_homology.justification_test = leaf(
        test,
        &[
            "justification",
            "Justification",
            "JustificationTest",
            "justificationTest",
        ],
    );

    form.phases.execute = decode_scheduled(phase(&["execute", "Execute"]), offset);
    form.phases.validation = decode_scheduled(phase(&["validation", "Validation"]), offset);
}

fn decode_scheduled(phase: Option<&Object>, offset: FixedOffset) -> PhaseRecord {
    PhaseRecord {
        stage: leaf(phase, &["stage", "Stage"]),
        start_date: iso_to_local(&leaf(phase, &["startDate", "StartDate"]), offset),
        end_date: iso_to_local(&leaf(phase, &["endDate", "EndDate"]), offset),
        ..PhaseRecord::default()
    }
}

fn decode_planning(section: Option<&Object>) -> PlanningDetails {
    PlanningDetails {
        activity: leaf(section, &["ativity", "Ativity", "activity"]),
        technology_area: normalize_technology_area(&leaf(
            section,
            &["technologyArea", "TechnologyArea"],
        )),
        probability_of_success: leaf(
            section,
            &["probabilityOfSuccess", "ProbabilityOfSuccess"],
        ),
    }
}

/// The headline fields of a backend record, shown before copying it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordSummary {
    /// The record's ticket, as the backend reported it.
    pub ticket: String,
    /// The request title.
    pub title: String,
    /// The request type.
    #[serde(rename = "type")]
    pub kind: String,
    /// The raw status text.
    pub status: String,
}

impl RecordSummary {
    /// Extracts the summary from a record. Missing fields read as empty.
    #[must_use]
    pub fn from_record(record: &Value) -> Self {
        let root = record.as_object();
        let identification = section(record, &["identification", "Identification"]);
        Self {
            ticket: leaf(root, &["ticket", "Ticket"]),
            title: leaf(identification, &["title", "Title"]),
            kind: leaf(identification, &["type", "Type"]),
            status: leaf(root, &["status", "Status"]),
        }
    }
}
