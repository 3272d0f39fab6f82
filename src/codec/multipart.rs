use std::fmt::Write as _;

use chrono::FixedOffset;
use serde::Serialize;

use crate::{
    codec::dates::local_to_iso,
    domain::{ChangeRequestForm, PhaseRecord},
};

/// The multipart field the archive is uploaded under.
pub const ATTACHMENT_FIELD: &str = "Attachments";

/// A `multipart/form-data` submission, held as ordered text fields plus an
/// optional file part.
///
/// Field names may repeat. Order is preserved exactly as encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MultipartForm {
    fields: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<FilePart>,
}

/// A file part of a multipart submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePart {
    /// The form field name.
    pub name: String,
    /// The filename sent in the `Content-Disposition` header.
    pub file_name: String,
    /// Size of the file in bytes.
    pub size: u64,
    /// The file contents, when available.
    #[serde(skip)]
    pub content: Option<Vec<u8>>,
}

impl MultipartForm {
    /// Appends a text field.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// The first value recorded under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Every value recorded under `name`, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether any field is named `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over the text fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// The number of text fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether there are no text fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The file part, if any.
    #[must_use]
    pub const fn file(&self) -> Option<&FilePart> {
        self.file.as_ref()
    }

    /// The `Content-Type` header value for a body rendered with `boundary`.
    #[must_use]
    pub fn content_type(boundary: &str) -> String {
        format!("multipart/form-data; boundary={boundary}")
    }

    /// Renders an RFC 7578 body.
    ///
    /// The caller picks a boundary that does not occur in any value. A file
    /// part without loaded contents is rendered with an empty body.
    #[must_use]
    pub fn render(&self, boundary: &str) -> Vec<u8> {
        let mut body = Vec::new();

        for (name, value) in &self.fields {
            let mut head = String::new();
            let _ = write!(
                head,
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n",
                escape_quoted(name)
            );
            body.extend_from_slice(head.as_bytes());
            body.extend_from_slice(value.as_bytes());
            body.extend_from_slice(b"\r\n");
        }

        if let Some(file) = &self.file {
            let mut head = String::new();
            let _ = write!(
                head,
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                escape_quoted(&file.name),
                escape_quoted(&file.file_name),
                content_type_for(&file.file_name),
            );
            body.extend_from_slice(head.as_bytes());
            if let Some(content) = &file.content {
                body.extend_from_slice(content);
            }
            body.extend_from_slice(b"\r\n");
        }

        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        body
    }
}

fn escape_quoted(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn content_type_for(file_name: &str) -> &'static str {
    if file_name.to_lowercase().ends_with(".zip") {
        "application/zip"
    } else {
        "application/octet-stream"
    }
}

/// Encodes a form for creation as a multipart submission.
///
/// Field names are the backend's exact spellings, including its misspelt
/// and inconsistently-cased section names (`planComunication`,
/// `planningExecutation`, `PlanningRemediation`). Section leaves are always
/// sent, even when empty. Phase leaves are only sent when non-empty, and both
/// justification fields travel under the shared `Justification` key.
#[must_use]
pub fn encode_multipart(form: &ChangeRequestForm, offset: FixedOffset) -> MultipartForm {
    let mut multipart = MultipartForm::default();

    let id = &form.identification;
    push_section(
        &mut multipart,
        "identification",
        &[("Type", id.kind.as_str()), ("Title", id.title.as_str())],
    );

    push_section(
        &mut multipart,
        "solution",
        &[(
            "ObjectiveOrSolution",
            form.solution.objective_or_solution.as_str(),
        )],
    );

    let category = &form.category;
    push_section(
        &mut multipart,
        "category",
        &[
            ("Objective", category.objective.as_str()),
            ("Action", category.action.as_str()),
            ("Impact", category.impact.as_str()),
            ("Urgency", category.urgency.as_str()),
        ],
    );

    let impact = &form.impact_category;
    push_section(
        &mut multipart,
        "impactCategory",
        &[
            ("ChangeSystem", impact.change_system.as_str()),
            ("Activity", impact.activity.as_str()),
            ("ImpactedServices", impact.impacted_services.as_str()),
            ("Environment", impact.environment.as_str()),
            ("ICsImpacted", impact.ics_impacted.as_str()),
        ],
    );

    push_section(
        &mut multipart,
        "deploymentWindow",
        &[("ImpactType", form.deployment_window.impact_type.as_str())],
    );

    let plan = &form.plan_communication;
    push_section(
        &mut multipart,
        "planComunication",
        &[
            ("WhosNotified", plan.who_is_notified.as_str()),
            ("Moment", plan.moment.as_str()),
            ("ComunicationType", plan.communication_type.as_str()),
            ("TechnologyArea", plan.technology_area.as_str()),
        ],
    );

    for (phase, record) in &form.phases {
        push_phase(&mut multipart, phase, record, offset);
    }

    for (prefix, details) in [
        ("planningExecutation", &form.planning_execution),
        ("PlanningRemediation", &form.planning_remediation),
    ] {
        push_section(
            &mut multipart,
            prefix,
            &[
                ("Ativity", details.activity.as_str()),
                ("TechnologyArea", details.technology_area.as_str()),
                (
                    "ProbabilityOfSuccess",
                    details.probability_of_success.as_str(),
                ),
            ],
        );
    }

    if let Some(attachment) = &form.attachment {
        multipart.file = Some(FilePart {
            name: ATTACHMENT_FIELD.to_string(),
            file_name: attachment.file_name.clone(),
            size: attachment.size,
            content: attachment.content.clone(),
        });
    }

    multipart
}

fn push_section(multipart: &mut MultipartForm, prefix: &str, leaves: &[(&str, &str)]) {
    for (key, value) in leaves {
        multipart.push(format!("{prefix}.{key}"), *value);
    }
}

fn push_phase(
    multipart: &mut MultipartForm,
    phase: &str,
    record: &PhaseRecord,
    offset: FixedOffset,
) {
    let leaves = [
        ("WasPlanned", &record.was_planned, false),
        ("Justification", &record.justification_planned, false),
        ("WasTested", &record.was_tested, false),
        ("Justification", &record.justification_test, false),
        ("stage", &record.stage, false),
        ("startDate", &record.start_date, true),
        ("endDate", &record.end_date, true),
    ];

    for (key, value, is_date) in leaves {
        if value.is_empty() {
            continue;
        }
        let value = if is_date {
            local_to_iso(value, offset)
        } else {
            value.clone()
        };
        multipart.push(format!("phases.{phase}.{key}"), value);
    }
}
