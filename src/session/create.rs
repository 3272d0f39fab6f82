use chrono::FixedOffset;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    api::{ApiRequest, paths},
    codec::{RecordSummary, decode_record, encode_multipart},
    domain::{
        Advance, Attachment, AttachmentPolicy, ChangeRequestForm, Config, NavigationEvent, Step,
        StepNavigator, Ticket,
    },
    session::{RequestToken, RequestTracker, SessionError},
};

/// The creation screen: a new form, optionally pre-filled from an existing
/// request.
#[derive(Debug, Clone)]
pub struct CreateSession {
    form: ChangeRequestForm,
    navigator: StepNavigator,
    policy: AttachmentPolicy,
    offset: FixedOffset,
    lookup: RequestTracker,
    submit: RequestTracker,
    searched: Option<Ticket>,
    found: Option<Value>,
}

impl CreateSession {
    /// Opens a session with an empty form on the first step.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            form: ChangeRequestForm::empty(),
            navigator: StepNavigator::new(),
            policy: config.attachment_policy(),
            offset: config.offset(),
            lookup: RequestTracker::default(),
            submit: RequestTracker::default(),
            searched: None,
            found: None,
        }
    }

    /// The form being filled in.
    #[must_use]
    pub const fn form(&self) -> &ChangeRequestForm {
        &self.form
    }

    /// Mutable access for applying user input.
    pub const fn form_mut(&mut self) -> &mut ChangeRequestForm {
        &mut self.form
    }

    /// The step currently shown.
    #[must_use]
    pub const fn current_step(&self) -> Step {
        self.navigator.current()
    }

    /// Advances one step if the current one validates.
    pub fn next_step(&mut self) -> Advance {
        self.navigator.next_step(&self.form)
    }

    /// Goes back one step.
    pub fn previous_step(&mut self) -> bool {
        self.navigator.previous_step()
    }

    /// Jumps to step `number`, ignoring numbers outside `1..=9`.
    pub fn go_to_step(&mut self, number: u8) -> bool {
        self.navigator.go_to_step(number)
    }

    /// Drains navigation events for the UI.
    pub fn take_events(&mut self) -> Vec<NavigationEvent> {
        self.navigator.take_events()
    }

    /// Attaches an archive.
    ///
    /// # Errors
    ///
    /// Returns an error if the file breaks the attachment rules or a file is
    /// already attached.
    pub fn attach(&mut self, attachment: Attachment) -> Result<(), SessionError> {
        self.policy
            .validate(&attachment, self.form.attachment.is_some())?;
        debug!(file = %attachment.file_name, size = attachment.size, "Attached file");
        self.form.attachment = Some(attachment);
        Ok(())
    }

    /// Removes the attachment, returning it.
    pub const fn remove_attachment(&mut self) -> Option<Attachment> {
        self.form.attachment.take()
    }

    /// Starts looking up an existing request to copy.
    ///
    /// Any previous lookup and its result are discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw_ticket` is not a valid ticket.
    pub fn begin_lookup(
        &mut self,
        raw_ticket: &str,
    ) -> Result<(RequestToken, ApiRequest), SessionError> {
        let ticket = Ticket::normalize(raw_ticket)?;
        self.found = None;
        let token = self.lookup.start();
        info!(%ticket, "Looking up change request");
        let request = ApiRequest::fetch(&ticket);
        self.searched = Some(ticket);
        Ok((token, request))
    }

    /// Stores the record returned by a lookup and summarises it.
    ///
    /// The searched ticket is recorded on the result when the backend omits
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Stale`] if the lookup was superseded or
    /// abandoned.
    pub fn complete_lookup(
        &mut self,
        token: RequestToken,
        mut record: Value,
    ) -> Result<RecordSummary, SessionError> {
        self.lookup.finish(token)?;
        if let (Some(object), Some(ticket)) = (record.as_object_mut(), &self.searched) {
            object
                .entry("ticket")
                .or_insert_with(|| Value::String(ticket.to_string()));
        }
        let summary = RecordSummary::from_record(&record);
        self.found = Some(record);
        Ok(summary)
    }

    /// Clears the outstanding lookup after it failed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Stale`] if the lookup was superseded or
    /// abandoned.
    pub fn fail_lookup(&mut self, token: RequestToken) -> Result<(), SessionError> {
        self.lookup.finish(token)
    }

    /// The summary of the record found by the last lookup.
    #[must_use]
    pub fn found(&self) -> Option<RecordSummary> {
        self.found.as_ref().map(RecordSummary::from_record)
    }

    /// Replaces the form with the found record and returns to the first step.
    ///
    /// The attachment, if any, is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if no record has been found.
    pub fn copy_found(&mut self) -> Result<(), SessionError> {
        let record = self.found.take().ok_or(SessionError::NothingToCopy)?;
        let mut form = decode_record(&record, self.offset);
        form.attachment = self.form.attachment.take();
        self.form = form;
        self.navigator.reset();
        info!("Copied change request into the form");
        Ok(())
    }

    /// Builds the creation request.
    ///
    /// # Errors
    ///
    /// Returns an error if the form does not validate or a submission is
    /// already outstanding.
    pub fn submission(&mut self) -> Result<(RequestToken, ApiRequest), SessionError> {
        if self.submit.is_busy() {
            return Err(SessionError::Busy);
        }
        if !self.form.is_submittable() {
            return Err(SessionError::Incomplete(self.form.blocking_reasons()));
        }
        let body = encode_multipart(&self.form, self.offset);
        let token = self.submit.start();
        info!(fields = body.len(), "Submitting change request");
        Ok((token, ApiRequest::post_multipart(paths::RDM, body)))
    }

    /// Accepts the backend's answer to a submission and starts over.
    ///
    /// Returns the ticket the backend assigned, when it reported one.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Stale`] if the submission was abandoned.
    pub fn complete_submission(
        &mut self,
        token: RequestToken,
        response: &Value,
    ) -> Result<Option<String>, SessionError> {
        self.submit.finish(token)?;
        let ticket = assigned_ticket(response);
        info!(ticket = ticket.as_deref().unwrap_or("unknown"), "Change request created");
        self.reset();
        Ok(ticket)
    }

    /// Clears the outstanding submission after it failed, keeping the form.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Stale`] if the submission was abandoned.
    pub fn fail_submission(&mut self, token: RequestToken) -> Result<(), SessionError> {
        self.submit.finish(token)
    }

    /// Empties the form, drops the attachment and returns to the first step.
    pub fn reset(&mut self) {
        self.form = ChangeRequestForm::empty();
        self.found = None;
        self.searched = None;
        self.navigator.reset();
    }

    /// Leaves the screen: outstanding requests are cancelled and the form is
    /// discarded.
    pub fn abandon(&mut self) {
        self.lookup.cancel();
        self.submit.cancel();
        self.reset();
        debug!("Abandoned creation session");
    }
}

/// The ticket reported in a creation response.
///
/// Prefers `ticket`, then falls back to `RDM-{id}`.
#[must_use]
pub fn assigned_ticket(response: &Value) -> Option<String> {
    let text = |key: &str| match response.get(key)? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    };
    text("ticket").or_else(|| text("id").map(|id| format!("RDM-{id}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::{Method, RequestBody};

    fn session() -> CreateSession {
        CreateSession::new(&Config::default())
    }

    fn fill_required(form: &mut ChangeRequestForm) {
        form.identification.title = "Upgrade kernel".to_string();
        form.identification.kind = "Normal".to_string();
        form.solution.objective_or_solution = "Patch CVE".to_string();
    }

    #[test]
    fn first_step_gates_progress() {
        let mut session = session();
        assert!(!session.next_step().moved());
        assert_eq!(session.current_step(), Step::Identification);

        session.form_mut().identification.title = "x".to_string();
        session.form_mut().identification.kind = "Normal".to_string();
        assert_eq!(session.next_step(), Advance::Moved(Step::Solution));
        assert_eq!(session.take_events(), [NavigationEvent::ScrollToTop]);
    }

    #[test]
    fn lookup_then_copy() {
        let mut session = session();
        session.go_to_step(5);

        let (token, request) = session.begin_lookup(" rdm-20260116-2F6863CA ").unwrap();
        assert_eq!(request.path, "/api/RDM/RDM-20260116-2f6863ca");

        let summary = session
            .complete_lookup(
                token,
                json!({
                    "status": "Aprovado",
                    "identification": {"type": "Normal", "title": "Old change"},
                    "planComunication": {"technologyArea": "network"}
                }),
            )
            .unwrap();
        assert_eq!(summary.ticket, "RDM-20260116-2f6863ca");
        assert_eq!(summary.title, "Old change");

        session.copy_found().unwrap();
        assert_eq!(session.form().identification.title, "Old change");
        assert_eq!(session.form().plan_communication.technology_area, "Redes");
        assert_eq!(session.current_step(), Step::Identification);
        assert!(matches!(session.copy_found(), Err(SessionError::NothingToCopy)));
    }

    #[test]
    fn copy_keeps_attachment() {
        let mut session = session();
        session.attach(Attachment::new("plan.zip", 100)).unwrap();
        let (token, _) = session.begin_lookup("RDM-1-a").unwrap();
        session.complete_lookup(token, json!({})).unwrap();

        session.copy_found().unwrap();
        assert_eq!(
            session.form().attachment.as_ref().map(|a| a.file_name.as_str()),
            Some("plan.zip")
        );
    }

    #[test]
    fn invalid_ticket_is_refused() {
        let mut session = session();
        assert!(matches!(
            session.begin_lookup("CHG-1-a"),
            Err(SessionError::Ticket(_))
        ));
    }

    #[test]
    fn stale_lookup_never_touches_the_form() {
        let mut session = session();
        let (first, _) = session.begin_lookup("RDM-1-a").unwrap();
        let (second, _) = session.begin_lookup("RDM-2-b").unwrap();

        assert!(matches!(
            session.complete_lookup(first, json!({"identification": {"title": "stale"}})),
            Err(SessionError::Stale)
        ));
        assert!(session.found().is_none());

        session.abandon();
        assert!(matches!(
            session.complete_lookup(second, json!({})),
            Err(SessionError::Stale)
        ));
        assert_eq!(session.form(), &ChangeRequestForm::empty());
    }

    #[test]
    fn submission_requires_valid_form() {
        let mut session = session();
        let Err(SessionError::Incomplete(reasons)) = session.submission() else {
            panic!("expected incomplete form");
        };
        assert_eq!(reasons.len(), 3);
    }

    #[test]
    fn submission_round_trip() {
        let mut session = session();
        fill_required(session.form_mut());
        session.attach(Attachment::new("evidence.zip", 10)).unwrap();

        let (token, request) = session.submission().unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "/api/RDM");
        let RequestBody::Multipart(body) = &request.body else {
            panic!("expected multipart body");
        };
        assert_eq!(body.get("identification.Title"), Some("Upgrade kernel"));
        assert!(body.file().is_some());

        assert!(matches!(session.submission(), Err(SessionError::Busy)));

        let ticket = session
            .complete_submission(token, &json!({"ticket": "RDM-20260116-abc"}))
            .unwrap();
        assert_eq!(ticket.as_deref(), Some("RDM-20260116-abc"));
        assert_eq!(session.form(), &ChangeRequestForm::empty());
    }

    #[test]
    fn failed_submission_keeps_form() {
        let mut session = session();
        fill_required(session.form_mut());
        let (token, _) = session.submission().unwrap();

        session.fail_submission(token).unwrap();
        assert_eq!(session.form().identification.title, "Upgrade kernel");
        assert!(session.submission().is_ok());
    }

    #[test]
    fn abandoned_submission_is_ignored() {
        let mut session = session();
        fill_required(session.form_mut());
        let (token, _) = session.submission().unwrap();
        session.abandon();
        assert_eq!(session.form(), &ChangeRequestForm::empty());

        fill_required(session.form_mut());
        session.go_to_step(3);
        assert!(matches!(
            session.complete_submission(token, &json!({"ticket": "RDM-1-a"})),
            Err(SessionError::Stale)
        ));
        assert_eq!(session.form().identification.title, "Upgrade kernel");
        assert_eq!(session.current_step(), Step::Category);
        assert!(session.submission().is_ok());
    }

    #[test]
    fn failed_lookup_clears_the_request() {
        let mut session = session();
        let (token, _) = session.begin_lookup("RDM-1-a").unwrap();
        session.fail_lookup(token).unwrap();

        assert!(session.found().is_none());
        assert!(matches!(session.fail_lookup(token), Err(SessionError::Stale)));
        assert!(matches!(
            session.complete_lookup(token, json!({})),
            Err(SessionError::Stale)
        ));
        assert!(matches!(session.copy_found(), Err(SessionError::NothingToCopy)));
    }

    #[test]
    fn attachment_rules_apply() {
        let mut session = session();
        assert!(matches!(
            session.attach(Attachment::new("plan.pdf", 1)),
            Err(SessionError::Attachment(_))
        ));
        session.attach(Attachment::new("a.zip", 1)).unwrap();
        assert!(session.attach(Attachment::new("b.zip", 1)).is_err());
        assert!(session.remove_attachment().is_some());
        assert!(session.attach(Attachment::new("b.zip", 1)).is_ok());
    }

    #[test]
    fn assigned_ticket_fallbacks() {
        assert_eq!(
            assigned_ticket(&json!({"ticket": "RDM-1-a", "id": 5})).as_deref(),
            Some("RDM-1-a")
        );
        assert_eq!(assigned_ticket(&json!({"id": 42})).as_deref(), Some("RDM-42"));
        assert_eq!(assigned_ticket(&json!({"id": "x9"})).as_deref(), Some("RDM-x9"));
        assert_eq!(assigned_ticket(&json!({"ticket": ""})), None);
    }
}
