use chrono::FixedOffset;
use serde_json::Value;
use tracing::info;

use crate::{
    api::{ApiRequest, paths},
    codec::{decode_record, encode_update},
    domain::{
        Advance, ChangeRequestForm, Config, NavigationEvent, Status, Step, StepNavigator, Ticket,
    },
    session::{RequestToken, RequestTracker, SessionError},
};

/// The edit screen for an existing, still pending request.
///
/// A pristine copy of the form is kept from load time so unsaved changes can
/// be detected and reverted.
#[derive(Debug, Clone)]
pub struct EditSession {
    ticket: Ticket,
    form: ChangeRequestForm,
    pristine: Option<ChangeRequestForm>,
    navigator: StepNavigator,
    offset: FixedOffset,
    load: RequestTracker,
    save: RequestTracker,
}

impl EditSession {
    /// Opens an edit session for `ticket`. Nothing is loaded yet.
    #[must_use]
    pub fn new(ticket: Ticket, config: &Config) -> Self {
        Self {
            ticket,
            form: ChangeRequestForm::empty(),
            pristine: None,
            navigator: StepNavigator::new(),
            offset: config.offset(),
            load: RequestTracker::default(),
            save: RequestTracker::default(),
        }
    }

    /// The request being edited.
    #[must_use]
    pub const fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    /// The form being edited.
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

    /// Whether step `number` currently validates.
    #[must_use]
    pub fn is_step_valid(&self, number: u8) -> bool {
        self.navigator.is_step_valid(number, &self.form)
    }

    /// Drains navigation events for the UI.
    pub fn take_events(&mut self) -> Vec<NavigationEvent> {
        self.navigator.take_events()
    }

    /// Whether the record has been loaded.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.pristine.is_some()
    }

    /// Starts fetching the record.
    pub fn begin_load(&mut self) -> (RequestToken, ApiRequest) {
        info!(ticket = %self.ticket, "Loading change request for editing");
        (self.load.start(), ApiRequest::fetch(&self.ticket))
    }

    /// Hydrates the form from the fetched record and returns to the first
    /// step.
    ///
    /// A record without a status is treated as editable.
    ///
    /// # Errors
    ///
    /// Returns an error if the load was abandoned, or if the record is no
    /// longer pending.
    pub fn finish_load(&mut self, token: RequestToken, record: &Value) -> Result<(), SessionError> {
        self.load.finish(token)?;

        let status = record
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !status.is_empty() && !Status::parse(status).is_some_and(Status::is_editable) {
            return Err(SessionError::NotEditable {
                ticket: self.ticket.to_string(),
                status: status.to_string(),
            });
        }

        self.form = decode_record(record, self.offset);
        self.pristine = Some(self.form.clone());
        self.navigator.reset();
        Ok(())
    }

    /// Clears the outstanding load after it failed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Stale`] if the load was abandoned.
    pub fn fail_load(&mut self, token: RequestToken) -> Result<(), SessionError> {
        self.load.finish(token)
    }

    /// Whether the form differs from what was loaded or last saved.
    ///
    /// This is what a leave-page warning should check.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.pristine
            .as_ref()
            .is_some_and(|pristine| *pristine != self.form)
    }

    /// Discards unsaved changes.
    pub fn revert(&mut self) {
        if let Some(pristine) = &self.pristine {
            self.form = pristine.clone();
        }
    }

    /// Builds the update request.
    ///
    /// # Errors
    ///
    /// Returns an error if the record was never loaded, the form does not
    /// validate, or a save is already outstanding.
    pub fn submission(&mut self) -> Result<(RequestToken, ApiRequest), SessionError> {
        if !self.is_loaded() {
            return Err(SessionError::NotLoaded);
        }
        if self.save.is_busy() {
            return Err(SessionError::Busy);
        }
        if !self.form.is_submittable() {
            return Err(SessionError::Incomplete(self.form.blocking_reasons()));
        }
        let payload = encode_update(&self.form, self.offset);
        let request = ApiRequest::put_json(paths::rdm(&self.ticket), &payload)?;
        info!(ticket = %self.ticket, "Saving change request");
        Ok((self.save.start(), request))
    }

    /// Accepts a successful save; the saved form becomes the new baseline.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Stale`] if the save was abandoned.
    pub fn complete_submission(&mut self, token: RequestToken) -> Result<(), SessionError> {
        self.save.finish(token)?;
        self.pristine = Some(self.form.clone());
        info!(ticket = %self.ticket, "Change request updated");
        Ok(())
    }

    /// Clears the outstanding save after it failed, keeping the edits.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Stale`] if the save was abandoned.
    pub fn fail_submission(&mut self, token: RequestToken) -> Result<(), SessionError> {
        self.save.finish(token)
    }

    /// Leaves the screen, cancelling outstanding requests.
    pub fn abandon(&mut self) {
        self.load.cancel();
        self.save.cancel();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::*;
    use crate::api::{Method, RequestBody};

    fn record(status: &str) -> Value {
        json!({
            "status": status,
            "identification": {"type": "Normal", "title": "Patch"},
            "solution": {"objectiveOrSolution": "Apply fix"},
            "phases": {"execute": {"stage": "Durante", "startDate": "2026-01-17T17:30:00.000Z"}}
        })
    }

    fn loaded(status: &str) -> EditSession {
        let ticket = "RDM-20260116-abc".parse().unwrap();
        let mut session = EditSession::new(ticket, &Config::default());
        let (token, _) = session.begin_load();
        session.finish_load(token, &record(status)).unwrap();
        session
    }

    #[test]
    fn load_requests_the_record() {
        let mut session = EditSession::new("RDM-20260116-abc".parse().unwrap(), &Config::default());
        let (_, request) = session.begin_load();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "/api/RDM/RDM-20260116-abc");
        assert!(!session.is_loaded());
    }

    #[test_case("Pendente"; "portuguese")]
    #[test_case("PENDING"; "english")]
    #[test_case(""; "missing")]
    fn pending_records_load(status: &str) {
        let session = loaded(status);
        assert!(session.is_loaded());
        assert_eq!(session.form().identification.title, "Patch");
        assert_eq!(session.form().phases.execute.start_date, "2026-01-17T14:30");
        assert!(!session.has_unsaved_changes());
    }

    #[test_case("Aprovado"; "approved")]
    #[test_case("Reprovado"; "rejected")]
    #[test_case("Arquivada"; "unknown")]
    fn other_records_are_refused(status: &str) {
        let mut session = EditSession::new("RDM-20260116-abc".parse().unwrap(), &Config::default());
        let (token, _) = session.begin_load();
        let error = session.finish_load(token, &record(status)).unwrap_err();
        assert!(matches!(error, SessionError::NotEditable { .. }));
        assert!(!session.is_loaded());
    }

    #[test]
    fn unsaved_changes_and_revert() {
        let mut session = loaded("Pendente");
        session.form_mut().category.urgency = "Alto".to_string();
        assert!(session.has_unsaved_changes());

        session.revert();
        assert!(!session.has_unsaved_changes());
        assert_eq!(session.form().category.urgency, "");
    }

    #[test]
    fn save_rebaselines() {
        let mut session = loaded("Pendente");
        session.form_mut().identification.title = "Patch v2".to_string();

        let (token, request) = session.submission().unwrap();
        assert_eq!(request.method, Method::Put);
        let RequestBody::Json(body) = &request.body else {
            panic!("expected json body");
        };
        assert_eq!(body["identification"]["title"], "Patch v2");
        assert_eq!(
            body["phases"]["execute"]["startDate"],
            "2026-01-17T17:30:00.000Z"
        );
        assert!(body["attachments"].is_null());
        assert!(session.has_unsaved_changes());

        session.complete_submission(token).unwrap();
        assert!(!session.has_unsaved_changes());
    }

    #[test]
    fn cannot_save_before_load() {
        let mut session = EditSession::new("RDM-20260116-abc".parse().unwrap(), &Config::default());
        assert!(matches!(session.submission(), Err(SessionError::NotLoaded)));
    }

    #[test]
    fn loading_returns_to_first_step() {
        let mut session = EditSession::new("RDM-20260116-abc".parse().unwrap(), &Config::default());
        assert!(session.go_to_step(4));
        assert!(session.previous_step());
        assert_eq!(session.current_step(), Step::Category);
        session.take_events();

        let (token, _) = session.begin_load();
        session.finish_load(token, &record("Pendente")).unwrap();

        assert_eq!(session.current_step(), Step::Identification);
        assert_eq!(session.take_events(), vec![NavigationEvent::ScrollToTop]);
    }

    #[test]
    fn navigation_is_gated_on_the_loaded_form() {
        let mut session = loaded("Pendente");
        assert!(session.is_step_valid(1));
        assert_eq!(session.next_step(), Advance::Moved(Step::Solution));

        session.form_mut().solution.objective_or_solution.clear();
        assert!(!session.is_step_valid(2));
        assert!(matches!(session.next_step(), Advance::Blocked(_)));
        assert_eq!(session.current_step(), Step::Solution);
    }

    #[test]
    fn failed_load_allows_retry() {
        let mut session = EditSession::new("RDM-20260116-abc".parse().unwrap(), &Config::default());
        let (token, _) = session.begin_load();
        session.fail_load(token).unwrap();
        assert!(matches!(session.fail_load(token), Err(SessionError::Stale)));
        assert!(!session.is_loaded());

        let (retry, _) = session.begin_load();
        session.finish_load(retry, &record("Pendente")).unwrap();
        assert!(session.is_loaded());
    }

    #[test]
    fn failed_save_keeps_edits_and_allows_retry() {
        let mut session = loaded("Pendente");
        session.form_mut().identification.title = "Patch v2".to_string();

        let (token, _) = session.submission().unwrap();
        assert!(matches!(session.submission(), Err(SessionError::Busy)));
        session.fail_submission(token).unwrap();

        assert_eq!(session.form().identification.title, "Patch v2");
        assert!(session.has_unsaved_changes());
        assert!(session.submission().is_ok());
    }

    #[test]
    fn abandoned_save_is_ignored() {
        let mut session = loaded("Pendente");
        session.form_mut().identification.title = "Patch v2".to_string();
        let (token, _) = session.submission().unwrap();
        session.abandon();

        assert!(matches!(
            session.complete_submission(token),
            Err(SessionError::Stale)
        ));
        assert!(session.has_unsaved_changes());
    }

    #[test]
    fn abandoned_load_is_ignored() {
        let mut session = EditSession::new("RDM-20260116-abc".parse().unwrap(), &Config::default());
        let (token, _) = session.begin_load();
        session.abandon();

        assert!(matches!(
            session.finish_load(token, &record("Pendente")),
            Err(SessionError::Stale)
        ));
        assert_eq!(session.form(), &ChangeRequestForm::empty());
    }
}
