use serde::Serialize;

use crate::{
    api::{ApiRequest, paths},
    domain::{Status, Ticket},
    session::SessionError,
};

/// An administrator's verdict on a pending request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDecision {
    /// The outcome. Only [`Status::Approved`], [`Status::Rejected`] and
    /// [`Status::Pending`] can be sent.
    pub status: Status,
    /// Optional note for the requester.
    pub subject: String,
}

#[derive(Serialize)]
struct ReviewBody<'a> {
    status: &'a str,
    subject: &'a str,
}

impl ReviewDecision {
    /// Approves, with an optional note.
    #[must_use]
    pub fn approve(subject: impl Into<String>) -> Self {
        Self {
            status: Status::Approved,
            subject: subject.into(),
        }
    }

    /// Rejects, with an optional note.
    #[must_use]
    pub fn reject(subject: impl Into<String>) -> Self {
        Self {
            status: Status::Rejected,
            subject: subject.into(),
        }
    }

    /// Builds the request that records this decision for `ticket`.
    ///
    /// # Errors
    ///
    /// Returns an error if the status has no API form.
    pub fn request(&self, ticket: &Ticket) -> Result<ApiRequest, SessionError> {
        let status = self
            .status
            .api_label()
            .ok_or(SessionError::InvalidDecision(self.status))?;
        let body = ReviewBody {
            status,
            subject: &self.subject,
        };
        Ok(ApiRequest::put_json(paths::admin_rdm_approve(ticket), &body)?)
    }
}
