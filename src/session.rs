//! Workflows that drive a form through creation, copying, editing and review.
//!
//! Sessions own the mutable state of one screen: the form, where the user is
//! in it, and which request is outstanding. They produce [`ApiRequest`]s and
//! accept the responses back, refusing any that arrive for a request that is
//! no longer current.
//!
//! [`ApiRequest`]: crate::api::ApiRequest

use crate::domain::{AttachmentError, Status, TicketError};

mod inflight;
pub use inflight::{RequestToken, RequestTracker};

mod create;
pub use create::{CreateSession, assigned_ticket};

mod edit;
pub use edit::EditSession;

mod review;
pub use review::ReviewDecision;

/// Errors raised by session workflows.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A response arrived for a request that was superseded or cancelled.
    #[error("Ignoring a response to a request that is no longer current")]
    Stale,

    /// A request of the same kind is still outstanding.
    #[error("A request is already in progress")]
    Busy,

    /// The ticket entered could not be parsed.
    #[error(transparent)]
    Ticket(#[from] TicketError),

    /// The attachment was refused.
    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    /// The form does not pass validation.
    #[error("The form cannot be submitted: {}", .0.join("; "))]
    Incomplete(Vec<String>),

    /// Copy was requested before a record was found.
    #[error("No change request has been found to copy")]
    NothingToCopy,

    /// Save was requested before the record was loaded.
    #[error("The change request has not been loaded yet")]
    NotLoaded,

    /// The record is past the point where it can be edited.
    #[error("Change request {ticket} is '{status}' and can no longer be edited")]
    NotEditable {
        /// The request's ticket.
        ticket: String,
        /// The status reported by the backend.
        status: String,
    },

    /// The status is not a review outcome.
    #[error("'{0}' is not a valid review decision")]
    InvalidDecision(Status),

    /// A request body could not be encoded.
    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}
