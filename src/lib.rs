//! Change-request ("RDM") form engine
//!
//! A change request is captured through a nine-step form, submitted to the
//! backend as a multipart body, edited through a JSON body and hydrated back
//! from the backend's JSON records. This crate holds the form model, the step
//! rules, the codecs between the form and the wire, and the workflows that
//! tie them together. It performs no HTTP itself; calls are described as
//! [`ApiRequest`] values.

pub mod domain;
pub use domain::{
    Attachment, AttachmentPolicy, ChangeRequestForm, Config, Status, Step, StepNavigator,
    TechnologyArea, Ticket, normalize_technology_area,
};

pub mod codec;
pub use codec::{decode_record, encode_multipart, encode_update};

pub mod api;
pub use api::{ApiRequest, TransportError};

pub mod session;
pub use session::{CreateSession, EditSession, ReviewDecision, SessionError};
