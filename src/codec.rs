//! Conversions between the form and the backend's wire formats.
//!
//! Three shapes leave or enter the form: a multipart body when a request is
//! created, a JSON body when it is edited, and a JSON record when one is
//! fetched. All conversions are total.

pub mod dates;

mod multipart;
pub use multipart::{ATTACHMENT_FIELD, FilePart, MultipartForm, encode_multipart};

/// The JSON body sent when editing a request.
pub mod update;
pub use update::{UpdatePayload, encode_update};

mod decode;
pub use decode::{RecordSummary, decode_record};
