//! Descriptions of the HTTP calls made to the change-request backend.
//!
//! Nothing here performs I/O. Each workflow step produces an [`ApiRequest`]
//! that the caller executes with whatever HTTP client it uses, then feeds the
//! response back into the session.

use serde::Serialize;

use crate::{codec::MultipartForm, domain::Ticket};

mod error;
pub use error::{TransportError, extract_backend_message};

/// Backend endpoint paths.
pub mod paths {
    use crate::domain::Ticket;

    /// Collection of change requests. `POST` creates one.
    pub const RDM: &str = "/api/RDM";

    /// The requests belonging to the signed-in user.
    pub const RDM_LOGGED_USER: &str = "/api/RDM/Logged-user";

    /// Requests awaiting an administrator's decision.
    pub const ADMIN_RDM_PENDING: &str = "/api/Admin/rdm-pending";

    /// A single request. `GET` fetches it, `PUT` replaces it.
    #[must_use]
    pub fn rdm(ticket: &Ticket) -> String {
        format!("{RDM}/{ticket}")
    }

    /// A condensed view of a single request.
    #[must_use]
    pub fn rdm_short(ticket: &Ticket) -> String {
        format!("{RDM}/ticket-short/{ticket}")
    }

    /// The archive attached to a request.
    #[must_use]
    pub fn rdm_attachments(ticket: &Ticket) -> String {
        format!("{RDM}/Attachments/{ticket}")
    }

    /// The printable report of a request.
    #[must_use]
    pub fn report(ticket: &Ticket) -> String {
        format!("/api/Report?ticket={ticket}")
    }

    /// The administrator's approve or reject action.
    #[must_use]
    pub fn admin_rdm_approve(ticket: &Ticket) -> String {
        format!("/api/Admin/rdm-approve/{ticket}")
    }
}

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
}

/// The body of a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum RequestBody {
    /// No body.
    Empty,
    /// A `multipart/form-data` body.
    Multipart(MultipartForm),
    /// An `application/json` body.
    Json(serde_json::Value),
}

/// A request to be executed against the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiRequest {
    /// The method.
    pub method: Method,
    /// Path and query, relative to the base URL.
    pub path: String,
    /// The body.
    pub body: RequestBody,
}

impl ApiRequest {
    /// A `GET` without a body.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    /// A `POST` with a multipart body.
    #[must_use]
    pub fn post_multipart(path: impl Into<String>, form: MultipartForm) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: RequestBody::Multipart(form),
        }
    }

    /// A `PUT` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be represented as JSON.
    pub fn put_json(
        path: impl Into<String>,
        body: &impl Serialize,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            method: Method::Put,
            path: path.into(),
            body: RequestBody::Json(serde_json::to_value(body)?),
        })
    }

    /// Fetches a full record.
    #[must_use]
    pub fn fetch(ticket: &Ticket) -> Self {
        Self::get(paths::rdm(ticket))
    }

    /// Fetches a condensed record.
    #[must_use]
    pub fn fetch_short(ticket: &Ticket) -> Self {
        Self::get(paths::rdm_short(ticket))
    }

    /// Downloads a request's attachment.
    #[must_use]
    pub fn attachments(ticket: &Ticket) -> Self {
        Self::get(paths::rdm_attachments(ticket))
    }

    /// Fetches a request's report.
    #[must_use]
    pub fn report(ticket: &Ticket) -> Self {
        Self::get(paths::report(ticket))
    }

    /// Lists requests awaiting review.
    #[must_use]
    pub fn pending() -> Self {
        Self::get(paths::ADMIN_RDM_PENDING)
    }

    /// Lists the signed-in user's requests.
    #[must_use]
    pub fn mine() -> Self {
        Self::get(paths::RDM_LOGGED_USER)
    }

    /// The absolute URL of this request under `base`.
    #[must_use]
    pub fn url(&self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.path)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::*;

    fn ticket() -> Ticket {
        "RDM-20260116-2f6863ca".parse().unwrap()
    }

    #[test_case(ApiRequest::fetch(&ticket()), "/api/RDM/RDM-20260116-2f6863ca"; "fetch")]
    #[test_case(ApiRequest::fetch_short(&ticket()), "/api/RDM/ticket-short/RDM-20260116-2f6863ca"; "short")]
    #[test_case(ApiRequest::attachments(&ticket()), "/api/RDM/Attachments/RDM-20260116-2f6863ca"; "attachments")]
    #[test_case(ApiRequest::report(&ticket()), "/api/Report?ticket=RDM-20260116-2f6863ca"; "report")]
    #[test_case(ApiRequest::pending(), "/api/Admin/rdm-pending"; "pending")]
    #[test_case(ApiRequest::mine(), "/api/RDM/Logged-user"; "mine")]
    fn get_paths(request: ApiRequest, path: &str) {
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, path);
        assert_eq!(request.body, RequestBody::Empty);
    }

    #[test]
    fn approve_path() {
        assert_eq!(
            paths::admin_rdm_approve(&ticket()),
            "/api/Admin/rdm-approve/RDM-20260116-2f6863ca"
        );
    }

    #[test]
    fn url_joins_base() {
        let request = ApiRequest::get(paths::RDM);
        assert_eq!(
            request.url("http://192.168.1.68:8080/"),
            "http://192.168.1.68:8080/api/RDM"
        );
    }

    #[test]
    fn serialises_as_descriptor() {
        let request = ApiRequest::put_json("/api/RDM/x", &json!({"a": 1})).unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "method": "PUT",
                "path": "/api/RDM/x",
                "body": {"kind": "json", "content": {"a": 1}}
            })
        );
        assert_eq!(
            serde_json::to_value(ApiRequest::pending()).unwrap()["body"],
            json!({"kind": "empty"})
        );
    }
}
