use serde_json::Value;

/// A failed call, as reported by the backend.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransportError {
    /// No request exists with the given ticket.
    #[error("No change request found with ticket \"{ticket}\"")]
    NotFound {
        /// The ticket that was looked up, or empty when not known.
        ticket: String,
    },

    /// The session has expired.
    #[error("Session expired, please sign in again")]
    Unauthorized,

    /// The user may not access this request.
    #[error("You do not have permission to access this change request")]
    Forbidden,

    /// Any other failure, with the backend's message when it sent one.
    #[error("{message}")]
    Backend {
        /// The HTTP status code.
        status: u16,
        /// The extracted message.
        message: String,
    },
}

impl TransportError {
    /// Interprets a failed response.
    ///
    /// `ticket` is quoted in the not-found message when the call concerned a
    /// specific request.
    #[must_use]
    pub fn from_response(status: u16, body: &str, ticket: Option<&str>) -> Self {
        match status {
            404 => Self::NotFound {
                ticket: ticket.unwrap_or_default().to_string(),
            },
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            _ => {
                let message = serde_json::from_str::<Value>(body)
                    .ok()
                    .and_then(|value| extract_backend_message(&value))
                    .or_else(|| {
                        let trimmed = body.trim();
                        (!trimmed.is_empty()).then(|| trimmed.to_string())
                    })
                    .unwrap_or_else(|| format!("HTTP {status}"));
                Self::Backend { status, message }
            }
        }
    }

    /// The HTTP status this error was built from.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::Backend { status, .. } => *status,
        }
    }
}

/// Pulls a readable message out of a backend error payload.
///
/// The backend reports errors in several shapes. They are tried in this
/// order: `errorMessages[]`, `errors[]`, `message`, `errors{field: [..]}`
/// and finally `title`. List entries are joined with ` | `.
#[must_use]
pub fn extract_backend_message(body: &Value) -> Option<String> {
    if let Some(messages) = body.get("errorMessages").and_then(Value::as_array) {
        return Some(join_list(messages));
    }

    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        return Some(join_list(errors));
    }

    if let Some(message) = body.get("message").and_then(non_empty_text) {
        return Some(message);
    }

    if let Some(fields) = body.get("errors").and_then(Value::as_object) {
        let rendered: Vec<String> = fields
            .iter()
            .map(|(field, errors)| match errors {
                Value::Array(items) => format!("{field}: {}", join_with(items, ", ")),
                other => format!("{field}: {}", text_of(other)),
            })
            .collect();
        return Some(rendered.join(" | "));
    }

    body.get("title").and_then(non_empty_text)
}

fn join_list(items: &[Value]) -> String {
    join_with(items, " | ")
}

fn join_with(items: &[Value], separator: &str) -> String {
    items.iter().map(text_of).collect::<Vec<_>>().join(separator)
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn non_empty_text(value: &Value) -> Option<String> {
    let text = text_of(value);
    (!value.is_null() && !text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::*;

    #[test_case(json!({"errorMessages": ["Title required", "Type required"]}), "Title required | Type required"; "error messages list")]
    #[test_case(json!({"errors": ["bad date"]}), "bad date"; "errors list")]
    #[test_case(json!({"message": "Ticket closed", "errors": {"a": ["b"]}}), "Ticket closed"; "message before field map")]
    #[test_case(json!({"errors": {"Title": ["is required", "too short"], "Type": "invalid"}}), "Title: is required, too short | Type: invalid"; "field map")]
    #[test_case(json!({"title": "One or more validation errors occurred."}), "One or more validation errors occurred."; "title")]
    fn extracts(body: Value, expected: &str) {
        assert_eq!(extract_backend_message(&body).as_deref(), Some(expected));
    }

    #[test]
    fn nothing_to_extract() {
        assert_eq!(extract_backend_message(&json!({"status": 500})), None);
        assert_eq!(extract_backend_message(&json!({"message": ""})), None);
    }

    #[test]
    fn status_codes_have_fixed_meanings() {
        assert_eq!(
            TransportError::from_response(404, "", Some("RDM-1-a")),
            TransportError::NotFound {
                ticket: "RDM-1-a".to_string()
            }
        );
        assert_eq!(
            TransportError::from_response(401, "{}", None),
            TransportError::Unauthorized
        );
        assert_eq!(
            TransportError::from_response(403, "{}", None),
            TransportError::Forbidden
        );
    }

    #[test]
    fn backend_message_fallbacks() {
        let json = TransportError::from_response(400, r#"{"message": "Invalid"}"#, None);
        assert_eq!(json.to_string(), "Invalid");
        assert_eq!(json.status(), 400);

        let text = TransportError::from_response(500, "Internal failure", None);
        assert_eq!(text.to_string(), "Internal failure");

        let unknown = TransportError::from_response(502, r#"{"status": 502}"#, None);
        assert_eq!(unknown.to_string(), r#"{"status": 502}"#);

        let empty = TransportError::from_response(503, "  ", None);
        assert_eq!(empty.to_string(), "HTTP 503");
    }
}
