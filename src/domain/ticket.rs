use std::{fmt, str::FromStr};

use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};

/// The unique identifier the backend assigns to a change request.
///
/// Format: `RDM-{DATE}-{SUFFIX}`, where:
/// - `RDM` is a fixed, upper-case prefix
/// - `DATE` is the creation date as digits (e.g. `20260116`)
/// - `SUFFIX` is a lower-case token that may itself contain dashes
///
/// Example: `RDM-20260116-2f6863ca`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticket {
    date: NonEmptyString,
    suffix: NonEmptyString,
}

/// The fixed prefix of every ticket.
pub const TICKET_PREFIX: &str = "RDM";

impl Ticket {
    /// Normalises user input into a ticket.
    ///
    /// Surrounding whitespace is trimmed, the prefix is upper-cased and the
    /// suffix lower-cased. Input that does not start with `RDM-` (in any case)
    /// is rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, has the wrong prefix, or lacks
    /// a date or suffix segment.
    ///
    /// # Examples
    ///
    /// ```
    /// use rdm::Ticket;
    ///
    /// let ticket = Ticket::normalize("  rdm-20260116-2F6863CA ").unwrap();
    /// assert_eq!(ticket.to_string(), "RDM-20260116-2f6863ca");
    /// ```
    pub fn normalize(raw: &str) -> Result<Self, Error> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::Empty);
        }

        let mut parts = trimmed.splitn(3, '-');
        let prefix = parts.next().unwrap_or_default();
        if !prefix.eq_ignore_ascii_case(TICKET_PREFIX) {
            return Err(Error::Prefix(trimmed.to_string()));
        }

        let date = parts
            .next()
            .and_then(|date| NonEmptyString::new(date.to_string()).ok())
            .ok_or_else(|| Error::Syntax(trimmed.to_string()))?;
        let suffix = parts
            .next()
            .and_then(|suffix| NonEmptyString::new(suffix.to_lowercase()).ok())
            .ok_or_else(|| Error::Syntax(trimmed.to_string()))?;

        Ok(Self { date, suffix })
    }

    /// The date segment.
    #[must_use]
    pub fn date(&self) -> &str {
        self.date.as_str()
    }

    /// The suffix segment.
    #[must_use]
    pub fn suffix(&self) -> &str {
        self.suffix.as_str()
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{TICKET_PREFIX}-{}-{}", self.date, self.suffix)
    }
}

/// Errors that can occur while parsing a ticket.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// Nothing was entered.
    #[error("Please enter a ticket code")]
    Empty,

    /// The ticket does not start with `RDM-`.
    #[error("Invalid ticket '{0}': tickets start with \"RDM-\", e.g. RDM-20260116-2f6863ca")]
    Prefix(String),

    /// The date or suffix segment is missing.
    #[error("Invalid ticket format: {0}")]
    Syntax(String),
}

impl FromStr for Ticket {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}

impl TryFrom<&str> for Ticket {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::normalize(value)
    }
}

impl TryFrom<String> for Ticket {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::normalize(&value)
    }
}

impl From<Ticket> for String {
    fn from(ticket: Ticket) -> Self {
        ticket.to_string()
    }
}
