use tracing::debug;

use crate::session::SessionError;

/// Identifies one outstanding request.
///
/// A token is only honoured while it is the tracker's current one; starting a
/// newer request or cancelling makes it stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken {
    generation: u64,
}

impl RequestToken {
    /// The generation this token was issued for.
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.generation
    }
}

/// Hands out generation-stamped tokens for in-flight requests.
///
/// Responses are delivered together with the token returned when the request
/// started. A response carrying a stale token is refused, so a request the
/// user has since abandoned or superseded can never write into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestTracker {
    generation: u64,
    in_flight: Option<u64>,
}

impl RequestTracker {
    /// Starts a request, superseding any that is still outstanding.
    pub fn start(&mut self) -> RequestToken {
        self.generation += 1;
        if let Some(previous) = self.in_flight.replace(self.generation) {
            debug!(previous, current = self.generation, "Superseding in-flight request");
        }
        RequestToken {
            generation: self.generation,
        }
    }

    /// Abandons the outstanding request, if any.
    pub fn cancel(&mut self) {
        if let Some(generation) = self.in_flight.take() {
            debug!(generation, "Cancelled in-flight request");
        }
        self.generation += 1;
    }

    /// Whether a request is outstanding.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether `token` belongs to the outstanding request.
    #[must_use]
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.in_flight == Some(token.generation)
    }

    /// Marks the request identified by `token` as answered.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Stale`] if the token has been superseded or
    /// cancelled, or was already used.
    pub fn finish(&mut self, token: RequestToken) -> Result<(), SessionError> {
        if self.is_current(token) {
            self.in_flight = None;
            Ok(())
        } else {
            debug!(
                generation = token.generation,
                "Discarding response to a stale request"
            );
            Err(SessionError::Stale)
        }
    }
}
