use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a change request is in its review lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Submitted and awaiting review. The only editable state.
    Pending,
    /// Approved by an administrator.
    Approved,
    /// Rejected by an administrator.
    Rejected,
    /// Carried out.
    Completed,
    /// Under analysis.
    InAnalysis,
    /// Withdrawn.
    Cancelled,
}

impl Status {
    /// Leniently recognises a status in Portuguese or English free text.
    ///
    /// Matching is case-insensitive and works on substrings, so
    /// `"RDM Aprovada"` is recognised as [`Status::Approved`].
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let lower = raw.to_lowercase();
        let contains_any = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        if contains_any(&["aprovado", "aprovada", "approved"]) {
            Some(Self::Approved)
        } else if contains_any(&[
            "rejeitado",
            "rejeitada",
            "reprovado",
            "reprovada",
            "rejected",
        ]) {
            Some(Self::Rejected)
        } else if contains_any(&["pendente", "pending"]) {
            Some(Self::Pending)
        } else if contains_any(&["concluído", "concluida", "completed"]) {
            Some(Self::Completed)
        } else if contains_any(&["em análise", "analysis"]) {
            Some(Self::InAnalysis)
        } else if contains_any(&["cancelado", "cancelada", "cancelled"]) {
            Some(Self::Cancelled)
        } else {
            None
        }
    }

    /// The value the review endpoint expects.
    ///
    /// Only the three review outcomes have an API form.
    #[must_use]
    pub const fn api_label(self) -> Option<&'static str> {
        match self {
            Self::Pending => Some("Pendente"),
            Self::Approved => Some("Aprovado"),
            Self::Rejected => Some("Reprovado"),
            Self::Completed | Self::InAnalysis | Self::Cancelled => None,
        }
    }

    /// The label shown in lists.
    #[must_use]
    pub const fn display_label(self) -> &'static str {
        match self {
            Self::Pending => "Pendente",
            Self::Approved => "Aprovada",
            Self::Rejected => "Reprovado",
            Self::Completed => "Concluída",
            Self::InAnalysis => "Em Análise",
            Self::Cancelled => "Cancelada",
        }
    }

    /// Whether a request in this state may still be edited by its author.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_label())
    }
}

/// Normalises a status for display, passing unknown text through.
#[must_use]
pub fn display_status(raw: &str) -> String {
    Status::parse(raw).map_or_else(|| raw.to_string(), |status| status.display_label().to_string())
}
