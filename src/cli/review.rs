use std::path::Path;

use clap::{ArgGroup, Parser};
use rdm::{ReviewDecision, Ticket};
use tracing::instrument;

#[derive(Debug, Parser)]
#[command(about = "Build the request that approves or rejects a pending change request")]
#[command(group(ArgGroup::new("verdict").required(true).args(["approve", "reject"])))]
pub struct Review {
    /// Ticket of the request under review
    #[arg(value_parser = super::parse_ticket)]
    ticket: Ticket,

    /// Approve the request
    #[arg(long)]
    approve: bool,

    /// Reject the request
    #[arg(long)]
    reject: bool,

    /// Note for the requester
    #[arg(long, default_value = "")]
    subject: String,
}

impl Review {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config = super::load_config(root);
        let decision = self.decision();
        let request = decision.request(&self.ticket)?;

        tracing::info!(ticket = %self.ticket, status = %decision.status, "Review prepared");
        let descriptor = serde_json::json!({
            "url": request.url(&config.api_base_url),
            "method": request.method,
            "body": request.body,
        });
        println!("{}", serde_json::to_string_pretty(&descriptor)?);
        Ok(())
    }

    fn decision(&self) -> ReviewDecision {
        if self.approve {
            ReviewDecision::approve(self.subject.clone())
        } else {
            ReviewDecision::reject(self.subject.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use rdm::Status;

    use super::*;

    #[test]
    fn verdict_is_required() {
        assert!(Review::try_parse_from(["review", "RDM-20260116-abc"]).is_err());
        assert!(
            Review::try_parse_from(["review", "RDM-20260116-abc", "--approve", "--reject"]).is_err()
        );
    }

    #[test]
    fn reject_carries_subject() {
        let review =
            Review::try_parse_from(["review", "rdm-20260116-abc", "--reject", "--subject", "No"])
                .unwrap();
        let decision = review.decision();

        assert_eq!(decision.status, Status::Rejected);
        assert_eq!(decision.subject, "No");
        assert_eq!(review.ticket.to_string(), "RDM-20260116-abc");
    }
}
