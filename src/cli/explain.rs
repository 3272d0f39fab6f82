use std::path::PathBuf;

use clap::Parser;
use rdm::TransportError;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Interpret a failed backend response as a user-facing message")]
pub struct Explain {
    /// The HTTP status code
    status: u16,

    /// File holding the response body
    #[arg(long)]
    body: Option<PathBuf>,

    /// Ticket the call concerned, quoted in not-found messages
    #[arg(long)]
    ticket: Option<String>,
}

impl Explain {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<()> {
        let body = match &self.body {
            Some(path) => std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?,
            None => String::new(),
        };
        let error = TransportError::from_response(self.status, &body, self.ticket.as_deref());
        println!("{} {error}", format!("[{}]", error.status()).warning());
        Ok(())
    }
}
