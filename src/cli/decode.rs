use std::path::{Path, PathBuf};

use clap::Parser;
use rdm::{codec::RecordSummary, decode_record, domain::display_status};
use serde_json::Value;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Hydrate a form from a backend record")]
pub struct Decode {
    /// Path to the backend record (JSON)
    record: PathBuf,

    /// Print only the record's headline fields
    #[arg(long)]
    summary: bool,

    /// Write the form to this file instead of stdout
    #[arg(short, long, conflicts_with = "summary")]
    output: Option<PathBuf>,
}

impl Decode {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config = super::load_config(root);
        let record: Value = super::read_json(&self.record)?;

        if self.summary {
            Self::output_summary(&RecordSummary::from_record(&record));
            return Ok(());
        }

        let form = decode_record(&record, config.offset());
        let json = serde_json::to_string_pretty(&form)?;
        match &self.output {
            Some(path) => {
                std::fs::write(path, json + "\n")
                    .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", path.display()))?;
                println!("Wrote {}", path.display());
            }
            None => println!("{json}"),
        }
        Ok(())
    }

    fn output_summary(summary: &RecordSummary) {
        let or_dash = |value: &str| {
            if value.is_empty() {
                "-".dim()
            } else {
                value.to_string()
            }
        };
        println!("Ticket: {}", or_dash(&summary.ticket).info());
        println!("Title:  {}", or_dash(&summary.title));
        println!("Type:   {}", or_dash(&summary.kind));
        println!("Status: {}", or_dash(&display_status(&summary.status)));
    }
}
