use clap::Parser;
use rdm::{TechnologyArea, normalize_technology_area};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Normalise free-text technology areas to their canonical values")]
pub struct Area {
    /// Raw values, e.g. "banco de dados" or "Ubuntu 22.04"
    #[arg(required = true)]
    values: Vec<String>,
}

impl Area {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) {
        let width = self.values.iter().map(String::len).max().unwrap_or(0);
        for raw in &self.values {
            let (normalized, known) = classify(raw);
            let shown = if known {
                normalized.success()
            } else {
                normalized.warning()
            };
            println!("{raw:<width$}  →  {shown}");
        }
    }
}

/// Returns the normalised value and whether it is one of the known areas.
fn classify(raw: &str) -> (String, bool) {
    let normalized = normalize_technology_area(raw);
    let known = TechnologyArea::ALL
        .iter()
        .any(|area| area.as_str() == normalized);
    (normalized, known)
}
