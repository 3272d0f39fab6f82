use std::path::Path;

use clap::{ArgGroup, Parser};
use rdm::codec::dates;
use tracing::instrument;

#[derive(Debug, Parser)]
#[command(about = "Convert dates between the editing, wire and display forms")]
#[command(group(ArgGroup::new("direction").args(["to_iso", "to_local", "display"])))]
pub struct Date {
    /// The date to convert
    value: String,

    /// Local editing form to a UTC instant (the default)
    #[arg(long)]
    to_iso: bool,

    /// UTC instant to the local editing form
    #[arg(long)]
    to_local: bool,

    /// Any accepted form to `DD/MM/YYYY HH:mm`
    #[arg(long)]
    display: bool,

    /// Drop the time when displaying
    #[arg(long, requires = "display")]
    date_only: bool,
}

impl Date {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) {
        let offset = super::load_config(root).offset();
        let converted = if self.to_local {
            dates::iso_to_local(&self.value, offset)
        } else if self.display {
            dates::format_for_display(&self.value, offset, !self.date_only).unwrap_or_default()
        } else {
            dates::local_to_iso(&self.value, offset)
        };
        println!("{converted}");
    }
}
