use std::path::{Path, PathBuf};

mod area;
mod date;
mod decode;
mod encode;
mod explain;
mod review;
mod show;
mod terminal;
mod validate;

use area::Area;
use clap::ArgAction;
use date::Date;
use decode::Decode;
use encode::Encode;
use explain::Explain;
use rdm::{ChangeRequestForm, Config, Ticket};
use review::Review;
use serde::de::DeserializeOwned;
use show::Show;
use tracing::instrument;
use validate::Validate;

/// Parse a ticket, normalising case and whitespace.
fn parse_ticket(s: &str) -> Result<Ticket, String> {
    Ticket::normalize(s).map_err(|e| format!("{e}"))
}

/// Loads the project configuration, falling back to defaults.
fn load_config(root: &Path) -> Config {
    Config::load_or_default(&Config::path(root))
}

/// Reads and deserialises a JSON file.
fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {e}", path.display()))
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    /// The path to the project root (where `.rdm/config.toml` lives)
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command.run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Write a default configuration file
    Init(Init),

    /// Print an empty form as JSON
    New(New),

    /// Check a form step by step
    ///
    /// Exits with status 2 when the form cannot be submitted.
    Validate(Validate),

    /// Build the request that submits a form
    Encode(Encode),

    /// Hydrate a form from a backend record
    Decode(Decode),

    /// Display a form with human-readable labels
    Show(Show),

    /// Normalise technology-area names
    Area(Area),

    /// Convert between local, ISO and display date formats
    Date(Date),

    /// Build an administrator's approve or reject request
    Review(Review),

    /// Interpret a failed backend response
    Explain(Explain),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Init(command) => command.run(&root)?,
            Self::New(command) => command.run()?,
            Self::Validate(command) => command.run()?,
            Self::Encode(command) => command.run(&root)?,
            Self::Decode(command) => command.run(&root)?,
            Self::Show(command) => command.run(&root)?,
            Self::Area(command) => command.run(),
            Self::Date(command) => command.run(&root),
            Self::Review(command) => command.run(&root)?,
            Self::Explain(command) => command.run()?,
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Init {}

impl Init {
    #[instrument(level = "debug", skip(self))]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let config_path = Config::path(root);
        if config_path.exists() {
            anyhow::bail!(
                "Project already initialized (found existing {})",
                config_path.display()
            );
        }

        Config::default()
            .save(&config_path)
            .map_err(|e| anyhow::anyhow!("Failed to create config.toml: {e}"))?;

        println!("Initialized change-request project in {}", root.display());
        println!("  Created: {}/config.toml", Config::DIR);
        println!();
        println!("Next steps:");
        println!("  rdm new --output request.json");
        println!("  rdm validate request.json");

        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct New {
    /// Write the form to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl New {
    #[instrument(level = "debug", skip(self))]
    fn run(self) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&ChangeRequestForm::empty())?;
        match self.output {
            Some(path) => {
                if path.exists() {
                    anyhow::bail!("Refusing to overwrite {}", path.display());
                }
                std::fs::write(&path, json + "\n")
                    .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", path.display()))?;
                println!("Created {}", path.display());
            }
            None => println!("{json}"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parse_ticket_normalises() {
        let ticket = parse_ticket(" rdm-20260116-ABC ").unwrap();
        assert_eq!(ticket.to_string(), "RDM-20260116-abc");
        assert!(parse_ticket("CHG-1").is_err());
    }

    #[test]
    fn init_writes_default_config() {
        let tmp = tempfile::tempdir().unwrap();

        Init {}.run(tmp.path()).unwrap();

        let config = Config::load(&Config::path(tmp.path())).unwrap();
        assert_eq!(config, Config::default());
        assert!(Init {}.run(tmp.path()).is_err());
    }

    #[test]
    fn missing_config_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(load_config(tmp.path()), Config::default());
    }

    #[test]
    fn new_writes_empty_form() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("form.json");

        New {
            output: Some(path.clone()),
        }
        .run()
        .unwrap();

        let form: ChangeRequestForm = read_json(&path).unwrap();
        assert_eq!(form, ChangeRequestForm::empty());
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::try_parse_from(["rdm", "-vv", "--root", "/tmp/x", "area", "win"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.root, PathBuf::from("/tmp/x"));
        assert!(matches!(cli.command, Command::Area(_)));
    }
}
