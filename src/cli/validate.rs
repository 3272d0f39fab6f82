use std::{path::PathBuf, process};

use clap::Parser;
use rdm::{ChangeRequestForm, Step};
use serde::Serialize;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Check a form step by step and report what blocks submission")]
pub struct Validate {
    /// Path to the form (JSON)
    form: PathBuf,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress all output; rely on the exit status
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Serialize)]
struct StepReport {
    step: u8,
    label: &'static str,
    valid: bool,
    reasons: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Report {
    submittable: bool,
    steps: Vec<StepReport>,
}

impl Report {
    fn new(form: &ChangeRequestForm) -> Self {
        let steps: Vec<StepReport> = Step::ALL
            .iter()
            .map(|step| {
                let validation = step.validate(form);
                StepReport {
                    step: step.number(),
                    label: step.label(),
                    valid: validation.valid,
                    reasons: validation.reasons,
                }
            })
            .collect();
        Self {
            submittable: steps.iter().all(|step| step.valid),
            steps,
        }
    }
}

impl Validate {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<()> {
        let form: ChangeRequestForm = super::read_json(&self.form)?;
        let report = Report::new(&form);

        if !self.quiet {
            match self.output {
                OutputFormat::Table => Self::output_table(&report),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }

        if !report.submittable {
            process::exit(2);
        }

        Ok(())
    }

    fn output_table(report: &Report) {
        for step in &report.steps {
            let line = format!("{:>2}. {}", step.step, step.label);
            if step.valid {
                println!("{} {line}", "✓".success());
            } else {
                println!("{} {line}", "✗".warning());
                for reason in &step.reasons {
                    println!("     {}", reason.dim());
                }
            }
        }
        println!();
        if report.submittable {
            println!("{}", "Ready to submit".success());
        } else {
            println!("{}", "Not ready to submit".warning());
        }
    }
}
