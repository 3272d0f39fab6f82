use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use clap::Parser;
use rdm::{
    ChangeRequestForm, Step,
    codec::dates::format_for_display,
    domain::{
        PhaseRecord, PlanningDetails,
        attachment::human_size,
        vocabulary::{self, SelectOption},
    },
};
use tracing::instrument;

use super::terminal::{Colorize, is_narrow};

#[derive(Debug, Parser)]
#[command(about = "Display a form with human-readable labels")]
pub struct Show {
    /// Path to the form (JSON)
    form: PathBuf,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

/// Collects `(label, value)` rows under section headings.
struct Sheet {
    narrow: bool,
    lines: Vec<String>,
}

impl Sheet {
    fn section(&mut self, step: Step) {
        if !self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.lines.push(step.to_string().heading());
    }

    fn row(&mut self, label: &str, value: &str) {
        let value = if value.is_empty() {
            "-".dim()
        } else {
            value.to_string()
        };
        if self.narrow {
            self.lines.push(format!("  {}", label.dim()));
            self.lines.push(format!("    {value}"));
        } else {
            self.lines.push(format!("  {:<22} {value}", format!("{label}:")));
        }
    }

    fn choice(&mut self, label: &str, options: &[SelectOption], value: &str) {
        self.row(label, vocabulary::display_value(options, value));
    }
}

impl Show {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let form: ChangeRequestForm = super::read_json(&self.form)?;
        match self.output {
            OutputFormat::Pretty => {
                let offset = super::load_config(root).offset();
                for line in render(&form, offset, is_narrow()) {
                    println!("{line}");
                }
            }
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&form)?),
        }
        Ok(())
    }
}

fn render(form: &ChangeRequestForm, offset: FixedOffset, narrow: bool) -> Vec<String> {
    let mut sheet = Sheet {
        narrow,
        lines: Vec::new(),
    };

    sheet.section(Step::Identification);
    sheet.choice("Tipo", vocabulary::REQUEST_TYPES, &form.identification.kind);
    sheet.row("Título", &form.identification.title);

    sheet.section(Step::Solution);
    sheet.row("Objetivo/Solução", &form.solution.objective_or_solution);

    sheet.section(Step::Category);
    let category = &form.category;
    sheet.choice("Objetivo", vocabulary::OBJECTIVE_TYPES, &category.objective);
    sheet.choice("Ação", vocabulary::ACTION_TYPES, &category.action);
    sheet.choice("Impacto", vocabulary::LEVEL_TYPES, &category.impact);
    sheet.choice("Urgência", vocabulary::LEVEL_TYPES, &category.urgency);

    sheet.section(Step::ImpactCategory);
    let impact = &form.impact_category;
    sheet.row("Sistema", &impact.change_system);
    sheet.choice("Atividade", vocabulary::ACTIVITY_TYPES, &impact.activity);
    sheet.row("Serviços impactados", &impact.impacted_services);
    sheet.choice("Ambiente", vocabulary::ENVIRONMENT_TYPES, &impact.environment);
    sheet.row("ICs impactados", &impact.ics_impacted);

    sheet.section(Step::DeploymentWindow);
    sheet.choice(
        "Tipo de impacto",
        vocabulary::IMPACT_TYPES,
        &form.deployment_window.impact_type,
    );

    sheet.section(Step::PlanCommunication);
    let plan = &form.plan_communication;
    sheet.row("Quem é notificado", &plan.who_is_notified);
    sheet.choice("Momento", vocabulary::MOMENTS, &plan.moment);
    sheet.choice(
        "Tipo de comunicação",
        vocabulary::COMMUNICATION_TYPES,
        &plan.communication_type,
    );
    sheet.choice(
        "Área de tecnologia",
        vocabulary::TECHNOLOGY_AREAS,
        &plan.technology_area,
    );

    sheet.section(Step::Phases);
    let phases = &form.phases;
    sheet.row("Planejado", &phases.planning.was_planned);
    sheet.row("Justificativa", &phases.planning.justification_planned);
    sheet.row("Testado", &phases.test_homology.was_tested);
    sheet.row("Justificativa", &phases.test_homology.justification_test);
    scheduled(&mut sheet, "Execução", &phases.execute, offset);
    scheduled(&mut sheet, "Validação", &phases.validation, offset);

    sheet.section(Step::Planning);
    planning(&mut sheet, "Execução", &form.planning_execution);
    planning(&mut sheet, "Remediação", &form.planning_remediation);

    sheet.section(Step::Attachments);
    let attachment = form
        .attachment
        .as_ref()
        .map(|a| format!("{} ({})", a.file_name, human_size(a.size)))
        .unwrap_or_default();
    sheet.row("Arquivo", &attachment);

    sheet.lines
}

fn scheduled(sheet: &mut Sheet, name: &str, phase: &PhaseRecord, offset: FixedOffset) {
    let date = |value: &str| format_for_display(value, offset, true).unwrap_or_default();
    sheet.choice(&format!("{name}: etapa"), vocabulary::STAGES, &phase.stage);
    sheet.row(&format!("{name}: início"), &date(&phase.start_date));
    sheet.row(&format!("{name}: fim"), &date(&phase.end_date));
}

fn planning(sheet: &mut Sheet, name: &str, details: &PlanningDetails) {
    sheet.row(&format!("{name}: atividade"), &details.activity);
    sheet.choice(
        &format!("{name}: área"),
        vocabulary::TECHNOLOGY_AREAS,
        &details.technology_area,
    );
    sheet.choice(
        &format!("{name}: sucesso"),
        vocabulary::LEVEL_TYPES,
        &details.probability_of_success,
    );
}
