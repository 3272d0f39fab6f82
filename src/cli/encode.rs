use std::{
    io::Write,
    path::{Path, PathBuf},
};

use clap::Parser;
use rdm::{
    ApiRequest, Attachment, ChangeRequestForm, CreateSession, Ticket,
    api::{RequestBody, paths},
    codec::MultipartForm,
    encode_update,
};
use serde::Serialize;
use tracing::instrument;

#[derive(Debug, Parser)]
#[command(about = "Build the request that submits a form")]
pub struct Encode {
    /// Path to the form (JSON)
    form: PathBuf,

    /// Which submission to build
    #[arg(long, value_enum, default_value = "multipart")]
    mode: Mode,

    /// Archive to attach (creation only)
    #[arg(long, conflicts_with = "ticket")]
    attachment: Option<PathBuf>,

    /// Ticket of the request being edited (required for updates)
    #[arg(long, value_parser = super::parse_ticket, required_if_eq("mode", "update"))]
    ticket: Option<Ticket>,

    /// Print the raw multipart body using this boundary instead of the
    /// request descriptor
    #[arg(long, value_name = "BOUNDARY")]
    boundary: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum Mode {
    /// Multipart creation (`POST /api/RDM`)
    #[default]
    Multipart,
    /// JSON update (`PUT /api/RDM/{ticket}`)
    Update,
}

#[derive(Debug, Serialize)]
struct Descriptor<'a> {
    url: String,
    #[serde(flatten)]
    request: &'a ApiRequest,
}

impl Encode {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config = super::load_config(root);
        let form: ChangeRequestForm = super::read_json(&self.form)?;

        let request = match self.mode {
            Mode::Multipart => self.creation(form, &config)?,
            Mode::Update => {
                let Some(ticket) = &self.ticket else {
                    anyhow::bail!("--ticket is required for updates");
                };
                let payload = encode_update(&form, config.offset());
                ApiRequest::put_json(paths::rdm(ticket), &payload)?
            }
        };

        if let Some(boundary) = &self.boundary {
            let RequestBody::Multipart(body) = &request.body else {
                anyhow::bail!("--boundary only applies to multipart submissions");
            };
            println!("Content-Type: {}", MultipartForm::content_type(boundary));
            println!();
            std::io::stdout().write_all(&body.render(boundary))?;
            return Ok(());
        }

        let descriptor = Descriptor {
            url: request.url(&config.api_base_url),
            request: &request,
        };
        println!("{}", serde_json::to_string_pretty(&descriptor)?);
        Ok(())
    }

    fn creation(
        &self,
        mut form: ChangeRequestForm,
        config: &rdm::Config,
    ) -> anyhow::Result<ApiRequest> {
        let mut session = CreateSession::new(config);
        if let Some(path) = &self.attachment {
            form.attachment = None;
            *session.form_mut() = form;
            let attachment = Attachment::from_path(path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
            session.attach(attachment)?;
        } else {
            *session.form_mut() = form;
        }
        let (_, request) = session.submission()?;
        Ok(request)
    }
}
