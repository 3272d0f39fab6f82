//! Domain models for change requests.
//!
//! This module contains the form schema, step rules and navigation, and the
//! small value types (tickets, statuses, technology areas, attachments) that
//! flow through the codecs.

/// The change-request form and its sections.
pub mod form;
pub use form::{
    Category, ChangeRequestForm, DeploymentWindow, Identification, ImpactCategory,
    PhaseRecord, Phases, PlanCommunication, PlanningDetails, Solution,
};

mod steps;
pub use steps::{Step, StepValidation};

mod navigator;
pub use navigator::{Advance, NavigationEvent, StepNavigator};

mod technology_area;
pub use technology_area::{TechnologyArea, UnknownAreaError, normalize_technology_area};

/// Ticket identifiers and parsing.
pub mod ticket;
pub use ticket::{Error as TicketError, Ticket};

mod status;
pub use status::{Status, display_status};

/// Attachments and the rules they are checked against.
pub mod attachment;
pub use attachment::{Attachment, AttachmentError, AttachmentPolicy};

pub mod vocabulary;

mod config;
pub use config::Config;
