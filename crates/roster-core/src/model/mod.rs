//! Incident records and the request shapes used to mutate them.

pub mod chat;
pub mod incident;

pub use chat::{ChatMessage, MAX_MESSAGE_CHARS};
pub use incident::{
    Incident, IncidentDraft, IncidentPage, IncidentPatch, MAX_TITLE_CHARS, ParseEnumError,
    Priority, Status,
};
