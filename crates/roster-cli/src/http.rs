//! `IncidentRepository` over the incident service's REST API.
//!
//! Create and update are form-encoded, matching the service's form
//! handlers; chat is JSON. Redirects are never followed, so a `303 See
//! Other` from create surfaces as "accepted, no record echoed".

use roster_core::config::ServerConfig;
use roster_core::error::RepoError;
use roster_core::model::{Incident, IncidentDraft, IncidentPage, IncidentPatch};
use roster_core::repo::{IncidentRepository, RepoResult};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub struct HttpRepository {
    agent: ureq::Agent,
    base_url: String,
    token: Option<String>,
    cookie_name: String,
}

impl HttpRepository {
    #[must_use]
    pub fn new(server: &ServerConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(server.timeout_secs.max(1)))
            .redirects(0)
            .user_agent(concat!("roster-cli/", env!("CARGO_PKG_VERSION")))
            .build();

        Self {
            agent,
            base_url: server.base_url.trim_end_matches('/').to_string(),
            token: server.token.clone().filter(|t| !t.trim().is_empty()),
            cookie_name: server.cookie_name.clone(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/api/incidents", self.base_url)
    }

    fn incident_url(&self, id: &str) -> RepoResult<String> {
        validate_path_id(id)?;
        Ok(format!("{}/api/incidents/{id}", self.base_url))
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        debug!(method, url, "incident service request");
        let mut request = self
            .agent
            .request(method, url)
            .set("Accept", "application/json");

        if let Some(token) = &self.token {
            request = request
                .set("Authorization", &format!("Bearer {token}"))
                .set("Cookie", &format!("{}={token}", self.cookie_name));
        }
        request
    }
}

impl IncidentRepository for HttpRepository {
    fn list(&mut self, limit: usize, offset: usize) -> RepoResult<IncidentPage> {
        let response = self
            .request("GET", &self.collection_url())
            .query("limit", &limit.to_string())
            .query("offset", &offset.to_string())
            .call()
            .map_err(map_error)?;
        decode(response)
    }

    fn get(&mut self, id: &str) -> RepoResult<Incident> {
        let url = self.incident_url(id)?;
        let response = self.request("GET", &url).call().map_err(map_error)?;
        decode(response)
    }

    fn create(&mut self, draft: &IncidentDraft) -> RepoResult<Option<Incident>> {
        let mut fields = vec![
            ("title", draft.title.as_str()),
            ("status", draft.status.as_str()),
            ("priority", draft.priority.as_str()),
            ("assigned_to", draft.assigned_to.as_str()),
        ];
        if let Some(description) = &draft.description {
            fields.push(("description", description.as_str()));
        }

        let response = self
            .request("POST", &self.collection_url())
            .send_form(&fields)
            .map_err(map_error)?;
        decode_optional(response)
    }

    fn update(&mut self, id: &str, patch: &IncidentPatch) -> RepoResult<Incident> {
        let url = self.incident_url(id)?;
        let response = self
            .request("PUT", &url)
            .send_form(&patch_fields(patch))
            .map_err(map_error)?;
        decode(response)
    }

    fn delete(&mut self, id: &str) -> RepoResult<()> {
        let url = self.incident_url(id)?;
        self.request("DELETE", &url).call().map_err(map_error)?;
        Ok(())
    }

    fn append_message(&mut self, id: &str, content: &str) -> RepoResult<Option<Incident>> {
        let url = format!("{}/chat", self.incident_url(id)?);
        let response = self
            .request("POST", &url)
            .send_json(serde_json::json!({ "content": content }))
            .map_err(map_error)?;
        decode_optional(response)
    }
}

/// Only the fields present in the patch are sent.
fn patch_fields(patch: &IncidentPatch) -> Vec<(&'static str, &str)> {
    let mut fields = Vec::new();
    if let Some(title) = &patch.title {
        fields.push(("title", title.as_str()));
    }
    if let Some(description) = &patch.description {
        fields.push(("description", description.as_str()));
    }
    if let Some(status) = patch.status {
        fields.push(("status", status.as_str()));
    }
    if let Some(priority) = patch.priority {
        fields.push(("priority", priority.as_str()));
    }
    if let Some(assigned_to) = &patch.assigned_to {
        fields.push(("assigned_to", assigned_to.as_str()));
    }
    fields
}

fn validate_path_id(id: &str) -> RepoResult<()> {
    let id = id.trim();
    if id.is_empty() {
        return Err(RepoError::Validation("incident id must not be empty".into()));
    }
    if id.contains(['/', '?', '#']) || id.chars().any(char::is_whitespace) {
        return Err(RepoError::Validation(format!("invalid incident id '{id}'")));
    }
    Ok(())
}

fn decode<T: DeserializeOwned>(response: ureq::Response) -> RepoResult<T> {
    response
        .into_json::<T>()
        .map_err(|e| RepoError::Network(format!("unexpected response format: {e}")))
}

/// A redirect or a body that is not an incident means "accepted without echo".
fn decode_optional(response: ureq::Response) -> RepoResult<Option<Incident>> {
    if (300..400).contains(&response.status()) {
        return Ok(None);
    }
    let body = response
        .into_string()
        .map_err(|e| RepoError::Network(format!("failed to read response: {e}")))?;
    Ok(serde_json::from_str::<Incident>(&body).ok())
}

fn map_error(err: ureq::Error) -> RepoError {
    match err {
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            classify_status(code, error_detail(&body))
        }
        ureq::Error::Transport(transport) => RepoError::Network(transport.to_string()),
    }
}

/// Map an HTTP error status to the repository taxonomy.
pub(crate) fn classify_status(code: u16, detail: Option<String>) -> RepoError {
    let detail = detail.unwrap_or_else(|| format!("HTTP {code}"));
    match code {
        401 | 403 => RepoError::Auth(detail),
        404 => RepoError::NotFound(detail),
        400 | 422 => RepoError::Validation(detail),
        _ => RepoError::Network(format!("HTTP {code}: {detail}")),
    }
}

/// Pull the `detail` field out of an error body.
///
/// Handles both the plain string form and the list-of-errors form used for
/// request validation failures.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}
