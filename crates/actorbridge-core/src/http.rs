//! Provider HTTP transport
//!
//! `HttpExecutionClient` implements the `ExecutionClient` contract against
//! the provider's REST API and adds the catalog operations the core does
//! not depend on but the CLI surfaces: listing actors and fetching an
//! actor's declared input schema.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::client::{
    ActorSource, ActorSummary, ExecutionClient, InputValueMap, ResultSet, RunHandle, RunStatus,
    TransportResult,
};
use crate::error::TransportError;
use crate::session::Credential;

const DEFAULT_BASE_URL: &str = "https://api.apify.com/v2";
const PUBLIC_ACTORS_PAGE: usize = 10;

/// Provider connection settings.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API base URL.
    pub base_url: String,

    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: std::env::var("ACTORBRIDGE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ProviderConfig {
    /// Config for a specific provider endpoint.
    pub fn new(base_url: &str) -> Self {
        ProviderConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }
}

/// reqwest-backed client for the provider API.
pub struct HttpExecutionClient {
    config: ProviderConfig,
    credential: Credential,
    http: reqwest::Client,
}

/// Provider response envelope: every body nests its payload under `data`.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct Page<T> {
    items: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRun {
    id: String,
    status: RunStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireActor {
    id: String,
    name: String,
    username: Option<String>,
    description: Option<String>,
    #[serde(default)]
    is_public: bool,
    #[serde(default)]
    is_deprecated: bool,
    created_at: Option<DateTime<Utc>>,
    modified_at: Option<DateTime<Utc>>,
    input_schema: Option<Value>,
}

impl WireActor {
    fn into_summary(self, source: ActorSource) -> ActorSummary {
        ActorSummary {
            id: self.id,
            name: self.name,
            username: self.username,
            description: self.description,
            is_public: self.is_public,
            is_deprecated: self.is_deprecated,
            created_at: self.created_at,
            modified_at: self.modified_at,
            source,
        }
    }
}

impl HttpExecutionClient {
    /// Create a client for the given provider and credential.
    pub fn new(config: ProviderConfig, credential: Credential) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("actorbridge/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to create HTTP client");

        HttpExecutionClient {
            config,
            credential,
            http,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> TransportResult<T> {
        debug!(path, "GET");
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(self.credential.as_str())
            .send()
            .await
            .map_err(into_transport)?;
        decode(response).await
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> TransportResult<T> {
        debug!(path, "POST");
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(self.credential.as_str())
            .json(body)
            .send()
            .await
            .map_err(into_transport)?;
        decode(response).await
    }

    /// Actors available to the credential: the caller's own plus a page of
    /// public ones, tagged by source.
    pub async fn list_actors(&self) -> TransportResult<Vec<ActorSummary>> {
        let own: Page<WireActor> = self.get_json("/acts").await?;
        let public: Page<WireActor> = self
            .get_json(&format!("/acts?isPublic=true&limit={PUBLIC_ACTORS_PAGE}"))
            .await?;

        let mut actors: Vec<ActorSummary> = own
            .items
            .into_iter()
            .map(|actor| actor.into_summary(ActorSource::User))
            .collect();
        actors.extend(
            public
                .items
                .into_iter()
                .map(|actor| actor.into_summary(ActorSource::Public)),
        );
        Ok(actors)
    }

    /// One actor's catalog entry.
    pub async fn get_actor(&self, actor_id: &str) -> TransportResult<ActorSummary> {
        let actor: WireActor = self.get_json(&format!("/acts/{actor_id}")).await?;
        let source = if actor.is_public {
            ActorSource::Public
        } else {
            ActorSource::User
        };
        Ok(actor.into_summary(source))
    }

    /// The raw input schema document an actor declares.
    ///
    /// Actors without a declared schema get a generic single-object schema
    /// so the form layer always has something to render.
    pub async fn get_actor_schema(&self, actor_id: &str) -> TransportResult<Value> {
        let actor: WireActor = self.get_json(&format!("/acts/{actor_id}")).await?;
        Ok(actor.input_schema.unwrap_or_else(fallback_schema))
    }
}

#[async_trait::async_trait]
impl ExecutionClient for HttpExecutionClient {
    async fn submit_run(
        &self,
        actor_id: &str,
        input: InputValueMap,
    ) -> TransportResult<RunHandle> {
        let run: WireRun = self
            .post_json(&format!("/acts/{actor_id}/runs"), &Value::Object(input))
            .await?;
        Ok(RunHandle {
            run_id: run.id,
            status: run.status,
        })
    }

    async fn get_run_status(&self, actor_id: &str, run_id: &str) -> TransportResult<RunHandle> {
        let run: WireRun = self
            .get_json(&format!("/acts/{actor_id}/runs/{run_id}"))
            .await?;
        Ok(RunHandle {
            run_id: run.id,
            status: run.status,
        })
    }

    async fn get_dataset_items(&self, actor_id: &str, run_id: &str) -> TransportResult<ResultSet> {
        self.get_json(&format!("/acts/{actor_id}/runs/{run_id}/dataset/items"))
            .await
    }
}

/// Unwrap the provider envelope, mapping failure statuses to the transport
/// taxonomy.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> TransportResult<T> {
    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(status_error(status, detail));
    }
    let envelope: Envelope<T> = response.json().await.map_err(|err| {
        TransportError::Upstream {
            status: 502,
            detail: format!("invalid provider response: {err}"),
        }
    })?;
    Ok(envelope.data)
}

fn status_error(status: StatusCode, detail: String) -> TransportError {
    match status {
        StatusCode::UNAUTHORIZED => TransportError::Unauthorized,
        StatusCode::NOT_FOUND => TransportError::NotFound,
        StatusCode::TOO_MANY_REQUESTS => TransportError::RateLimited,
        other => TransportError::Upstream {
            status: other.as_u16(),
            detail,
        },
    }
}

fn into_transport(err: reqwest::Error) -> TransportError {
    match err.status() {
        Some(status) => status_error(status, err.to_string()),
        // Connection-level failure: no status to map, treat as the provider
        // being unavailable.
        None => TransportError::Upstream {
            status: 503,
            detail: err.to_string(),
        },
    }
}

fn fallback_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "input": {
                "type": "object",
                "title": "Input Parameters",
                "description": "Actor-specific input parameters"
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaModel;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_error(StatusCode::UNAUTHORIZED, String::new()),
            TransportError::Unauthorized
        );
        assert_eq!(
            status_error(StatusCode::NOT_FOUND, String::new()),
            TransportError::NotFound
        );
        assert_eq!(
            status_error(StatusCode::TOO_MANY_REQUESTS, String::new()),
            TransportError::RateLimited
        );
        assert_eq!(
            status_error(StatusCode::BAD_GATEWAY, "boom".to_string()),
            TransportError::Upstream {
                status: 502,
                detail: "boom".to_string()
            }
        );
    }

    #[test]
    fn test_fallback_schema_is_usable() {
        let schema = SchemaModel::from_value(&fallback_schema()).expect("fallback must parse");
        assert!(schema.property("input").is_some());
        assert!(!schema.is_required("input"));
    }

    #[test]
    fn test_base_url_trailing_slash_normalised() {
        let credential = Credential::new("t").unwrap();
        let client = HttpExecutionClient::new(ProviderConfig::new("https://api.example/v2/"), credential);
        assert_eq!(client.url("/acts"), "https://api.example/v2/acts");
    }

    #[test]
    fn test_run_wire_decoding() {
        let body = r#"{ "data": { "id": "r-1", "status": "RUNNING" } }"#;
        let envelope: Envelope<WireRun> = serde_json::from_str(body).expect("decode failed");
        assert_eq!(envelope.data.id, "r-1");
        assert_eq!(envelope.data.status, RunStatus::Running);
    }
}
