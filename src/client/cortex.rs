//! Client for one Cortex instance.
//!
//! Every operation funnels through a single request path: build the URL
//! from the instance's base URL, apply authentication, send, then classify
//! the response by status. Bodies of 2xx responses are handed to a decoder;
//! any other status becomes a [`CortexError`] carrying the status, the URL
//! and the raw body.
//!
//! # API Usage
//!
//! Analyzers live under `/api/analyzer`, responders (workers) under
//! `/api/responder`. Jobs are polled with `/api/job/{id}/waitreport` and the
//! engine version is read from `/api/status`.

use crate::client::instance::CortexInstance;
use crate::client::transport::TransportSettings;
use crate::core::{
    Analyzer, Artifact, ClientError, CortexError, FileArtifact, HealthStatus, InstanceStatus,
    Result, Worker,
};
use crate::health;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Display;
use std::time::Duration;
use tracing::debug;

/// Body of a responder run request.
///
/// `data` holds the JSON text of the observable, not a nested object.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecutionRequest<'a> {
    data: String,
    data_type: &'a str,
    tlp: i64,
    message: &'a str,
    parameters: &'a Value,
}

fn json<T: DeserializeOwned>(body: &[u8]) -> serde_json::Result<T> {
    serde_json::from_slice(body)
}

/// Renders a duration the way the engine parses `atMost`.
fn format_at_most(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        format!("{} seconds", duration.as_secs())
    } else {
        // Round up: a sub-millisecond wait must not become "0 milliseconds".
        format!("{} milliseconds", duration.as_nanos().div_ceil(1_000_000))
    }
}

/// Client for one Cortex instance.
///
/// Immutable after construction; any number of calls may run concurrently
/// against the same client.
///
/// # Example
///
/// ```rust,ignore
/// use cortexbridge::client::{CortexClient, CortexInstance};
/// use cortexbridge::core::Authentication;
///
/// let instance = CortexInstance::new("local", "http://127.0.0.1:9001")
///     .with_auth(Authentication::bearer("api-key"));
/// let client = CortexClient::with_default_transport(instance)?;
/// let analyzers = client.list_analyzer().await?;
/// ```
#[derive(Debug)]
pub struct CortexClient {
    instance: CortexInstance,
    http: reqwest::Client,
}

impl CortexClient {
    /// Creates a client over a shared HTTP transport.
    pub fn new(instance: CortexInstance, http: reqwest::Client) -> Self {
        Self { instance, http }
    }

    /// Creates a client with its own transport built from default settings.
    pub fn with_default_transport(instance: CortexInstance) -> Result<Self> {
        let http = TransportSettings::default().build_client()?;
        Ok(Self::new(instance, http))
    }

    /// Instance name.
    pub fn name(&self) -> &str {
        self.instance.name()
    }

    /// Instance base URL.
    pub fn base_url(&self) -> &str {
        self.instance.base_url()
    }

    /// The configured instance.
    pub fn instance(&self) -> &CortexInstance {
        &self.instance
    }

    /// Executes one request against this instance.
    ///
    /// `build` adds method-specific parts (body, query) to the bare request;
    /// `decode` turns a 2xx body into the result.
    async fn request<T, B, D, E>(
        &self,
        method: Method,
        path: &str,
        build: B,
        decode: D,
    ) -> Result<T>
    where
        B: FnOnce(RequestBuilder) -> RequestBuilder,
        D: FnOnce(&[u8]) -> std::result::Result<T, E>,
        E: Display,
    {
        let url = self.instance.url_for(path);
        let request = self
            .instance
            .auth()
            .apply(build(self.http.request(method.clone(), &url)));

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::transport(&url, e))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::transport(&url, e))?;

        debug!(
            instance = self.name(),
            method = %method,
            url = %url,
            status = status.as_u16(),
            "Cortex request completed"
        );

        if status.is_success() {
            decode(&body[..]).map_err(|e| {
                CortexError::new(
                    status.as_u16(),
                    url,
                    format!(
                        "invalid response body ({}): {}",
                        e,
                        String::from_utf8_lossy(&body)
                    ),
                )
                .into()
            })
        } else {
            Err(CortexError::new(status.as_u16(), url, String::from_utf8_lossy(&body)).into())
        }
    }

    /// Fetches a responder by id.
    pub async fn get_worker_by_id(&self, id: &str) -> Result<Worker> {
        let worker: Worker = self
            .request(Method::GET, &format!("api/responder/{}", id), |r| r, json)
            .await?;
        Ok(worker.with_cortex_id(self.name()))
    }

    /// Fetches a responder by name.
    ///
    /// Returns [`ClientError::NotFound`] when no responder has this name.
    pub async fn get_worker_by_name(&self, name: &str) -> Result<Worker> {
        self.search_by_name("api/responder/_search", "worker", name).await
    }

    /// Fetches an analyzer by id, falling back to a lookup by name.
    ///
    /// Older engines address analyzers by name, so when the by-id call fails
    /// for any reason `id` is retried as a name. Only the outcome of the
    /// second attempt is returned.
    pub async fn get_analyzer(&self, id: &str) -> Result<Analyzer> {
        let by_id: Result<Analyzer> = self
            .request(Method::GET, &format!("api/analyzer/{}", id), |r| r, json)
            .await;

        match by_id {
            Ok(analyzer) => Ok(analyzer.with_cortex_id(self.name())),
            Err(error) => {
                debug!(
                    instance = self.name(),
                    analyzer_id = id,
                    error = %error,
                    "Analyzer lookup by id failed, trying by name"
                );
                self.get_analyzer_by_name(id).await
            }
        }
    }

    /// Fetches an analyzer by name.
    ///
    /// Returns [`ClientError::NotFound`] when no analyzer has this name.
    pub async fn get_analyzer_by_name(&self, name: &str) -> Result<Analyzer> {
        self.search_by_name("api/analyzer/_search", "analyzer", name).await
    }

    async fn search_by_name(
        &self,
        path: &str,
        entity: &'static str,
        name: &str,
    ) -> Result<Worker> {
        let query = json!({
            "query": { "_field": "name", "_value": name },
            "range": "0-1"
        });
        let found: Vec<Worker> = self
            .request(Method::POST, path, |r| r.json(&query), json)
            .await?;

        found
            .into_iter()
            .next()
            .map(|worker| worker.with_cortex_id(self.name()))
            .ok_or_else(|| ClientError::not_found(entity, name))
    }

    /// Lists every analyzer enabled on this instance.
    pub async fn list_analyzer(&self) -> Result<Vec<Analyzer>> {
        let analyzers: Vec<Analyzer> = self
            .request(
                Method::GET,
                "api/analyzer",
                |r| r.query(&[("range", "all")]),
                json,
            )
            .await?;
        Ok(self.tag(analyzers))
    }

    /// Lists the analyzers accepting a data type.
    pub async fn list_analyzer_for_type(&self, data_type: &str) -> Result<Vec<Analyzer>> {
        let analyzers: Vec<Analyzer> = self
            .request(
                Method::GET,
                &format!("api/analyzer/type/{}", data_type),
                |r| r,
                json,
            )
            .await?;
        Ok(self.tag(analyzers))
    }

    /// Searches responders with an engine query.
    pub async fn find_workers(&self, query: &Value) -> Result<Vec<Worker>> {
        self.find("api/responder/_search", query).await
    }

    /// Searches analyzers with an engine query.
    pub async fn find_analyzers(&self, query: &Value) -> Result<Vec<Analyzer>> {
        self.find("api/analyzer/_search", query).await
    }

    async fn find(&self, path: &str, query: &Value) -> Result<Vec<Worker>> {
        let body = json!({ "query": query, "range": "all" });
        let workers: Vec<Worker> = self
            .request(Method::POST, path, |r| r.json(&body), json)
            .await?;
        Ok(self.tag(workers))
    }

    fn tag(&self, workers: Vec<Worker>) -> Vec<Worker> {
        workers
            .into_iter()
            .map(|worker| worker.with_cortex_id(self.name()))
            .collect()
    }

    /// Submits an artifact to an analyzer and returns the created job.
    ///
    /// Files are sent as a multipart body (`data` binary part and `_json`
    /// metadata part); inline data as a JSON body. Path-backed files are
    /// read at this point.
    pub async fn analyze(&self, analyzer_id: &str, artifact: &Artifact) -> Result<Value> {
        let path = format!("api/analyzer/{}/run", analyzer_id);

        match artifact {
            Artifact::File(file) => {
                let form = Self::multipart(file).await?;
                self.request(Method::POST, &path, |r| r.multipart(form), json)
                    .await
            }
            Artifact::Data(data) => {
                self.request(Method::POST, &path, |r| r.json(data.fields()), json)
                    .await
            }
        }
    }

    async fn multipart(file: &FileArtifact) -> Result<Form> {
        let content = file.read().await?;
        let mut part = Part::bytes(content)
            .mime_str(file.content_type())
            .map_err(|e| ClientError::InvalidArtifact {
                reason: format!("content type '{}': {}", file.content_type(), e),
            })?;
        if let Some(filename) = file.filename() {
            part = part.file_name(filename.to_string());
        }

        let metadata = Value::Object(file.attributes().clone()).to_string();
        Ok(Form::new().part("data", part).text("_json", metadata))
    }

    /// Runs a responder on an observable.
    ///
    /// `data` is embedded as its JSON text.
    pub async fn execute(
        &self,
        worker_id: &str,
        data_type: &str,
        data: &Value,
        tlp: i64,
        message: &str,
        parameters: &Value,
    ) -> Result<Value> {
        let body = ExecutionRequest {
            data: data.to_string(),
            data_type,
            tlp,
            message,
            parameters,
        };
        self.request(
            Method::POST,
            &format!("api/responder/{}/run", worker_id),
            |r| r.json(&body),
            json,
        )
        .await
    }

    /// Waits for a job report.
    ///
    /// The engine holds the request for at most `at_most`; no client-side
    /// deadline is added beyond the transport's own timeout.
    pub async fn wait_report(&self, job_id: &str, at_most: Duration) -> Result<Value> {
        let at_most = format_at_most(at_most);
        self.request(
            Method::GET,
            &format!("api/job/{}/waitreport", job_id),
            |r| r.query(&[("atMost", at_most.as_str())]),
            json,
        )
        .await
    }

    /// Returns the engine version, or `None` if the instance is unhealthy.
    ///
    /// Never fails and never takes longer than
    /// [`health::VERSION_PROBE_TIMEOUT`].
    pub async fn get_version(&self) -> Option<String> {
        health::probe_version(self.name(), self.fetch_version()).await
    }

    async fn fetch_version(&self) -> Result<Option<String>> {
        let status: Value = self.request(Method::GET, "api/status", |r| r, json).await?;
        Ok(status
            .pointer("/versions/Cortex")
            .and_then(Value::as_str)
            .map(str::to_owned))
    }

    /// Returns name, version and health of this instance.
    pub async fn status(&self) -> InstanceStatus {
        InstanceStatus::from_probe(self.name(), self.get_version().await)
    }

    /// Returns the health of this instance.
    pub async fn health(&self) -> HealthStatus {
        HealthStatus::from_version(self.get_version().await.as_deref())
    }
}
