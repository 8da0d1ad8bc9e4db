use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::api::{DeleteReceipt, ProjectApi};
use super::routes::Routes;
use super::session::SessionStore;
use crate::errors::CoreError;
use crate::models::project::{NewProject, Project, ProjectUpdate};
use crate::models::transaction::{NewTransaction, Transaction, TransactionKind, TransactionUpdate};

/// Header carrying the tenant isolation key.
pub const TENANT_HEADER: &str = "X-Tenant-ID";

/// Longest error-body excerpt carried into the error chain.
const MAX_ERROR_BODY: usize = 200;

/// Connection settings for the backend API.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// API root including any prefix, e.g. `https://host/api`
    pub base_url: String,

    /// Deadline for the `/health` reachability check
    pub probe_timeout: Duration,

    /// Overall deadline for regular calls
    pub request_timeout: Duration,

    /// Extra attempts for idempotent reads on network failure or timeout
    pub read_retries: u32,

    /// Linear backoff base: the n-th retry sleeps `base × n`
    pub retry_base_delay: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            probe_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            read_retries: 2,
            retry_base_delay: Duration::from_secs(1),
        }
    }
}

/// Thin HTTP wrapper over the backend REST surface.
///
/// Attaches the bearer token and tenant header to every call and refuses to
/// issue a request when no complete credentials are stored. Status codes are
/// classified into the [`CoreError`] taxonomy; only idempotent reads are
/// retried, and only on network-level failure or timeout.
pub struct RemoteClient {
    http: Client,
    routes: Routes,
    session: Arc<SessionStore>,
    config: RemoteConfig,
}

impl RemoteClient {
    pub fn new(config: RemoteConfig, session: Arc<SessionStore>) -> Self {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        let routes = Routes::new(config.base_url.clone());
        Self {
            http,
            routes,
            session,
            config,
        }
    }

    #[must_use]
    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
        idempotent: bool,
    ) -> Result<Response, CoreError> {
        let creds = self.session.current().ok_or(CoreError::AuthRequired)?;
        let attempts = if idempotent {
            1 + self.config.read_retries
        } else {
            1
        };

        let mut last_err = CoreError::Network("request was never issued".into());
        for attempt in 1..=attempts {
            if attempt > 1 {
                let delay = self.config.retry_base_delay * (attempt - 1);
                tracing::debug!(url, attempt, ?delay, "retrying idempotent request");
                tokio::time::sleep(delay).await;
            }

            let mut request = self
                .http
                .request(method.clone(), url)
                .bearer_auth(&creds.token)
                .header(TENANT_HEADER, &creds.tenant_id);
            if let Some(body) = &body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) => return Self::classify(response).await,
                // Network-level failure or timeout: retryable when idempotent.
                Err(e) => last_err = CoreError::from(e),
            }
        }

        Err(last_err)
    }

    /// Map a non-success status onto the error taxonomy; success responses
    /// pass through untouched.
    async fn classify(response: Response) -> Result<Response, CoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let path = response.url().path().to_string();
        let mut message = response.text().await.unwrap_or_default();
        if message.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !message.is_char_boundary(cut) {
                cut -= 1;
            }
            message.truncate(cut);
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(CoreError::AuthRequired),
            StatusCode::NOT_FOUND => Err(CoreError::NotFound(path)),
            // Server-side validation echo — surfaced, never fallen back.
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(CoreError::Validation(message))
            }
            _ => Err(CoreError::Server {
                status: status.as_u16(),
                message,
            }),
        }
    }

    /// A body that fails to parse is a transport problem: classified as
    /// `Network` so the fallback-to-local policy applies.
    async fn json_body<T: DeserializeOwned>(response: Response) -> Result<T, CoreError> {
        response
            .json::<T>()
            .await
            .map_err(|e| CoreError::Network(format!("invalid response body: {e}")))
    }

    fn to_body<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, CoreError> {
        serde_json::to_value(value).map_err(|e| CoreError::Serialization(e.to_string()))
    }
}

/// The list endpoint returns either a bare array or a `{data: [...]}` envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProjectListBody {
    Plain(Vec<Project>),
    Wrapped { data: Vec<Project> },
}

#[async_trait]
impl ProjectApi for RemoteClient {
    async fn probe(&self) -> bool {
        let mut request = self
            .http
            .get(self.routes.health())
            .timeout(self.config.probe_timeout);
        // Credentials are attached when present, but a liveness probe must
        // not require them.
        if let Some(creds) = self.session.current() {
            request = request
                .bearer_auth(&creds.token)
                .header(TENANT_HEADER, &creds.tenant_id);
        }
        match request.send().await {
            Ok(response) => response.status().as_u16() < 500,
            Err(_) => false,
        }
    }

    async fn list_projects(&self) -> Result<Vec<Project>, CoreError> {
        let response = self
            .send(Method::GET, &self.routes.projects(), None, true)
            .await?;
        let body: ProjectListBody = Self::json_body(response).await?;
        Ok(match body {
            ProjectListBody::Plain(projects) => projects,
            ProjectListBody::Wrapped { data } => data,
        })
    }

    async fn create_project(&self, input: &NewProject) -> Result<Project, CoreError> {
        let body = Self::to_body(input)?;
        let response = self
            .send(Method::POST, &self.routes.projects(), Some(body), false)
            .await?;
        Self::json_body(response).await
    }

    async fn update_project(&self, id: &str, patch: &ProjectUpdate) -> Result<Project, CoreError> {
        let body = Self::to_body(patch)?;
        let response = self
            .send(Method::PUT, &self.routes.project(id), Some(body), false)
            .await?;
        Self::json_body(response).await
    }

    async fn delete_project(&self, id: &str) -> Result<DeleteReceipt, CoreError> {
        let response = self
            .send(Method::DELETE, &self.routes.project(id), None, false)
            .await?;
        Self::json_body(response).await
    }

    async fn add_transaction(
        &self,
        project_id: &str,
        input: &NewTransaction,
        kind: TransactionKind,
    ) -> Result<Transaction, CoreError> {
        let mut body = Self::to_body(input)?;
        body["type"] = json!(kind);
        let response = self
            .send(
                Method::POST,
                &self.routes.transactions(project_id),
                Some(body),
                false,
            )
            .await?;
        Self::json_body(response).await
    }

    async fn update_transaction(
        &self,
        project_id: &str,
        tx_id: &str,
        patch: &TransactionUpdate,
    ) -> Result<Transaction, CoreError> {
        let body = Self::to_body(patch)?;
        let response = self
            .send(
                Method::PUT,
                &self.routes.transaction(project_id, tx_id),
                Some(body),
                false,
            )
            .await?;
        Self::json_body(response).await
    }

    async fn delete_transaction(
        &self,
        project_id: &str,
        tx_id: &str,
    ) -> Result<Project, CoreError> {
        let response = self
            .send(
                Method::DELETE,
                &self.routes.transaction(project_id, tx_id),
                None,
                false,
            )
            .await?;
        Self::json_body(response).await
    }
}
