// crates/blockdrag-store-rest/src/store.rs
// ============================================================================
// Module: REST Document Store
// Description: DocumentStore backed by the CMS REST API.
// Purpose: Create and delete fixture documents over HTTP with strict limits.
// Dependencies: blockdrag-core, reqwest, serde, serde_json, tokio, tracing
// ============================================================================

//! ## Overview
//! The CMS exposes each collection at `{api}/{slug}`. Creates answer with
//! `{ "doc": {...} }`; bulk deletes filter with `where[id][in]` and answer
//! with `{ "docs": [...], "errors": [...] }`, where a non-empty `errors`
//! array means at least one document survived. Redirects are not followed
//! and response bodies above the configured limit fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use blockdrag_core::Collection;
use blockdrag_core::Credentials;
use blockdrag_core::DocId;
use blockdrag_core::DocumentStore;
use blockdrag_core::StoreError;
use reqwest::Client;
use reqwest::Method;
use reqwest::RequestBuilder;
use reqwest::Response;
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::OnceCell;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default response size limit in bytes.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;
/// Longest error body excerpt carried in a [`StoreError::Rejected`].
const MAX_ERROR_EXCERPT: usize = 512;
/// User agent sent with every request.
const USER_AGENT: &str = concat!("blockdrag/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// How requests authenticate.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum RestAuth {
    /// Anonymous requests.
    #[default]
    None,
    /// `Authorization: {collection} API-Key {key}`.
    ApiKey {
        /// Collection that owns the key.
        collection: String,
        /// Key value.
        key: String,
    },
    /// Log in once, then send `Authorization: JWT {token}`.
    Login(Credentials),
}

impl std::fmt::Debug for RestAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::ApiKey {
                collection, ..
            } => f.debug_struct("ApiKey").field("collection", collection).finish_non_exhaustive(),
            Self::Login(credentials) => {
                f.debug_struct("Login").field("email", &credentials.email).finish_non_exhaustive()
            }
        }
    }
}

/// REST store configuration.
///
/// # Invariants
/// - `api_url` is the API root, for example `http://localhost:3000/api`.
/// - `max_response_bytes` bounds every response body read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestStoreConfig {
    /// API root URL.
    pub api_url: String,
    /// Authentication mode.
    pub auth: RestAuth,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Largest response body accepted.
    pub max_response_bytes: usize,
}

impl RestStoreConfig {
    /// Creates an anonymous configuration with default limits.
    #[must_use]
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            auth: RestAuth::None,
            timeout: DEFAULT_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Create response envelope.
#[derive(Deserialize)]
struct CreateEnvelope {
    /// Created document.
    doc: Value,
}

/// Bulk delete response envelope.
#[derive(Deserialize)]
struct BulkEnvelope {
    /// Deleted documents.
    #[serde(default)]
    docs: Vec<Value>,
    /// Per-document failures.
    #[serde(default)]
    errors: Vec<Value>,
}

/// Login response envelope.
#[derive(Deserialize)]
struct LoginEnvelope {
    /// Session token.
    token: Option<String>,
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// [`DocumentStore`] over the CMS REST API.
pub struct RestDocumentStore {
    /// Store configuration.
    config: RestStoreConfig,
    /// Parsed API root.
    api_root: Url,
    /// HTTP client.
    client: Client,
    /// Session token for [`RestAuth::Login`], fetched on first use.
    token: OnceCell<String>,
}

impl RestDocumentStore {
    /// Creates a store client.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Transport`] when the API URL is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: RestStoreConfig) -> Result<Self, StoreError> {
        let mut api_root = Url::parse(&config.api_url)
            .map_err(|err| StoreError::Transport(format!("invalid api url: {err}")))?;
        if api_root.cannot_be_a_base() {
            return Err(StoreError::Transport("api url cannot be a base".to_string()));
        }
        if !api_root.path().ends_with('/') {
            let path = format!("{}/", api_root.path());
            api_root.set_path(&path);
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .redirect(Policy::none())
            .build()
            .map_err(|err| StoreError::Transport(format!("http client build failed: {err}")))?;
        Ok(Self {
            config,
            api_root,
            client,
            token: OnceCell::new(),
        })
    }

    /// Returns the URL of a collection or one of its documents.
    fn endpoint(&self, collection: Collection, id: Option<&DocId>) -> Result<Url, StoreError> {
        let mut url = self
            .api_root
            .join(collection.slug())
            .map_err(|err| StoreError::Transport(format!("invalid collection url: {err}")))?;
        if let Some(id) = id {
            url.path_segments_mut()
                .map_err(|()| StoreError::Transport("api url cannot be a base".to_string()))?
                .push(&id.to_string());
        }
        Ok(url)
    }

    /// Builds an authenticated request.
    async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder, StoreError> {
        tracing::trace!(method = %method, url = %url, "document store request");
        let builder = self.client.request(method, url);
        let header = match &self.config.auth {
            RestAuth::None => return Ok(builder),
            RestAuth::ApiKey {
                collection,
                key,
            } => format!("{collection} API-Key {key}"),
            RestAuth::Login(credentials) => {
                let token = self.token.get_or_try_init(|| self.login(credentials)).await?;
                format!("JWT {token}")
            }
        };
        Ok(builder.header(AUTHORIZATION, header))
    }

    /// Exchanges credentials for a session token.
    async fn login(&self, credentials: &Credentials) -> Result<String, StoreError> {
        let mut url = self.endpoint(Collection::Users, None)?;
        url.path_segments_mut()
            .map_err(|()| StoreError::Transport("api url cannot be a base".to_string()))?
            .push("login");
        let body = serde_json::json!({
            "email": credentials.email,
            "password": credentials.password,
        });
        let response = self.send(self.client.post(url).json_body(&body)?, "login").await?;
        let envelope: LoginEnvelope = self.read_json(response, "login").await?;
        envelope
            .token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| StoreError::InvalidResponse("login response carried no token".to_string()))
    }

    /// Sends a request and rejects non-success statuses.
    async fn send(&self, builder: RequestBuilder, operation: &str) -> Result<Response, StoreError> {
        let response =
            builder.send().await.map_err(|err| StoreError::Transport(format!("{operation}: {err}")))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = read_limited(response, self.config.max_response_bytes).await.unwrap_or_default();
        Err(rejected(operation, status, &body))
    }

    /// Reads and decodes a JSON response body.
    async fn read_json<T: DeserializeOwned>(
        &self,
        response: Response,
        operation: &str,
    ) -> Result<T, StoreError> {
        let body = read_limited(response, self.config.max_response_bytes).await?;
        serde_json::from_slice(&body)
            .map_err(|err| StoreError::InvalidResponse(format!("{operation}: {err}")))
    }
}

#[async_trait]
impl DocumentStore for RestDocumentStore {
    async fn create(&self, collection: Collection, data: Value) -> Result<Value, StoreError> {
        let operation = format!("create {collection}");
        let url = self.endpoint(collection, None)?;
        let builder = self.request(Method::POST, url).await?.json_body(&data)?;
        let response = self.send(builder, &operation).await?;
        let envelope: CreateEnvelope = self.read_json(response, &operation).await?;
        Ok(envelope.doc)
    }

    async fn delete(&self, collection: Collection, id: &DocId) -> Result<(), StoreError> {
        let operation = format!("delete {collection} {id}");
        let url = self.endpoint(collection, Some(id))?;
        let builder = self.request(Method::DELETE, url).await?;
        match self.send(builder, &operation).await {
            Ok(_) => Ok(()),
            Err(StoreError::Rejected {
                status: 404, ..
            }) => Err(StoreError::NotFound {
                collection,
                id: id.clone(),
            }),
            Err(err) => Err(err),
        }
    }

    async fn delete_where_id_in(
        &self,
        collection: Collection,
        ids: &[DocId],
    ) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        let operation = format!("delete {collection} where id in");
        let mut url = self.endpoint(collection, None)?;
        let joined = ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
        url.query_pairs_mut().append_pair("where[id][in]", &joined);
        let builder = self.request(Method::DELETE, url).await?;
        let response = self.send(builder, &operation).await?;
        let status = response.status();
        let envelope: BulkEnvelope = self.read_json(response, &operation).await?;
        if !envelope.errors.is_empty() {
            let message = Value::Array(envelope.errors).to_string();
            return Err(rejected(&operation, status, message.as_bytes()));
        }
        tracing::debug!(collection = %collection, deleted = envelope.docs.len(), "bulk delete");
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Attaches a JSON body without relying on reqwest's `json` feature.
trait JsonBody: Sized {
    /// Serializes `value` as the request body.
    fn json_body(self, value: &Value) -> Result<Self, StoreError>;
}

impl JsonBody for RequestBuilder {
    fn json_body(self, value: &Value) -> Result<Self, StoreError> {
        let body = serde_json::to_vec(value)
            .map_err(|err| StoreError::InvalidResponse(format!("request encoding failed: {err}")))?;
        Ok(self.header(CONTENT_TYPE, "application/json").body(body))
    }
}

/// Builds a rejection carrying a bounded excerpt of the response body.
fn rejected(operation: &str, status: StatusCode, body: &[u8]) -> StoreError {
    let text = String::from_utf8_lossy(body);
    let message: String = text.chars().take(MAX_ERROR_EXCERPT).collect();
    StoreError::Rejected {
        operation: operation.to_string(),
        status: status.as_u16(),
        message,
    }
}

/// Reads a response body, failing once it exceeds `max_bytes`.
///
/// # Errors
///
/// Returns [`StoreError::InvalidResponse`] when the body is too large or
/// shorter than its declared length.
async fn read_limited(mut response: Response, max_bytes: usize) -> Result<Vec<u8>, StoreError> {
    let expected_len = response.content_length();
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| StoreError::InvalidResponse("response size limit exceeds u64".to_string()))?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(StoreError::InvalidResponse("response exceeds size limit".to_string()));
    }
    let mut buf = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|err| StoreError::Transport(format!("failed to read response: {err}")))?
    {
        if buf.len() + chunk.len() > max_bytes {
            return Err(StoreError::InvalidResponse("response exceeds size limit".to_string()));
        }
        buf.extend_from_slice(&chunk);
    }
    if let Some(expected) = expected_len {
        let expected = usize::try_from(expected)
            .map_err(|_| StoreError::InvalidResponse("invalid response length".to_string()))?;
        if buf.len() < expected {
            return Err(StoreError::InvalidResponse("response truncated".to_string()));
        }
    }
    Ok(buf)
}
