// ============================================================================
// Echo Client - HTTP Client
// File: crates/echo-client/src/client.rs
// ============================================================================
//! Typed client for the Echo API with ordered base URL fallback.

use std::marker::PhantomData;
use std::time::Duration;

use echo_core::domain::{Customer, Feedback, Goal, Idea, Initiative, TenantEntity};
use echo_shared::constants::{TENANT_COOKIE, TENANT_HEADER};
use parking_lot::RwLock;
use reqwest::{header, Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ClientError;
use crate::normalize::{normalize_list, normalize_one, Listing};

/// Dev proxy first, then the servers directly.
pub const DEFAULT_BASE_URLS: &[&str] = &[
    "http://localhost:5173/api",
    "http://localhost:3000",
    "http://localhost:3001",
    "http://localhost:5000",
];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct EchoClient {
    http: Client,
    base_urls: Vec<String>,
    token: RwLock<Option<String>>,
    tenant_id: RwLock<Option<Uuid>>,
}

/// Session returned by login and register.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: SessionUser,
    pub tenant: SessionTenant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionTenant {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Me {
    pub user: SessionUser,
    pub tenant: SessionTenant,
}

#[derive(Debug, Serialize)]
pub struct Registration<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<&'a str>,
}

impl EchoClient {
    pub fn new<I, S>(base_urls: I) -> Result<Self, ClientError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let base_urls: Vec<String> = base_urls
            .into_iter()
            .map(|url| url.into().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .collect();
        if base_urls.is_empty() {
            return Err(ClientError::NoBaseUrls);
        }

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ClientError::Setup)?;

        Ok(Self {
            http,
            base_urls,
            token: RwLock::new(None),
            tenant_id: RwLock::new(None),
        })
    }

    pub fn with_defaults() -> Result<Self, ClientError> {
        Self::new(DEFAULT_BASE_URLS.iter().copied())
    }

    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.set_token(Some(token.into()));
        self
    }

    pub fn with_tenant(self, tenant_id: Uuid) -> Self {
        self.set_tenant(Some(tenant_id));
        self
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    pub fn set_tenant(&self, tenant_id: Option<Uuid>) {
        *self.tenant_id.write() = tenant_id;
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    pub fn tenant_id(&self) -> Option<Uuid> {
        *self.tenant_id.read()
    }

    pub fn base_urls(&self) -> &[String] {
        &self.base_urls
    }

    pub fn goals(&self) -> Collection<'_, Goal> {
        Collection::new(self)
    }

    pub fn initiatives(&self) -> Collection<'_, Initiative> {
        Collection::new(self)
    }

    pub fn customers(&self) -> Collection<'_, Customer> {
        Collection::new(self)
    }

    pub fn feedback(&self) -> Collection<'_, Feedback> {
        Collection::new(self)
    }

    pub fn ideas(&self) -> Collection<'_, Idea> {
        Collection::new(self)
    }

    /// Logs in and keeps the returned token and tenant for later calls.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let body = json!({ "email": email, "password": password });
        let response = self.request(Method::POST, "/auth/login", &[], Some(&body)).await?;
        self.adopt(normalize_one(response)?)
    }

    pub async fn register(&self, registration: &Registration<'_>) -> Result<Session, ClientError> {
        let body = serde_json::to_value(registration).map_err(|e| ClientError::Decode(e.to_string()))?;
        let response = self.request(Method::POST, "/auth/register", &[], Some(&body)).await?;
        self.adopt(normalize_one(response)?)
    }

    pub async fn me(&self) -> Result<Me, ClientError> {
        let response = self.request(Method::GET, "/auth/me", &[], None).await?;
        normalize_one(response)
    }

    fn adopt(&self, session: Session) -> Result<Session, ClientError> {
        self.set_token(Some(session.access_token.clone()));
        self.set_tenant(Some(session.tenant.id));
        Ok(session)
    }

    /// Sends one request, walking the base URLs in order. Transport failures
    /// and 5xx answers move on to the next URL; anything else is final.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        let mut last_error = ClientError::NoBaseUrls;

        for base_url in &self.base_urls {
            let url = format!("{}{}", base_url, path);
            match self.attempt(method.clone(), &url, query, body).await {
                Ok(value) => return Ok(value),
                Err(err) if err.allows_fallback() => {
                    warn!(url = %url, "Request failed, trying next base URL: {}", err);
                    last_error = err;
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error)
    }

    async fn attempt(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        let mut request = self.http.request(method.clone(), url).header(header::ACCEPT, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.token() {
            request = request.bearer_auth(token);
        }
        if let Some(tenant_id) = self.tenant_id() {
            request = request
                .header(TENANT_HEADER, tenant_id.to_string())
                .header(header::COOKIE, format!("{}={}", TENANT_COOKIE, tenant_id));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| ClientError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| ClientError::Transport {
            url: url.to_string(),
            source,
        })?;
        debug!(method = %method, url = %url, status = status.as_u16(), "Echo API response");

        if status.is_server_error() {
            return Err(ClientError::Server {
                url: url.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }
        if !status.is_success() {
            return Err(api_error(status, &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// Decodes `{ error: { code, message } }`, or an older `{ message }` body.
fn api_error(status: StatusCode, text: &str) -> ClientError {
    let body: Value = serde_json::from_str(text).unwrap_or(Value::Null);
    let error = if body["error"].is_object() { &body["error"] } else { &body };

    let code = error["code"]
        .as_str()
        .or_else(|| body["error"].as_str())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("ERROR"))
        .to_string();
    let message = error["message"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| text.trim().to_string());

    ClientError::Api {
        status: status.as_u16(),
        code,
        message,
    }
}

/// CRUD calls for one collection.
pub struct Collection<'a, E> {
    client: &'a EchoClient,
    _entity: PhantomData<E>,
}

impl<'a, E: TenantEntity> Collection<'a, E> {
    fn new(client: &'a EchoClient) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }

    fn path(&self) -> String {
        format!("/{}", E::KIND.collection())
    }

    fn item_path(&self, id: &Uuid) -> String {
        format!("/{}/{}", E::KIND.collection(), id)
    }

    /// `params` are passed through as query string filters (`status`,
    /// `search`, `sort`, `page`, ...).
    pub async fn list(&self, params: &[(&str, String)]) -> Result<Listing<E>, ClientError> {
        let body = self.client.request(Method::GET, &self.path(), params, None).await?;
        normalize_list(body, E::KIND.collection())
    }

    pub async fn get(&self, id: &Uuid) -> Result<E, ClientError> {
        let body = self.client.request(Method::GET, &self.item_path(id), &[], None).await?;
        normalize_one(body)
    }

    pub async fn create(&self, input: &impl Serialize) -> Result<E, ClientError> {
        let input = serde_json::to_value(input).map_err(|e| ClientError::Decode(e.to_string()))?;
        let body = self.client.request(Method::POST, &self.path(), &[], Some(&input)).await?;
        normalize_one(body)
    }

    /// Partial update: only the fields present in `changes` are touched.
    pub async fn update(&self, id: &Uuid, changes: &impl Serialize) -> Result<E, ClientError> {
        let changes = serde_json::to_value(changes).map_err(|e| ClientError::Decode(e.to_string()))?;
        let body = self
            .client
            .request(Method::PUT, &self.item_path(id), &[], Some(&changes))
            .await?;
        normalize_one(body)
    }

    /// A row that is already gone counts as deleted.
    pub async fn delete(&self, id: &Uuid) -> Result<(), ClientError> {
        match self.client.request(Method::DELETE, &self.item_path(id), &[], None).await {
            Ok(_) => Ok(()),
            Err(err) if err.is_not_found() => {
                debug!(kind = E::KIND.as_str(), id = %id, "Delete of missing row treated as success");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
