//! HTTP client for the remote health API.

use crate::config::ApiConfig;
use crate::session::SessionStore;
use crate::{Error, Result};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// JSON client bound to one base URL
///
/// When a session store is attached, its access token is sent as a bearer
/// token on every request.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Option<Arc<SessionStore>>,
}

impl ApiClient {
    /// Client for the default backend
    pub fn new() -> Result<Self> {
        Self::from_config(&ApiConfig::default())
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session: None,
        })
    }

    pub fn with_session(mut self, session: Arc<SessionStore>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(self.request(Method::GET, path).query(query)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request_id = Uuid::new_v4();
        tracing::debug!("{} {} ({})", method, path, request_id);
        let mut builder = self
            .client
            .request(method, self.url(path))
            .header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(token) = self.session.as_ref().and_then(|s| s.access_token()) {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let path = response.url().path().to_string();
        let response = check_status(&path, response).await?;
        Ok(response.json::<T>().await?)
    }
}

async fn check_status(path: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    tracing::warn!("API request to {} failed with {}", path, status);
    if status == StatusCode::NOT_FOUND {
        return Err(Error::NotFound(path.to_string()));
    }
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}
