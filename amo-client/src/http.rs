//! HTTP transport for the portal API
//!
//! Request plumbing shared by every endpoint: bearer auth injection,
//! the signed-out short-circuit, and mapping of HTTP failures onto
//! the portal error taxonomy.

use crate::ClientConfig;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::{PortalError, PortalResult};

/// Error body the backend sends on structured failures
#[derive(serde::Deserialize)]
struct ApiErrorResponse {
    pub code: i32,
    pub message: String,
}

/// Low-level HTTP transport with session handling
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> PortalResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| PortalError::internal(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Build an authenticated request, short-circuiting when signed out
    fn request(&self, method: reqwest::Method, path: &str) -> PortalResult<reqwest::RequestBuilder> {
        let (token, _) = self.config.session()?;
        Ok(self
            .client
            .request(method, self.url(path))
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {}", token)))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> PortalResult<T> {
        let response = self
            .request(reqwest::Method::GET, path)?
            .send()
            .await
            .map_err(transport_err)?;
        Self::handle_response(response).await
    }

    pub async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> PortalResult<T> {
        let response = self
            .request(reqwest::Method::POST, path)?
            .json(body)
            .send()
            .await
            .map_err(transport_err)?;
        Self::handle_response(response).await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> PortalResult<T> {
        let response = self
            .request(reqwest::Method::POST, path)?
            .multipart(form)
            .send()
            .await
            .map_err(transport_err)?;
        Self::handle_response(response).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> PortalResult<T> {
        let response = self
            .request(reqwest::Method::DELETE, path)?
            .send()
            .await
            .map_err(transport_err)?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> PortalResult<T> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            // Prefer the structured error body when the backend sent one
            if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&text) {
                return Err(PortalError::Api {
                    code: api_err.code,
                    message: api_err.message,
                });
            }
            return match status {
                StatusCode::UNAUTHORIZED => Err(PortalError::Unauthorized),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    Err(PortalError::validation(text))
                }
                StatusCode::NOT_FOUND => Err(PortalError::not_found(text)),
                _ => Err(PortalError::internal(text)),
            };
        }
        response
            .json()
            .await
            .map_err(|e| PortalError::InvalidResponse(e.to_string()))
    }
}

fn transport_err(err: reqwest::Error) -> PortalError {
    PortalError::transport(err.to_string())
}
