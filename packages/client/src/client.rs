use crate::error::{ClientError, ClientResult};
use crate::models::{Envelope, LandingPage, PixelStore, Store};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

/// Thin JSON client for the backend endpoints the editor reads
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: base_url.to_string(),
            token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn stores(&self) -> ClientResult<Vec<Store>> {
        self.get_json("/api/public/stores", &[]).await
    }

    pub async fn pixel_stores(&self, store_uuid: &str) -> ClientResult<Vec<PixelStore>> {
        self.get_json("/api/public/pixel-stores", &[("store_uuid", store_uuid)])
            .await
    }

    /// Stored page for edit mode
    pub async fn landing_page(&self, id: &str) -> ClientResult<LandingPage> {
        self.get_json(&format!("/api/landing-pages/{}", id), &[]).await
    }

    #[instrument(skip(self, query), fields(base = %self.base_url))]
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ClientResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.get(&url).query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), status = status.as_u16(), "response received");
        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        Ok(envelope.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = ApiClient::new("https://api.example.com/ ").unwrap();
        assert_eq!(client.base_url(), "https://api.example.com");
    }

    #[test]
    fn test_rejects_relative_base_url() {
        assert!(matches!(
            ApiClient::new("api.example.com"),
            Err(ClientError::InvalidBaseUrl(_))
        ));
    }
}
