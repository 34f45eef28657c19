//! HttpSessionApi - REST implementation of the session API.
//!
//! Per-session requests are scoped by the `session` header. Mutations that
//! answer with an empty body are followed by a fresh `GET /sessions`, so the
//! caller always receives the server's own snapshot.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use calcula_core::config::{ClientConfig, DEFAULT_REQUEST_TIMEOUT_SECS};
use calcula_core::error::{CalculaError, Result};
use calcula_core::price::{NewPrice, PhotoUpload, PricePhoto, PriceUpdate};
use calcula_core::session::{SessionApi, SessionId, SessionSnapshot};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

/// Header carrying the session identifier.
pub const SESSION_HEADER: &str = "session";

const DEFAULT_PHOTO_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Deserialize)]
struct CreateSessionResponse {
    #[serde(default)]
    id: Option<String>,
}

/// Session API client over HTTP.
#[derive(Clone)]
pub struct HttpSessionApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpSessionApi {
    /// Creates a client for the given base URL with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Creates a client from the loaded configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(config.base_url()?).with_timeout(config.request_timeout()))
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL of one price. Each segment is percent-encoded, so an id holding
    /// `/`, `?` or `#` still addresses that price.
    fn price_url(&self, price_id: &str, trailing: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| CalculaError::config(format!("Invalid API URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| CalculaError::config(format!("API URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(["sessions", "prices", price_id])
            .extend(trailing);
        Ok(url)
    }

    /// Sends a request and turns transport failures and non-2xx statuses
    /// into errors.
    async fn send(&self, request: RequestBuilder, action: &str) -> Result<Response> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| transport_error(action, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(
                "[HttpSessionApi] {} failed with status {}: {}",
                action,
                status,
                body
            );
            return Err(CalculaError::api(status.as_u16(), body));
        }
        Ok(response)
    }

    /// Sends a mutation and returns the snapshot in its body, or fetches the
    /// current one when the body is empty or unusable.
    async fn send_for_snapshot(
        &self,
        session_id: &SessionId,
        request: RequestBuilder,
        action: &str,
    ) -> Result<SessionSnapshot> {
        let response = self.send(request, action).await?;
        match read_body(response, action).await? {
            Some(body) => match serde_json::from_str::<SessionSnapshot>(&body) {
                Ok(snapshot) => Ok(snapshot),
                Err(e) => {
                    tracing::warn!(
                        "[HttpSessionApi] {}: unusable response body ({}), refetching session",
                        action,
                        e
                    );
                    self.get_session(session_id).await
                }
            },
            None => {
                tracing::debug!("[HttpSessionApi] {}: empty body, refetching session", action);
                self.get_session(session_id).await
            }
        }
    }
}

#[async_trait]
impl SessionApi for HttpSessionApi {
    async fn create_session(&self) -> Result<SessionId> {
        let request = self
            .client
            .post(self.url("/sessions"))
            .json(&serde_json::json!({ "has_club": true }));
        let response = self.send(request, "create session").await?;

        let body = read_body(response, "create session")
            .await?
            .ok_or_else(|| CalculaError::protocol("Empty response when creating session"))?;
        let parsed: CreateSessionResponse = serde_json::from_str(&body)?;
        let id = parsed
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| CalculaError::protocol("Session response has no id"))?;

        tracing::info!("[HttpSessionApi] Created session {}", id);
        Ok(SessionId::new(id))
    }

    async fn get_session(&self, session_id: &SessionId) -> Result<SessionSnapshot> {
        let request = self
            .client
            .get(self.url("/sessions"))
            .header(SESSION_HEADER, session_id.as_str());
        let response = self.send(request, "fetch session").await?;

        let body = read_body(response, "fetch session")
            .await?
            .ok_or_else(|| CalculaError::protocol("Empty response when fetching session"))?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn create_price(
        &self,
        session_id: &SessionId,
        price: &NewPrice,
    ) -> Result<SessionSnapshot> {
        let request = self
            .client
            .post(self.url("/sessions/prices"))
            .header(SESSION_HEADER, session_id.as_str())
            .multipart(price_form(price));
        self.send_for_snapshot(session_id, request, "create price")
            .await
    }

    async fn update_price(
        &self,
        session_id: &SessionId,
        update: &PriceUpdate,
    ) -> Result<SessionSnapshot> {
        let request = self
            .client
            .patch(self.price_url(&update.price_id, &[])?)
            .header(SESSION_HEADER, session_id.as_str())
            .multipart(price_form(&update.price));
        self.send_for_snapshot(session_id, request, "update price")
            .await
    }

    async fn upload_price_image(
        &self,
        session_id: &SessionId,
        upload: &PhotoUpload,
    ) -> Result<SessionSnapshot> {
        let file = Part::bytes(upload.bytes.clone())
            .file_name(upload.filename.clone())
            .mime_str(&upload.mime_type)
            .map_err(|e| {
                CalculaError::validation("mime_type", format!("Unsupported image type: {}", e))
            })?;
        let form = Form::new()
            .part("file", file)
            .text("quantity", upload.quantity.to_string());

        let request = self
            .client
            .post(self.url("/sessions/prices"))
            .header(SESSION_HEADER, session_id.as_str())
            .multipart(form);
        self.send_for_snapshot(session_id, request, "upload image")
            .await
    }

    async fn delete_price(&self, session_id: &SessionId, price_id: &str) -> Result<()> {
        let request = self
            .client
            .delete(self.price_url(price_id, &[])?)
            .header(SESSION_HEADER, session_id.as_str());
        self.send(request, "delete price").await?;
        Ok(())
    }

    async fn get_price_photo(
        &self,
        session_id: &SessionId,
        price_id: &str,
    ) -> Result<Option<PricePhoto>> {
        let request = self
            .client
            .get(self.price_url(price_id, &["photo"])?)
            .header(SESSION_HEADER, session_id.as_str());

        let response = match self.send(request, "fetch photo").await {
            Ok(response) => response,
            Err(e) if e.is_api_status(StatusCode::NOT_FOUND.as_u16()) => return Ok(None),
            Err(e) => return Err(e),
        };

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_PHOTO_CONTENT_TYPE.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error("fetch photo", e))?;
        if bytes.is_empty() {
            return Ok(None);
        }

        Ok(Some(PricePhoto {
            uri: to_data_uri(&content_type, &bytes),
            content_type,
        }))
    }
}

fn price_form(price: &NewPrice) -> Form {
    Form::new()
        .text("name", price.name.clone())
        .text("quantity", price.quantity.to_string())
        .text("value", price.value.to_string())
}

/// Reads the body as text. `None` for 204/205 and blank bodies.
async fn read_body(response: Response, action: &str) -> Result<Option<String>> {
    let status = response.status();
    if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
        return Ok(None);
    }
    let text = response
        .text()
        .await
        .map_err(|e| transport_error(action, e))?;
    if text.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

fn transport_error(action: &str, err: reqwest::Error) -> CalculaError {
    if err.is_timeout() {
        CalculaError::transport(format!("{}: request timed out", action))
    } else {
        CalculaError::transport(format!("{}: {}", action, err))
    }
}

/// Encodes binary content as a `data:` URI.
pub fn to_data_uri(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, BASE64.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = HttpSessionApi::new("https://api.example.com/");
        assert_eq!(api.base_url(), "https://api.example.com");
        assert_eq!(
            api.price_url("p1", &[]).unwrap().as_str(),
            "https://api.example.com/sessions/prices/p1"
        );
    }

    #[test]
    fn test_price_url_encodes_id_segment() {
        let api = HttpSessionApi::new("https://api.example.com/v1");
        assert_eq!(
            api.price_url("a/b?c#d", &["photo"]).unwrap().as_str(),
            "https://api.example.com/v1/sessions/prices/a%2Fb%3Fc%23d/photo"
        );
        assert!(HttpSessionApi::new("not a url").price_url("p1", &[]).is_err());
    }

    #[test]
    fn test_from_config_requires_url() {
        assert!(HttpSessionApi::from_config(&ClientConfig::default()).is_err());
        let config = ClientConfig {
            api_url: Some("http://localhost:8080".into()),
            request_timeout_secs: 5,
            ..Default::default()
        };
        let api = HttpSessionApi::from_config(&config).unwrap();
        assert_eq!(api.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_data_uri() {
        assert_eq!(to_data_uri("image/png", b"hi"), "data:image/png;base64,aGk=");
    }
}
