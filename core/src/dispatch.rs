//! Builds outbound requests, runs them through a `Transport`, and decodes
//! the response with the envelope rules.

use crate::config::ClientConfig;
use crate::envelope::{self, Envelope};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, Transport};

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

/// Sends requests on behalf of a `Client`.
///
/// `token` is `Some` for authenticated calls. An empty token is sent as is;
/// rejecting it is the server's job.
#[derive(Debug, Clone)]
pub struct Dispatcher<T> {
    config: ClientConfig,
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn get<R: Envelope>(&self, url: &str, token: Option<&str>) -> Result<R, ApiError> {
        let request = self.build_request(HttpMethod::Get, url, None, token)?;
        self.send(&request)
    }

    pub fn post<R: Envelope>(
        &self,
        url: &str,
        body: Vec<u8>,
        token: Option<&str>,
    ) -> Result<R, ApiError> {
        let request = self.build_request(HttpMethod::Post, url, Some(body), token)?;
        self.send(&request)
    }

    /// Assemble the request exactly as it would be sent, headers in order.
    pub fn build_request(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<Vec<u8>>,
        token: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        url::Url::parse(url).map_err(|err| ApiError::RequestConstruction {
            method,
            url: url.to_string(),
            reason: err.to_string(),
        })?;

        let mut headers = vec![("User-Agent".to_string(), self.config.user_agent.clone())];
        if let Some(token) = token {
            headers.push(("Authorization".to_string(), format!("Token {token}")));
        }
        if url == self.config.endpoints.card_url {
            headers.push(("Content-Type".to_string(), FORM.to_string()));
        } else {
            headers.push(("Content-Type".to_string(), JSON.to_string()));
            headers.push(("FIXR-Platform".to_string(), self.config.platform.clone()));
            headers.push((
                "FIXR-Platform-Version".to_string(),
                self.config.platform_version.clone(),
            ));
            headers.push(("FIXR-App-Version".to_string(), self.config.app_version.clone()));
        }

        Ok(HttpRequest {
            method,
            url: url.to_string(),
            headers,
            body,
        })
    }

    fn send<R: Envelope>(&self, request: &HttpRequest) -> Result<R, ApiError> {
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            authenticated = request.header("Authorization").is_some(),
            "dispatching request"
        );
        let response = self.transport.execute(request)?;
        tracing::debug!(status = response.status, url = %request.url, "received response");
        envelope::decode(&response.body)
    }
}
