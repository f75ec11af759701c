//! Authenticated HTTP session for the portal.
//!
//! Wraps a blocking `reqwest` client with base-URL prefixing, bearer-token
//! injection and unwrapping of the portal's `{success, resultMessage, body}`
//! envelope. One client per run; connections are pooled across calls.

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{multipart, Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::contract::ContractClient;
use crate::error::{ClientError, Result};

/// Production base URL of the portal API.
pub const DEFAULT_BASE_URL: &str = "https://ws.future-healthcare.net/prd/api/fhc/fhcp/";

/// Partnership identifier sent with every request.
pub const DEFAULT_PARTNERSHIP: &str = "vic";

/// HTTP timeout in seconds. Generous because file uploads ride through it too.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// User agent string identifying this client.
const USER_AGENT: &str = concat!("fhc-client/", env!("CARGO_PKG_VERSION"));

/// Response envelope used by every portal endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    body: Option<T>,
}

/// Envelope variant for failure responses, where only the message matters.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(rename = "resultMessage")]
    result_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    token: String,
}

#[derive(Debug, Deserialize)]
struct ContractsBody {
    #[serde(rename = "Contracts")]
    contracts: Vec<crate::types::Contract>,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    guid: String,
}

/// HTTP client for the Future Healthcare API.
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for the given base URL and partnership.
    ///
    /// `token` may be `None` for the login flow; every other endpoint
    /// requires one.
    pub fn new(
        base_url: impl Into<String>,
        partnership: &str,
        token: Option<String>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            "X-Partnership",
            HeaderValue::from_str(partnership)
                .map_err(|_| ClientError::InvalidResponse(format!("bad partnership: {partnership}")))?,
        );

        let http = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// The bearer token currently attached to this session, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(self.http.get(self.url(path)))
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.authorize(self.http.post(self.url(path)))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and unwrap the portal envelope into `T`.
    pub(crate) fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let envelope: Envelope<T> = self.unwrap_envelope(builder)?;
        envelope
            .body
            .ok_or_else(|| ClientError::InvalidResponse("missing response body".to_string()))
    }

    /// Send a request, checking the envelope but discarding any body.
    pub(crate) fn send_ok(&self, builder: RequestBuilder) -> Result<()> {
        self.unwrap_envelope::<serde_json::Value>(builder)?;
        Ok(())
    }

    fn unwrap_envelope<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<Envelope<T>> {
        let response = builder.send()?;
        let status = response.status();

        if status != StatusCode::OK {
            let message = response
                .json::<ErrorEnvelope>()
                .ok()
                .and_then(|envelope| envelope.result_message)
                .unwrap_or_else(|| "Unexpected error".to_string());
            tracing::debug!(status = status.as_u16(), %message, "portal rejected request");
            return Err(ClientError::Api {
                message,
                status: status.as_u16(),
            });
        }

        let envelope: Envelope<T> = response
            .json()
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        if !envelope.success {
            return Err(ClientError::ProtocolViolation);
        }
        Ok(envelope)
    }

    /// Authenticate and attach the returned bearer token to this session.
    pub fn login(&mut self, username: &str, password: &str) -> Result<String> {
        let payload = json!({ "username": username, "password": password });
        let body: LoginBody = self
            .send(self.post("login").json(&payload))
            .map_err(|e| match e {
                ClientError::Api { message, status } => ClientError::Login { message, status },
                other => other,
            })?;

        self.token = Some(body.token.clone());
        Ok(body.token)
    }

    /// Retrieve the contracts attached to the authenticated account.
    pub fn contracts(&self) -> Result<Vec<crate::types::Contract>> {
        let body: ContractsBody = self.send(self.get("contracts"))?;
        Ok(body.contracts)
    }

    /// Scope further calls to one contract.
    #[must_use]
    pub fn contract(&self, contract_token: &str) -> ContractClient<'_> {
        ContractClient::new(self, contract_token)
    }

    /// Upload a document; returns the portal-assigned guid.
    ///
    /// `is_invoice` tags the primary receipt as opposed to supporting
    /// attachments.
    pub fn upload_file(&self, path: &Path, is_invoice: bool) -> Result<String> {
        let form = multipart::Form::new()
            .text("isInvoice", if is_invoice { "true" } else { "false" })
            .file("file", path)?;

        tracing::debug!(path = %path.display(), is_invoice, "uploading file");
        let body: UploadedFile = self.send(self.post("files").multipart(form))?;
        Ok(body.guid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_prefixing() {
        let client = ApiClient::new("https://example.net/api/", "vic", None).unwrap();
        assert_eq!(client.url("login"), "https://example.net/api/login");
        assert_eq!(client.url("/login"), "https://example.net/api/login");
    }

    #[test]
    fn test_new_rejects_unprintable_partnership() {
        assert!(ApiClient::new("https://example.net", "bad\npartnership", None).is_err());
    }
}
