//! Remote consent-status resolution.

use std::time::Duration;

use serde_json::Value;

use crate::error::{SdkError, SdkResult};
use crate::types::{ConsentScope, ConsentStatus};

/// Production status endpoint.
pub(crate) const DEFAULT_STATUS_URL: &str = "https://cdn.consentkit.io/sdk/consent-status";

const STATUS_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches the user's consent scope/force decision from the status endpoint.
pub struct StatusResolver {
    client: reqwest::Client,
    base_url: String,
}

impl StatusResolver {
    pub fn new() -> SdkResult<Self> {
        Self::with_base_url(DEFAULT_STATUS_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> SdkResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(STATUS_TIMEOUT)
            .build()
            .map_err(|e| SdkError::Internal(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// GETs `<base>?s=<site_id>[&v=<token>]` and interprets the response.
    ///
    /// Transport failures and malformed bodies are errors so the caller can
    /// keep its previous status; a non-200 response is a valid outcome
    /// carrying only the server-reported error.
    pub async fn fetch(
        &self,
        site_id: &str,
        version_token: Option<&str>,
    ) -> SdkResult<ConsentStatus> {
        let url = status_url(&self.base_url, site_id, version_token);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SdkError::Transport(format!("consent status fetch failed: {e}")))?;
        let code = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SdkError::Transport(format!("failed to read status body: {e}")))?;
        parse_status_body(code, &body)
    }
}

fn status_url(base: &str, site_id: &str, version_token: Option<&str>) -> String {
    let mut url = format!("{base}?s={}", urlencoding::encode(site_id));
    if let Some(token) = version_token.filter(|token| !token.is_empty()) {
        url.push_str("&v=");
        url.push_str(&urlencoding::encode(token));
    }
    url
}

pub(crate) fn parse_status_body(code: u16, body: &str) -> SdkResult<ConsentStatus> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| SdkError::Protocol(format!("malformed consent status body: {e}")))?;

    if code == 200 {
        let scope = json
            .get("scope")
            .and_then(Value::as_str)
            .and_then(ConsentScope::parse);
        let force = json.get("force").and_then(Value::as_bool).unwrap_or(false);
        Ok(ConsentStatus::from_response(scope, force))
    } else {
        let error = json
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| Some(format!("server returned status {code}")));
        Ok(ConsentStatus::from_error(error))
    }
}
