//! Shared HTTP plumbing for the backend adapters.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;

use llmkit_core::{LlmError, Result};

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// POST a JSON body and return the raw response text.
///
/// Maps local failures to `Marshal`/`Transport`, non-2xx statuses to `Http`
/// with the body preserved for diagnostics. Decoding is left to the caller
/// since every endpoint has its own shape.
pub(crate) async fn post_json(
    client: &Client,
    url: &str,
    body: &Value,
    timeout: Duration,
    bearer: Option<&str>,
) -> Result<String> {
    let payload = serde_json::to_vec(body).map_err(|e| LlmError::Marshal(e.to_string()))?;

    let mut request = client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .timeout(timeout)
        .body(payload);
    if let Some(token) = bearer {
        request = request.bearer_auth(token);
    }

    let response = request
        .send()
        .await
        .map_err(|e| LlmError::Transport(e.to_string()))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| LlmError::Transport(e.to_string()))?;

    if !status.is_success() {
        return Err(LlmError::Http {
            status: status.as_u16(),
            body: text,
        });
    }

    Ok(text)
}
