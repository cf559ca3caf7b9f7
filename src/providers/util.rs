use crate::core::error::ProviderError;
use serde_json::Value;
use tracing::debug;

/// Browser-like agent string; the public quote endpoints reject the
/// default reqwest one.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Sends a prepared request and decodes the body as JSON, mapping HTTP
/// status and transport failures onto the provider error taxonomy.
pub async fn send_json(request: reqwest::RequestBuilder) -> Result<Value, ProviderError> {
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        debug!(status = status.as_u16(), "Provider returned error status");
        return Err(ProviderError::from_status(status.as_u16()));
    }

    let text = response.text().await?;
    if text.trim().is_empty() {
        return Err(ProviderError::MalformedResponse(
            "empty response body".to_string(),
        ));
    }

    Ok(serde_json::from_str(&text)?)
}
