//! Business messaging client (WhatsApp Cloud API shape)
//!
//! `POST {api_url}/{phone_number_id}/messages` with a Bearer access token.

use std::time::Duration;

use serde::Deserialize;

use super::NotifyError;

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    messages: Vec<MessageId>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct MessageId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

pub struct MessagingClient {
    http: reqwest::Client,
    api_url: String,
    access_token: String,
    phone_number_id: String,
}

impl std::fmt::Debug for MessagingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagingClient")
            .field("api_url", &self.api_url)
            .field("phone_number_id", &self.phone_number_id)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl MessagingClient {
    pub fn new(
        api_url: impl Into<String>,
        access_token: impl Into<String>,
        phone_number_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            phone_number_id: phone_number_id.into(),
        })
    }

    /// Send a plain text message; returns the provider message id
    pub async fn send_text(&self, to: &str, body: &str) -> Result<String, NotifyError> {
        let payload = serde_json::json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "text",
            "text": { "preview_url": false, "body": body },
        });

        let response = self
            .http
            .post(format!("{}/{}/messages", self.api_url, self.phone_number_id))
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        let message_id = parse_send_response(status, &text)?;

        tracing::info!(to = %to, message_id = %message_id, "Notification sent");
        Ok(message_id)
    }
}

fn parse_send_response(status: reqwest::StatusCode, body: &str) -> Result<String, NotifyError> {
    let parsed: SendResponse = serde_json::from_str(body)
        .map_err(|e| NotifyError::Provider(format!("HTTP {status}: invalid response: {e}")))?;

    if let Some(error) = parsed.error {
        return Err(NotifyError::Provider(error.message));
    }
    if !status.is_success() {
        return Err(NotifyError::Provider(format!("HTTP {status}")));
    }
    parsed
        .messages
        .into_iter()
        .next()
        .map(|m| m.id)
        .ok_or_else(|| NotifyError::Provider("response contained no message id".into()))
}
