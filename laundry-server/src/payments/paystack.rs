//! Paystack integration via REST API (no SDK dependency)
//!
//! - `POST /transaction/initialize` → hosted checkout
//! - `GET  /transaction/verify/:reference` → transaction status
//!
//! Amounts are kobo. Every response is wrapped in `{status, message, data}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::gateway::{Checkout, GatewayStatus, InitializeTransaction, PaymentGateway, Verification};
use super::{PaymentError, PaymentResult};

pub const DEFAULT_BASE_URL: &str = "https://api.paystack.co";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: bool,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    reference: String,
    status: String,
    amount: i64,
    #[serde(default)]
    paid_at: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    gateway_response: Option<String>,
}

/// Unwrap a Paystack envelope
fn decode_envelope<T: DeserializeOwned>(http_status: StatusCode, body: &str) -> PaymentResult<T> {
    let envelope: Envelope<T> = serde_json::from_str(body).map_err(|e| {
        PaymentError::InvalidResponse(format!("HTTP {http_status}: {e}"))
    })?;

    if !http_status.is_success() || !envelope.status {
        let message = if envelope.message.is_empty() {
            format!("Paystack request failed (HTTP {http_status})")
        } else {
            envelope.message
        };
        return Err(PaymentError::Gateway(message));
    }

    envelope
        .data
        .ok_or_else(|| PaymentError::InvalidResponse(format!("missing data: {}", envelope.message)))
}

pub struct PaystackClient {
    http: reqwest::Client,
    secret_key: String,
    base_url: String,
}

impl std::fmt::Debug for PaystackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaystackClient")
            .field("base_url", &self.base_url)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

impl PaystackClient {
    pub fn new(
        secret_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> PaymentResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            secret_key: secret_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn read<T: DeserializeOwned>(&self, response: reqwest::Response) -> PaymentResult<T> {
        let status = response.status();
        let body = response.text().await?;
        decode_envelope(status, &body)
    }
}

#[async_trait]
impl PaymentGateway for PaystackClient {
    async fn initialize(&self, request: InitializeTransaction) -> PaymentResult<Checkout> {
        let mut body = serde_json::json!({
            "email": request.email,
            "amount": request.amount,
            "reference": request.reference,
            "metadata": request.metadata,
        });
        if let Some(callback_url) = &request.callback_url {
            body["callback_url"] = serde_json::Value::String(callback_url.clone());
        }

        let response = self
            .http
            .post(format!("{}/transaction/initialize", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .await?;
        let checkout: Checkout = self.read(response).await?;

        tracing::info!(reference = %checkout.reference, amount = request.amount, "Paystack transaction initialized");
        Ok(checkout)
    }

    async fn verify(&self, reference: &str) -> PaymentResult<Verification> {
        if reference.is_empty() {
            return Err(PaymentError::ReferenceMissing);
        }
        let mut url = reqwest::Url::parse(&format!("{}/transaction/verify/", self.base_url))
            .map_err(|e| PaymentError::InvalidResponse(format!("invalid base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| PaymentError::InvalidResponse("invalid base url".into()))?
            .pop_if_empty()
            .push(reference);

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.secret_key)
            .send()
            .await?;
        let data: VerifyData = self.read(response).await?;

        tracing::debug!(reference = %data.reference, status = %data.status, "Paystack transaction verified");
        Ok(data.into())
    }
}

impl From<VerifyData> for Verification {
    fn from(data: VerifyData) -> Self {
        Self {
            reference: data.reference,
            status: GatewayStatus::parse(&data.status),
            amount: data.amount,
            paid_at: data.paid_at,
            channel: data.channel,
            gateway_response: data.gateway_response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_initialize() {
        let body = r#"{
            "status": true,
            "message": "Authorization URL created",
            "data": {
                "authorization_url": "https://checkout.paystack.com/0peioxfhpn",
                "access_code": "0peioxfhpn",
                "reference": "LD240501600123-0a1b2c3d"
            }
        }"#;
        let checkout: Checkout = decode_envelope(StatusCode::OK, body).unwrap();
        assert_eq!(checkout.access_code, "0peioxfhpn");
        assert_eq!(checkout.reference, "LD240501600123-0a1b2c3d");
    }

    #[test]
    fn test_decode_verify() {
        let body = r#"{
            "status": true,
            "message": "Verification successful",
            "data": {
                "id": 4099260516,
                "status": "success",
                "reference": "LD240501600123-0a1b2c3d",
                "amount": 300000,
                "gateway_response": "Successful",
                "paid_at": "2024-05-01T10:10:00.000Z",
                "channel": "card",
                "currency": "NGN"
            }
        }"#;
        let data: VerifyData = decode_envelope(StatusCode::OK, body).unwrap();
        let verification = Verification::from(data);
        assert_eq!(verification.status, GatewayStatus::Success);
        assert_eq!(verification.amount, 300_000);
        assert_eq!(verification.channel.as_deref(), Some("card"));
    }

    #[test]
    fn test_decode_gateway_error() {
        let body = r#"{"status": false, "message": "Transaction reference not found"}"#;
        let err = decode_envelope::<VerifyData>(StatusCode::BAD_REQUEST, body).unwrap_err();
        match err {
            PaymentError::Gateway(msg) => assert_eq!(msg, "Transaction reference not found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_garbage() {
        let err = decode_envelope::<VerifyData>(StatusCode::BAD_GATEWAY, "<html>").unwrap_err();
        assert!(matches!(err, PaymentError::InvalidResponse(_)));
    }

    #[test]
    fn test_new_trims_base_url() {
        let client =
            PaystackClient::new("sk_test", "https://api.paystack.co/", Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.base_url, "https://api.paystack.co");
        assert!(!format!("{client:?}").contains("sk_test"));
    }
}
