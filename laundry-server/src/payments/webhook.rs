//! Paystack webhook: signature check and event parsing
//!
//! Header `x-paystack-signature` = hex(HMAC-SHA512(secret_key, raw_body))

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha512;

pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Event that settles a charge
pub const CHARGE_SUCCESS: &str = "charge.success";

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub data: WebhookData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookData {
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
}

impl WebhookEvent {
    pub fn is_charge_success(&self) -> bool {
        self.event == CHARGE_SUCCESS
    }
}

/// Verify webhook signature (HMAC-SHA512, hex)
pub fn verify_signature(payload: &[u8], signature: &str, secret: &str) -> Result<(), &'static str> {
    if signature.is_empty() {
        return Err("Missing webhook signature");
    }
    let mut mac = Hmac::<Sha512>::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(payload);

    let sig_bytes = hex::decode(signature.trim()).map_err(|_| "Invalid signature hex")?;
    mac.verify_slice(&sig_bytes)
        .map_err(|_| "Webhook signature mismatch")
}

/// Compute the signature (tests and local tooling)
pub fn sign(payload: &[u8], secret: &str) -> String {
    let mut mac = match Hmac::<Sha512>::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "sk_test_abc123";

    #[test]
    fn test_signature_roundtrip() {
        let body = br#"{"event":"charge.success","data":{"reference":"LD1"}}"#;
        let sig = sign(body, SECRET);
        assert_eq!(sig.len(), 128);
        assert!(verify_signature(body, &sig, SECRET).is_ok());
    }

    #[test]
    fn test_signature_rejects_tampered_body() {
        let sig = sign(b"{\"amount\":100}", SECRET);
        assert_eq!(
            verify_signature(b"{\"amount\":999}", &sig, SECRET),
            Err("Webhook signature mismatch")
        );
    }

    #[test]
    fn test_signature_rejects_wrong_secret_and_garbage() {
        let body = b"{}";
        let sig = sign(body, "other-secret");
        assert!(verify_signature(body, &sig, SECRET).is_err());
        assert_eq!(
            verify_signature(body, "not-hex!", SECRET),
            Err("Invalid signature hex")
        );
        assert!(verify_signature(body, "", SECRET).is_err());
    }

    #[test]
    fn test_parse_event() {
        let json = r#"{
            "event": "charge.success",
            "data": {"id": 302961, "reference": "LD240501600123-0a1b2c3d", "status": "success", "amount": 300000, "currency": "NGN"}
        }"#;
        let event: WebhookEvent = serde_json::from_str(json).unwrap();
        assert!(event.is_charge_success());
        assert_eq!(event.data.reference.as_deref(), Some("LD240501600123-0a1b2c3d"));
        assert_eq!(event.data.amount, Some(300_000));

        let event: WebhookEvent =
            serde_json::from_str(r#"{"event":"transfer.success","data":{}}"#).unwrap();
        assert!(!event.is_charge_success());
        assert!(event.data.reference.is_none());
    }
}
