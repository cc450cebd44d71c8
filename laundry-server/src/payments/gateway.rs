//! 支付网关抽象

use async_trait::async_trait;
use serde::{Deserialize, Serialize, Serializer};

use super::PaymentResult;

/// Transaction initialization request (amount in kobo)
#[derive(Debug, Clone)]
pub struct InitializeTransaction {
    pub email: String,
    pub amount: i64,
    pub reference: String,
    pub callback_url: Option<String>,
    pub metadata: serde_json::Value,
}

/// Hosted checkout returned by the gateway
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Checkout {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

/// Gateway transaction status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayStatus {
    Success,
    Failed,
    Abandoned,
    Pending,
    Reversed,
    Other(String),
}

impl GatewayStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "success" => Self::Success,
            "failed" => Self::Failed,
            "abandoned" => Self::Abandoned,
            "pending" | "ongoing" | "processing" | "queued" => Self::Pending,
            "reversed" => Self::Reversed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Abandoned => "abandoned",
            Self::Pending => "pending",
            Self::Reversed => "reversed",
            Self::Other(s) => s,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl std::fmt::Display for GatewayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for GatewayStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Verified transaction
#[derive(Debug, Clone, Serialize)]
pub struct Verification {
    pub reference: String,
    pub status: GatewayStatus,
    /// kobo
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_response: Option<String>,
}

/// Payment gateway
///
/// `verify` is a read and may be repeated freely.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initialize(&self, request: InitializeTransaction) -> PaymentResult<Checkout>;

    async fn verify(&self, reference: &str) -> PaymentResult<Verification>;
}
