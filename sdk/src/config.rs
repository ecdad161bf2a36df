//! # Client Configuration & Constants
//!
//! Every default the SDK falls back on lives here. If a timeout or a fee
//! ceiling is hardcoded anywhere else, it is a bug waiting for a bug report.
//!
//! Two layers:
//!
//! - **Constants**: protocol denominations, default ceilings, retry and
//!   backoff parameters.
//! - **[`ClientConfig`]**: the JSON shape a caller hands to
//!   [`Client::from_config`](crate::Client::from_config). Loading it from a
//!   file or the environment is the caller's business; parsing it is ours.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Denomination
// ---------------------------------------------------------------------------

/// Photons per NOVA. Eight decimals, same as the fee precision on-ledger.
pub const PHOTONS_PER_NOVA: u64 = 100_000_000;

// ---------------------------------------------------------------------------
// Fees & Payments
// ---------------------------------------------------------------------------

/// Fee ceiling for transactions that don't set one and whose kind has no
/// opinion either. 2 NOVA.
pub const DEFAULT_MAX_TRANSACTION_FEE: u64 = 2 * PHOTONS_PER_NOVA;

/// Upper bound on what a single paid query may cost. 1 NOVA.
pub const DEFAULT_MAX_QUERY_PAYMENT: u64 = PHOTONS_PER_NOVA;

/// Payment attached to paid queries when the caller does not pick an amount.
pub const DEFAULT_QUERY_PAYMENT: u64 = PHOTONS_PER_NOVA / 100;

// ---------------------------------------------------------------------------
// Transaction Limits
// ---------------------------------------------------------------------------

/// How long after its valid start a transaction may still reach consensus.
pub const DEFAULT_TRANSACTION_VALID_DURATION: Duration = Duration::from_secs(120);

/// Nodes reject anything longer than three minutes, so we do too.
pub const MAX_TRANSACTION_VALID_DURATION: Duration = Duration::from_secs(180);

/// Maximum memo length in bytes (UTF-8).
pub const MAX_MEMO_LENGTH: usize = 100;

/// Valid start is backdated by a random amount in this window so that a
/// client clock running slightly ahead of the nodes does not earn an
/// `InvalidTransactionStart`.
pub const VALID_START_BACKDATE_MIN: Duration = Duration::from_secs(5);
pub const VALID_START_BACKDATE_MAX: Duration = Duration::from_secs(8);

// ---------------------------------------------------------------------------
// Retry & Backoff
// ---------------------------------------------------------------------------

/// Attempts per execution before giving up with `MaxAttemptsExceeded`.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// First retry delay. Doubles on every attempt after that.
pub const DEFAULT_MIN_BACKOFF: Duration = Duration::from_millis(250);

/// Retry delay ceiling.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(8);

/// Absolute deadline for one `execute`, from first send to final answer.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Receipts show up a few seconds after consensus. Poll a bit more patiently.
pub const DEFAULT_RECEIPT_MAX_ATTEMPTS: u32 = 30;

/// Deadline for a receipt or record poll.
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Node backoff after its first failure. Doubles per consecutive failure.
pub const NODE_MIN_BACKOFF: Duration = Duration::from_secs(8);

/// A node is never benched for longer than this.
pub const NODE_MAX_BACKOFF: Duration = Duration::from_secs(3600);

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Default plaintext gRPC port of a ledger node.
pub const DEFAULT_GRPC_PORT: u16 = 50211;

/// TCP connect timeout for a node channel.
pub const GRPC_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// LedgerId
// ---------------------------------------------------------------------------

/// Which ledger the client believes it is talking to.
///
/// Purely informational for the SDK's own logic; it ends up in logs and
/// lets callers sanity-check that their address book and their intentions
/// agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LedgerId {
    Mainnet,
    Testnet,
    Previewnet,
    /// Anything else: a local devnet, a private deployment, a typo.
    Custom(String),
}

impl LedgerId {
    /// Single-byte form used by nodes when reporting their ledger.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            LedgerId::Mainnet => vec![0x00],
            LedgerId::Testnet => vec![0x01],
            LedgerId::Previewnet => vec![0x02],
            LedgerId::Custom(name) => name.as_bytes().to_vec(),
        }
    }

    pub fn is_mainnet(&self) -> bool {
        matches!(self, LedgerId::Mainnet)
    }
}

impl fmt::Display for LedgerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerId::Mainnet => write!(f, "mainnet"),
            LedgerId::Testnet => write!(f, "testnet"),
            LedgerId::Previewnet => write!(f, "previewnet"),
            LedgerId::Custom(name) => write!(f, "{name}"),
        }
    }
}

impl From<String> for LedgerId {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "mainnet" => LedgerId::Mainnet,
            "testnet" => LedgerId::Testnet,
            "previewnet" => LedgerId::Previewnet,
            _ => LedgerId::Custom(s),
        }
    }
}

impl From<LedgerId> for String {
    fn from(id: LedgerId) -> Self {
        id.to_string()
    }
}

impl FromStr for LedgerId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(LedgerId::from(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// ClientSettings
// ---------------------------------------------------------------------------

/// Runtime knobs a [`Client`](crate::Client) applies to every request that
/// doesn't override them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub max_attempts: u32,
    pub min_backoff: Duration,
    pub max_backoff: Duration,
    pub request_timeout: Duration,
    pub receipt_max_attempts: u32,
    pub receipt_timeout: Duration,
    pub default_max_transaction_fee: Option<u64>,
    pub max_query_payment: u64,
    pub default_query_payment: u64,
    pub transaction_valid_duration: Duration,
    /// `None` picks a third of the network (at least one node).
    pub max_nodes_per_transaction: Option<usize>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            min_backoff: DEFAULT_MIN_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            receipt_max_attempts: DEFAULT_RECEIPT_MAX_ATTEMPTS,
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
            default_max_transaction_fee: None,
            max_query_payment: DEFAULT_MAX_QUERY_PAYMENT,
            default_query_payment: DEFAULT_QUERY_PAYMENT,
            transaction_valid_duration: DEFAULT_TRANSACTION_VALID_DURATION,
            max_nodes_per_transaction: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ClientConfig (JSON)
// ---------------------------------------------------------------------------

/// Operator credentials as they appear in a config document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorConfig {
    /// `shard.realm.num`
    pub account_id: String,
    /// Hex-encoded 32-byte Ed25519 secret key.
    pub private_key: String,
}

/// Serializable client configuration.
///
/// ```json
/// {
///   "network": { "10.0.0.1:50211": "0.0.3", "10.0.0.2:50211": "0.0.4" },
///   "ledgerId": "testnet",
///   "operator": { "accountId": "0.0.1001", "privateKey": "9d61b1..." },
///   "maxAttempts": 5
/// }
/// ```
///
/// Every field except `network` is optional and falls back to the
/// matching constant in this module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Address book: endpoint address → node account id.
    pub network: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_id: Option<LedgerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<OperatorConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_backoff_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_backoff_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_transaction_fee: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_query_payment: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_nodes_per_transaction: Option<usize>,
}

impl ClientConfig {
    /// Parse a JSON config document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ClientConfig =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        if config.network.is_empty() {
            return Err(Error::Config("network address book is empty".into()));
        }
        Ok(config)
    }

    /// Fold the optional overrides into a full set of settings.
    pub fn settings(&self) -> Result<ClientSettings> {
        let mut settings = ClientSettings::default();
        if let Some(attempts) = self.max_attempts {
            if attempts == 0 {
                return Err(Error::Config("maxAttempts must be at least 1".into()));
            }
            settings.max_attempts = attempts;
        }
        if let Some(ms) = self.min_backoff_ms {
            settings.min_backoff = Duration::from_millis(ms);
        }
        if let Some(ms) = self.max_backoff_ms {
            settings.max_backoff = Duration::from_millis(ms);
        }
        if settings.min_backoff > settings.max_backoff {
            return Err(Error::Config(
                "minBackoffMs must not exceed maxBackoffMs".into(),
            ));
        }
        if let Some(ms) = self.request_timeout_ms {
            settings.request_timeout = Duration::from_millis(ms);
        }
        settings.default_max_transaction_fee = self.max_transaction_fee;
        if let Some(payment) = self.max_query_payment {
            settings.max_query_payment = payment;
        }
        settings.max_nodes_per_transaction = self.max_nodes_per_transaction;
        Ok(settings)
    }
}

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------

/// Render a photon amount as a decimal NOVA string for logs.
pub fn format_nova(photons: u64) -> String {
    let whole = photons / PHOTONS_PER_NOVA;
    let frac = photons % PHOTONS_PER_NOVA;
    if frac == 0 {
        format!("{whole} NOVA")
    } else {
        let frac = format!("{frac:08}");
        format!("{whole}.{} NOVA", frac.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_constants_sanity() {
        assert!(DEFAULT_MIN_BACKOFF < DEFAULT_MAX_BACKOFF);
        assert!(NODE_MIN_BACKOFF < NODE_MAX_BACKOFF);
        assert!(DEFAULT_MAX_ATTEMPTS > 0);
        assert!(VALID_START_BACKDATE_MIN < VALID_START_BACKDATE_MAX);
    }

    #[test]
    fn test_fee_constants_sanity() {
        assert!(DEFAULT_QUERY_PAYMENT <= DEFAULT_MAX_QUERY_PAYMENT);
        assert!(DEFAULT_TRANSACTION_VALID_DURATION <= MAX_TRANSACTION_VALID_DURATION);
    }

    #[test]
    fn test_ledger_id_parse_and_display() {
        assert_eq!("testnet".parse::<LedgerId>().unwrap(), LedgerId::Testnet);
        assert_eq!("MAINNET".parse::<LedgerId>().unwrap(), LedgerId::Mainnet);
        assert_eq!(
            "local-dev".parse::<LedgerId>().unwrap(),
            LedgerId::Custom("local-dev".into())
        );
        assert_eq!(LedgerId::Previewnet.to_string(), "previewnet");
        assert_eq!(LedgerId::Testnet.to_bytes(), vec![0x01]);
    }

    #[test]
    fn test_client_config_from_json() {
        let json = r#"{
            "network": { "127.0.0.1:50211": "0.0.3", "127.0.0.1:50212": "0.0.4" },
            "ledgerId": "testnet",
            "operator": { "accountId": "0.0.1001", "privateKey": "00" },
            "maxAttempts": 4,
            "requestTimeoutMs": 5000
        }"#;
        let config = ClientConfig::from_json(json).unwrap();
        assert_eq!(config.network.len(), 2);
        assert_eq!(config.ledger_id, Some(LedgerId::Testnet));
        assert_eq!(config.operator.as_ref().unwrap().account_id, "0.0.1001");

        let settings = config.settings().unwrap();
        assert_eq!(settings.max_attempts, 4);
        assert_eq!(settings.request_timeout, Duration::from_secs(5));
        assert_eq!(settings.min_backoff, DEFAULT_MIN_BACKOFF);
    }

    #[test]
    fn test_client_config_rejects_empty_network() {
        let err = ClientConfig::from_json(r#"{ "network": {} }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_client_config_rejects_inverted_backoff() {
        let json = r#"{
            "network": { "127.0.0.1:50211": "0.0.3" },
            "minBackoffMs": 9000,
            "maxBackoffMs": 1000
        }"#;
        let config = ClientConfig::from_json(json).unwrap();
        assert!(config.settings().is_err());
    }

    #[test]
    fn test_format_nova() {
        assert_eq!(format_nova(2 * PHOTONS_PER_NOVA), "2 NOVA");
        assert_eq!(format_nova(150_000_000), "1.5 NOVA");
        assert_eq!(format_nova(1), "0.00000001 NOVA");
    }
}
