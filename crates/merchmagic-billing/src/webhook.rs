//! Payment webhook signature verification and event parsing.
//!
//! The `Stripe-Signature` header has the form `t=<unix>,v1=<hex>[,v1=...]`.
//! The signed payload is `"{t}.{raw body}"`, HMAC-SHA256 keyed with the
//! endpoint secret. Any matching `v1` entry is accepted.

use hmac::{Hmac, Mac};
use merchmagic_core::models::account::AccountId;
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::BillingError;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Event type that lifts the daily quota.
pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

/// Checkout metadata key carrying the account id.
pub const ACCOUNT_METADATA_KEY: &str = "userId";

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, BillingError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BillingError::InvalidSignatureFormat(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Build a signature header for `payload`.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> Result<String, BillingError> {
    let mac = mac_for(secret, timestamp, payload)?;
    Ok(format!(
        "t={timestamp},v1={}",
        hex::encode(mac.finalize().into_bytes())
    ))
}

struct ParsedHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

fn parse_header(header: &str) -> Result<ParsedHeader, BillingError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for item in header.split(',') {
        let Some((key, value)) = item.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => {
                timestamp = Some(value.parse::<i64>().map_err(|_| {
                    BillingError::InvalidSignatureFormat(format!("bad timestamp: {value}"))
                })?);
            }
            // Unparseable entries never match; other schemes are ignored.
            "v1" => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| BillingError::InvalidSignatureFormat("missing t=".into()))?;
    if signatures.is_empty() {
        return Err(BillingError::InvalidSignatureFormat(
            "missing v1 signature".into(),
        ));
    }
    Ok(ParsedHeader {
        timestamp,
        signatures,
    })
}

/// Verify `header` against `payload`. `now` is Unix seconds.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
    tolerance_secs: u64,
) -> Result<(), BillingError> {
    let parsed = parse_header(header)?;

    if now.abs_diff(parsed.timestamp) > tolerance_secs {
        return Err(BillingError::TimestampOutsideTolerance);
    }

    let expected = mac_for(secret, parsed.timestamp, payload)?
        .finalize()
        .into_bytes();

    let matched = parsed
        .signatures
        .iter()
        .any(|candidate| bool::from(candidate.as_slice().ct_eq(expected.as_slice())));

    if matched {
        Ok(())
    } else {
        Err(BillingError::InvalidSignature)
    }
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

impl WebhookEvent {
    pub fn parse(payload: &[u8]) -> Result<Self, BillingError> {
        serde_json::from_slice(payload).map_err(|e| BillingError::InvalidPayload(e.to_string()))
    }

    pub fn is_checkout_completed(&self) -> bool {
        self.event_type == CHECKOUT_COMPLETED
    }

    /// Account id carried in the checkout session metadata.
    pub fn correlated_account(&self) -> Option<AccountId> {
        self.data
            .object
            .get("metadata")?
            .get(ACCOUNT_METADATA_KEY)?
            .as_str()
            .filter(|id| !id.is_empty())
            .map(AccountId::from)
    }
}
