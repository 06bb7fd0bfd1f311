// autorent
// Copyright 2026 The autorent Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Verification and parsing of the webhook events sent by the payment processor.
//!
//! Every event carries a `Webhook-Signature` header of the form `t=<unix secs>,v1=<hex>` where
//! the `v1` value is the HMAC-SHA256 of `"<t>.<body>"` keyed with the shared webhook secret.
//! The header may carry more than one `v1` entry while the secret is being rotated.

use autorent_core::env::{get_optional_var, get_required_var};
use derivative::Derivative;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;
use time::OffsetDateTime;

/// Name of the header that carries the event signature.
pub const SIGNATURE_HEADER: &str = "webhook-signature";

/// Event type sent when a checkout session has been paid.
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Default value for the `tolerance` configuration property.
const DEFAULT_TOLERANCE: Duration = Duration::from_secs(5 * 60);

/// Type of the MAC used to sign events.
type HmacSha256 = Hmac<Sha256>;

/// Errors raised while validating a webhook event.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum WebhookError {
    /// The signature header is missing or cannot be parsed.
    #[error("Malformed signature header: {0}")]
    MalformedHeader(String),

    /// The payload does not look like an event.
    #[error("Invalid event payload: {0}")]
    InvalidPayload(String),

    /// None of the signatures in the header match the payload.
    #[error("Signature does not match payload")]
    SignatureMismatch,

    /// The signature timestamp is outside of the accepted window.
    #[error("Signature timestamp is outside the tolerance window")]
    Stale,
}

/// Result type for this module.
pub type WebhookResult<T> = Result<T, WebhookError>;

/// Options to validate webhook events.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
#[cfg_attr(test, derivative(PartialEq))]
pub struct WebhookOptions {
    /// Secret shared with the payment processor to sign events.
    #[derivative(Debug = "ignore")]
    pub secret: String,

    /// Maximum difference between the signature timestamp and the current time.
    pub tolerance: Duration,
}

impl WebhookOptions {
    /// Creates a new set of options from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use variables such as `<prefix>_SECRET` and `<prefix>_TOLERANCE`.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        Ok(Self {
            secret: get_required_var::<String>(prefix, "SECRET")?,
            tolerance: get_optional_var::<Duration>(prefix, "TOLERANCE")?
                .unwrap_or(DEFAULT_TOLERANCE),
        })
    }
}

/// Object embedded in an event.  Only the fields of checkout sessions are modeled.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct EventObject {
    /// Identifier of the object, which for checkout sessions is the session ID.
    pub id: String,

    /// Total amount collected by the checkout session, in cents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_total: Option<i64>,
}

/// Container for the object the event refers to.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct EventData {
    /// The object the event refers to.
    pub object: EventObject,
}

/// A webhook event as sent by the payment processor.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Event {
    /// Unique identifier of the event.
    pub id: String,

    /// Type of the event, such as `checkout.session.completed`.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Payload of the event.
    pub data: EventData,
}

/// Parsed contents of the signature header.
struct SignatureHeader {
    /// Timestamp at which the event was signed.
    timestamp: i64,

    /// All `v1` signatures present in the header.
    signatures: Vec<Vec<u8>>,
}

/// Parses the raw `header` value.
fn parse_header(header: &str) -> WebhookResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = vec![];
    for item in header.split(',') {
        let (key, value) = match item.trim().split_once('=') {
            Some(kv) => kv,
            None => return Err(WebhookError::MalformedHeader(format!("Bad item '{}'", item))),
        };
        match key {
            "t" => match value.parse::<i64>() {
                Ok(t) => timestamp = Some(t),
                Err(e) => {
                    return Err(WebhookError::MalformedHeader(format!("Bad timestamp: {}", e)))
                }
            },
            "v1" => match hex::decode(value) {
                Ok(signature) => signatures.push(signature),
                Err(e) => {
                    return Err(WebhookError::MalformedHeader(format!("Bad signature: {}", e)))
                }
            },
            _ => (),
        }
    }

    let timestamp = match timestamp {
        Some(timestamp) => timestamp,
        None => return Err(WebhookError::MalformedHeader("No timestamp".to_owned())),
    };
    if signatures.is_empty() {
        return Err(WebhookError::MalformedHeader("No v1 signature".to_owned()));
    }
    Ok(SignatureHeader { timestamp, signatures })
}

/// Creates the MAC for `timestamp` and `body` keyed with `secret`.
fn new_mac(secret: &str, timestamp: i64, body: &[u8]) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    mac
}

/// Computes the signature header value for a `body` signed at `timestamp` with `secret`.
///
/// This is what the payment processor does on its side and is exposed to let tests forge
/// valid events.
pub fn sign(secret: &str, timestamp: i64, body: &[u8]) -> String {
    let mac = new_mac(secret, timestamp, body);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

/// Verifies that `body` was signed by the payment processor as claimed by `header`, and that
/// the signature is within the tolerance window around `now`.
pub fn verify(
    opts: &WebhookOptions,
    header: &str,
    body: &[u8],
    now: OffsetDateTime,
) -> WebhookResult<()> {
    let header = parse_header(header)?;

    let matched = header.signatures.iter().any(|signature| {
        new_mac(&opts.secret, header.timestamp, body).verify_slice(signature).is_ok()
    });
    if !matched {
        return Err(WebhookError::SignatureMismatch);
    }

    let skew = now.unix_timestamp().abs_diff(header.timestamp);
    if skew > opts.tolerance.as_secs() {
        return Err(WebhookError::Stale);
    }

    Ok(())
}

/// Parses a `body` that has already been verified into an `Event`.
pub fn parse_event(body: &[u8]) -> WebhookResult<Event> {
    serde_json::from_slice(body).map_err(|e| WebhookError::InvalidPayload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    /// Timestamp used to sign all test events.
    const SIGNED_AT: OffsetDateTime = datetime!(2026-05-10 12:00:00 UTC);

    fn test_opts() -> WebhookOptions {
        WebhookOptions { secret: "whsec_test".to_owned(), tolerance: DEFAULT_TOLERANCE }
    }

    #[test]
    fn test_webhook_options_from_env() {
        temp_env::with_vars(
            [("HOOK_SECRET", Some("the-secret")), ("HOOK_TOLERANCE", Some("1m"))],
            || {
                assert_eq!(
                    WebhookOptions {
                        secret: "the-secret".to_owned(),
                        tolerance: Duration::from_secs(60)
                    },
                    WebhookOptions::from_env("HOOK").unwrap()
                );
            },
        );

        temp_env::with_vars([("HOOK_SECRET", Some("the-secret")), ("HOOK_TOLERANCE", None)], || {
            assert_eq!(DEFAULT_TOLERANCE, WebhookOptions::from_env("HOOK").unwrap().tolerance);
        });

        temp_env::with_var_unset("HOOK_SECRET", || {
            WebhookOptions::from_env("HOOK").unwrap_err();
        });
    }

    #[test]
    fn test_verify_ok() {
        let body = br#"{"id":"evt_1"}"#;
        let header = sign("whsec_test", SIGNED_AT.unix_timestamp(), body);
        verify(&test_opts(), &header, body, SIGNED_AT).unwrap();
        verify(&test_opts(), &header, body, SIGNED_AT + Duration::from_secs(300)).unwrap();
        verify(&test_opts(), &header, body, SIGNED_AT - Duration::from_secs(300)).unwrap();
    }

    #[test]
    fn test_verify_any_of_multiple_signatures() {
        let body = br#"{"id":"evt_1"}"#;
        let good = sign("whsec_test", SIGNED_AT.unix_timestamp(), body);
        let v1 = good.split_once(",v1=").unwrap().1;
        let header = format!("t={},v1={},v1={}", SIGNED_AT.unix_timestamp(), "00".repeat(32), v1);
        verify(&test_opts(), &header, body, SIGNED_AT).unwrap();
    }

    #[test]
    fn test_verify_tampered_body() {
        let header = sign("whsec_test", SIGNED_AT.unix_timestamp(), br#"{"amount":1}"#);
        assert_eq!(
            WebhookError::SignatureMismatch,
            verify(&test_opts(), &header, br#"{"amount":2}"#, SIGNED_AT).unwrap_err()
        );
    }

    #[test]
    fn test_verify_wrong_secret() {
        let body = b"{}";
        let header = sign("other-secret", SIGNED_AT.unix_timestamp(), body);
        assert_eq!(
            WebhookError::SignatureMismatch,
            verify(&test_opts(), &header, body, SIGNED_AT).unwrap_err()
        );
    }

    #[test]
    fn test_verify_stale() {
        let body = b"{}";
        let header = sign("whsec_test", SIGNED_AT.unix_timestamp(), body);
        assert_eq!(
            WebhookError::Stale,
            verify(&test_opts(), &header, body, SIGNED_AT + Duration::from_secs(301)).unwrap_err()
        );
    }

    #[test]
    fn test_verify_malformed_headers() {
        for (header, exp_message) in [
            ("", "Bad item"),
            ("v1=abcd", "No timestamp"),
            ("t=123", "No v1 signature"),
            ("t=abc,v1=abcd", "Bad timestamp"),
            ("t=123,v1=xyz", "Bad signature"),
        ] {
            match verify(&test_opts(), header, b"{}", SIGNED_AT) {
                Err(WebhookError::MalformedHeader(msg)) => {
                    assert!(msg.contains(exp_message), "{} did not contain {}", msg, exp_message)
                }
                e => panic!("Unexpected result for '{}': {:?}", header, e),
            }
        }
    }

    #[test]
    fn test_parse_event_ok() {
        let event = parse_event(
            br#"{
                "id": "evt_123",
                "type": "checkout.session.completed",
                "data": {"object": {"id": "cs_test_1", "amount_total": 5000, "extra": true}}
            }"#,
        )
        .unwrap();
        assert_eq!(
            Event {
                id: "evt_123".to_owned(),
                event_type: CHECKOUT_SESSION_COMPLETED.to_owned(),
                data: EventData {
                    object: EventObject { id: "cs_test_1".to_owned(), amount_total: Some(5000) }
                },
            },
            event
        );
    }

    #[test]
    fn test_parse_event_without_amount() {
        let event =
            parse_event(br#"{"id": "e", "type": "other", "data": {"object": {"id": "x"}}}"#)
                .unwrap();
        assert_eq!(None, event.data.object.amount_total);
    }

    #[test]
    fn test_parse_event_invalid() {
        match parse_event(br#"{"id": "e"}"#) {
            Err(WebhookError::InvalidPayload(msg)) => assert!(msg.contains("missing field")),
            e => panic!("{:?}", e),
        }
    }
}
