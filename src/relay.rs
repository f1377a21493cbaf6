//! bloXroute TON Trader API submission client
//!
//! Signed external messages are posted to `{endpoint}/api/v2/submit`
//! instead of the public RPC's sendBoc.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::errors::RelayError;
use crate::rpc::{MessageSender, SubmitOutcome};
use crate::wallet::{SignedMessage, WalletKind};

const SUBMIT_PATH: &str = "/api/v2/submit";

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    transaction: SubmitTransaction,
    wallet: &'a str,
}

#[derive(Debug, Serialize)]
struct SubmitTransaction {
    content: String,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    msg_body_hash: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    code: i64,
    message: String,
}

pub struct RelayClient {
    client: Client,
    endpoint: String,
    auth_key: String,
    wallet: WalletKind,
}

impl RelayClient {
    pub fn new(
        endpoint: &str,
        auth_key: &str,
        wallet: WalletKind,
        timeout: Duration,
    ) -> Result<Self, RelayError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            auth_key: auth_key.to_string(),
            wallet,
        })
    }

    /// Submit one signed message, returning the relay's message body hash
    pub async fn submit(&self, message: &SignedMessage) -> Result<String, RelayError> {
        let wallet = self.wallet.relay_name().ok_or(RelayError::UnsupportedWallet)?;

        let request = SubmitRequest {
            transaction: SubmitTransaction {
                content: message.to_base64(),
            },
            wallet,
        };
        let url = format!("{}{}", self.endpoint, SUBMIT_PATH);

        debug!("relay submit: {} ({} wallet, {} byte boc)", url, wallet, message.boc().len());

        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.auth_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        info!(status_code = status.as_u16(), "relay response received");

        if status != reqwest::StatusCode::OK {
            return Err(match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => {
                    error!(code = err.code, message = %err.message, "relay API error");
                    RelayError::Api {
                        code: err.code,
                        message: err.message,
                    }
                }
                Err(_) => RelayError::Status {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let parsed: SubmitResponse = serde_json::from_str(&body)
            .map_err(|e| RelayError::Decode(format!("{}. Body: {}", e, body)))?;
        Ok(parsed.msg_body_hash)
    }
}

#[async_trait]
impl MessageSender for RelayClient {
    fn name(&self) -> &'static str {
        "relay"
    }

    async fn send_message(&self, message: &SignedMessage) -> eyre::Result<SubmitOutcome> {
        let hash = self.submit(message).await?;
        Ok(SubmitOutcome {
            via: self.name(),
            msg_hash: Some(hash),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn relay(server: &MockServer, wallet: WalletKind) -> RelayClient {
        RelayClient::new(&server.uri(), "auth-token", wallet, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_submit_posts_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/submit"))
            .and(header("Authorization", "auth-token"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({
                "transaction": {"content": "AQID"},
                "wallet": "V4R2"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"msg_body_hash": "deadbeef"})))
            .expect(1)
            .mount(&server)
            .await;

        let hash = relay(&server, WalletKind::V4R2)
            .submit(&SignedMessage::new(vec![1, 2, 3]))
            .await
            .unwrap();
        assert_eq!(hash, "deadbeef");
    }

    #[tokio::test]
    async fn test_wallet_type_names() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({
                "transaction": {"content": "AQID"},
                "wallet": "HighloadV2R2"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"msg_body_hash": "h"})))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = relay(&server, WalletKind::HighloadV2R2)
            .send_message(&SignedMessage::new(vec![1, 2, 3]))
            .await
            .unwrap();
        assert_eq!(outcome.via, "relay");
        assert_eq!(outcome.msg_hash.as_deref(), Some("h"));
    }

    #[tokio::test]
    async fn test_api_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": 3,
                "message": "invalid signature"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = relay(&server, WalletKind::V4R2)
            .submit(&SignedMessage::new(vec![1]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "API error: invalid signature (code: 3)");
    }

    #[tokio::test]
    async fn test_non_json_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream timeout"))
            .mount(&server)
            .await;

        let err = relay(&server, WalletKind::HighloadV2R2)
            .submit(&SignedMessage::new(vec![1]))
            .await
            .unwrap_err();
        match err {
            RelayError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream timeout");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_unsupported_wallet_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = relay(&server, WalletKind::V3R2)
            .submit(&SignedMessage::new(vec![1]))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::UnsupportedWallet));
    }
}
