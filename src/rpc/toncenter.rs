//! toncenter HTTP JSON-RPC v2 client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tonlib_core::TonAddress;
use tracing::{debug, info};

use super::{
    AccountState, GetMethodArg, GetMethodResult, MasterchainInfo, MessageSender, StackValue,
    SubmitOutcome, TonProvider,
};
use crate::errors::RpcError;
use crate::wallet::SignedMessage;

/// TVM exit codes 0 and 1 both mean success
const TVM_SUCCESS_CODES: [i64; 2] = [0, 1];

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    result: Option<T>,
    error: Option<String>,
    code: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawMasterchainInfo {
    last: RawBlockId,
}

#[derive(Debug, Deserialize)]
struct RawBlockId {
    workchain: i32,
    shard: Value,
    seqno: u32,
}

#[derive(Debug, Deserialize)]
struct RawGetMethodResult {
    #[serde(default)]
    stack: Vec<Value>,
    exit_code: i64,
}

#[derive(Clone)]
pub struct ToncenterClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ToncenterClient {
    pub fn new(endpoint: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, RpcError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key,
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let request = json!({
            "id": 1,
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });

        debug!("toncenter request: {}", request);

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("X-API-Key", key);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!("toncenter {} status: {}, body length: {}", method, status, body.len());

        let envelope: Envelope<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(RpcError::Decode(format!("{}: {}. Body: {}", method, e, body)));
            }
            Err(_) => {
                return Err(RpcError::Http {
                    status: status.as_u16(),
                    body,
                });
            }
        };

        if !envelope.ok {
            return Err(RpcError::Api {
                code: envelope.code.unwrap_or(i64::from(status.as_u16())),
                message: envelope.error.unwrap_or_default(),
            });
        }

        envelope
            .result
            .ok_or_else(|| RpcError::Decode(format!("{} response without result", method)))
    }
}

/// Numbers come back either as JSON strings or as JSON numbers
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl TonProvider for ToncenterClient {
    async fn masterchain_info(&self) -> Result<MasterchainInfo, RpcError> {
        let raw: RawMasterchainInfo = self.call("getMasterchainInfo", json!({})).await?;
        Ok(MasterchainInfo {
            workchain: raw.last.workchain,
            shard: value_to_string(&raw.last.shard),
            seqno: raw.last.seqno,
        })
    }

    async fn account_state(&self, address: &TonAddress) -> Result<AccountState, RpcError> {
        let raw: String = self
            .call("getAddressState", json!({ "address": address.to_base64_url() }))
            .await?;
        AccountState::parse(&raw)
    }

    async fn balance(&self, address: &TonAddress) -> Result<u64, RpcError> {
        let raw: Value = self
            .call("getAddressBalance", json!({ "address": address.to_base64_url() }))
            .await?;
        let raw = value_to_string(&raw);
        raw.parse()
            .map_err(|e| RpcError::Decode(format!("invalid balance {:?}: {}", raw, e)))
    }

    async fn run_get_method(
        &self,
        address: &TonAddress,
        method: &str,
        stack: Vec<GetMethodArg>,
    ) -> Result<GetMethodResult, RpcError> {
        let stack = stack
            .iter()
            .map(GetMethodArg::to_json)
            .collect::<Result<Vec<_>, _>>()?;

        let raw: RawGetMethodResult = self
            .call(
                "runGetMethod",
                json!({
                    "address": address.to_base64_url(),
                    "method": method,
                    "stack": stack,
                }),
            )
            .await?;

        if !TVM_SUCCESS_CODES.contains(&raw.exit_code) {
            return Err(RpcError::ExitCode {
                method: method.to_string(),
                exit_code: raw.exit_code,
            });
        }

        debug!("{} exit code {}, {} stack entries", method, raw.exit_code, raw.stack.len());

        let stack = raw
            .stack
            .iter()
            .map(StackValue::from_json)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GetMethodResult {
            method: method.to_string(),
            stack,
        })
    }
}

#[async_trait]
impl MessageSender for ToncenterClient {
    fn name(&self) -> &'static str {
        "toncenter"
    }

    async fn send_message(&self, message: &SignedMessage) -> eyre::Result<SubmitOutcome> {
        let result: Value = self
            .call("sendBocReturnHash", json!({ "boc": message.to_base64() }))
            .await?;
        let msg_hash = result.get("hash").and_then(Value::as_str).map(str::to_string);
        info!("sendBoc accepted, hash: {}", msg_hash.as_deref().unwrap_or("<none>"));
        Ok(SubmitOutcome {
            via: self.name(),
            msg_hash,
        })
    }
}
