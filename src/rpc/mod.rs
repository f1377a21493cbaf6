pub mod toncenter;
#[cfg(test)]
pub(crate) mod testing;

pub use toncenter::ToncenterClient;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use num_bigint::{BigInt, BigUint};
use serde_json::{json, Value};
use tonlib_core::cell::{BagOfCells, Cell};
use tonlib_core::TonAddress;
use tracing::debug;

use crate::errors::RpcError;
use crate::wallet::SignedMessage;

/// Account status as reported by the node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountState {
    Active,
    Uninitialized,
    Frozen,
}

impl AccountState {
    pub fn is_active(self) -> bool {
        self == AccountState::Active
    }

    pub fn parse(raw: &str) -> Result<Self, RpcError> {
        match raw {
            "active" => Ok(AccountState::Active),
            "uninitialized" | "uninit" | "nonexist" => Ok(AccountState::Uninitialized),
            "frozen" => Ok(AccountState::Frozen),
            other => Err(RpcError::Decode(format!("unknown account state {:?}", other))),
        }
    }
}

impl std::fmt::Display for AccountState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountState::Active => write!(f, "active"),
            AccountState::Uninitialized => write!(f, "uninitialized"),
            AccountState::Frozen => write!(f, "frozen"),
        }
    }
}

/// Latest masterchain block reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterchainInfo {
    pub workchain: i32,
    pub shard: String,
    pub seqno: u32,
}

/// Argument passed to a get-method
#[derive(Debug, Clone)]
pub enum GetMethodArg {
    Num(BigUint),
    Slice(Cell),
}

impl GetMethodArg {
    /// Slice holding a single address, the usual argument of address lookups
    pub fn address(address: &TonAddress) -> Result<Self, RpcError> {
        let mut builder = tonlib_core::cell::CellBuilder::new();
        builder
            .store_address(address)
            .map_err(|e| RpcError::Encode(e.to_string()))?;
        let cell = builder.build().map_err(|e| RpcError::Encode(e.to_string()))?;
        Ok(GetMethodArg::Slice(cell))
    }

    pub fn to_json(&self) -> Result<Value, RpcError> {
        match self {
            GetMethodArg::Num(n) => Ok(json!(["num", format!("0x{:x}", n)])),
            GetMethodArg::Slice(cell) => Ok(json!(["tvm.Slice", cell_to_base64(cell)?])),
        }
    }
}

/// Value returned on a get-method stack
#[derive(Debug, Clone, PartialEq)]
pub enum StackValue {
    Num(BigInt),
    /// Cell or slice as a base64 BoC
    Cell(String),
    Other(Value),
}

impl StackValue {
    pub fn from_json(entry: &Value) -> Result<Self, RpcError> {
        let pair = entry
            .as_array()
            .filter(|pair| pair.len() == 2)
            .ok_or_else(|| RpcError::Decode(format!("malformed stack entry {}", entry)))?;
        let kind = pair[0].as_str().unwrap_or_default();
        let value = &pair[1];

        match kind {
            "num" | "int" => {
                let raw = value
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| value.to_string());
                parse_num(&raw).map(StackValue::Num)
            }
            "cell" | "slice" | "tvm.Cell" | "tvm.Slice" => {
                let boc = value
                    .get("bytes")
                    .and_then(Value::as_str)
                    .or_else(|| value.as_str())
                    .ok_or_else(|| RpcError::Decode(format!("{} entry without bytes", kind)))?;
                Ok(StackValue::Cell(boc.to_string()))
            }
            _ => Ok(StackValue::Other(entry.clone())),
        }
    }
}

/// Decode "0x1f", "-0x1f" or plain decimal numbers
fn parse_num(raw: &str) -> Result<BigInt, RpcError> {
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let parsed = match digits.strip_prefix("0x") {
        Some(hex) => BigInt::parse_bytes(hex.as_bytes(), 16),
        None => BigInt::parse_bytes(digits.as_bytes(), 10),
    }
    .ok_or_else(|| RpcError::Decode(format!("invalid number {:?}", raw)))?;
    Ok(if negative { -parsed } else { parsed })
}

/// Result of a successful get-method call
#[derive(Debug, Clone)]
pub struct GetMethodResult {
    pub method: String,
    pub stack: Vec<StackValue>,
}

impl GetMethodResult {
    fn entry(&self, index: usize) -> Result<&StackValue, RpcError> {
        self.stack.get(index).ok_or_else(|| {
            RpcError::Decode(format!(
                "{} returned {} stack entries, wanted index {}",
                self.method,
                self.stack.len(),
                index
            ))
        })
    }

    pub fn num(&self, index: usize) -> Result<BigInt, RpcError> {
        match self.entry(index)? {
            StackValue::Num(n) => Ok(n.clone()),
            other => Err(RpcError::Decode(format!("{}[{}] is not a number: {:?}", self.method, index, other))),
        }
    }

    pub fn unsigned(&self, index: usize) -> Result<BigUint, RpcError> {
        self.num(index)?
            .to_biguint()
            .ok_or_else(|| RpcError::Decode(format!("{}[{}] is negative", self.method, index)))
    }

    pub fn address(&self, index: usize) -> Result<TonAddress, RpcError> {
        match self.entry(index)? {
            StackValue::Cell(boc) => {
                let decode = |e: tonlib_core::cell::TonCellError| RpcError::Decode(e.to_string());
                let bag = BagOfCells::parse_base64(boc).map_err(decode)?;
                let root = bag.single_root().map_err(decode)?;
                let address = root.parser().load_address().map_err(decode)?;
                Ok(address)
            }
            other => Err(RpcError::Decode(format!("{}[{}] is not a cell: {:?}", self.method, index, other))),
        }
    }
}

pub fn cell_to_base64(cell: &Cell) -> Result<String, RpcError> {
    let boc = BagOfCells::from_root(cell.clone())
        .serialize(false)
        .map_err(|e| RpcError::Encode(e.to_string()))?;
    Ok(STANDARD.encode(boc))
}

/// Read side of the chain: state queries and get-methods
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TonProvider: Send + Sync {
    async fn masterchain_info(&self) -> Result<MasterchainInfo, RpcError>;

    async fn account_state(&self, address: &TonAddress) -> Result<AccountState, RpcError>;

    /// Balance in nanotons
    async fn balance(&self, address: &TonAddress) -> Result<u64, RpcError>;

    async fn run_get_method(
        &self,
        address: &TonAddress,
        method: &str,
        stack: Vec<GetMethodArg>,
    ) -> Result<GetMethodResult, RpcError>;
}

/// Outcome of handing a signed message to a submission backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub via: &'static str,
    pub msg_hash: Option<String>,
}

/// Write side: where signed external messages are submitted.
/// The public RPC and the relay are interchangeable implementations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageSender: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send_message(&self, message: &SignedMessage) -> eyre::Result<SubmitOutcome>;
}

/// Fail unless the account at `address` is active
pub async fn require_active<P>(provider: &P, address: &TonAddress, what: &str) -> Result<(), RpcError>
where
    P: TonProvider + ?Sized,
{
    let state = provider.account_state(address).await?;
    debug!(address = %address.to_base64_url(), %state, "{} account state", what);
    if !state.is_active() {
        return Err(RpcError::Inactive(what.to_string()));
    }
    Ok(())
}
