//! DeDust factory, pool and native vault wrappers

use std::sync::Arc;

use eyre::{eyre, Result};
use num_bigint::BigUint;
use tonlib_core::cell::{Cell, CellBuilder};
use tonlib_core::TonAddress;
use tracing::debug;

use crate::rpc::{GetMethodArg, TonProvider};
use crate::wallet::InternalTransfer;

const OP_NATIVE_SWAP: u32 = 0xea06185d;

/// Swap kind bit: 0 = given in
const SWAP_KIND_GIVEN_IN: bool = false;

/// Pool curve, the first argument of the factory's `get_pool_address`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolType {
    Volatile = 0,
    Stable = 1,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Asset {
    Native,
    Jetton(TonAddress),
}

impl Asset {
    /// native$0000 | jetton$0001 workchain:int8 address:uint256
    pub fn store(&self, builder: &mut CellBuilder) -> Result<()> {
        match self {
            Asset::Native => {
                builder.store_u8(4, 0b0000)?;
            }
            Asset::Jetton(master) => {
                builder
                    .store_u8(4, 0b0001)?
                    .store_u8(8, master.workchain as i8 as u8)?
                    .store_slice(&master.hash_part)?;
            }
        }
        Ok(())
    }

    pub fn to_cell(&self) -> Result<Cell> {
        let mut builder = CellBuilder::new();
        self.store(&mut builder)?;
        Ok(builder.build()?)
    }

    fn to_arg(&self) -> Result<GetMethodArg> {
        Ok(GetMethodArg::Slice(self.to_cell()?))
    }
}

impl std::fmt::Display for PoolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolType::Volatile => write!(f, "volatile"),
            PoolType::Stable => write!(f, "stable"),
        }
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Asset::Native => write!(f, "TON"),
            Asset::Jetton(master) => write!(f, "jetton {}", master.to_base64_url()),
        }
    }
}

pub struct Factory {
    pub address: TonAddress,
}

impl Factory {
    pub fn new(address: TonAddress) -> Self {
        Self { address }
    }

    pub async fn vault_address<P>(&self, provider: &P, asset: &Asset) -> Result<TonAddress>
    where
        P: TonProvider + ?Sized,
    {
        let result = provider
            .run_get_method(&self.address, "get_vault_address", vec![asset.to_arg()?])
            .await?;
        let address = result.address(0)?;
        debug!(%asset, vault = %address.to_base64_url(), "resolved vault");
        Ok(address)
    }

    pub async fn pool_address<P>(
        &self,
        provider: &P,
        pool_type: PoolType,
        assets: [&Asset; 2],
    ) -> Result<TonAddress>
    where
        P: TonProvider + ?Sized,
    {
        let stack = vec![
            GetMethodArg::Num(BigUint::from(pool_type as u32)),
            assets[0].to_arg()?,
            assets[1].to_arg()?,
        ];
        let result = provider
            .run_get_method(&self.address, "get_pool_address", stack)
            .await?;
        let address = result.address(0)?;
        debug!(%pool_type, pool = %address.to_base64_url(), "resolved pool");
        Ok(address)
    }
}

/// Output of the pool's `estimate_swap_out` get-method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapEstimate {
    pub amount_out: BigUint,
    pub trade_fee: BigUint,
}

pub struct Pool {
    pub address: TonAddress,
}

impl Pool {
    pub fn new(address: TonAddress) -> Self {
        Self { address }
    }

    /// Stack returns (asset_out, amount_out, trade_fee)
    pub async fn estimate_swap_out<P>(
        &self,
        provider: &P,
        asset_in: &Asset,
        amount_in: u64,
    ) -> Result<SwapEstimate>
    where
        P: TonProvider + ?Sized,
    {
        let stack = vec![asset_in.to_arg()?, GetMethodArg::Num(BigUint::from(amount_in))];
        let result = provider
            .run_get_method(&self.address, "estimate_swap_out", stack)
            .await?;
        Ok(SwapEstimate {
            amount_out: result.unsigned(1)?,
            trade_fee: result.unsigned(2)?,
        })
    }
}

pub struct VaultNative {
    pub address: TonAddress,
}

impl VaultNative {
    pub fn new(address: TonAddress) -> Self {
        Self { address }
    }

    /// swap#ea06185d with an empty next step and default swap params
    pub fn swap_body(&self, query_id: u64, pool: &TonAddress, amount: u64, limit: &BigUint) -> Result<Cell> {
        let params = swap_params()?;

        let mut builder = CellBuilder::new();
        builder
            .store_u32(32, OP_NATIVE_SWAP)?
            .store_u64(64, query_id)?
            .store_coins(&BigUint::from(amount))?
            .store_address(pool)?
            .store_bit(SWAP_KIND_GIVEN_IN)?
            .store_coins(limit)?
            .store_bit(false)?; // no next step
        builder.store_reference(&Arc::new(params))?;
        Ok(builder.build()?)
    }

    /// Transfer to the vault carrying `amount` plus the swap gas
    pub fn swap_transfer(&self, pool: &TonAddress, amount: u64, limit: &BigUint, gas: u64) -> Result<InternalTransfer> {
        let value = amount
            .checked_add(gas)
            .ok_or_else(|| eyre!("swap value overflows: {} + {}", amount, gas))?;
        let body = self.swap_body(0, pool, amount, limit)?;
        Ok(InternalTransfer::new(self.address.clone(), value).with_body(body))
    }
}

/// deadline 0, recipient and referral none, no fulfil or reject payloads
fn swap_params() -> Result<Cell> {
    let mut builder = CellBuilder::new();
    builder
        .store_u32(32, 0)?
        .store_u8(2, 0)? // recipient: addr_none
        .store_u8(2, 0)? // referral: addr_none
        .store_bit(false)?
        .store_bit(false)?;
    Ok(builder.build()?)
}
