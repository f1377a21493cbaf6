//! STON.fi v1 router: TON to jetton swaps through proxy-TON

use std::sync::Arc;

use eyre::Result;
use num_bigint::BigUint;
use tonlib_core::cell::{Cell, CellBuilder, EitherCellLayout};
use tonlib_core::message::{HasOpcode, JettonTransferMessage, TonMessage, WithForwardPayload};
use tonlib_core::TonAddress;
use tracing::debug;

use crate::config::{STONFI_PROXY_TON, STONFI_ROUTER, STONFI_TON_TO_JETTON_FORWARD_GAS};
use crate::rpc::{GetMethodArg, TonProvider};
use crate::wallet::InternalTransfer;

const OP_SWAP: u32 = 0x25938561;

#[derive(Debug, Clone)]
pub struct SwapTonToJettonParams {
    pub user_wallet: TonAddress,
    /// TON offered, in nanotons
    pub offer_amount: u64,
    pub ask_jetton: TonAddress,
    pub min_ask_amount: BigUint,
    pub query_id: u64,
    pub referral: Option<TonAddress>,
    /// Forward gas override; defaults to 0.215 TON
    pub forward_gas: Option<u64>,
}

pub struct Router {
    pub address: TonAddress,
    pub proxy_ton: TonAddress,
}

impl Router {
    pub fn new(address: TonAddress, proxy_ton: TonAddress) -> Self {
        Self { address, proxy_ton }
    }

    /// Mainnet v1 router with its proxy-TON
    pub fn v1() -> Result<Self> {
        Ok(Self::new(STONFI_ROUTER.parse()?, STONFI_PROXY_TON.parse()?))
    }

    /// Jetton wallet of `owner` for the given jetton master
    pub async fn jetton_wallet<P>(&self, provider: &P, jetton_master: &TonAddress, owner: &TonAddress) -> Result<TonAddress>
    where
        P: TonProvider + ?Sized,
    {
        let result = provider
            .run_get_method(jetton_master, "get_wallet_address", vec![GetMethodArg::address(owner)?])
            .await?;
        Ok(result.address(0)?)
    }

    /// pTON transfer to the router's proxy-TON wallet, forwarding a swap request
    pub async fn swap_ton_to_jetton_tx<P>(&self, provider: &P, params: &SwapTonToJettonParams) -> Result<InternalTransfer>
    where
        P: TonProvider + ?Sized,
    {
        let proxy_ton_wallet = self.jetton_wallet(provider, &self.proxy_ton, &self.address).await?;
        let ask_jetton_wallet = self.jetton_wallet(provider, &params.ask_jetton, &self.address).await?;

        debug!(
            proxy_ton_wallet = %proxy_ton_wallet.to_base64_url(),
            ask_jetton_wallet = %ask_jetton_wallet.to_base64_url(),
            "router wallets resolved"
        );

        let forward_gas = params.forward_gas.unwrap_or(STONFI_TON_TO_JETTON_FORWARD_GAS);
        let payload = swap_payload(
            &ask_jetton_wallet,
            &params.min_ask_amount,
            &params.user_wallet,
            params.referral.as_ref(),
        )?;
        let body = jetton_transfer_body(
            params.query_id,
            params.offer_amount,
            &self.address,
            &params.user_wallet,
            forward_gas,
            payload,
        )?;

        let value = params
            .offer_amount
            .checked_add(forward_gas)
            .ok_or_else(|| eyre::eyre!("swap value overflows: {} + {}", params.offer_amount, forward_gas))?;

        Ok(InternalTransfer::new(proxy_ton_wallet, value).with_body(body))
    }
}

/// swap#25938561 ask_wallet min_ask recipient referral?
pub fn swap_payload(
    ask_jetton_wallet: &TonAddress,
    min_ask_amount: &BigUint,
    recipient: &TonAddress,
    referral: Option<&TonAddress>,
) -> Result<Cell> {
    let mut builder = CellBuilder::new();
    builder
        .store_u32(32, OP_SWAP)?
        .store_address(ask_jetton_wallet)?
        .store_coins(min_ask_amount)?
        .store_address(recipient)?;
    match referral {
        Some(referral) => {
            builder.store_bit(true)?.store_address(referral)?;
        }
        None => {
            builder.store_bit(false)?;
        }
    }
    Ok(builder.build()?)
}

/// TEP-74 transfer with the forward payload in a reference
pub fn jetton_transfer_body(
    query_id: u64,
    amount: u64,
    destination: &TonAddress,
    response_destination: &TonAddress,
    forward_ton_amount: u64,
    forward_payload: Cell,
) -> Result<Cell> {
    let mut message = JettonTransferMessage::new(destination, &BigUint::from(amount));
    message
        .with_query_id(query_id)
        .with_response_destination(response_destination)
        .set_either_cell_layout(EitherCellLayout::ToRef)
        .with_forward_payload(BigUint::from(forward_ton_amount), Arc::new(forward_payload));
    Ok(message.build()?)
}
