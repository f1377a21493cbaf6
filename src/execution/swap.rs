use eyre::{eyre, Result};
use num_bigint::BigUint;
use tonlib_core::TonAddress;
use tracing::info;

use super::sign_and_submit;
use crate::amount::format_ton;
use crate::dex::dedust::{Asset, Factory, Pool, PoolType, VaultNative};
use crate::dex::stonfi::{Router, SwapTonToJettonParams};
use crate::dex::{Dex, SwapQuote};
use crate::rpc::{require_active, MessageSender, SubmitOutcome, TonProvider};
use crate::wallet::transfer::tip_transfer;
use crate::wallet::{TransferBundle, Wallet};

/// How the DeDust pool is found
#[derive(Debug, Clone)]
pub enum PoolSelector {
    Address(TonAddress),
    /// Factory lookup of the TON/jetton pool
    Lookup { jetton: TonAddress, pool_type: PoolType },
}

#[derive(Debug, Clone)]
pub struct DedustSwapParams {
    pub pool: PoolSelector,
    pub amount_in: u64,
    pub tip: u64,
    pub gas: u64,
    pub slippage_bps: u32,
}

#[derive(Debug, Clone)]
pub struct StonfiSwapParams {
    pub ask_jetton: TonAddress,
    pub offer_amount: u64,
    pub min_ask_amount: BigUint,
    pub query_id: u64,
    pub tip: u64,
}

#[derive(Debug, Clone)]
pub struct SwapResult {
    pub dex: Dex,
    pub wallet: TonAddress,
    /// DeDust pool or STON.fi router
    pub pool: TonAddress,
    /// Where the swap message goes: native vault or router's pTON wallet
    pub swap_destination: TonAddress,
    pub quote: SwapQuote,
    pub swap_value: u64,
    pub tip: u64,
    pub seqno: u32,
    pub boc_base64: String,
    pub outcome: Option<SubmitOutcome>,
}

/// TON -> jetton swap through a DeDust native vault, tipping the relay
pub async fn execute_dedust_swap<P>(
    provider: &P,
    sender: Option<&dyn MessageSender>,
    wallet: &Wallet,
    factory: &Factory,
    tip_address: &TonAddress,
    params: &DedustSwapParams,
) -> Result<SwapResult>
where
    P: TonProvider + ?Sized,
{
    let pool_address = match &params.pool {
        PoolSelector::Address(address) => address.clone(),
        PoolSelector::Lookup { jetton, pool_type } => {
            factory
                .pool_address(provider, *pool_type, [&Asset::Native, &Asset::Jetton(jetton.clone())])
                .await?
        }
    };
    info!("pool address = {}", pool_address.to_base64_url());

    let vault = VaultNative::new(factory.vault_address(provider, &Asset::Native).await?);
    info!("native vault address = {}", vault.address.to_base64_url());

    let block = provider.masterchain_info().await?;
    info!(
        "master chain info: w = {} sh = {} seq = {}",
        block.workchain, block.shard, block.seqno
    );

    require_active(provider, &pool_address, "Pool").await?;
    require_active(provider, &vault.address, "Native Vault").await?;

    let pool = Pool::new(pool_address);
    let estimate = pool
        .estimate_swap_out(provider, &Asset::Native, params.amount_in)
        .await?;
    let quote = SwapQuote::new(params.amount_in, estimate.amount_out.clone(), params.slippage_bps)?;
    info!(
        expected_out = %estimate.amount_out,
        trade_fee = %estimate.trade_fee,
        "min amount out = {}",
        quote.min_out
    );

    let swap = vault.swap_transfer(&pool.address, params.amount_in, &quote.min_out, params.gas)?;
    let swap_value = swap.value;
    let bundle = TransferBundle::new(swap, tip_transfer(tip_address, params.tip, None)?);

    let submission = sign_and_submit(provider, wallet, &bundle, sender).await?;

    Ok(SwapResult {
        dex: Dex::DeDust,
        wallet: wallet.address().clone(),
        pool: pool.address,
        swap_destination: vault.address,
        quote,
        swap_value,
        tip: params.tip,
        seqno: submission.seqno,
        boc_base64: submission.signed.to_base64(),
        outcome: submission.outcome,
    })
}

/// TON -> jetton swap through the STON.fi v1 router, tipping the relay.
/// `expected_wallet` must be the address derived from the signing keys.
pub async fn execute_stonfi_swap<P>(
    provider: &P,
    sender: Option<&dyn MessageSender>,
    wallet: &Wallet,
    expected_wallet: &TonAddress,
    router: &Router,
    tip_address: &TonAddress,
    params: &StonfiSwapParams,
) -> Result<SwapResult>
where
    P: TonProvider + ?Sized,
{
    if wallet.address() != expected_wallet {
        return Err(eyre!(
            "WALLET_ADDR {} does not match the {} wallet derived from MNEMONIC ({})",
            expected_wallet.to_base64_url(),
            wallet.kind(),
            wallet.address().to_base64_url()
        ));
    }

    let tx = router
        .swap_ton_to_jetton_tx(
            provider,
            &SwapTonToJettonParams {
                user_wallet: expected_wallet.clone(),
                offer_amount: params.offer_amount,
                ask_jetton: params.ask_jetton.clone(),
                min_ask_amount: params.min_ask_amount.clone(),
                query_id: params.query_id,
                referral: None,
                forward_gas: None,
            },
        )
        .await?;
    info!(
        to = %tx.destination.to_base64_url(),
        value = %format_ton(tx.value),
        "swap tx params"
    );

    let quote = SwapQuote::fixed(params.offer_amount, params.min_ask_amount.clone());
    let swap_destination = tx.destination.clone();
    let swap_value = tx.value;
    let bundle = TransferBundle::new(tx, tip_transfer(tip_address, params.tip, None)?);

    let submission = sign_and_submit(provider, wallet, &bundle, sender).await?;

    Ok(SwapResult {
        dex: Dex::StonFiV1,
        wallet: wallet.address().clone(),
        pool: router.address.clone(),
        swap_destination,
        quote,
        swap_value,
        tip: params.tip,
        seqno: submission.seqno,
        boc_base64: submission.signed.to_base64(),
        outcome: submission.outcome,
    })
}
