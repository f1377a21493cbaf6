use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::{eyre, Result};
use num_bigint::BigUint;
use tonlib_core::TonAddress;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod amount;
mod config;
mod dex;
mod errors;
mod execution;
mod relay;
mod rpc;
mod wallet;

use amount::{format_ton, parse_ton, DEFAULT_SLIPPAGE_BPS};
use config::{ClientMode, SwapEnv, RELAY_TIMEOUT, RPC_TIMEOUT};
use dex::dedust::{Factory, PoolType};
use dex::stonfi::Router;
use errors::{ConfigError, RelayError};
use execution::{
    execute_dedust_swap, execute_stonfi_swap, execute_transfer, print_swap_report, print_transfer_report,
    DedustSwapParams, PoolSelector, StonfiSwapParams, TransferParams,
};
use relay::RelayClient;
use rpc::{MessageSender, ToncenterClient};
use wallet::{read_phrase_file, Wallet, WalletKind};

#[derive(Parser)]
#[command(name = "ton-swap")]
#[command(about = "TON DEX swaps and transfers with bloXroute relay submission", long_about = None)]
struct Cli {
    /// Log level or filter directive (overrides RUST_LOG), e.g. debug
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value = "false")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Swap TON for a jetton on DeDust (env: MNEMONIC, AUTH_KEY, BX_TIP_ADDR, CLIENT)
    DedustSwap {
        /// Pool address; defaults to the TON/DOGS pool
        #[arg(long, default_value = config::DEDUST_DEFAULT_POOL, conflicts_with = "jetton")]
        pool: String,

        /// Look up the TON/<jetton> volatile pool through the factory instead
        #[arg(long)]
        jetton: Option<String>,

        /// Look up the stable pool instead of the volatile one
        #[arg(long, requires = "jetton")]
        stable: bool,

        /// TON to swap
        #[arg(long, default_value = config::DEDUST_DEFAULT_AMOUNT)]
        amount: String,

        /// Relay tip in TON
        #[arg(long, default_value = config::DEDUST_DEFAULT_TIP)]
        tip: String,

        /// Gas attached to the vault message in TON
        #[arg(long, default_value = config::DEDUST_SWAP_GAS)]
        gas: String,

        /// Slippage tolerance in bps (e.g., 100 = 1%)
        #[arg(long, default_value_t = DEFAULT_SLIPPAGE_BPS)]
        slippage: u32,

        /// Wallet contract version
        #[arg(long, value_enum, default_value = "v4r2")]
        wallet: WalletKind,

        /// Relay endpoint used when CLIENT=relay
        #[arg(long, default_value = config::RELAY_ENDPOINT)]
        relay_uri: String,

        /// Public JSON-RPC endpoint
        #[arg(long, default_value = config::TONCENTER_RPC)]
        rpc_uri: String,
    },

    /// Swap TON for a jetton on STON.fi v1 (env: MNEMONIC, WALLET_ADDR, BX_TIP_ADDR)
    StonfiSwap {
        /// Jetton master to receive; defaults to STON
        #[arg(long, default_value = config::STONFI_DEFAULT_ASK_JETTON)]
        ask_jetton: String,

        /// TON to offer
        #[arg(long, default_value = config::STONFI_DEFAULT_AMOUNT)]
        amount: String,

        /// Minimum jetton units to receive
        #[arg(long, default_value = config::STONFI_DEFAULT_MIN_ASK)]
        min_ask: String,

        /// Relay tip in TON
        #[arg(long, default_value = config::STONFI_DEFAULT_TIP)]
        tip: String,

        #[arg(long, default_value_t = config::STONFI_DEFAULT_QUERY_ID)]
        query_id: u64,

        /// Wallet contract version
        #[arg(long, value_enum, default_value = "v4r2")]
        wallet: WalletKind,

        /// Relay endpoint used when CLIENT=relay
        #[arg(long, default_value = config::RELAY_ENDPOINT)]
        relay_uri: String,

        /// Public JSON-RPC endpoint
        #[arg(long, default_value = config::TONCENTER_RPC)]
        rpc_uri: String,
    },

    /// Send TON with a relay tip through the TON Trader API
    Transfer {
        /// Transaction destination address
        #[arg(long = "destination-address", visible_alias = "destination")]
        destination: String,

        /// Amount in TON
        #[arg(long, default_value = config::TRANSFER_DEFAULT_AMOUNT)]
        amount: String,

        /// Relay tip in TON
        #[arg(long, default_value = config::TRANSFER_DEFAULT_TIP)]
        tip: String,

        /// Transfer comment
        #[arg(long)]
        comment: Option<String>,

        /// bloXroute auth header
        #[arg(long)]
        auth_header: String,

        /// TON Trader API endpoint
        #[arg(long, default_value = config::RELAY_TRANSFER_ENDPOINT)]
        uri: String,

        /// File with the seed phrase for the sending wallet
        #[arg(long)]
        from_wallet: PathBuf,

        /// Wallet contract version
        #[arg(long, value_enum, default_value = "v4r2")]
        wallet: WalletKind,

        /// Public JSON-RPC endpoint
        #[arg(long, default_value = config::TONCENTER_RPC)]
        rpc_uri: String,
    },
}

fn parse_address(raw: &str, what: &str) -> Result<TonAddress> {
    raw.parse()
        .map_err(|e| eyre!("Invalid {} address {:?}: {}", what, raw, e))
}

/// Pick the submission backend for the configured CLIENT mode
fn build_sender(
    env: &SwapEnv,
    kind: WalletKind,
    relay_uri: &str,
    provider: &ToncenterClient,
) -> Result<Option<Box<dyn MessageSender>>> {
    match env.client {
        ClientMode::Relay => {
            if kind.relay_name().is_none() {
                return Err(RelayError::UnsupportedWallet.into());
            }
            let auth_key = env
                .auth_key
                .as_deref()
                .ok_or(ConfigError::MissingEnv("AUTH_KEY"))?;
            Ok(Some(Box::new(RelayClient::new(relay_uri, auth_key, kind, RELAY_TIMEOUT)?)))
        }
        ClientMode::Direct => Ok(Some(Box::new(provider.clone()))),
        ClientMode::PrintOnly => Ok(None),
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_dedust_swap(
    pool: String,
    jetton: Option<String>,
    stable: bool,
    amount: String,
    tip: String,
    gas: String,
    slippage: u32,
    kind: WalletKind,
    relay_uri: String,
    rpc_uri: String,
) -> Result<()> {
    let env = SwapEnv::dedust_from_env()?;
    env.log_config();

    let params = DedustSwapParams {
        pool: match &jetton {
            Some(jetton) => PoolSelector::Lookup {
                jetton: parse_address(jetton, "jetton")?,
                pool_type: if stable { PoolType::Stable } else { PoolType::Volatile },
            },
            None => PoolSelector::Address(parse_address(&pool, "pool")?),
        },
        amount_in: parse_ton(&amount)?,
        tip: parse_ton(&tip)?,
        gas: parse_ton(&gas)?,
        slippage_bps: slippage,
    };
    let tip_address = parse_address(&env.tip_address, "BX_TIP_ADDR")?;
    info!(
        amount = %format_ton(params.amount_in),
        tip = %format_ton(params.tip),
        gas = %format_ton(params.gas),
        slippage_bps = params.slippage_bps,
        wallet = %kind,
        rpc = %rpc_uri,
        "dedust swap arguments"
    );

    let provider = ToncenterClient::new(&rpc_uri, env.toncenter_api_key.clone(), RPC_TIMEOUT)?;
    let sender = build_sender(&env, kind, &relay_uri, &provider)?;

    let wallet = Wallet::from_phrase(kind, &env.mnemonic)?;
    println!("Wallet: {}", wallet.address().to_base64_url());
    let factory = Factory::new(parse_address(config::DEDUST_FACTORY, "factory")?);

    println!("\n══════════════════════════════════════════════════════════════");
    println!("  DEDUST SWAP | CLIENT={}", env.client);
    println!("══════════════════════════════════════════════════════════════");

    let result = execute_dedust_swap(&provider, sender.as_deref(), &wallet, &factory, &tip_address, &params).await?;
    print_swap_report(&result);

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_stonfi_swap(
    ask_jetton: String,
    amount: String,
    min_ask: String,
    tip: String,
    query_id: u64,
    kind: WalletKind,
    relay_uri: String,
    rpc_uri: String,
) -> Result<()> {
    let env = SwapEnv::stonfi_from_env()?;
    env.log_config();

    let expected_wallet = match env.wallet_address.as_deref() {
        Some(raw) => parse_address(raw, "WALLET_ADDR")?,
        None => return Err(ConfigError::MissingEnv("WALLET_ADDR").into()),
    };
    let tip_address = parse_address(&env.tip_address, "BX_TIP_ADDR")?;
    let params = StonfiSwapParams {
        ask_jetton: parse_address(&ask_jetton, "ask jetton")?,
        offer_amount: parse_ton(&amount)?,
        min_ask_amount: min_ask
            .trim()
            .parse::<BigUint>()
            .map_err(|e| eyre!("Invalid min ask amount {:?}: {}", min_ask, e))?,
        query_id,
        tip: parse_ton(&tip)?,
    };
    info!(
        amount = %format_ton(params.offer_amount),
        min_ask = %params.min_ask_amount,
        tip = %format_ton(params.tip),
        query_id,
        wallet = %kind,
        rpc = %rpc_uri,
        "stonfi swap arguments"
    );

    let provider = ToncenterClient::new(&rpc_uri, env.toncenter_api_key.clone(), RPC_TIMEOUT)?;
    let sender = build_sender(&env, kind, &relay_uri, &provider)?;

    let wallet = Wallet::from_phrase(kind, &env.mnemonic)?;
    println!("Wallet: {}", wallet.address().to_base64_url());
    let router = Router::v1()?;

    println!("\n══════════════════════════════════════════════════════════════");
    println!("  STON.FI SWAP | CLIENT={}", env.client);
    println!("══════════════════════════════════════════════════════════════");

    let result = execute_stonfi_swap(
        &provider,
        sender.as_deref(),
        &wallet,
        &expected_wallet,
        &router,
        &tip_address,
        &params,
    )
    .await?;
    print_swap_report(&result);

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_transfer(
    destination: String,
    amount: String,
    tip: String,
    comment: Option<String>,
    auth_header: String,
    uri: String,
    from_wallet: PathBuf,
    kind: WalletKind,
    rpc_uri: String,
) -> Result<()> {
    let comment = comment.unwrap_or_else(|| {
        format!(
            "TON trader API test, {}",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f")
        )
    });
    info!("amount = {}", amount);
    info!("auth-header = <redacted>");
    info!("comment = {}", comment);
    info!("destination-address = {}", destination);
    info!("uri = {}", uri);
    info!("from-wallet = {}", from_wallet.display());
    info!("tip = {}", tip);
    info!("rpc-uri = {}", rpc_uri);

    let params = TransferParams {
        destination: parse_address(&destination, "destination")?,
        amount: parse_ton(&amount)?,
        tip: parse_ton(&tip)?,
        comment,
        tip_address: parse_address(config::RELAY_TIP_ADDRESS, "tip")?,
    };

    let phrase = read_phrase_file(&from_wallet)?;
    let wallet = Wallet::from_phrase(kind, &phrase)?;
    info!("wallet address: {}", wallet.address().to_base64_url());

    let api_key = std::env::var("TONCENTER_API_KEY").ok().filter(|k| !k.is_empty());
    let provider = ToncenterClient::new(&rpc_uri, api_key, RPC_TIMEOUT)?;
    let relay = RelayClient::new(&uri, &auth_header, kind, RELAY_TIMEOUT)?;

    let result = execute_transfer(&provider, &relay, &wallet, &params).await?;
    print_transfer_report(&result);

    Ok(())
}

fn init_tracing(log_level: Option<&str>, json: bool) -> Result<()> {
    let filter = match log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let builder = FmtSubscriber::builder().with_env_filter(filter);
    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref(), cli.log_json)?;

    match cli.command {
        Commands::DedustSwap { pool, jetton, stable, amount, tip, gas, slippage, wallet, relay_uri, rpc_uri } => {
            run_dedust_swap(pool, jetton, stable, amount, tip, gas, slippage, wallet, relay_uri, rpc_uri).await
        }
        Commands::StonfiSwap { ask_jetton, amount, min_ask, tip, query_id, wallet, relay_uri, rpc_uri } => {
            run_stonfi_swap(ask_jetton, amount, min_ask, tip, query_id, wallet, relay_uri, rpc_uri).await
        }
        Commands::Transfer { destination, amount, tip, comment, auth_header, uri, from_wallet, wallet, rpc_uri } => {
            run_transfer(destination, amount, tip, comment, auth_header, uri, from_wallet, wallet, rpc_uri).await
        }
    }
}
