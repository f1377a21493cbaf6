pub mod report;
pub mod swap;
pub mod transfer;

pub use report::{print_swap_report, print_transfer_report};
pub use swap::{execute_dedust_swap, execute_stonfi_swap, DedustSwapParams, PoolSelector, StonfiSwapParams, SwapResult};
pub use transfer::{execute_transfer, TransferParams, TransferResult};

use chrono::Utc;
use eyre::{eyre, Result};
use tracing::info;

use crate::amount::format_ton;
use crate::config::MESSAGE_TTL_SECS;
use crate::rpc::{MessageSender, SubmitOutcome, TonProvider};
use crate::wallet::{SignedMessage, TransferBundle, Wallet};

/// A signed bundle and, unless running print-only, the submission result
#[derive(Debug, Clone)]
pub struct Submission {
    pub seqno: u32,
    pub signed: SignedMessage,
    pub outcome: Option<SubmitOutcome>,
}

/// Fetch seqno, sign with a short expiry and hand the message to the sender
pub(crate) async fn sign_and_submit<P>(
    provider: &P,
    wallet: &Wallet,
    bundle: &TransferBundle,
    sender: Option<&dyn MessageSender>,
) -> Result<Submission>
where
    P: TonProvider + ?Sized,
{
    let (seqno, with_state_init) = wallet.seqno(provider).await?;
    let expire_at = u32::try_from(Utc::now().timestamp() + MESSAGE_TTL_SECS)
        .map_err(|_| eyre!("message expiry does not fit in u32"))?;

    let signed = wallet.sign(bundle, seqno, expire_at, with_state_init)?;
    info!(
        seqno,
        expire_at,
        messages = bundle.transfers().len(),
        total = %format_ton(bundle.total_value()),
        with_state_init,
        boc_bytes = signed.boc().len(),
        "signed external message"
    );

    let outcome = match sender {
        Some(sender) => {
            info!("submitting via {}", sender.name());
            Some(sender.send_message(&signed).await?)
        }
        None => None,
    };

    Ok(Submission {
        seqno,
        signed,
        outcome,
    })
}
