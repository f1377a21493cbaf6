use eyre::Result;
use tonlib_core::TonAddress;
use tracing::info;

use super::sign_and_submit;
use crate::amount::format_ton;
use crate::rpc::{MessageSender, TonProvider};
use crate::wallet::transfer::tip_transfer;
use crate::wallet::{comment_body, InternalTransfer, TransferBundle, Wallet};

#[derive(Debug, Clone)]
pub struct TransferParams {
    pub destination: TonAddress,
    pub amount: u64,
    pub tip: u64,
    pub comment: String,
    pub tip_address: TonAddress,
}

#[derive(Debug, Clone)]
pub struct TransferResult {
    pub wallet: TonAddress,
    pub balance: u64,
    pub destination: TonAddress,
    pub amount: u64,
    pub tip: u64,
    pub seqno: u32,
    pub msg_hash: Option<String>,
}

/// Plain TON transfer plus a commented tip, always submitted
pub async fn execute_transfer<P>(
    provider: &P,
    sender: &dyn MessageSender,
    wallet: &Wallet,
    params: &TransferParams,
) -> Result<TransferResult>
where
    P: TonProvider + ?Sized,
{
    let block = provider.masterchain_info().await?;
    let balance = provider.balance(wallet.address()).await?;
    info!(block = block.seqno, "wallet balance: {} TON", format_ton(balance));

    let primary = InternalTransfer::new(params.destination.clone(), params.amount)
        .with_body(comment_body(&params.comment)?);
    let tip_comment = format!("tip from {}", wallet.address().to_base64_url());
    let tip = tip_transfer(&params.tip_address, params.tip, Some(&tip_comment))?;
    let bundle = TransferBundle::new(primary, tip);

    let submission = sign_and_submit(provider, wallet, &bundle, Some(sender)).await?;
    let msg_hash = submission.outcome.and_then(|o| o.msg_hash);
    info!("tx sent, msg body hash: {}", msg_hash.as_deref().unwrap_or("<none>"));

    Ok(TransferResult {
        wallet: wallet.address().clone(),
        balance,
        destination: params.destination.clone(),
        amount: params.amount,
        tip: params.tip,
        seqno: submission.seqno,
        msg_hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RELAY_TIP_ADDRESS;
    use crate::rpc::testing::{masterchain, num_entry, stack_result};
    use crate::rpc::{AccountState, MockMessageSender, MockTonProvider, SubmitOutcome};
    use crate::wallet::tests::TEST_PHRASE;
    use crate::wallet::WalletKind;

    #[tokio::test]
    async fn test_transfer_uses_deployed_seqno() {
        let wallet = Wallet::from_phrase(WalletKind::V4R2, TEST_PHRASE).unwrap();
        let own = wallet.address().clone();

        let mut provider = MockTonProvider::new();
        provider.expect_masterchain_info().times(1).returning(|| Ok(masterchain()));
        let account = own.clone();
        provider
            .expect_balance()
            .withf(move |address| *address == account)
            .times(1)
            .returning(|_| Ok(1_500_000_000));
        provider
            .expect_account_state()
            .times(1)
            .returning(|_| Ok(AccountState::Active));
        provider
            .expect_run_get_method()
            .withf(move |address, method, stack| *address == own && method == "seqno" && stack.is_empty())
            .times(1)
            .returning(|_, method, _| Ok(stack_result(method, vec![num_entry(7)])));

        let mut sender = MockMessageSender::new();
        sender.expect_name().return_const("relay");
        sender.expect_send_message().times(1).returning(|_| {
            Ok(SubmitOutcome {
                via: "relay",
                msg_hash: Some("hash-1".to_string()),
            })
        });

        let params = TransferParams {
            destination: "UQBxilZz_2cN_Ficy91kj4v5Zy5pPHl6fkZi83xiMeGUxSzx".parse().unwrap(),
            amount: 250_000_000,
            tip: 15_000_000,
            comment: "test transfer".to_string(),
            tip_address: RELAY_TIP_ADDRESS.parse().unwrap(),
        };

        let result = execute_transfer(&provider, &sender, &wallet, &params).await.unwrap();
        assert_eq!(result.balance, 1_500_000_000);
        assert_eq!(result.seqno, 7);
        assert_eq!(result.msg_hash.as_deref(), Some("hash-1"));
    }

    #[tokio::test]
    async fn test_transfer_send_failure_propagates() {
        let wallet = Wallet::from_phrase(WalletKind::V4R2, TEST_PHRASE).unwrap();
        let mut provider = MockTonProvider::new();
        provider.expect_masterchain_info().returning(|| Ok(masterchain()));
        provider.expect_balance().returning(|_| Ok(0));
        provider.expect_account_state().returning(|_| Ok(AccountState::Uninitialized));
        provider.expect_run_get_method().times(0);

        let mut sender = MockMessageSender::new();
        sender.expect_name().return_const("relay");
        sender
            .expect_send_message()
            .times(1)
            .returning(|_| Err(eyre::eyre!("API error: insufficient tip (code: 3)")));

        let params = TransferParams {
            destination: "UQBxilZz_2cN_Ficy91kj4v5Zy5pPHl6fkZi83xiMeGUxSzx".parse().unwrap(),
            amount: 1,
            tip: 1,
            comment: "c".repeat(200),
            tip_address: RELAY_TIP_ADDRESS.parse().unwrap(),
        };

        let err = execute_transfer(&provider, &sender, &wallet, &params).await.unwrap_err();
        assert_eq!(err.to_string(), "API error: insufficient tip (code: 3)");
    }
}
