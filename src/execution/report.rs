use chrono::Local;

use crate::amount::format_ton;
use crate::execution::{SwapResult, TransferResult};

pub fn print_swap_report(result: &SwapResult) {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");

    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("  SWAP REPORT | {}", timestamp);
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("  DEX:            {}", result.dex);
    println!("  Wallet:         {}", result.wallet.to_base64_url());
    println!("  Pool/Router:    {}", result.pool.to_base64_url());
    println!("  Swap To:        {}", result.swap_destination.to_base64_url());
    println!();

    println!("  AMOUNTS:");
    println!("    Amount In:      {} TON", format_ton(result.quote.amount_in));
    match &result.quote.expected_out {
        Some(expected) => {
            println!("    Expected Out:   {}", expected);
            println!(
                "    Min Out:        {} ({}bps slippage)",
                result.quote.min_out, result.quote.slippage_bps
            );
        }
        None => println!("    Min Out:        {}", result.quote.min_out),
    }
    println!("    Message Value:  {} TON", format_ton(result.swap_value));
    println!("    Relay Tip:      {} TON", format_ton(result.tip));
    println!("    Total Sent:     {} TON", format_ton(result.swap_value.saturating_add(result.tip)));
    println!();

    println!("  MESSAGE:");
    println!("    Seqno:          {}", result.seqno);
    println!("    BoC (base64):");
    println!("    {}", result.boc_base64);
    println!();

    match &result.outcome {
        Some(outcome) => {
            println!("  \x1b[1;32mSUBMITTED\x1b[0m via {}", outcome.via);
            if let Some(hash) = &outcome.msg_hash {
                println!("    Msg Hash:       {}", hash);
            }
        }
        None => {
            println!("  NOT SUBMITTED (CLIENT=print)");
        }
    }

    println!();
    println!("═══════════════════════════════════════════════════════════════");
}

pub fn print_transfer_report(result: &TransferResult) {
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("  TRANSFER SENT");
    println!("═══════════════════════════════════════════════════════════════");
    println!("  From:           {}", result.wallet.to_base64_url());
    println!("  Balance:        {} TON", format_ton(result.balance));
    println!("  To:             {}", result.destination.to_base64_url());
    println!("  Amount:         {} TON", format_ton(result.amount));
    println!("  Tip:            {} TON", format_ton(result.tip));
    println!("  Seqno:          {}", result.seqno);
    println!("  Msg Body Hash:  {}", result.msg_hash.as_deref().unwrap_or("-"));
    println!("═══════════════════════════════════════════════════════════════");
}
