//! TON amount conversions and slippage math

use eyre::{eyre, Result};
use num_bigint::BigUint;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

pub const NANOS_PER_TON: u64 = 1_000_000_000;
const TON_DECIMALS: u32 = 9;

/// Default slippage tolerance in bps (100 = 1%)
pub const DEFAULT_SLIPPAGE_BPS: u32 = 100;
const BPS_DENOMINATOR: u32 = 10_000;

/// Parse a human TON amount ("0.001") into nanotons
pub fn parse_ton(value: &str) -> Result<u64> {
    let trimmed = value.trim();
    let amount = Decimal::from_str(trimmed)
        .map_err(|e| eyre!("Invalid TON amount {:?}: {}", value, e))?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(eyre!("TON amount must not be negative: {}", value));
    }
    if amount.scale() > TON_DECIMALS {
        return Err(eyre!("TON amount has more than {} decimals: {}", TON_DECIMALS, value));
    }

    amount
        .checked_mul(Decimal::from(NANOS_PER_TON))
        .and_then(|nanos| nanos.to_u64())
        .ok_or_else(|| eyre!("TON amount out of range: {}", value))
}

/// Format nanotons as a human TON amount without trailing zeros
pub fn format_ton(nanos: u64) -> String {
    let whole = nanos / NANOS_PER_TON;
    let frac = nanos % NANOS_PER_TON;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:09}", frac);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Minimum acceptable output after applying a slippage tolerance.
///
/// floor(expected * (10000 - bps) / 10000); at 100 bps this is
/// floor(expected * 99 / 100).
pub fn min_out_with_slippage(expected: &BigUint, slippage_bps: u32) -> Result<BigUint> {
    if slippage_bps > BPS_DENOMINATOR {
        return Err(eyre!("Slippage {} bps exceeds 100%", slippage_bps));
    }
    Ok(expected * (BPS_DENOMINATOR - slippage_bps) / BPS_DENOMINATOR)
}
