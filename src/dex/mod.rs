pub mod dedust;
pub mod stonfi;

use eyre::Result;
use num_bigint::BigUint;

use crate::amount::min_out_with_slippage;

/// Enum representing supported DEXes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dex {
    DeDust,
    StonFiV1,
}

impl std::fmt::Display for Dex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dex::DeDust => write!(f, "DeDust"),
            Dex::StonFiV1 => write!(f, "STON.fi v1"),
        }
    }
}

/// Expected output of a swap and the floor accepted on-chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapQuote {
    pub amount_in: u64,
    /// Pool estimate; None when the floor comes from the caller
    pub expected_out: Option<BigUint>,
    pub min_out: BigUint,
    pub slippage_bps: u32,
}

impl SwapQuote {
    pub fn new(amount_in: u64, expected_out: BigUint, slippage_bps: u32) -> Result<Self> {
        let min_out = min_out_with_slippage(&expected_out, slippage_bps)?;
        Ok(Self {
            amount_in,
            expected_out: Some(expected_out),
            min_out,
            slippage_bps,
        })
    }

    /// Caller supplied floor with no on-chain estimate behind it
    pub fn fixed(amount_in: u64, min_out: BigUint) -> Self {
        Self {
            amount_in,
            expected_out: None,
            min_out,
            slippage_bps: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_default_slippage() {
        let quote = SwapQuote::new(1_000_000, BigUint::from(12_345u32), 100).unwrap();
        assert_eq!(quote.min_out, BigUint::from(12_221u32));
        assert_eq!(quote.expected_out, Some(BigUint::from(12_345u32)));
    }

    #[test]
    fn test_fixed_quote() {
        let quote = SwapQuote::fixed(6_000_000, BigUint::from(3_000_000u32));
        assert_eq!(quote.min_out, BigUint::from(3_000_000u32));
        assert_eq!(quote.expected_out, None);
        assert_eq!(quote.slippage_bps, 0);
    }
}
