//! Get-method stack builders for unit tests

use tonlib_core::TonAddress;

use super::{cell_to_base64, GetMethodArg, GetMethodResult, MasterchainInfo, StackValue};

/// Stack entry holding an address slice
pub fn address_entry(address: &TonAddress) -> StackValue {
    let GetMethodArg::Slice(cell) = GetMethodArg::address(address).unwrap() else {
        unreachable!("address argument is always a slice");
    };
    StackValue::Cell(cell_to_base64(&cell).unwrap())
}

pub fn num_entry(value: u64) -> StackValue {
    StackValue::Num(num_bigint::BigInt::from(value))
}

pub fn stack_result(method: &str, stack: Vec<StackValue>) -> GetMethodResult {
    GetMethodResult {
        method: method.to_string(),
        stack,
    }
}

pub fn masterchain() -> MasterchainInfo {
    MasterchainInfo {
        workchain: -1,
        shard: "8000000000000000".to_string(),
        seqno: 40_000_000,
    }
}
