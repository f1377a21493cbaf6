use std::sync::Arc;

use eyre::Result;
use num_bigint::BigUint;
use tonlib_core::cell::{ArcCell, Cell, CellBuilder};
use tonlib_core::message::{CommonMsgInfo, InternalMessage, TonMessage, TransferMessage};
use tonlib_core::TonAddress;

/// Comment bytes inline in the body cell: 1023 bits minus the 32-bit op
const HEAD_COMMENT_BYTES: usize = 123;
/// Comment bytes in each chained continuation cell
const TAIL_COMMENT_BYTES: usize = 127;

/// One internal message carried by the wallet's external message
#[derive(Debug, Clone, PartialEq)]
pub struct InternalTransfer {
    pub destination: TonAddress,
    /// Value in nanotons
    pub value: u64,
    pub bounce: bool,
    pub body: Option<Cell>,
}

impl InternalTransfer {
    /// Bounceable transfer with an empty body
    pub fn new(destination: TonAddress, value: u64) -> Self {
        Self {
            destination,
            value,
            bounce: true,
            body: None,
        }
    }

    pub fn with_body(mut self, body: Cell) -> Self {
        self.body = Some(body);
        self
    }

    /// int_msg_info with zeroed fees and lt, which the network fills in
    pub fn to_cell(&self) -> Result<Cell> {
        let info = CommonMsgInfo::InternalMessage(InternalMessage {
            ihr_disabled: true,
            bounce: self.bounce,
            bounced: false,
            src: TonAddress::NULL,
            dest: self.destination.clone(),
            value: BigUint::from(self.value),
            ihr_fee: BigUint::from(0u32),
            fwd_fee: BigUint::from(0u32),
            created_lt: 0,
            created_at: 0,
        });

        let mut message = TransferMessage::new(info);
        if let Some(body) = &self.body {
            message.with_data(Arc::new(body.clone()));
        }
        Ok(message.build()?)
    }
}

/// Text comment body: op 0 followed by the UTF-8 text. Text that does not fit
/// the first cell continues in a chain of referenced cells.
pub fn comment_body(text: &str) -> Result<Cell> {
    let bytes = text.as_bytes();
    let (head, rest) = bytes.split_at(bytes.len().min(HEAD_COMMENT_BYTES));

    let mut tail: Option<ArcCell> = None;
    for chunk in rest.chunks(TAIL_COMMENT_BYTES).rev() {
        let mut builder = CellBuilder::new();
        builder.store_slice(chunk)?;
        if let Some(next) = &tail {
            builder.store_reference(next)?;
        }
        tail = Some(Arc::new(builder.build()?));
    }

    let mut builder = CellBuilder::new();
    builder.store_u32(32, 0)?.store_slice(head)?;
    if let Some(next) = &tail {
        builder.store_reference(next)?;
    }
    Ok(builder.build()?)
}

/// The two messages every submission carries: the payload transfer first,
/// then the relay tip
#[derive(Debug, Clone)]
pub struct TransferBundle {
    transfers: [InternalTransfer; 2],
}

impl TransferBundle {
    pub fn new(primary: InternalTransfer, tip: InternalTransfer) -> Self {
        Self {
            transfers: [primary, tip],
        }
    }

    pub fn transfers(&self) -> &[InternalTransfer] {
        &self.transfers
    }

    /// Nanotons leaving the wallet, before fees
    pub fn total_value(&self) -> u64 {
        self.transfers.iter().map(|t| t.value).sum()
    }

    pub fn to_cells(&self) -> Result<Vec<ArcCell>> {
        self.transfers
            .iter()
            .map(|t| t.to_cell().map(Arc::new))
            .collect()
    }
}

/// Tip transfer to the relay; empty body unless a comment is given
pub fn tip_transfer(tip_address: &TonAddress, value: u64, comment: Option<&str>) -> Result<InternalTransfer> {
    let transfer = InternalTransfer::new(tip_address.clone(), value);
    match comment {
        Some(text) => Ok(transfer.with_body(comment_body(text)?)),
        None => Ok(transfer),
    }
}
