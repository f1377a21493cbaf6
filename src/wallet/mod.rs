//! Wallet keys, addresses and message signing

pub mod transfer;

pub use transfer::{comment_body, InternalTransfer, TransferBundle};

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use eyre::{eyre, Result};
use tonlib_core::cell::BagOfCells;
use tonlib_core::mnemonic::{KeyPair, Mnemonic};
use tonlib_core::wallet::{TonWallet, WalletVersion};
use tonlib_core::TonAddress;
use tracing::debug;

use crate::config::SEED_PHRASE_WORDS;
use crate::rpc::TonProvider;

/// Wallet contract flavours known to the CLI and the relay.
///
/// Only V4R2 can be signed: the SDK writes a seqno-style body and attaches
/// V4R2 code as state-init, which would not match any other contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum WalletKind {
    #[value(name = "v3r2")]
    V3R2,
    #[value(name = "v4r2")]
    V4R2,
    #[value(name = "highload-v2r2")]
    HighloadV2R2,
}

impl WalletKind {
    pub fn version(self) -> WalletVersion {
        match self {
            WalletKind::V3R2 => WalletVersion::V3R2,
            WalletKind::V4R2 => WalletVersion::V4R2,
            WalletKind::HighloadV2R2 => WalletVersion::HighloadV2R2,
        }
    }

    /// Wallet type name accepted by the relay, None when the relay refuses it
    pub fn relay_name(self) -> Option<&'static str> {
        match self {
            WalletKind::V3R2 => None,
            WalletKind::V4R2 => Some("V4R2"),
            WalletKind::HighloadV2R2 => Some("HighloadV2R2"),
        }
    }

    pub fn can_sign(self) -> bool {
        matches!(self, WalletKind::V4R2)
    }
}

impl std::fmt::Display for WalletKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletKind::V3R2 => write!(f, "V3R2"),
            WalletKind::V4R2 => write!(f, "V4R2"),
            WalletKind::HighloadV2R2 => write!(f, "HighloadV2R2"),
        }
    }
}

/// Derive the key pair from a space separated seed phrase
pub fn keys_from_phrase(phrase: &str) -> Result<KeyPair> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.is_empty() {
        return Err(eyre!("Seed phrase is empty"));
    }
    let mnemonic = Mnemonic::new(words, &None)?;
    Ok(mnemonic.to_key_pair()?)
}

/// Read a seed phrase file, which must hold exactly 24 words
pub fn read_phrase_file(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| eyre!("failed to read phrase from '{}', {}", path.display(), e))?;
    let words: Vec<&str> = raw.split_whitespace().collect();
    if words.len() != SEED_PHRASE_WORDS {
        return Err(eyre!("invalid phrase, length {}", words.len()));
    }
    Ok(words.join(" "))
}

/// A signed external message, serialized as a bag of cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    boc: Vec<u8>,
}

impl SignedMessage {
    pub fn new(boc: Vec<u8>) -> Self {
        Self { boc }
    }

    pub fn boc(&self) -> &[u8] {
        &self.boc
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.boc)
    }
}

/// Wallet contract in workchain 0 controlled by a key pair
pub struct Wallet {
    inner: TonWallet,
    kind: WalletKind,
}

impl Wallet {
    pub fn derive(kind: WalletKind, key_pair: &KeyPair) -> Result<Self> {
        if !kind.can_sign() {
            return Err(eyre!("{} wallets cannot be signed by this client, use v4r2", kind));
        }
        let inner = TonWallet::derive_default(kind.version(), key_pair)?;
        Ok(Self { inner, kind })
    }

    pub fn from_phrase(kind: WalletKind, phrase: &str) -> Result<Self> {
        let key_pair = keys_from_phrase(phrase)?;
        Self::derive(kind, &key_pair)
    }

    pub fn address(&self) -> &TonAddress {
        &self.inner.address
    }

    pub fn kind(&self) -> WalletKind {
        self.kind
    }

    /// Current seqno and whether the contract still needs its state-init
    pub async fn seqno<P>(&self, provider: &P) -> Result<(u32, bool)>
    where
        P: TonProvider + ?Sized,
    {
        let state = provider.account_state(self.address()).await?;
        if !state.is_active() {
            debug!(%state, "wallet not deployed, attaching state-init");
            return Ok((0, true));
        }

        let result = provider.run_get_method(self.address(), "seqno", vec![]).await?;
        let seqno = u32::try_from(result.unsigned(0)?)
            .map_err(|_| eyre!("wallet seqno does not fit in u32"))?;
        Ok((seqno, false))
    }

    /// Sign the bundle into an external message addressed to this wallet
    pub fn sign(
        &self,
        bundle: &TransferBundle,
        seqno: u32,
        expire_at: u32,
        with_state_init: bool,
    ) -> Result<SignedMessage> {
        let messages = bundle.to_cells()?;
        let external = self
            .inner
            .create_external_message(expire_at, seqno, messages, with_state_init)?;
        let boc = BagOfCells::from_root(external).serialize(true)?;
        Ok(SignedMessage::new(boc))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    pub(crate) const TEST_PHRASE: &str = "long bomb own void gravity orphan social suspect picture breeze ranch exotic friend enable heavy squeeze practice shuffle cruel feel great confirm wagon write";

    #[test]
    fn test_wallet_derivation_is_deterministic() {
        let a = Wallet::from_phrase(WalletKind::V4R2, TEST_PHRASE).unwrap();
        let b = Wallet::from_phrase(WalletKind::V4R2, TEST_PHRASE).unwrap();
        assert_eq!(a.address(), b.address());
        assert_eq!(a.address().workchain, 0);
    }

    #[test]
    fn test_only_v4r2_derives() {
        for kind in [WalletKind::V3R2, WalletKind::HighloadV2R2] {
            let err = Wallet::from_phrase(kind, TEST_PHRASE).err().unwrap();
            assert_eq!(
                err.to_string(),
                format!("{} wallets cannot be signed by this client, use v4r2", kind)
            );
        }
    }

    #[test]
    fn test_keys_from_phrase_rejects_garbage() {
        assert!(keys_from_phrase("").is_err());
        assert!(keys_from_phrase("not a real seed phrase at all").is_err());
    }

    #[test]
    fn test_relay_names() {
        assert_eq!(WalletKind::V4R2.relay_name(), Some("V4R2"));
        assert_eq!(WalletKind::HighloadV2R2.relay_name(), Some("HighloadV2R2"));
        assert_eq!(WalletKind::V3R2.relay_name(), None);
    }

    #[test]
    fn test_read_phrase_file() {
        let dir = std::env::temp_dir();
        let good = dir.join(format!("ton-swap-phrase-{}.txt", std::process::id()));
        let mut file = std::fs::File::create(&good).unwrap();
        writeln!(file, "{}", TEST_PHRASE.replace(' ', "\n")).unwrap();
        assert_eq!(read_phrase_file(&good).unwrap(), TEST_PHRASE);
        std::fs::remove_file(&good).unwrap();

        let short = dir.join(format!("ton-swap-short-{}.txt", std::process::id()));
        std::fs::write(&short, "one two three").unwrap();
        let err = read_phrase_file(&short).unwrap_err();
        assert_eq!(err.to_string(), "invalid phrase, length 3");
        std::fs::remove_file(&short).unwrap();

        assert!(read_phrase_file(Path::new("/definitely/not/here")).is_err());
    }

    #[test]
    fn test_sign_produces_boc() {
        let wallet = Wallet::from_phrase(WalletKind::V4R2, TEST_PHRASE).unwrap();
        let tip: TonAddress = crate::config::RELAY_TIP_ADDRESS.parse().unwrap();
        let bundle = TransferBundle::new(
            InternalTransfer::new(wallet.address().clone(), 1_000_000),
            InternalTransfer::new(tip, 1_000_000),
        );
        let signed = wallet.sign(&bundle, 3, 1_900_000_000, false).unwrap();
        assert!(!signed.boc().is_empty());
        assert_eq!(STANDARD.decode(signed.to_base64()).unwrap(), signed.boc());

        let with_init = wallet.sign(&bundle, 0, 1_900_000_000, true).unwrap();
        assert!(with_init.boc().len() > signed.boc().len());
    }

    #[test]
    fn test_state_init_matches_wallet_address() {
        let wallet = Wallet::from_phrase(WalletKind::V4R2, TEST_PHRASE).unwrap();
        let tip: TonAddress = crate::config::RELAY_TIP_ADDRESS.parse().unwrap();
        let bundle = TransferBundle::new(
            InternalTransfer::new(tip.clone(), 1_000_000),
            InternalTransfer::new(tip, 1_000_000),
        );
        let signed = wallet.sign(&bundle, 0, 1_900_000_000, true).unwrap();

        let boc = BagOfCells::parse(signed.boc()).unwrap();
        let external = boc.single_root().unwrap();
        let mut parser = external.parser();
        assert_eq!(parser.load_u8(2).unwrap(), 2); // ext_in_msg_info
        assert_eq!(parser.load_address().unwrap(), TonAddress::NULL);
        assert_eq!(&parser.load_address().unwrap(), wallet.address());
        parser.load_coins().unwrap();
        assert!(parser.load_bit().unwrap()); // state-init present
        assert!(parser.load_bit().unwrap()); // as a reference

        let state_init = &external.references()[0];
        assert_eq!(state_init.cell_hash(), wallet.address().hash_part);
    }
}
