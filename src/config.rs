//! TON swap client configuration

use std::str::FromStr;
use std::time::Duration;

use tracing::info;

use crate::errors::ConfigError;

// Public RPC (toncenter JSON-RPC v2)
pub const TONCENTER_RPC: &str = "https://toncenter.com/api/v2/jsonRPC";
pub const RPC_TIMEOUT: Duration = Duration::from_millis(10_000);

// bloXroute TON Trader API
pub const RELAY_ENDPOINT: &str = "https://frankfurt.ton.dex.blxrbdn.com";
pub const RELAY_TRANSFER_ENDPOINT: &str = "https://eu.ton.dex.blxrbdn.com";
pub const RELAY_TIMEOUT: Duration = Duration::from_millis(10_000);
pub const RELAY_TIP_ADDRESS: &str = "UQAw0AJjHbMYQobYXHBoW29ShKx1V2UjaiKanhDYBNJYDPUh";

// DeDust
pub const DEDUST_FACTORY: &str = "EQBfBWT7X2BHg9tXAxzhz2aKiNTU1tpt5NsiK0uSDW_YAJ67";
pub const DEDUST_DEFAULT_POOL: &str = "EQBjB_2TLdpOhhj25F_gYmM6fMb8hbI3rx-EA4g_ALr9O0RJ"; // TON/DOGS
pub const DEDUST_SWAP_GAS: &str = "0.08";
pub const DEDUST_DEFAULT_AMOUNT: &str = "0.001";
pub const DEDUST_DEFAULT_TIP: &str = "0.001";

// STON.fi v1
pub const STONFI_ROUTER: &str = "EQB3ncyBUTjZUA5EnFKR5_EnOMI9V1tTEAAPaiU71gc4TiUt";
pub const STONFI_PROXY_TON: &str = "EQCM3B12QK1e4yZSf8GtBRT0aLMNyEsBc_DhVfRRtOEffLez";
pub const STONFI_DEFAULT_ASK_JETTON: &str = "EQA2kCVNwVsil2EM2mB0SkXytxCqQjS4mttjDpnXmwG9T6bO"; // STON
pub const STONFI_TON_TO_JETTON_FORWARD_GAS: u64 = 215_000_000;
pub const STONFI_DEFAULT_AMOUNT: &str = "0.006";
pub const STONFI_DEFAULT_MIN_ASK: &str = "3000000";
pub const STONFI_DEFAULT_TIP: &str = "0.005";
pub const STONFI_DEFAULT_QUERY_ID: u64 = 12345;

// Plain transfer
pub const TRANSFER_DEFAULT_AMOUNT: &str = "0.25";
pub const TRANSFER_DEFAULT_TIP: &str = "0.015";
pub const SEED_PHRASE_WORDS: usize = 24;

/// Seconds a signed external message stays valid
pub const MESSAGE_TTL_SECS: i64 = 60;

/// Where a signed message goes once it is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMode {
    /// bloXroute relay, POST /api/v2/submit
    Relay,
    /// Public RPC sendBoc
    Direct,
    /// Only print the base64 BoC
    PrintOnly,
}

impl FromStr for ClientMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relay" | "ton4" | "bx" => Ok(ClientMode::Relay),
            "direct" | "toncenter" => Ok(ClientMode::Direct),
            "print" => Ok(ClientMode::PrintOnly),
            other => Err(ConfigError::InvalidEnv {
                name: "CLIENT",
                reason: format!("unknown client {:?}, expected relay, direct or print", other),
            }),
        }
    }
}

impl std::fmt::Display for ClientMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientMode::Relay => write!(f, "relay"),
            ClientMode::Direct => write!(f, "direct"),
            ClientMode::PrintOnly => write!(f, "print"),
        }
    }
}

/// Settings read from the environment for the swap commands
#[derive(Clone)]
pub struct SwapEnv {
    pub mnemonic: String,
    pub auth_key: Option<String>,
    pub tip_address: String,
    pub wallet_address: Option<String>,
    pub client: ClientMode,
    pub toncenter_api_key: Option<String>,
}

impl SwapEnv {
    /// DeDust flow: MNEMONIC, AUTH_KEY, BX_TIP_ADDR and CLIENT are required
    pub fn dedust_from_env() -> Result<Self, ConfigError> {
        Self::dedust(|name| std::env::var(name).ok())
    }

    /// STON.fi flow: MNEMONIC, WALLET_ADDR and BX_TIP_ADDR are required
    pub fn stonfi_from_env() -> Result<Self, ConfigError> {
        Self::stonfi(|name| std::env::var(name).ok())
    }

    pub fn dedust<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mnemonic = required(&lookup, "MNEMONIC")?;
        let auth_key = required(&lookup, "AUTH_KEY")?;
        let tip_address = required(&lookup, "BX_TIP_ADDR")?;
        let client = required(&lookup, "CLIENT")?.parse()?;

        Ok(Self {
            mnemonic,
            auth_key: Some(auth_key),
            tip_address,
            wallet_address: optional(&lookup, "WALLET_ADDR"),
            client,
            toncenter_api_key: optional(&lookup, "TONCENTER_API_KEY"),
        })
    }

    pub fn stonfi<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mnemonic = required(&lookup, "MNEMONIC")?;
        let wallet_address = required(&lookup, "WALLET_ADDR")?;
        let tip_address = required(&lookup, "BX_TIP_ADDR")?;
        let client = match optional(&lookup, "CLIENT") {
            Some(value) => value.parse()?,
            None => ClientMode::PrintOnly,
        };
        let auth_key = optional(&lookup, "AUTH_KEY");
        if client == ClientMode::Relay && auth_key.is_none() {
            return Err(ConfigError::MissingEnv("AUTH_KEY"));
        }

        Ok(Self {
            mnemonic,
            auth_key,
            tip_address,
            wallet_address: Some(wallet_address),
            client,
            toncenter_api_key: optional(&lookup, "TONCENTER_API_KEY"),
        })
    }

    /// Mnemonic words, split on whitespace
    pub fn mnemonic_words(&self) -> Vec<&str> {
        self.mnemonic.split_whitespace().collect()
    }

    /// Log configuration on startup, secrets redacted
    pub fn log_config(&self) {
        info!(
            mnemonic_words = self.mnemonic_words().len(),
            auth_key = if self.auth_key.is_some() { "<set>" } else { "<unset>" },
            tip_address = %self.tip_address,
            wallet_address = self.wallet_address.as_deref().unwrap_or("<derived>"),
            client = %self.client,
            "swap environment loaded"
        );
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name).ok_or(ConfigError::MissingEnv(name))
}

fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const DEDUST_VARS: [(&str, &str); 4] = [
        ("MNEMONIC", "word1 word2 word3"),
        ("AUTH_KEY", "secret"),
        ("BX_TIP_ADDR", RELAY_TIP_ADDRESS),
        ("CLIENT", "ton4"),
    ];

    #[test]
    fn test_dedust_env_complete() {
        let env = SwapEnv::dedust(lookup(&DEDUST_VARS)).unwrap();
        assert_eq!(env.mnemonic_words(), vec!["word1", "word2", "word3"]);
        assert_eq!(env.auth_key.as_deref(), Some("secret"));
        assert_eq!(env.client, ClientMode::Relay);
        assert_eq!(env.wallet_address, None);
    }

    #[test]
    fn test_dedust_env_each_missing_var_fails() {
        for missing in ["MNEMONIC", "AUTH_KEY", "BX_TIP_ADDR", "CLIENT"] {
            let vars: Vec<(&str, &str)> = DEDUST_VARS
                .iter()
                .copied()
                .filter(|(k, _)| *k != missing)
                .collect();
            match SwapEnv::dedust(lookup(&vars)) {
                Err(ConfigError::MissingEnv(name)) => assert_eq!(name, missing),
                Err(e) => panic!("unexpected error for {}: {}", missing, e),
                Ok(_) => panic!("{} missing but config loaded", missing),
            }
        }
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let mut vars = DEDUST_VARS.to_vec();
        vars[1] = ("AUTH_KEY", "");
        let err = SwapEnv::dedust(lookup(&vars)).err().unwrap();
        assert_eq!(err.to_string(), "Environment variable AUTH_KEY is required.");
    }

    #[test]
    fn test_stonfi_env_defaults_to_print() {
        let env = SwapEnv::stonfi(lookup(&[
            ("MNEMONIC", "a b"),
            ("WALLET_ADDR", "EQA2kCVNwVsil2EM2mB0SkXytxCqQjS4mttjDpnXmwG9T6bO"),
            ("BX_TIP_ADDR", RELAY_TIP_ADDRESS),
        ]))
        .unwrap();
        assert_eq!(env.client, ClientMode::PrintOnly);
        assert!(env.auth_key.is_none());
    }

    #[test]
    fn test_stonfi_env_requires_wallet_addr() {
        let err = SwapEnv::stonfi(lookup(&[("MNEMONIC", "a b"), ("BX_TIP_ADDR", "x")]))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::MissingEnv("WALLET_ADDR")));
    }

    #[test]
    fn test_stonfi_relay_needs_auth_key() {
        let err = SwapEnv::stonfi(lookup(&[
            ("MNEMONIC", "a b"),
            ("WALLET_ADDR", "w"),
            ("BX_TIP_ADDR", "t"),
            ("CLIENT", "relay"),
        ]))
        .err()
        .unwrap();
        assert!(matches!(err, ConfigError::MissingEnv("AUTH_KEY")));
    }

    #[test]
    fn test_client_mode_parse() {
        assert_eq!("TON4".parse::<ClientMode>().unwrap(), ClientMode::Relay);
        assert_eq!("toncenter".parse::<ClientMode>().unwrap(), ClientMode::Direct);
        assert_eq!("print".parse::<ClientMode>().unwrap(), ClientMode::PrintOnly);
        assert!("carrier-pigeon".parse::<ClientMode>().is_err());
    }
}
