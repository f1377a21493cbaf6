use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable {0} is required.")]
    MissingEnv(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    InvalidEnv { name: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("RPC transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("RPC HTTP status {status}: {body}")]
    Http { status: u16, body: String },
    #[error("RPC error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("get-method {method} failed with exit code {exit_code}")]
    ExitCode { method: String, exit_code: i64 },
    #[error("Unexpected RPC response: {0}")]
    Decode(String),
    #[error("Failed to encode RPC request: {0}")]
    Encode(String),
    #[error("{0} does not exist.")]
    Inactive(String),
}

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("unsupported wallet type; please use one these: HighloadV2R2, HighloadV3, V4R2 or V5R1Final")]
    UnsupportedWallet,
    #[error("failed to send request: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API error: {message} (code: {code})")]
    Api { code: i64, message: String },
    #[error("Submission failure: HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Decode(String),
}
