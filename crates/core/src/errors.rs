use rust_decimal::Decimal;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Unified error type for the entire papertrade-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input ───────────────────────────────────────────────────────
    #[error("Invalid request: {0}")]
    Validation(ValidationErrors),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    // ── Business rules ──────────────────────────────────────────────
    #[error("Insufficient funds. Need ${required:.2}, have ${available:.2}")]
    InsufficientFunds { required: Decimal, available: Decimal },

    #[error("Insufficient shares of {symbol}. Need {requested}, have {available}")]
    InsufficientShares {
        symbol: String,
        requested: u64,
        available: u64,
    },

    #[error("Holding not found: {0}")]
    HoldingNotFound(String),

    #[error("{0} is already in favorites")]
    FavoriteExists(String),

    // ── Lookups ─────────────────────────────────────────────────────
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Account already exists: {0}")]
    AccountExists(String),

    #[error("{0} is not in favorites")]
    FavoriteNotFound(String),

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    // ── Market data ─────────────────────────────────────────────────
    #[error("Quote unavailable for {symbol}: {reason}")]
    QuoteUnavailable { symbol: String, reason: String },

    #[error("API error ({provider}): {message}")]
    Api { provider: String, message: String },

    #[error("Network error: {0}")]
    Network(String),

    // ── Persistence ─────────────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Portfolio for {0} was modified concurrently")]
    ConcurrentModification(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported file version: {0}")]
    UnsupportedVersion(u16),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("File I/O error: {0}")]
    FileIO(String),
}

/// Coarse classification used by the transport boundary to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input; the caller can resubmit corrected data.
    Input,
    /// A trading rule rejected the request (funds, shares, duplicates).
    Business,
    /// The addressed account, favorite or symbol does not exist.
    NotFound,
    /// The market data source failed and no fallback could answer.
    Upstream,
    /// Lost update detected; the caller may retry.
    Conflict,
    /// Storage failed; nothing from the request was committed.
    Persistence,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_) | CoreError::InvalidQuantity(_) => ErrorKind::Input,
            CoreError::InsufficientFunds { .. }
            | CoreError::InsufficientShares { .. }
            | CoreError::HoldingNotFound(_)
            | CoreError::FavoriteExists(_) => ErrorKind::Business,
            CoreError::AccountNotFound(_)
            | CoreError::FavoriteNotFound(_)
            | CoreError::SymbolNotFound(_) => ErrorKind::NotFound,
            CoreError::QuoteUnavailable { .. } | CoreError::Api { .. } | CoreError::Network(_) => {
                ErrorKind::Upstream
            }
            CoreError::AccountExists(_) | CoreError::ConcurrentModification(_) => {
                ErrorKind::Conflict
            }
            CoreError::Storage(_)
            | CoreError::InvalidFileFormat(_)
            | CoreError::UnsupportedVersion(_)
            | CoreError::Serialization(_)
            | CoreError::Deserialization(_)
            | CoreError::FileIO(_) => ErrorKind::Persistence,
        }
    }

    /// Stable machine-readable code for the error, e.g. `INSUFFICIENT_FUNDS`.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "VALIDATION_FAILED",
            CoreError::InvalidQuantity(_) => "INVALID_QUANTITY",
            CoreError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            CoreError::InsufficientShares { .. } => "INSUFFICIENT_SHARES",
            CoreError::HoldingNotFound(_) => "HOLDING_NOT_FOUND",
            CoreError::FavoriteExists(_) => "FAVORITE_EXISTS",
            CoreError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            CoreError::AccountExists(_) => "ACCOUNT_EXISTS",
            CoreError::FavoriteNotFound(_) => "FAVORITE_NOT_FOUND",
            CoreError::SymbolNotFound(_) => "SYMBOL_NOT_FOUND",
            CoreError::QuoteUnavailable { .. } => "QUOTE_UNAVAILABLE",
            CoreError::Api { .. } => "API_ERROR",
            CoreError::Network(_) => "NETWORK_ERROR",
            CoreError::Storage(_) => "STORAGE_ERROR",
            CoreError::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            CoreError::InvalidFileFormat(_) => "INVALID_FILE_FORMAT",
            CoreError::UnsupportedVersion(_) => "UNSUPPORTED_VERSION",
            CoreError::Serialization(_) => "SERIALIZATION_ERROR",
            CoreError::Deserialization(_) => "DESERIALIZATION_ERROR",
            CoreError::FileIO(_) => "FILE_IO_ERROR",
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<ValidationErrors> for CoreError {
    fn from(errors: ValidationErrors) -> Self {
        CoreError::Validation(errors)
    }
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<bincode::Error> for CoreError {
    fn from(e: bincode::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full request URL, including the apikey query param.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
