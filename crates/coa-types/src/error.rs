//! Error types for the CoA exchange.
//!
//! All errors use the `COA_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Authorization errors
//! - 2xx: Registry errors
//! - 3xx: Participant errors
//! - 4xx: Request errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{AccountId, BusinessId, RequestNumber};

/// Central error enum for all CoA exchange operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoaError {
    // =================================================================
    // Authorization Errors (1xx)
    // =================================================================
    /// The caller lacks the identity or role the operation requires.
    #[error("COA_ERR_100: Unauthorized caller {caller}: {reason}")]
    Unauthorized { caller: AccountId, reason: String },

    // =================================================================
    // Registry Errors (2xx)
    // =================================================================
    /// A business with this identifier is already registered.
    #[error("COA_ERR_200: Business identifier already registered: {0}")]
    DuplicateIdentifier(BusinessId),

    /// A business with this account is already registered.
    #[error("COA_ERR_201: Account already registered: {0}")]
    DuplicateAccount(AccountId),

    /// No business is registered for this account.
    #[error("COA_ERR_202: No business registered for account {0}")]
    BusinessNotFound(AccountId),

    /// An account address could not be parsed.
    #[error("COA_ERR_203: Invalid account: {reason}")]
    InvalidAccount { reason: String },

    /// The public key bytes are not a valid ed25519 key.
    #[error("COA_ERR_204: Invalid public key: {reason}")]
    InvalidPublicKey { reason: String },

    /// An ed25519 signature did not verify against the registered key.
    #[error("COA_ERR_205: Signature verification failed")]
    SignatureInvalid,

    // =================================================================
    // Participant Errors (3xx)
    // =================================================================
    /// The caller of `new_request` is not a registered business.
    #[error("COA_ERR_300: Unknown requester: {0}")]
    UnknownRequester(AccountId),

    /// The designated responder is not a registered business.
    #[error("COA_ERR_301: Unknown responder: {0}")]
    UnknownResponder(AccountId),

    // =================================================================
    // Request Errors (4xx)
    // =================================================================
    /// No request with this number exists.
    #[error("COA_ERR_400: Unknown request: {0}")]
    UnknownRequest(RequestNumber),

    /// The request is closed; its amounts can no longer change.
    #[error("COA_ERR_401: Request already closed: {0}")]
    RequestAlreadyClosed(RequestNumber),

    /// The answer vector length differs from the requested vector length.
    #[error("COA_ERR_402: Dimension mismatch: expected {expected} amounts, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A request must ask for at least one amount.
    #[error("COA_ERR_403: Requested amounts must not be empty")]
    EmptyRequest,

    /// The requested vector is longer than the configured maximum.
    #[error("COA_ERR_404: Too many dimensions: {actual} exceeds limit {max}")]
    TooManyDimensions { max: usize, actual: usize },

    /// Accepting the answer would push a position past its requested value.
    #[error(
        "COA_ERR_405: Overshoot at position {position}: requested {requested}, would accumulate {accumulated}"
    )]
    Overshoot {
        position: usize,
        requested: u64,
        accumulated: u64,
    },

    /// Accumulating the answer would overflow a 64-bit amount.
    #[error("COA_ERR_406: Amount overflow at position {position}")]
    AmountOverflow { position: usize },

    /// The request number space is exhausted.
    #[error("COA_ERR_407: Request numbers exhausted")]
    RequestNumberExhausted,

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("COA_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("COA_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid values, malformed document, etc.).
    #[error("COA_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, CoaError>;

impl From<serde_json::Error> for CoaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
