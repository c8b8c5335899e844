//! System-wide constants for the CoA exchange.

/// Length of a ledger account address in bytes.
pub const ACCOUNT_LEN: usize = 20;

/// First request number handed out by a freshly deployed exchange.
pub const DEFAULT_FIRST_REQUEST_NUMBER: u64 = 1;

/// Maximum number of positions in a requested-amounts vector (default).
pub const DEFAULT_MAX_DIMENSIONS: usize = 64;

/// Sequence number of the first record in a notification log.
pub const FIRST_EVENT_SEQ: u64 = 1;

/// Domain separator for content references built with [`crate::ContentRef::digest`].
pub const CONTENT_REF_DOMAIN: &[u8] = b"coa:content:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
