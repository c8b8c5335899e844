//! Read-only view of the registry used by other components.
//!
//! The exchange authorizes participants through this trait and receives it
//! by shared reference, so it can never mutate registry state.

use coa_types::{AccountId, PublicKey, Result};

/// Answers "is this account a recognized business, and what is its key".
pub trait ParticipantDirectory {
    /// Whether `account` belongs to a registered business. Never fails.
    fn is_registered(&self, account: &AccountId) -> bool;

    /// The public key registered for `account`.
    ///
    /// # Errors
    /// Returns `BusinessNotFound` if the account is not registered.
    fn public_key_of(&self, account: &AccountId) -> Result<PublicKey>;
}
