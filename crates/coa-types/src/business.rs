//! Registered business record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, BusinessId, PublicKey};

/// A business admitted to the exchange by the administrative authority.
///
/// Both `id` and `account` are unique across the registry. Records are
/// append-only: re-adding either key fails instead of overwriting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    /// Natural-number identifier (VAT id).
    pub id: BusinessId,
    /// Ledger account the business calls from.
    pub account: AccountId,
    /// Public key used to encrypt or sign off-ledger reports.
    pub public_key: PublicKey,
    /// When the authority registered the business.
    pub registered_at: DateTime<Utc>,
}

impl Business {
    #[must_use]
    pub fn new(id: BusinessId, account: AccountId, public_key: PublicKey) -> Self {
        Self {
            id,
            account,
            public_key,
            registered_at: Utc::now(),
        }
    }
}
