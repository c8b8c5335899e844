//! Identity registry — the authoritative business directory.
//!
//! A guarded key-value store: only the administrative authority may add
//! businesses, and the identifier and account of each business are unique.
//! Uniqueness is checked before anything is inserted, so a rejected call
//! leaves the registry exactly as it was.

use std::collections::{BTreeMap, HashMap};

use coa_types::{AccountId, Business, BusinessId, CoaError, PublicKey, Result};

use crate::directory::ParticipantDirectory;

/// Append-only registry of businesses, keyed by identifier with a
/// secondary index by account.
pub struct IdentityRegistry {
    /// The only account allowed to register businesses.
    authority: AccountId,
    /// Businesses by identifier.
    businesses: BTreeMap<BusinessId, Business>,
    /// Secondary index: account → identifier.
    by_account: HashMap<AccountId, BusinessId>,
}

impl IdentityRegistry {
    /// Create an empty registry administered by `authority`.
    #[must_use]
    pub fn new(authority: AccountId) -> Self {
        Self {
            authority,
            businesses: BTreeMap::new(),
            by_account: HashMap::new(),
        }
    }

    /// Register a business.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the authority
    /// - `DuplicateIdentifier` if `id` is already registered
    /// - `DuplicateAccount` if `account` is already registered
    pub fn add_business(
        &mut self,
        caller: AccountId,
        id: BusinessId,
        account: AccountId,
        public_key: PublicKey,
    ) -> Result<()> {
        self.ensure_authority(caller, "only the authority may register businesses")?;

        if self.businesses.contains_key(&id) {
            return Err(CoaError::DuplicateIdentifier(id));
        }
        if self.by_account.contains_key(&account) {
            return Err(CoaError::DuplicateAccount(account));
        }

        self.by_account.insert(account, id);
        self.businesses
            .insert(id, Business::new(id, account, public_key));

        tracing::info!(business = %id, account = %account, "Business registered");
        Ok(())
    }

    /// Hand the administrative role to another account.
    ///
    /// # Errors
    /// Returns `Unauthorized` if `caller` is not the current authority.
    pub fn transfer_authority(&mut self, caller: AccountId, new_authority: AccountId) -> Result<()> {
        self.ensure_authority(caller, "only the authority may transfer authority")?;
        tracing::info!(from = %self.authority, to = %new_authority, "Authority transferred");
        self.authority = new_authority;
        Ok(())
    }

    /// The current administrative authority.
    #[must_use]
    pub fn authority(&self) -> AccountId {
        self.authority
    }

    /// Look up a business by identifier.
    #[must_use]
    pub fn business(&self, id: BusinessId) -> Option<&Business> {
        self.businesses.get(&id)
    }

    /// Look up a business by account.
    #[must_use]
    pub fn business_by_account(&self, account: &AccountId) -> Option<&Business> {
        self.by_account
            .get(account)
            .and_then(|id| self.businesses.get(id))
    }

    /// All businesses in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Business> {
        self.businesses.values()
    }

    /// Number of registered businesses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.businesses.len()
    }

    /// Whether no business is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.businesses.is_empty()
    }

    fn ensure_authority(&self, caller: AccountId, reason: &str) -> Result<()> {
        if caller == self.authority {
            return Ok(());
        }
        tracing::warn!(caller = %caller, reason, "Registry call rejected");
        Err(CoaError::Unauthorized {
            caller,
            reason: reason.to_string(),
        })
    }
}

impl ParticipantDirectory for IdentityRegistry {
    fn is_registered(&self, account: &AccountId) -> bool {
        self.by_account.contains_key(account)
    }

    fn public_key_of(&self, account: &AccountId) -> Result<PublicKey> {
        self.business_by_account(account)
            .map(|b| b.public_key.clone())
            .ok_or(CoaError::BusinessNotFound(*account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VAT_1: BusinessId = BusinessId(1056);
    const VAT_2: BusinessId = BusinessId(1057);

    fn key(hex: &str) -> PublicKey {
        PublicKey::from_hex(hex).unwrap()
    }

    fn setup() -> (IdentityRegistry, AccountId) {
        let authority = AccountId::random();
        (IdentityRegistry::new(authority), authority)
    }

    #[test]
    fn authority_registers_business() {
        let (mut reg, authority) = setup();
        let acct = AccountId::random();
        let pk = key("0x49c7e43c42e28e74e31abbb02534d2a383ec42df5ae41a7cf9da1e74dfc0226a");

        reg.add_business(authority, VAT_1, acct, pk.clone()).unwrap();

        assert!(reg.is_registered(&acct));
        assert_eq!(reg.public_key_of(&acct).unwrap(), pk);
        assert_eq!(reg.business(VAT_1).unwrap().account, acct);
        assert_eq!(reg.business_by_account(&acct).unwrap().id, VAT_1);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn non_authority_rejected() {
        let (mut reg, _) = setup();
        let intruder = AccountId::random();
        let err = reg
            .add_business(intruder, VAT_1, intruder, PublicKey::new(vec![1]))
            .unwrap_err();
        assert!(matches!(err, CoaError::Unauthorized { caller, .. } if caller == intruder));
        assert!(reg.is_empty());
        assert!(!reg.is_registered(&intruder));
    }

    #[test]
    fn duplicate_identifier_rejected_without_overwrite() {
        let (mut reg, authority) = setup();
        let first = AccountId::random();
        let second = AccountId::random();
        reg.add_business(authority, VAT_1, first, PublicKey::new(vec![1]))
            .unwrap();

        let err = reg
            .add_business(authority, VAT_1, second, PublicKey::new(vec![2]))
            .unwrap_err();
        assert_eq!(err, CoaError::DuplicateIdentifier(VAT_1));

        assert_eq!(reg.business(VAT_1).unwrap().account, first);
        assert!(!reg.is_registered(&second));
        assert_eq!(reg.public_key_of(&first).unwrap(), PublicKey::new(vec![1]));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn duplicate_account_rejected_without_overwrite() {
        let (mut reg, authority) = setup();
        let acct = AccountId::random();
        reg.add_business(authority, VAT_1, acct, PublicKey::new(vec![1]))
            .unwrap();

        let err = reg
            .add_business(authority, VAT_2, acct, PublicKey::new(vec![2]))
            .unwrap_err();
        assert_eq!(err, CoaError::DuplicateAccount(acct));

        assert!(reg.business(VAT_2).is_none());
        assert_eq!(reg.public_key_of(&acct).unwrap(), PublicKey::new(vec![1]));
    }

    #[test]
    fn unknown_account_lookups() {
        let (reg, _) = setup();
        let acct = AccountId::random();
        assert!(!reg.is_registered(&acct));
        assert_eq!(
            reg.public_key_of(&acct).unwrap_err(),
            CoaError::BusinessNotFound(acct)
        );
        assert!(reg.business_by_account(&acct).is_none());
    }

    #[test]
    fn authority_transfer_moves_the_role() {
        let (mut reg, old) = setup();
        let new = AccountId::random();

        reg.transfer_authority(old, new).unwrap();
        assert_eq!(reg.authority(), new);

        let err = reg
            .add_business(old, VAT_1, AccountId::random(), PublicKey::new(vec![1]))
            .unwrap_err();
        assert!(matches!(err, CoaError::Unauthorized { .. }));

        reg.add_business(new, VAT_1, AccountId::random(), PublicKey::new(vec![1]))
            .unwrap();
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn only_authority_can_transfer() {
        let (mut reg, authority) = setup();
        let intruder = AccountId::random();
        let err = reg.transfer_authority(intruder, intruder).unwrap_err();
        assert!(matches!(err, CoaError::Unauthorized { .. }));
        assert_eq!(reg.authority(), authority);
    }

    #[test]
    fn iter_in_identifier_order() {
        let (mut reg, authority) = setup();
        reg.add_business(authority, VAT_2, AccountId::random(), PublicKey::new(vec![2]))
            .unwrap();
        reg.add_business(authority, VAT_1, AccountId::random(), PublicKey::new(vec![1]))
            .unwrap();
        let ids: Vec<_> = reg.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![VAT_1, VAT_2]);
    }

    #[test]
    fn business_record_serializes() {
        let (mut reg, authority) = setup();
        let acct = AccountId::random();
        reg.add_business(authority, VAT_1, acct, PublicKey::new(vec![7]))
            .unwrap();
        let json = serde_json::to_string(reg.business(VAT_1).unwrap()).unwrap();
        let back: Business = serde_json::from_str(&json).unwrap();
        assert_eq!(back.account, acct);
    }
}
