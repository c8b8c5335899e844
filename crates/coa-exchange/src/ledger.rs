//! Single-writer ledger — the composition root.
//!
//! Wires a fresh [`IdentityRegistry`] and a fresh [`CoaExchange`] together
//! and serializes every call through one mutex. Each mutating call runs to
//! completion (or fails with no effect) before the next one starts, which
//! gives the same atomicity and total ordering a shared ledger provides.
//!
//! Caller identity is an explicit parameter on every operation. Whoever
//! fronts the ledger (RPC layer, session handler) is responsible for
//! authenticating it; see [`Ledger::verify_signed_by`] for ed25519 keys.

use std::sync::{Mutex, MutexGuard};

use coa_registry::{IdentityRegistry, ParticipantDirectory};
use coa_types::{
    AccountId, BusinessId, CoaError, CoaRequest, ContentRef, EventRecord, ExchangeConfig,
    PublicKey, RequestNumber, RequestStatus, Result,
};

use crate::exchange::CoaExchange;

/// Everything the ledger guards.
struct LedgerState {
    registry: IdentityRegistry,
    exchange: CoaExchange,
}

/// Thread-safe front door to the registry and the exchange.
///
/// `Ledger` is `Send + Sync`; share it with `Arc`.
pub struct Ledger {
    state: Mutex<LedgerState>,
}

impl Ledger {
    /// Deploy a registry administered by `authority` and an exchange bound
    /// to it.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` does not validate.
    pub fn deploy(authority: AccountId, config: ExchangeConfig) -> Result<Self> {
        let exchange = CoaExchange::new(config)?;
        tracing::info!(authority = %authority, "Ledger deployed");
        Ok(Self {
            state: Mutex::new(LedgerState {
                registry: IdentityRegistry::new(authority),
                exchange,
            }),
        })
    }

    // -----------------------------------------------------------------
    // Registry operations
    // -----------------------------------------------------------------

    /// See [`IdentityRegistry::add_business`].
    pub fn add_business(
        &self,
        caller: AccountId,
        id: BusinessId,
        account: AccountId,
        public_key: PublicKey,
    ) -> Result<()> {
        self.lock()?
            .registry
            .add_business(caller, id, account, public_key)
    }

    /// See [`IdentityRegistry::transfer_authority`].
    pub fn transfer_authority(&self, caller: AccountId, new_authority: AccountId) -> Result<()> {
        self.lock()?
            .registry
            .transfer_authority(caller, new_authority)
    }

    pub fn is_registered(&self, account: &AccountId) -> Result<bool> {
        Ok(self.lock()?.registry.is_registered(account))
    }

    pub fn public_key_of(&self, account: &AccountId) -> Result<PublicKey> {
        self.lock()?.registry.public_key_of(account)
    }

    /// Check that `signature` over `message` was made with the key
    /// registered for `account`.
    ///
    /// # Errors
    /// - `BusinessNotFound` if the account is not registered
    /// - `InvalidPublicKey` if the registered key is not ed25519
    /// - `SignatureInvalid` if the signature does not verify
    pub fn verify_signed_by(
        &self,
        account: &AccountId,
        message: &[u8],
        signature: &[u8],
    ) -> Result<()> {
        self.public_key_of(account)?.verify(message, signature)
    }

    // -----------------------------------------------------------------
    // Exchange operations
    // -----------------------------------------------------------------

    /// See [`CoaExchange::new_request`].
    pub fn new_request(
        &self,
        caller: AccountId,
        content_ref: ContentRef,
        responder: AccountId,
        requested: Vec<u64>,
    ) -> Result<RequestNumber> {
        let mut guard = self.lock()?;
        let LedgerState { registry, exchange } = &mut *guard;
        exchange.new_request(&*registry, caller, content_ref, responder, requested)
    }

    /// See [`CoaExchange::answer`].
    pub fn answer(
        &self,
        caller: AccountId,
        number: RequestNumber,
        partial: &[u64],
    ) -> Result<RequestStatus> {
        self.lock()?.exchange.answer(caller, number, partial)
    }

    /// A copy of request `number`, if it exists.
    pub fn request_of(&self, number: RequestNumber) -> Result<Option<CoaRequest>> {
        Ok(self.lock()?.exchange.request_of(number).cloned())
    }

    /// Open requests waiting on `responder`.
    pub fn open_requests_for(&self, responder: AccountId) -> Result<Vec<CoaRequest>> {
        Ok(self
            .lock()?
            .exchange
            .open_requests_for(responder)
            .cloned()
            .collect())
    }

    /// Notifications with `seq > cursor`, oldest first.
    pub fn events_since(&self, cursor: u64) -> Result<Vec<EventRecord>> {
        Ok(self.lock()?.exchange.events().since(cursor).to_vec())
    }

    /// JSON export of every request, for audit.
    pub fn snapshot_json(&self) -> Result<String> {
        let guard = self.lock()?;
        let requests: Vec<&CoaRequest> = guard.exchange.requests().collect();
        Ok(serde_json::to_string_pretty(&requests)?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, LedgerState>> {
        self.state
            .lock()
            .map_err(|_| CoaError::Internal("ledger lock poisoned".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coa_types::CoaEvent;

    fn deployed() -> (Ledger, AccountId) {
        let authority = AccountId::random();
        let ledger = Ledger::deploy(authority, ExchangeConfig::default()).unwrap();
        (ledger, authority)
    }

    #[test]
    fn ledger_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Ledger>();
    }

    #[test]
    fn deploy_rejects_bad_config() {
        let cfg = ExchangeConfig {
            first_request_number: 0,
            ..ExchangeConfig::default()
        };
        assert!(matches!(
            Ledger::deploy(AccountId::random(), cfg),
            Err(CoaError::Configuration(_))
        ));
    }

    #[test]
    fn request_flow_through_ledger() {
        let (ledger, authority) = deployed();
        let a = AccountId::random();
        let b = AccountId::random();
        ledger
            .add_business(authority, BusinessId(1), a, PublicKey::new(vec![1]))
            .unwrap();
        ledger
            .add_business(authority, BusinessId(2), b, PublicKey::new(vec![2]))
            .unwrap();

        let n = ledger
            .new_request(a, ContentRef::digest(b"lot 7"), b, vec![5])
            .unwrap();
        assert_eq!(ledger.open_requests_for(b).unwrap().len(), 1);
        assert_eq!(ledger.answer(b, n, &[5]).unwrap(), RequestStatus::Closed);
        assert!(ledger.open_requests_for(b).unwrap().is_empty());

        let kinds: Vec<_> = ledger
            .events_since(0)
            .unwrap()
            .into_iter()
            .map(|r| r.event.kind())
            .collect();
        assert_eq!(kinds, vec!["Requested", "Answered", "CoaClosed"]);
        assert!(matches!(
            ledger.events_since(2).unwrap()[0].event,
            CoaEvent::CoaClosed { .. }
        ));
    }

    #[test]
    fn unregistered_lookups() {
        let (ledger, _) = deployed();
        let acct = AccountId::random();
        assert!(!ledger.is_registered(&acct).unwrap());
        assert_eq!(
            ledger.public_key_of(&acct).unwrap_err(),
            CoaError::BusinessNotFound(acct)
        );
        assert!(ledger.request_of(RequestNumber(1)).unwrap().is_none());
    }

    #[test]
    fn signature_checked_against_registered_key() {
        use ed25519_dalek::Signer;

        let (ledger, authority) = deployed();
        let acct = AccountId::random();
        let (signing, public) = PublicKey::generate_ed25519();
        ledger
            .add_business(authority, BusinessId(1056), acct, public)
            .unwrap();

        let sig = signing.sign(b"report body").to_bytes();
        assert!(ledger.verify_signed_by(&acct, b"report body", &sig).is_ok());
        assert_eq!(
            ledger
                .verify_signed_by(&acct, b"other body", &sig)
                .unwrap_err(),
            CoaError::SignatureInvalid
        );
    }

    #[test]
    fn snapshot_lists_requests() {
        let (ledger, authority) = deployed();
        let a = AccountId::random();
        ledger
            .add_business(authority, BusinessId(1), a, PublicKey::new(vec![1]))
            .unwrap();
        ledger
            .new_request(a, ContentRef::new(vec![1]), a, vec![3, 4])
            .unwrap();

        let json = ledger.snapshot_json().unwrap();
        let parsed: Vec<CoaRequest> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].requested, vec![3, 4]);
        assert_eq!(parsed[0].status, RequestStatus::Open);
    }
}
