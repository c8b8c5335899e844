//! Exchange state machine — requests, partial answers, reconciliation.
//!
//! Flow for one request:
//! 1. A registered business calls [`CoaExchange::new_request`] naming a
//!    registered responder and the amounts it wants certified
//! 2. The responder calls [`CoaExchange::answer`] one or more times
//! 3. Each answer is added into the running totals
//! 4. The answer that makes the totals equal the requested amounts closes
//!    the request and emits `CoaClosed`
//!
//! Every call validates first and mutates last, so a rejected call has no
//! effect: no record, no counter advance, no notification.

use std::collections::BTreeMap;

use coa_types::{
    AccountId, CoaError, CoaEvent, CoaRequest, ContentRef, ExchangeConfig, RequestNumber,
    RequestStatus, Result,
};
use coa_registry::ParticipantDirectory;

use crate::event_log::EventLog;

/// Owns every CoA request and the notification log.
///
/// Participant checks go through a [`ParticipantDirectory`] passed in by
/// shared reference; the exchange never holds or mutates registry state.
pub struct CoaExchange {
    config: ExchangeConfig,
    /// All requests ever created, open and closed.
    requests: BTreeMap<RequestNumber, CoaRequest>,
    /// Number the next request will receive.
    next_number: RequestNumber,
    events: EventLog,
}

impl CoaExchange {
    /// Create an empty exchange.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` does not validate.
    pub fn new(config: ExchangeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            next_number: RequestNumber(config.first_request_number),
            config,
            requests: BTreeMap::new(),
            events: EventLog::new(),
        })
    }

    /// Open a new request from `caller` to `responder`.
    ///
    /// # Errors
    /// - `UnknownRequester` if `caller` is not registered (checked first)
    /// - `UnknownResponder` if `responder` is not registered
    /// - `EmptyRequest` if `requested` is empty
    /// - `TooManyDimensions` if `requested` exceeds the configured limit
    /// - `RequestNumberExhausted` if no number is left to assign
    pub fn new_request(
        &mut self,
        directory: &impl ParticipantDirectory,
        caller: AccountId,
        content_ref: ContentRef,
        responder: AccountId,
        requested: Vec<u64>,
    ) -> Result<RequestNumber> {
        if !directory.is_registered(&caller) {
            tracing::warn!(caller = %caller, "Request rejected: requester not registered");
            return Err(CoaError::UnknownRequester(caller));
        }
        if !directory.is_registered(&responder) {
            tracing::warn!(
                caller = %caller,
                responder = %responder,
                "Request rejected: responder not registered"
            );
            return Err(CoaError::UnknownResponder(responder));
        }
        if requested.is_empty() {
            return Err(CoaError::EmptyRequest);
        }
        if requested.len() > self.config.max_dimensions {
            return Err(CoaError::TooManyDimensions {
                max: self.config.max_dimensions,
                actual: requested.len(),
            });
        }

        let number = self.next_number;
        let following = number.next()?;

        let request = CoaRequest::open(number, caller, responder, content_ref.clone(), requested);
        let event = CoaEvent::Requested {
            sender: caller,
            receiver: responder,
            request_number: number,
            content_ref,
            requested: request.requested.clone(),
        };

        self.requests.insert(number, request);
        self.next_number = following;
        self.events.append(event);

        tracing::info!(
            request = %number,
            requester = %caller,
            responder = %responder,
            "CoA request opened"
        );
        Ok(number)
    }

    /// Add a partial answer from `caller` to request `number`.
    ///
    /// Returns the request's status after the call.
    ///
    /// # Errors
    /// - `UnknownRequest` if no such request exists
    /// - `RequestAlreadyClosed` if the request is closed
    /// - `Unauthorized` if `caller` is not the request's responder
    /// - `DimensionMismatch` if `partial` has the wrong length
    /// - `AmountOverflow` / `Overshoot` if a position would pass its target
    pub fn answer(
        &mut self,
        caller: AccountId,
        number: RequestNumber,
        partial: &[u64],
    ) -> Result<RequestStatus> {
        let request = self
            .requests
            .get_mut(&number)
            .ok_or(CoaError::UnknownRequest(number))?;

        if !request.is_open() {
            return Err(CoaError::RequestAlreadyClosed(number));
        }
        if caller != request.responder {
            tracing::warn!(
                request = %number,
                caller = %caller,
                responder = %request.responder,
                "Answer rejected: caller is not the responder"
            );
            return Err(CoaError::Unauthorized {
                caller,
                reason: format!("only the responder of {number} may answer"),
            });
        }

        let staged = request.stage_answer(partial)?;
        let closed = request.commit_answer(staged)?;

        self.events.append(CoaEvent::Answered {
            request_number: number,
            partial: partial.to_vec(),
        });
        tracing::debug!(
            request = %number,
            partial = ?partial,
            accumulated = ?request.accumulated,
            "Answer accepted"
        );

        if closed {
            self.events.append(CoaEvent::CoaClosed {
                sender: request.responder,
                receiver: request.requester,
                request_number: number,
            });
            tracing::info!(
                request = %number,
                answers = request.answer_count,
                "CoA request reconciled and closed"
            );
        }
        Ok(request.status)
    }

    /// Look up a request by number.
    #[must_use]
    pub fn request_of(&self, number: RequestNumber) -> Option<&CoaRequest> {
        self.requests.get(&number)
    }

    /// Open requests waiting on `responder`, oldest first.
    pub fn open_requests_for(&self, responder: AccountId) -> impl Iterator<Item = &CoaRequest> {
        self.requests
            .values()
            .filter(move |r| r.is_open() && r.responder == responder)
    }

    /// Every request created by `requester`, oldest first.
    pub fn requests_by(&self, requester: AccountId) -> impl Iterator<Item = &CoaRequest> {
        self.requests
            .values()
            .filter(move |r| r.requester == requester)
    }

    /// All requests, oldest first.
    pub fn requests(&self) -> impl Iterator<Item = &CoaRequest> {
        self.requests.values()
    }

    /// The notification log.
    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Number the next request will receive.
    #[must_use]
    pub fn next_request_number(&self) -> RequestNumber {
        self.next_number
    }

    #[must_use]
    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }
}
