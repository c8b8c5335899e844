//! # CoA Request — the multi-value reconciliation record
//!
//! A request asks the responder to certify a vector of quantities. The
//! responder answers in one or more parts; each part is added into the
//! running totals. The request closes on the answer that makes the totals
//! equal the requested vector at every position.
//!
//! ## State Machine
//!
//! ```text
//!          answer (totals != requested)
//!            ┌──────┐
//!            ▼      │
//!   ┌──────┐ ───────┘     ┌────────┐
//!   │ OPEN ├─────────────▶│ CLOSED │
//!   └──────┘  answer      └────────┘
//!           (totals == requested)
//! ```
//!
//! Answers go through two steps so a rejected answer never leaves partial
//! state behind: [`CoaRequest::stage_answer`] validates and computes the new
//! totals without touching `self`, and [`CoaRequest::commit_answer`] stores
//! them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, CoaError, ContentRef, RequestNumber, Result};

/// Lifecycle state of a CoA request.
///
/// The only transition is `Open → Closed`; `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Accepting answers from the responder.
    Open,
    /// Totals reconciled exactly. **Irreversible.**
    Closed,
}

impl RequestStatus {
    /// Can a request in this state move to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Open, Self::Closed))
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

/// A CoA request between two registered businesses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoaRequest {
    /// Assigned once at creation, never reused.
    pub number: RequestNumber,
    /// The business that asked for the certificate.
    pub requester: AccountId,
    /// The only business allowed to answer.
    pub responder: AccountId,
    /// Reference to the off-ledger item being certified.
    pub content_ref: ContentRef,
    /// Target amounts. Immutable after creation.
    pub requested: Vec<u64>,
    /// Running element-wise sum of all answers. Only ever increases.
    pub accumulated: Vec<u64>,
    /// Current lifecycle state.
    pub status: RequestStatus,
    /// Number of accepted answers.
    pub answer_count: u32,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl CoaRequest {
    /// Create an open request with zeroed totals.
    #[must_use]
    pub fn open(
        number: RequestNumber,
        requester: AccountId,
        responder: AccountId,
        content_ref: ContentRef,
        requested: Vec<u64>,
    ) -> Self {
        let accumulated = vec![0; requested.len()];
        Self {
            number,
            requester,
            responder,
            content_ref,
            requested,
            accumulated,
            status: RequestStatus::Open,
            answer_count: 0,
            created_at: Utc::now(),
            closed_at: None,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == RequestStatus::Open
    }

    /// Number of positions in the requested vector.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.requested.len()
    }

    /// Whether the totals equal the requested vector at every position.
    #[must_use]
    pub fn is_reconciled(&self) -> bool {
        self.accumulated == self.requested
    }

    /// What is still missing at each position.
    #[must_use]
    pub fn remaining(&self) -> Vec<u64> {
        self.requested
            .iter()
            .zip(&self.accumulated)
            .map(|(req, acc)| req.saturating_sub(*acc))
            .collect()
    }

    /// Validate `partial` against this request and return the totals it
    /// would produce. Does not modify the request.
    ///
    /// # Errors
    /// - `RequestAlreadyClosed` if the request is closed
    /// - `DimensionMismatch` if `partial` has the wrong length
    /// - `AmountOverflow` if a position would overflow `u64`
    /// - `Overshoot` if a position would exceed its requested value
    pub fn stage_answer(&self, partial: &[u64]) -> Result<Vec<u64>> {
        if !self.is_open() {
            return Err(CoaError::RequestAlreadyClosed(self.number));
        }
        if partial.len() != self.requested.len() {
            return Err(CoaError::DimensionMismatch {
                expected: self.requested.len(),
                actual: partial.len(),
            });
        }

        let mut staged = Vec::with_capacity(partial.len());
        for (position, ((acc, add), req)) in self
            .accumulated
            .iter()
            .zip(partial)
            .zip(&self.requested)
            .enumerate()
        {
            let total = acc
                .checked_add(*add)
                .ok_or(CoaError::AmountOverflow { position })?;
            if total > *req {
                return Err(CoaError::Overshoot {
                    position,
                    requested: *req,
                    accumulated: total,
                });
            }
            staged.push(total);
        }
        Ok(staged)
    }

    /// Store totals produced by [`Self::stage_answer`]. Closes the request
    /// when they reconcile. Returns `true` if this call closed it.
    ///
    /// # Errors
    /// - `RequestAlreadyClosed` if the request is closed
    /// - `DimensionMismatch` if `staged` has the wrong length
    /// - `Internal` if any staged total is lower than the current one
    pub fn commit_answer(&mut self, staged: Vec<u64>) -> Result<bool> {
        if !self.is_open() {
            return Err(CoaError::RequestAlreadyClosed(self.number));
        }
        if staged.len() != self.accumulated.len() {
            return Err(CoaError::DimensionMismatch {
                expected: self.accumulated.len(),
                actual: staged.len(),
            });
        }
        if staged.iter().zip(&self.accumulated).any(|(new, old)| new < old) {
            return Err(CoaError::Internal(format!(
                "staged totals for {} would decrease an accumulated amount",
                self.number
            )));
        }

        self.accumulated = staged;
        self.answer_count = self.answer_count.saturating_add(1);

        if self.is_reconciled() {
            self.status = RequestStatus::Closed;
            self.closed_at = Some(Utc::now());
            return Ok(true);
        }
        Ok(false)
    }
}
