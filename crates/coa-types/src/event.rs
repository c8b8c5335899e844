//! Notifications emitted by the exchange.
//!
//! These are the only externally observable asynchronous signals. The two
//! participating businesses watch them to drive the protocol forward.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, ContentRef, RequestNumber};

/// A state change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoaEvent {
    /// A new request was created.
    Requested {
        /// The requester.
        sender: AccountId,
        /// The responder.
        receiver: AccountId,
        request_number: RequestNumber,
        content_ref: ContentRef,
        requested: Vec<u64>,
    },
    /// The responder submitted a partial answer.
    Answered {
        request_number: RequestNumber,
        partial: Vec<u64>,
    },
    /// Totals reconciled and the request closed.
    CoaClosed {
        /// The responder.
        sender: AccountId,
        /// The requester.
        receiver: AccountId,
        request_number: RequestNumber,
    },
}

impl CoaEvent {
    /// The request this notification is about.
    #[must_use]
    pub fn request_number(&self) -> RequestNumber {
        match self {
            Self::Requested { request_number, .. }
            | Self::Answered { request_number, .. }
            | Self::CoaClosed { request_number, .. } => *request_number,
        }
    }

    /// Short name used in logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Requested { .. } => "Requested",
            Self::Answered { .. } => "Answered",
            Self::CoaClosed { .. } => "CoaClosed",
        }
    }
}

/// A notification together with its position in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Strictly increasing position, starting at 1.
    pub seq: u64,
    pub emitted_at: DateTime<Utc>,
    pub event: CoaEvent,
}
