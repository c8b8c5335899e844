//! # coa-exchange
//!
//! **Exchange State Machine**: two-party Certificate of Analysis
//! reconciliation between registered businesses.
//!
//! ## Architecture
//!
//! 1. **CoaExchange**: owns every request, validates callers against a
//!    [`coa_registry::ParticipantDirectory`], accumulates partial answers,
//!    and closes requests on exact match
//! 2. **EventLog**: ordered, append-only notifications (`Requested`,
//!    `Answered`, `CoaClosed`) consumed by cursor
//! 3. **Ledger**: single-writer composition root guarding registry and
//!    exchange behind one lock
//!
//! ## Request Flow
//!
//! ```text
//! requester → Ledger.new_request() → Registry check → Requested
//! responder → Ledger.answer() ×N   → accumulate     → Answered
//!                                  → totals == requested → CoaClosed
//! ```

pub mod event_log;
pub mod exchange;
pub mod ledger;

pub use event_log::EventLog;
pub use exchange::CoaExchange;
pub use ledger::Ledger;
