//! # coa-types
//!
//! Shared types, errors, and configuration for the **CoA exchange**.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`BusinessId`], [`RequestNumber`], [`ContentRef`], [`PublicKey`]
//! - **Registry model**: [`Business`]
//! - **Request model**: [`CoaRequest`], [`RequestStatus`]
//! - **Notifications**: [`CoaEvent`], [`EventRecord`]
//! - **Configuration**: [`ExchangeConfig`]
//! - **Errors**: [`CoaError`] with `COA_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod business;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod request;

pub use business::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use request::*;

// Constants are accessed via `coa_types::constants::FOO`.
