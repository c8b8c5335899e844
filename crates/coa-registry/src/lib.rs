//! # coa-registry
//!
//! **Identity Registry**: the single source of truth for which accounts are
//! recognized businesses and what their public keys are.
//!
//! - [`IdentityRegistry`]: authority-gated, append-only business store
//! - [`ParticipantDirectory`]: the read-only lookup seam other components use
//!
//! Registration is gated to one administrative authority, fixed at
//! construction and movable only through
//! [`IdentityRegistry::transfer_authority`].

pub mod directory;
pub mod registry;

pub use directory::ParticipantDirectory;
pub use registry::IdentityRegistry;
