//! Capability store for Warden: durable users and roles.
//!
//! The store is a collaborator of the session core, not part of it. The
//! core only sees the [`CapabilityStore`] trait; which backend sits
//! behind it is the deployment's choice.
//!
//! # Key types
//!
//! - [`CapabilityStore`] — the operations the service needs over `User`
//!   and `Role` records
//! - [`MemoryStore`] — an in-process implementation
//! - [`StoreError`] — not-found and conflict conditions, kept distinct
//!   from backend failures

mod error;
mod memory;
mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::CapabilityStore;
