//! Persistence adapters for the credential store port.
//!
//! Adapters only translate between stored representations and domain types;
//! uniqueness enforcement and idempotent set mutations are part of the port
//! contract every implementation must honour.

mod memory;

pub use memory::InMemoryCredentialStore;
