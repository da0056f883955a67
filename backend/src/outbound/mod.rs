//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern: adapters are thin
//! translators between domain types and infrastructure-specific
//! representations and contain no business logic. Database-backed credential
//! stores live outside this core; the in-memory adapter here serves tests
//! and single-process deployments.

pub mod persistence;
