//! Identity and social-graph core.
//!
//! Authenticates users by credential, issues signed expiring session tokens,
//! and keeps the symmetric follow relationship between user records
//! eventually consistent without a multi-record transaction. HTTP routing
//! and database wiring are external collaborators: inbound adapters call the
//! domain services, outbound adapters implement the [`domain::ports`]
//! traits.

pub mod config;
pub mod domain;
pub mod outbound;

pub use config::AuthSettings;
