//! Membership Ledger
//!
//! The authoritative state machine for player membership lifecycle:
//! assignment, audited usage adjustment, manual override, status
//! transitions, summary projection and the read-through summary cache.

pub mod cache;
pub mod projector;
pub mod service;

pub use cache::SummaryCache;
pub use service::MembershipLedger;
