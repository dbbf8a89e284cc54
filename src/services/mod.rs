//! Service layer for preset management and application.
//!
//! Services coordinate the models with the external collaborators declared
//! in [`crate::ports`].

pub mod coordinator;
pub mod latest_request;
pub mod preset_store;
pub mod resolution;

// Re-export commonly used types
pub use coordinator::{ApplyOutcome, Collaborators, PresetApplicationCoordinator};
pub use latest_request::{LatestRequest, RequestTicket};
pub use preset_store::PresetStore;
pub use resolution::{is_no_match, BaseModelPatterns};
