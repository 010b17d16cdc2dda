// HTTP API routes
//
// Each submodule handles one resource with its own AppState.

pub mod admin;
pub mod common;
pub mod events;
pub mod intake;
pub mod providers;
pub mod validation;

// Re-export common types
pub use common::{ErrorResponse, ListResponse, ToastedResponse};
