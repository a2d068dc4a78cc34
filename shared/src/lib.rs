//! Shared types and rules for the surgical inventory platform
//!
//! This crate holds the domain models, the role permission matrix and the
//! pricing rules used by both the engine and the browser bindings (via WASM).

pub mod models;
pub mod pricing;
pub mod types;
pub mod validation;

pub use models::*;
pub use pricing::*;
pub use types::*;
pub use validation::*;
