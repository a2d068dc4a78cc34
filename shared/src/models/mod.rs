//! Domain models for the surgical inventory platform

mod analytics;
mod directory;
mod inventory;
mod transaction;
mod user;

pub use analytics::*;
pub use directory::*;
pub use inventory::*;
pub use transaction::*;
pub use user::*;
