//! Core types for storyvault
//!
//! Story domain records, typed payloads, the working-state snapshot and
//! environment configuration shared by the storage, service and CLI crates.

mod chapter;
mod character;
pub mod constants;
mod env_config;
mod error;
mod evolution;
mod plot;
mod relationship;
mod story;
mod working_state;
mod world;

pub use chapter::*;
pub use character::*;
pub use env_config::*;
pub use error::*;
pub use evolution::*;
pub use plot::*;
pub use relationship::*;
pub use story::*;
pub use working_state::*;
pub use world::*;
