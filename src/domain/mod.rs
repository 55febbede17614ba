//! Domain layer types and invariants.

pub mod entities;
pub mod error;
pub mod industry;
pub mod site;
pub mod slug;
pub mod types;
