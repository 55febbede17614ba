//! Application services layer.

pub mod admin;
pub mod content;
pub mod error;
pub mod export;
pub mod leads;
pub mod notify;
pub mod pagination;
pub mod public;
pub mod rate_limit;
pub mod repos;
pub mod sitemap;
pub mod validation;
