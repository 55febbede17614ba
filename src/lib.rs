//! J-Digital Solutions site backend.
//!
//! Layers follow the usual split: `domain` holds records and pure rules,
//! `application` holds services and repository traits, `infra` holds the
//! PostgreSQL, HTTP, email and storage adapters, and `cache` holds the public
//! response cache and its invalidation table.

pub mod application;
pub mod cache;
pub mod client;
pub mod config;
pub mod domain;
pub mod infra;
