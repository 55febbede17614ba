//! Deterministic URL slugs for services, projects, categories and packages.
//!
//! Slugs contain only lowercase ASCII alphanumerics separated by single
//! hyphens. Uniqueness is the store's job: a colliding save fails with a
//! duplicate error instead of being silently suffixed.

use slug::slugify;
use thiserror::Error;

/// Errors that can occur while generating a slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
}

/// Derive a slug from the provided human-readable text.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let candidate = slugify(input);

    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Use the explicit slug when one was supplied, otherwise derive it from `fallback`.
pub fn slug_or_derive(explicit: Option<&str>, fallback: &str) -> Result<String, SlugError> {
    match explicit.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => derive_slug(value),
        None => derive_slug(fallback),
    }
}
