use thiserror::Error;

/// Raised when a raw value cannot become one of the domain's enumerations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("unknown lead status `{0}`")]
    UnknownLeadStatus(String),
    #[error("unknown project status `{0}`")]
    UnknownProjectStatus(String),
}
