use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum CargoflowError {
    /// A record is missing required fields and was rejected before mapping.
    ValidationError(String),
    /// The upstream provider could not be reached or refused the call.
    ProviderUnavailable(String),
    /// The per-provider request budget for the current window is exhausted.
    RateLimited(String),
    /// A carrier/type had no mapping rule; a safe default was substituted.
    MappingIncomplete(String),
    PersistenceError(String),
    EventError(String),
    ConfigurationError(String),
}

impl fmt::Display for CargoflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CargoflowError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            CargoflowError::ProviderUnavailable(msg) => write!(f, "Provider unavailable: {msg}"),
            CargoflowError::RateLimited(msg) => write!(f, "Rate limited: {msg}"),
            CargoflowError::MappingIncomplete(msg) => write!(f, "Mapping incomplete: {msg}"),
            CargoflowError::PersistenceError(msg) => write!(f, "Persistence error: {msg}"),
            CargoflowError::EventError(msg) => write!(f, "Event error: {msg}"),
            CargoflowError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for CargoflowError {}

pub type Result<T> = std::result::Result<T, CargoflowError>;
