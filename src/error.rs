use thiserror::Error;

/// Configuration errors raised while building the panel registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("panel '{0}' is already registered")]
    DuplicateTitle(String),
    #[error("panel '{0}' must allow at least one instance")]
    ZeroInstances(String),
}
