use std::fmt;

/// Contract-level precondition failure
///
/// Returned when a resolver is built over a contract that cannot be resolved
/// against at all. These are caller errors, not request validation outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// The document declares no `paths` object
    MissingPaths {
        /// Contract title, for diagnostics
        title: String,
    },
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractError::MissingPaths { title } => {
                write!(
                    f,
                    "Contract error: '{}' declares no paths. \
                    A contract must be loaded with a paths object before requests can be resolved.",
                    title
                )
            }
        }
    }
}

impl std::error::Error for ContractError {}
