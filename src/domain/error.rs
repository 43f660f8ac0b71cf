use thiserror::Error;

/// Violations of the duplicate-before-consume body contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BodyError {
    #[error("response body already consumed")]
    AlreadyConsumed,
}
