//! Error taxonomy for the simulation core.
//!
//! All fatal conditions propagate synchronously out of the call that
//! triggered them; the core performs no retries. Idempotent-operation
//! notices (re-linking an existing edge, unlinking a missing edge, releasing
//! an already-free port slot) are **not** errors — they are logged through
//! `tracing` and the operation completes as a no-op.

use thiserror::Error;

use crate::types::Guid;

/// Errors raised by registry, topology, and port-pool operations.
#[derive(Error, Debug)]
pub enum SimError {
    /// An argument to a graph or typed-access operation does not satisfy the
    /// node capability contract (for example, an endpoint that was never
    /// registered, or a GUID resolved as the wrong variant).
    #[error("invalid operand: {0}")]
    InvalidOperand(String),

    /// A GUID was resolved that is not present in the registry. This
    /// indicates a programming error or use-after-deregistration.
    #[error("unknown GUID {0}")]
    UnknownGuid(Guid),

    /// A port-pool allocation was requested with no free slot. Port counts
    /// are a physical constraint fixed at construction, so this is a hard
    /// stop for the allocation call.
    #[error("{pool} port pool exhausted (all {capacity} slots occupied)")]
    PoolExhausted { pool: String, capacity: usize },

    /// A node that already holds a GUID was registered a second time.
    #[error("node {0} is already registered")]
    DuplicateRegistration(Guid),
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SimError::UnknownGuid(42);
        assert_eq!(err.to_string(), "unknown GUID 42");

        let err = SimError::PoolExhausted {
            pool: "rf".to_string(),
            capacity: 2,
        };
        assert!(err.to_string().contains("rf port pool exhausted"));
        assert!(err.to_string().contains("2 slots"));
    }

    #[test]
    fn test_duplicate_registration_message() {
        let err = SimError::DuplicateRegistration(7);
        assert_eq!(err.to_string(), "node 7 is already registered");
    }
}
