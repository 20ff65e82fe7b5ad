//! Service-level errors and the typed access result.
//!
//! Negatives travel on two channels. Authorization and absence are values:
//! `None`, `false`, an empty list, or [`Access::NotMember`]. Invariant
//! violations and backend failures are [`ServiceError`]s.

use reelog_storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("user is already a member of the group")]
    DuplicateMember,

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a members-only read. Distinguishes a missing group from a
/// requester outside it; callers that don't care can treat both as empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Access<T> {
    Granted(T),
    NotMember,
    NotFound,
}

impl<T> Access<T> {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted(_))
    }

    pub fn granted(self) -> Option<T> {
        match self {
            Access::Granted(value) => Some(value),
            _ => None,
        }
    }
}

/// Collapse a store `NotFound` into `None`, keeping other errors.
pub(crate) fn optional<T>(result: Result<T, StoreError>) -> Result<Option<T>, StoreError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(StoreError::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_granted() {
        let access = Access::Granted(3);
        assert!(access.is_granted());
        assert_eq!(access.granted(), Some(3));
    }

    #[test]
    fn test_access_negatives() {
        assert!(!Access::<i32>::NotMember.is_granted());
        assert!(!Access::<i32>::NotFound.is_granted());
        assert_eq!(Access::<i32>::NotMember.granted(), None);
    }

    #[test]
    fn test_optional_maps_not_found() {
        assert_eq!(optional::<i32>(Err(StoreError::NotFound)).unwrap(), None);
        assert_eq!(optional(Ok(1)).unwrap(), Some(1));
        assert!(optional::<i32>(Err(StoreError::Conflict)).is_err());
    }
}
