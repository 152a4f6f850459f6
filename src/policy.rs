use crate::error::ApiError;
use crate::middleware::AuthUser;

/// The three access policies a resource can be guarded by.
///
/// A single synchronous decision per request based on who is calling and
/// whether the operation writes. Ownership scoping (own reservations/tickets
/// only) is applied separately in the queries themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Reads open to anyone; writes require a staff account.
    AdminOrReadOnly,
    /// Every operation, reads included, requires an authenticated user.
    Authorized,
    /// Reads open to anyone; writes require any authenticated user.
    AuthorizedOrReadOnly,
}

pub fn authorize(policy: Policy, user: Option<&AuthUser>, write: bool) -> Result<(), ApiError> {
    match policy {
        Policy::AdminOrReadOnly => {
            if !write {
                return Ok(());
            }
            match user {
                None => Err(ApiError::Unauthenticated),
                Some(user) if user.is_staff => Ok(()),
                Some(_) => Err(ApiError::PermissionDenied(
                    "Staff access required".to_string(),
                )),
            }
        }
        Policy::Authorized => match user {
            Some(_) => Ok(()),
            None => Err(ApiError::Unauthenticated),
        },
        Policy::AuthorizedOrReadOnly => {
            if !write {
                return Ok(());
            }
            match user {
                Some(_) => Ok(()),
                None => Err(ApiError::Unauthenticated),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visitor() -> AuthUser {
        AuthUser {
            id: 1,
            email: "visitor@example.com".to_string(),
            is_staff: false,
        }
    }

    fn staff() -> AuthUser {
        AuthUser {
            id: 2,
            email: "admin@example.com".to_string(),
            is_staff: true,
        }
    }

    #[test]
    fn anonymous_can_read_admin_guarded_resources() {
        assert!(authorize(Policy::AdminOrReadOnly, None, false).is_ok());
    }

    #[test]
    fn anonymous_write_is_unauthenticated_not_forbidden() {
        let err = authorize(Policy::AdminOrReadOnly, None, true).unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[test]
    fn non_staff_write_to_admin_resource_is_forbidden() {
        let user = visitor();
        let err = authorize(Policy::AdminOrReadOnly, Some(&user), true).unwrap_err();
        assert!(matches!(err, ApiError::PermissionDenied(_)));
    }

    #[test]
    fn staff_can_write_admin_resources() {
        let user = staff();
        assert!(authorize(Policy::AdminOrReadOnly, Some(&user), true).is_ok());
    }

    #[test]
    fn authorized_policy_guards_reads_too() {
        let err = authorize(Policy::Authorized, None, false).unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));

        let user = visitor();
        assert!(authorize(Policy::Authorized, Some(&user), false).is_ok());
    }

    #[test]
    fn authorized_or_read_only_lets_any_user_write() {
        assert!(authorize(Policy::AuthorizedOrReadOnly, None, false).is_ok());

        let err = authorize(Policy::AuthorizedOrReadOnly, None, true).unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));

        let user = visitor();
        assert!(authorize(Policy::AuthorizedOrReadOnly, Some(&user), true).is_ok());
    }
}
