//! Permission enforcement against the `permissions` claim.

use crate::services::auth::{error::AuthError, verifier::DecodedClaims};

/// What a route demands of an already-verified caller.
///
/// `Authenticated` is the explicit opt-out: any valid token will do. There is no
/// "empty permission means open" shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Authenticated,
    Permission(String),
}

impl Requirement {
    pub fn permission(name: impl Into<String>) -> Self {
        Self::Permission(name.into())
    }
}

pub fn check(claims: &DecodedClaims, requirement: &Requirement) -> Result<(), AuthError> {
    let required = match requirement {
        Requirement::Authenticated => return Ok(()),
        Requirement::Permission(required) => required,
    };

    let granted = claims
        .permissions
        .as_ref()
        .ok_or(AuthError::PermissionsClaimMissing)?;

    if !granted.contains(required) {
        return Err(AuthError::PermissionDenied(required.clone()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn claims(permissions: Option<&[&str]>) -> DecodedClaims {
        DecodedClaims {
            issuer: "https://casting-agency.eu.auth0.com/".into(),
            audience: vec!["casting".into()],
            subject: "auth0|assistant".into(),
            expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            permissions: permissions
                .map(|p| p.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>()),
        }
    }

    #[test]
    fn held_permission_is_allowed() {
        let claims = claims(Some(&["get:movies", "get:actors"]));
        assert_eq!(check(&claims, &Requirement::permission("get:movies")), Ok(()));
    }

    #[test]
    fn missing_permission_is_denied() {
        let claims = claims(Some(&["get:movies", "get:actors"]));
        assert_eq!(
            check(&claims, &Requirement::permission("post:movies")),
            Err(AuthError::PermissionDenied("post:movies".into()))
        );
    }

    #[test]
    fn membership_is_case_sensitive() {
        let claims = claims(Some(&["GET:movies"]));
        assert_eq!(
            check(&claims, &Requirement::permission("get:movies")),
            Err(AuthError::PermissionDenied("get:movies".into()))
        );
    }

    #[test]
    fn absent_claim_is_reported_as_such() {
        let claims = claims(None);
        assert_eq!(
            check(&claims, &Requirement::permission("get:movies")),
            Err(AuthError::PermissionsClaimMissing)
        );
    }

    #[test]
    fn authenticated_requirement_needs_no_claim() {
        assert_eq!(check(&claims(None), &Requirement::Authenticated), Ok(()));
        assert_eq!(
            check(&claims(Some(&[])), &Requirement::Authenticated),
            Ok(())
        );
    }

    #[test]
    fn empty_permission_name_is_not_an_opt_out() {
        let claims = claims(Some(&["get:movies"]));
        assert_eq!(
            check(&claims, &Requirement::permission("")),
            Err(AuthError::PermissionDenied(String::new()))
        );
    }
}
