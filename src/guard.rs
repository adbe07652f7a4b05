use crate::models::profile::UserRole;
use crate::session::{SessionState, SessionStatus};

/// What a capability-restricted view should do for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Render the protected content.
    Render,
    /// Render a loading placeholder; do not redirect. Covers both the
    /// initial auth check and the authenticated-but-profile-pending state.
    Loading,
    /// Not authenticated: go to the login view.
    RedirectLogin,
    /// Authenticated but not authorized for this view: go home.
    RedirectHome,
}

/// Pure route-guard decision. Re-evaluate on every session change; the
/// result must never be cached.
///
/// An empty `required_roles` means any authenticated user with a loaded
/// profile may enter.
pub fn evaluate(state: &SessionState, required_roles: &[UserRole]) -> RouteDecision {
    match state.status() {
        SessionStatus::Initializing => RouteDecision::Loading,
        SessionStatus::Anonymous => RouteDecision::RedirectLogin,
        SessionStatus::Authenticated => {
            let Some(profile) = state.profile() else {
                // Authenticated, role unknown: redirecting to login would be
                // wrong, rendering would leak protected content. Hold.
                return RouteDecision::Loading;
            };
            if required_roles.is_empty() || required_roles.contains(&profile.role) {
                RouteDecision::Render
            } else {
                RouteDecision::RedirectHome
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_support::{anonymous, authenticated, initializing};

    const SHELTER_ONLY: &[UserRole] = &[UserRole::Shelter];

    #[test]
    fn initializing_holds_with_loading() {
        assert_eq!(evaluate(&initializing(), SHELTER_ONLY), RouteDecision::Loading);
        assert_eq!(evaluate(&initializing(), &[]), RouteDecision::Loading);
    }

    #[test]
    fn anonymous_redirects_to_login() {
        assert_eq!(evaluate(&anonymous(), SHELTER_ONLY), RouteDecision::RedirectLogin);
        assert_eq!(evaluate(&anonymous(), &[]), RouteDecision::RedirectLogin);
    }

    #[test]
    fn authenticated_without_profile_holds_with_loading() {
        let state = authenticated("uid-1", None);
        assert_eq!(evaluate(&state, SHELTER_ONLY), RouteDecision::Loading);
        assert_eq!(evaluate(&state, &[]), RouteDecision::Loading);
    }

    #[test]
    fn no_required_roles_renders_for_any_profile() {
        let state = authenticated("uid-1", Some(UserRole::Adopter));
        assert_eq!(evaluate(&state, &[]), RouteDecision::Render);
    }

    #[test]
    fn wrong_role_redirects_home_not_login() {
        let state = authenticated("uid-1", Some(UserRole::Adopter));
        assert_eq!(evaluate(&state, SHELTER_ONLY), RouteDecision::RedirectHome);
    }

    #[test]
    fn matching_role_renders() {
        let state = authenticated("uid-1", Some(UserRole::Shelter));
        assert_eq!(evaluate(&state, SHELTER_ONLY), RouteDecision::Render);
        assert_eq!(
            evaluate(&state, &[UserRole::Adopter, UserRole::Shelter]),
            RouteDecision::Render
        );
    }
}
