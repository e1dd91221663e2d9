//! Page-level auth guard.
//!
//! The guard resolves a [`PagePolicy`] against the current [`SessionStatus`]
//! and yields a [`GuardOutcome`] telling the frontend shell what to do:
//! render the page, show a named placeholder, or redirect. Role checks go
//! through the pluggable [`RolePolicy`] trait rather than a hard-wired
//! comparison, so deployments can swap the rule without touching the guard.

use crate::constants::Routes;

use super::role::Role;
use super::session::SessionStatus;

/// Placeholder shown while the session is still resolving, unless the
/// policy names its own.
pub const DEFAULT_LOADING_PLACEHOLDER: &str = "loading";

/// Declarative access policy attached to a page.
///
/// An empty policy (the [`Default`]) guards nothing: the page renders for
/// everyone, including anonymous visitors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagePolicy {
    /// Page name. Naming a page marks it guarded even with no other
    /// constraint set: anonymous visitors are denied.
    pub name: Option<String>,
    /// Minimum role required to view the page.
    pub role: Option<Role>,
    /// Placeholder identifier shown while the session is loading.
    pub loading: Option<String>,
    /// Placeholder identifier shown instead of redirecting when access is
    /// denied.
    pub unauthorized: Option<String>,
    /// Redirect target for denied access; defaults to the login route.
    pub redirect: Option<String>,
    /// Hide the page from signed-in users (login and signup pages).
    pub hide_if_authenticated: bool,
}

impl PagePolicy {
    /// Whether the policy places no constraints on the page.
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.role.is_none()
            && self.loading.is_none()
            && self.unauthorized.is_none()
            && self.redirect.is_none()
            && !self.hide_if_authenticated
    }
}

/// What the frontend shell should do with the guarded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Render the page content.
    Render,
    /// Render the named placeholder instead of the page.
    Placeholder(String),
    /// Navigate to the given route.
    Redirect(String),
}

/// Decides whether a user's role satisfies a page's role requirement.
pub trait RolePolicy: Send + Sync {
    /// Whether `actual` satisfies the `required` role.
    fn allows(&self, required: Role, actual: Role) -> bool;
}

/// Level-based policy: a role satisfies a requirement when its privilege
/// level is at least as high (numerically no greater) than the required one.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelRolePolicy;

impl RolePolicy for LevelRolePolicy {
    fn allows(&self, required: Role, actual: Role) -> bool {
        actual.level() <= required.level()
    }
}

/// Policy that grants every role; useful in development and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveRolePolicy;

impl RolePolicy for PermissiveRolePolicy {
    fn allows(&self, _required: Role, _actual: Role) -> bool {
        true
    }
}

/// Resolve a page policy against the current session status.
///
/// ## Invariants
/// - An empty policy always yields [`GuardOutcome::Render`].
/// - A denied visitor receives exactly one outcome: the `unauthorized`
///   placeholder when configured, otherwise a single redirect.
/// - `hide_if_authenticated` sends signed-in users to the home route and
///   never consults the role policy.
pub fn resolve(
    policy: &PagePolicy,
    status: &SessionStatus,
    role_policy: &dyn RolePolicy,
    routes: &Routes,
) -> GuardOutcome {
    if policy.is_empty() {
        return GuardOutcome::Render;
    }

    match status {
        SessionStatus::Loading => GuardOutcome::Placeholder(
            policy
                .loading
                .clone()
                .unwrap_or_else(|| DEFAULT_LOADING_PLACEHOLDER.to_owned()),
        ),
        SessionStatus::Unauthenticated => {
            if policy.hide_if_authenticated {
                return GuardOutcome::Render;
            }
            deny(policy, routes.login)
        }
        SessionStatus::Authenticated(user) => {
            if policy.hide_if_authenticated {
                return GuardOutcome::Redirect(routes.home.to_owned());
            }
            match policy.role {
                Some(required) if !role_policy.allows(required, user.role) => {
                    deny(policy, routes.login)
                }
                _ => GuardOutcome::Render,
            }
        }
    }
}

fn deny(policy: &PagePolicy, fallback: &str) -> GuardOutcome {
    if let Some(placeholder) = &policy.unauthorized {
        return GuardOutcome::Placeholder(placeholder.clone());
    }
    GuardOutcome::Redirect(
        policy
            .redirect
            .clone()
            .unwrap_or_else(|| fallback.to_owned()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Constants;
    use crate::domain::session::SessionUser;
    use crate::domain::user::UserId;
    use rstest::{fixture, rstest};

    #[fixture]
    fn routes() -> Routes {
        Constants::new().routes
    }

    fn authenticated(role: Role) -> SessionStatus {
        SessionStatus::Authenticated(SessionUser {
            id: UserId::random(),
            role,
        })
    }

    fn role_guarded(role: Role) -> PagePolicy {
        PagePolicy {
            role: Some(role),
            ..PagePolicy::default()
        }
    }

    #[rstest]
    fn empty_policy_renders_for_everyone(routes: Routes) {
        let policy = PagePolicy::default();
        for status in [
            SessionStatus::Loading,
            SessionStatus::Unauthenticated,
            authenticated(Role::Audit),
        ] {
            assert_eq!(
                resolve(&policy, &status, &LevelRolePolicy, &routes),
                GuardOutcome::Render
            );
        }
    }

    #[rstest]
    fn loading_uses_default_placeholder(routes: Routes) {
        let outcome = resolve(
            &role_guarded(Role::User),
            &SessionStatus::Loading,
            &LevelRolePolicy,
            &routes,
        );
        assert_eq!(
            outcome,
            GuardOutcome::Placeholder(DEFAULT_LOADING_PLACEHOLDER.to_owned())
        );
    }

    #[rstest]
    fn loading_prefers_configured_placeholder(routes: Routes) {
        let policy = PagePolicy {
            role: Some(Role::User),
            loading: Some("spinner".to_owned()),
            ..PagePolicy::default()
        };
        let outcome = resolve(&policy, &SessionStatus::Loading, &LevelRolePolicy, &routes);
        assert_eq!(outcome, GuardOutcome::Placeholder("spinner".to_owned()));
    }

    #[rstest]
    fn named_page_is_guarded_without_other_constraints(routes: Routes) {
        let policy = PagePolicy {
            name: Some("dashboard".to_owned()),
            ..PagePolicy::default()
        };
        assert!(!policy.is_empty());
        assert_eq!(
            resolve(
                &policy,
                &SessionStatus::Unauthenticated,
                &LevelRolePolicy,
                &routes
            ),
            GuardOutcome::Redirect("/auth/login".to_owned())
        );
        assert_eq!(
            resolve(&policy, &authenticated(Role::User), &LevelRolePolicy, &routes),
            GuardOutcome::Render
        );
    }

    #[rstest]
    fn anonymous_visitor_redirects_to_login_by_default(routes: Routes) {
        let outcome = resolve(
            &role_guarded(Role::User),
            &SessionStatus::Unauthenticated,
            &LevelRolePolicy,
            &routes,
        );
        assert_eq!(outcome, GuardOutcome::Redirect("/auth/login".to_owned()));
    }

    #[rstest]
    fn anonymous_visitor_honours_configured_redirect(routes: Routes) {
        let policy = PagePolicy {
            role: Some(Role::User),
            redirect: Some("/welcome".to_owned()),
            ..PagePolicy::default()
        };
        let outcome = resolve(
            &policy,
            &SessionStatus::Unauthenticated,
            &LevelRolePolicy,
            &routes,
        );
        assert_eq!(outcome, GuardOutcome::Redirect("/welcome".to_owned()));
    }

    #[rstest]
    fn unauthorized_placeholder_wins_over_redirect(routes: Routes) {
        let policy = PagePolicy {
            role: Some(Role::Admin),
            unauthorized: Some("forbidden".to_owned()),
            redirect: Some("/welcome".to_owned()),
            ..PagePolicy::default()
        };
        let outcome = resolve(
            &policy,
            &SessionStatus::Unauthenticated,
            &LevelRolePolicy,
            &routes,
        );
        assert_eq!(outcome, GuardOutcome::Placeholder("forbidden".to_owned()));
    }

    #[rstest]
    #[case(Role::Admin, Role::Superadmin, GuardOutcome::Render)]
    #[case(Role::Admin, Role::Admin, GuardOutcome::Render)]
    #[case(Role::Admin, Role::User, GuardOutcome::Redirect("/auth/login".to_owned()))]
    #[case(Role::User, Role::Audit, GuardOutcome::Redirect("/auth/login".to_owned()))]
    fn level_policy_compares_privilege(
        routes: Routes,
        #[case] required: Role,
        #[case] actual: Role,
        #[case] expected: GuardOutcome,
    ) {
        let outcome = resolve(
            &role_guarded(required),
            &authenticated(actual),
            &LevelRolePolicy,
            &routes,
        );
        assert_eq!(outcome, expected);
    }

    #[rstest]
    fn permissive_policy_grants_every_role(routes: Routes) {
        let outcome = resolve(
            &role_guarded(Role::Superadmin),
            &authenticated(Role::Audit),
            &PermissiveRolePolicy,
            &routes,
        );
        assert_eq!(outcome, GuardOutcome::Render);
    }

    #[rstest]
    fn hidden_page_redirects_signed_in_users_home(routes: Routes) {
        let policy = PagePolicy {
            hide_if_authenticated: true,
            ..PagePolicy::default()
        };
        assert_eq!(
            resolve(&policy, &authenticated(Role::User), &LevelRolePolicy, &routes),
            GuardOutcome::Redirect("/".to_owned())
        );
        assert_eq!(
            resolve(
                &policy,
                &SessionStatus::Unauthenticated,
                &LevelRolePolicy,
                &routes
            ),
            GuardOutcome::Render
        );
    }

    #[rstest]
    fn authenticated_without_role_requirement_renders(routes: Routes) {
        let policy = PagePolicy {
            unauthorized: Some("forbidden".to_owned()),
            ..PagePolicy::default()
        };
        let outcome = resolve(
            &policy,
            &authenticated(Role::Audit),
            &LevelRolePolicy,
            &routes,
        );
        assert_eq!(outcome, GuardOutcome::Render);
    }
}
