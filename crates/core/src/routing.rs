//! Route guard rules.
//!
//! [`redirect_target`] is a pure function of `(path, authenticated, role)`:
//! the UI evaluates it once per navigation and replaces the route when it
//! returns `Some`. Applying it to its own output never redirects again.

use crate::model::Role;

pub const ROOT_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const SIGNUP_PATH: &str = "/signup";
pub const STUDENT_HOME: &str = "/dashboard";
pub const ADMIN_HOME: &str = "/admin";
pub const RESULTS_PATH: &str = "/results";

const STUDENT_AREAS: [&str; 3] = [STUDENT_HOME, "/exam", RESULTS_PATH];
const ADMIN_AREAS: [&str; 1] = [ADMIN_HOME];
const PUBLIC_PATHS: [&str; 3] = [ROOT_PATH, LOGIN_PATH, SIGNUP_PATH];

#[must_use]
pub fn home_path(role: Role) -> &'static str {
    match role {
        Role::Admin => ADMIN_HOME,
        Role::Student => STUDENT_HOME,
    }
}

/// Drops query/fragment and a trailing slash so `/admin/` and `/admin?x=1`
/// are judged like `/admin`.
fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else if path.is_empty() {
        ROOT_PATH
    } else {
        path
    }
}

/// Segment-aware prefix match: `/admin` covers `/admin/exams` but not `/administrator`.
fn within(path: &str, area: &str) -> bool {
    path == area
        || path
            .strip_prefix(area)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[must_use]
pub fn is_auth_page(path: &str) -> bool {
    matches!(normalize(path), LOGIN_PATH | SIGNUP_PATH)
}

#[must_use]
pub fn is_protected(path: &str) -> bool {
    let path = normalize(path);
    STUDENT_AREAS
        .iter()
        .chain(ADMIN_AREAS.iter())
        .any(|area| within(path, area))
}

#[must_use]
pub fn can_access(path: &str, role: Role) -> bool {
    let path = normalize(path);
    if ADMIN_AREAS.iter().any(|area| within(path, area)) {
        return role == Role::Admin;
    }
    if STUDENT_AREAS.iter().any(|area| within(path, area)) {
        return role == Role::Student;
    }
    PUBLIC_PATHS.contains(&path)
}

/// Where to send the user instead of `path`, if anywhere.
#[must_use]
pub fn redirect_target(path: &str, authenticated: bool, role: Option<Role>) -> Option<&'static str> {
    let path = normalize(path);

    if authenticated && path == ROOT_PATH {
        if let Some(role) = role {
            return Some(home_path(role));
        }
    }

    if !authenticated && is_protected(path) {
        return Some(LOGIN_PATH);
    }

    if authenticated && is_auth_page(path) {
        return Some(role.map_or(ROOT_PATH, home_path));
    }

    if authenticated {
        if let Some(role) = role {
            if !can_access(path, role) {
                return Some(home_path(role));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_users_are_sent_to_login_from_protected_paths() {
        assert_eq!(redirect_target("/dashboard", false, None), Some(LOGIN_PATH));
        assert_eq!(redirect_target("/exam/e1", false, None), Some(LOGIN_PATH));
        assert_eq!(redirect_target("/admin/exams", false, None), Some(LOGIN_PATH));
        assert_eq!(redirect_target("/login", false, None), None);
        assert_eq!(redirect_target("/", false, None), None);
    }

    #[test]
    fn signed_in_users_leave_auth_pages() {
        assert_eq!(redirect_target("/login", true, Some(Role::Student)), Some(STUDENT_HOME));
        assert_eq!(redirect_target("/signup", true, Some(Role::Admin)), Some(ADMIN_HOME));
        assert_eq!(redirect_target("/login", true, None), Some(ROOT_PATH));
    }

    #[test]
    fn roles_are_kept_in_their_areas() {
        assert_eq!(redirect_target("/admin", true, Some(Role::Student)), Some(STUDENT_HOME));
        assert_eq!(redirect_target("/results/a1", true, Some(Role::Admin)), Some(ADMIN_HOME));
        assert_eq!(redirect_target("/exam/e1", true, Some(Role::Student)), None);
        assert_eq!(redirect_target("/admin/grading/a1", true, Some(Role::Admin)), None);
        assert_eq!(redirect_target("/", true, Some(Role::Admin)), Some(ADMIN_HOME));
    }

    #[test]
    fn prefix_matching_respects_segments() {
        assert!(!is_protected("/administrator"));
        assert!(is_protected("/admin/"));
        assert!(is_protected("/results?page=2"));
        assert_eq!(
            redirect_target("/administrator", true, Some(Role::Admin)),
            Some(ADMIN_HOME)
        );
    }

    #[test]
    fn guard_is_idempotent() {
        let paths = [
            "/", "/login", "/signup", "/dashboard", "/exam/e1", "/results", "/results/a1",
            "/admin", "/admin/exams", "/admin/exam/e1", "/admin/grading/a1", "/nowhere",
        ];
        let states = [
            (false, None),
            (true, None),
            (true, Some(Role::Student)),
            (true, Some(Role::Admin)),
        ];
        for path in paths {
            for (authenticated, role) in states {
                let first = redirect_target(path, authenticated, role);
                let landed = first.unwrap_or(path);
                assert_eq!(
                    redirect_target(landed, authenticated, role),
                    None,
                    "{path} -> {landed} should be stable for {authenticated}/{role:?}"
                );
            }
        }
    }
}
