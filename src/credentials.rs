//! Environment-sourced JIRA credentials.
//!
//! Credentials are read from the process environment at the point of use and
//! never cached, so they can be rotated without restarting long-running
//! callers.

use std::env;

/// Environment variable holding the JIRA user name.
pub const USER_VAR: &str = "JIRA_USER";

/// Environment variable holding the JIRA password.
pub const PASSWORD_VAR: &str = "JIRA_PASSWORD";

/// Read the credential pair from the environment.
///
/// Unset variables come back as empty strings; the server rejects those with
/// a 401 like any other bad credentials.
pub(crate) fn lookup() -> (String, String) {
    let user = env::var(USER_VAR).unwrap_or_default();
    let password = env::var(PASSWORD_VAR).unwrap_or_default();
    (user, password)
}

/// Check whether the JIRA credentials are absent from the environment.
///
/// Returns `true` iff either `JIRA_USER` or `JIRA_PASSWORD` is unset or
/// empty.
pub fn credentials_missing() -> bool {
    let (user, password) = lookup();
    user.is_empty() || password.is_empty()
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn clear_env() {
        env::remove_var(USER_VAR);
        env::remove_var(PASSWORD_VAR);
    }

    #[test]
    #[serial]
    fn test_missing_when_both_unset() {
        clear_env();
        assert!(credentials_missing());
    }

    #[test]
    #[serial]
    fn test_missing_when_password_unset() {
        clear_env();
        env::set_var(USER_VAR, "user");
        assert!(credentials_missing());
    }

    #[test]
    #[serial]
    fn test_missing_when_user_unset() {
        clear_env();
        env::set_var(PASSWORD_VAR, "pwd");
        assert!(credentials_missing());
    }

    #[test]
    #[serial]
    fn test_missing_when_user_empty() {
        clear_env();
        env::set_var(USER_VAR, "");
        env::set_var(PASSWORD_VAR, "pwd");
        assert!(credentials_missing());
    }

    #[test]
    #[serial]
    fn test_present_when_both_set() {
        clear_env();
        env::set_var(USER_VAR, "user");
        env::set_var(PASSWORD_VAR, "pwd");
        assert!(!credentials_missing());
        clear_env();
    }
}
