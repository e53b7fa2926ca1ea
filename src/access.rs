//! Role-based authorization with an explicit request context.
//!
//! The caller's role travels in a [`RequestContext`] instead of process-wide
//! state. A check passes only when the role matches the required role exactly.

use crate::error::{Result, SafeWriteError};

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SafeWriteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(SafeWriteError::Other(anyhow::anyhow!(
                "Unknown role '{}': expected 'admin' or 'user'",
                other
            ))),
        }
    }
}

/// Result of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied { required: Role, actual: Role },
}

/// Who is making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    role: Role,
}

impl RequestContext {
    pub fn new(role: Role) -> Self {
        Self { role }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Fails with [`SafeWriteError::AccessDenied`] unless the role matches.
    pub fn require(&self, required: Role) -> Result<()> {
        match authorize(self, required) {
            Access::Allowed => Ok(()),
            Access::Denied { required, actual } => {
                Err(SafeWriteError::AccessDenied { required, actual })
            }
        }
    }
}

/// Compares the context's role against `required`.
pub fn authorize(ctx: &RequestContext, required: Role) -> Access {
    if ctx.role == required {
        log::debug!("Access granted for role '{}'", required);
        Access::Allowed
    } else {
        log::warn!(
            "Access denied: requires role '{}', current role is '{}'",
            required,
            ctx.role
        );
        Access::Denied {
            required,
            actual: ctx.role,
        }
    }
}

/// Runs `f` only when `ctx` holds the `required` role.
pub fn guarded<T>(ctx: &RequestContext, required: Role, f: impl FnOnce() -> T) -> Result<T> {
    ctx.require(required)?;
    Ok(f())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_role_is_allowed() {
        let ctx = RequestContext::new(Role::Admin);
        assert_eq!(authorize(&ctx, Role::Admin), Access::Allowed);
    }

    #[test]
    fn test_admin_is_not_a_user() {
        let ctx = RequestContext::new(Role::Admin);
        assert_eq!(
            authorize(&ctx, Role::User),
            Access::Denied {
                required: Role::User,
                actual: Role::Admin,
            }
        );
    }

    #[test]
    fn test_guarded_skips_body_when_denied() {
        let ctx = RequestContext::new(Role::User);
        let mut called = false;

        let result = guarded(&ctx, Role::Admin, || called = true);

        assert!(matches!(
            result,
            Err(SafeWriteError::AccessDenied {
                required: Role::Admin,
                actual: Role::User,
            })
        ));
        assert!(!called);
    }

    #[test]
    fn test_guarded_returns_value_when_allowed() {
        let ctx = RequestContext::new(Role::Admin);
        let secret = guarded(&ctx, Role::Admin, || "server password").unwrap();
        assert_eq!(secret, "server password");
    }

    #[test]
    fn test_denied_error_message() {
        let err = RequestContext::new(Role::User)
            .require(Role::Admin)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Access denied: requires role 'admin', current role is 'user'"
        );
    }

    #[test]
    fn test_parse_role() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" User ".parse::<Role>().unwrap(), Role::User);
        assert!("root".parse::<Role>().is_err());
    }
}
