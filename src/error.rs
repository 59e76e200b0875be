//! Error handling for the transition engine.
//!
//! This module defines [`NavigationError`] — the value carried by every
//! navigation that fails for a *reason*. Silent outcomes (a superseded
//! transition, a same-location no-op, a redirect) carry no error at all;
//! see the controller documentation for the full taxonomy.
//!
//! # Examples
//!
//! ```
//! use waymark::NavigationError;
//!
//! let err = NavigationError::aborted("/settings", "/admin");
//! assert_eq!(err.to_string(), "navigation from '/settings' to '/admin' aborted");
//!
//! let err = NavigationError::custom("session expired");
//! assert_eq!(err.to_string(), "session expired");
//! ```

use std::fmt;

// ============================================================================
// NavigationError
// ============================================================================

/// Reasons a navigation can fail.
///
/// Implements [`std::error::Error`] and [`Display`](std::fmt::Display) for
/// idiomatic error handling. Checkpoints produce these through
/// [`GuardNext::fail`](crate::GuardNext::fail); the engine synthesizes
/// [`Aborted`](Self::Aborted) when a checkpoint vetoes without supplying its
/// own error.
#[derive(Debug, Clone)]
pub enum NavigationError {
    /// A checkpoint vetoed the transition without supplying its own error.
    Aborted {
        /// Full path of the location the navigation started from.
        from: String,
        /// Full path of the vetoed target.
        to: String,
    },

    /// Loading an on-demand fragment failed.
    LoadFailed {
        /// Description of the load failure.
        message: String,
    },

    /// Checkpoint redirects chained past the safety limit.
    RedirectLoop {
        /// The target that tripped the limit.
        to: String,
    },

    /// Host-defined failure supplied by a checkpoint.
    Custom {
        /// Human-readable failure description.
        message: String,
    },
}

impl NavigationError {
    /// Synthesized veto error for a checkpoint that rejected the transition.
    pub fn aborted(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Aborted {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Error for a failed on-demand fragment load.
    pub fn load_failed(message: impl Into<String>) -> Self {
        Self::LoadFailed {
            message: message.into(),
        }
    }

    /// Error raised when consecutive redirects exceed the safety limit.
    pub fn redirect_loop(to: impl Into<String>) -> Self {
        Self::RedirectLoop { to: to.into() }
    }

    /// Host-defined failure with a human-readable message.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationError::Aborted { from, to } => {
                write!(f, "navigation from '{}' to '{}' aborted", from, to)
            }
            NavigationError::LoadFailed { message } => {
                write!(f, "fragment load failed: {}", message)
            }
            NavigationError::RedirectLoop { to } => {
                write!(f, "redirect loop detected while navigating to '{}'", to)
            }
            NavigationError::Custom { message } => {
                write!(f, "{}", message)
            }
        }
    }
}

impl std::error::Error for NavigationError {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aborted_display() {
        let err = NavigationError::aborted("/a", "/b");
        assert_eq!(err.to_string(), "navigation from '/a' to '/b' aborted");
    }

    #[test]
    fn test_load_failed_display() {
        let err = NavigationError::load_failed("chunk missing");
        assert_eq!(err.to_string(), "fragment load failed: chunk missing");
    }

    #[test]
    fn test_redirect_loop_display() {
        let err = NavigationError::redirect_loop("/login");
        assert_eq!(
            err.to_string(),
            "redirect loop detected while navigating to '/login'"
        );
    }

    #[test]
    fn test_custom_display() {
        let err = NavigationError::custom("session expired");
        assert_eq!(err.to_string(), "session expired");
    }
}
