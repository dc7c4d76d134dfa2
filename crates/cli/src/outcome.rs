//! Handler outcome definitions
//!
//! Every menu handler reports one of these. The process exit status does not
//! depend on them; they drive logging and let tests assert what happened.

/// Outcome of one menu handler invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Everything checked out
    Success,

    /// Completed, but something deserves attention (private bucket, empty listing, ...)
    Warning,

    /// Missing or malformed user input; nothing was sent
    InputError,

    /// The remote service reported a failure
    RemoteError,

    /// The user asked to leave the menu
    Exit,
}

impl Outcome {
    /// Get a human-readable description of the outcome
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Completed successfully",
            Self::Warning => "Completed with warnings",
            Self::InputError => "Invalid input",
            Self::RemoteError => "Remote operation failed",
            Self::Exit => "Session ended",
        }
    }

    /// Downgrade a success to a warning when `warn` is set
    pub const fn warn_if(self, warn: bool) -> Self {
        match self {
            Self::Success if warn => Self::Warning,
            other => other,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Success.to_string(), "Completed successfully");
        assert!(Outcome::RemoteError.to_string().contains("failed"));
    }

    #[test]
    fn test_warn_if() {
        assert_eq!(Outcome::Success.warn_if(true), Outcome::Warning);
        assert_eq!(Outcome::Success.warn_if(false), Outcome::Success);
        assert_eq!(Outcome::RemoteError.warn_if(true), Outcome::RemoteError);
    }
}
