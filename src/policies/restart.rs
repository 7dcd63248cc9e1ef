//! # Restart policies for stream watches.
//!
//! [`RestartPolicy`] decides whether a watch is reopened after its run ends.
//!
//! ```text
//! RestartPolicy::Never      → run once (push registration)
//! RestartPolicy::OnFailure  → reopen only after an error
//! RestartPolicy::Always     → reopen after an error or a clean end (streams)
//! ```

/// Policy controlling whether a watch is reopened after it ends or fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RestartPolicy {
    /// Run once and exit.
    Never,
    /// Reopen only if the run returned an error.
    #[default]
    OnFailure,
    /// Reopen whenever the run returns, until cancelled.
    Always,
}

impl RestartPolicy {
    /// Whether a run that finished with `failed` should be followed by another.
    pub fn should_restart(self, failed: bool) -> bool {
        match self {
            RestartPolicy::Never => false,
            RestartPolicy::OnFailure => failed,
            RestartPolicy::Always => true,
        }
    }
}
