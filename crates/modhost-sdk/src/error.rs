//! Error types for module lifecycle hooks.

/// Result alias for lifecycle hooks.
pub type HookResult = Result<(), HookError>;

/// Error returned from a module's enable or disable hook.
///
/// Hook errors never cross the library boundary as values; the generated
/// FFI shims collapse them into a status code that the host logs.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// Hook failed with a message.
    #[error("{0}")]
    Failed(String),

    /// Any other error a hook wants to surface.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HookError {
    /// Shorthand for a message-only failure.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
