//! Per-call options threaded through every operation.

/// How an operation was invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallContext {
    /// Drop info and output lines.
    pub suppress_output: bool,
    /// Invoked by another operation rather than by the user.
    pub internal: bool,
}

impl CallContext {
    /// A call made directly by the user.
    pub fn top_level() -> Self {
        Self::default()
    }

    /// A sub-call made by another operation: silent, result returned only.
    pub fn internal() -> Self {
        Self {
            suppress_output: true,
            internal: true,
        }
    }

    /// Whether info and output lines should be dropped.
    pub fn is_quiet(&self) -> bool {
        self.suppress_output || self.internal
    }
}
