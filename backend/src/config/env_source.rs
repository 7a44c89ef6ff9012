//! Environment lookup abstraction.
//!
//! Configuration loading reads variables through [`EnvSource`] so tests can
//! supply fixed values without mutating the process environment.

/// Environment abstraction for configuration lookups.
pub trait EnvSource: Send + Sync {
    /// Fetch a string value by name.
    fn string(&self, name: &str) -> Option<String>;
}

/// Environment access backed by the real process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl ProcessEnv {
    /// Create a new environment reader.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl EnvSource for ProcessEnv {
    fn string(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}
