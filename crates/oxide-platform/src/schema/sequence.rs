//! Sequence descriptors.

use crate::error::{PlatformError, Result};

/// A sequence definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// Sequence name.
    pub name: String,
    /// Increment between values.
    pub allocation_size: i64,
    /// First value.
    pub initial_value: i64,
    /// Number of values cached by the engine; `None` uses the engine default.
    pub cache: Option<u32>,
}

impl Sequence {
    /// Creates a sequence starting at 1 with increment 1.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            allocation_size: 1,
            initial_value: 1,
            cache: None,
        }
    }

    /// Sets the increment.
    #[must_use]
    pub const fn allocation_size(mut self, size: i64) -> Self {
        self.allocation_size = size;
        self
    }

    /// Sets the first value.
    #[must_use]
    pub const fn initial_value(mut self, value: i64) -> Self {
        self.initial_value = value;
        self
    }

    /// Sets the cache size.
    #[must_use]
    pub const fn cache(mut self, cache: u32) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Checks the descriptor.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty name or a zero increment.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PlatformError::invalid("sequence name must not be empty"));
        }
        if self.allocation_size == 0 {
            return Err(PlatformError::invalid(format!(
                "sequence '{}' has a zero increment",
                self.name
            )));
        }
        Ok(())
    }
}
