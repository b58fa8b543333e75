//! Redacting wrapper for sensitive configuration values.

use std::fmt;

/// A value that must never reach logs.
///
/// `Debug` and `Display` always print `[REDACTED]`; the inner value is only
/// reachable through [`Secret::expose_secret`]. There is deliberately no
/// `Clone`, `Deref` or `AsRef`.
pub struct Secret<T> {
    inner: T,
}

impl<T> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Explicit access to the wrapped value. Do not log the result.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
