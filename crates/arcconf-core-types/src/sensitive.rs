//! Sensitive value marker
//!
//! Configuration fields such as key store pins are written to the store
//! verbatim but must never reach logs or audit output. `Sensitive<T>`
//! redacts itself in `Debug` and `Display`.

use std::fmt;

/// Placeholder emitted instead of a sensitive value
pub const REDACTED: &str = "***REDACTED***";

/// Wrapper for sensitive data that redacts itself in Debug and Display
///
/// # Example
///
/// ```
/// use arcconf_core_types::Sensitive;
///
/// let pin = Sensitive::new("secret123");
/// assert_eq!(format!("{:?}", pin), "***REDACTED***");
/// assert_eq!(pin.expose(), &"secret123");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a sensitive value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying sensitive value
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}
