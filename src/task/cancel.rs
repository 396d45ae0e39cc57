/*!
 * Cancellation Handle
 * One-shot thunk returned by an effect starter
 */

use std::fmt;

/// Cancellation thunk for an in-flight effect
///
/// Consumed by `cancel`, so it runs at most once. Dropping a handle
/// without cancelling does nothing.
pub struct Cancel {
    thunk: Option<Box<dyn FnOnce()>>,
}

impl Cancel {
    pub fn new<F>(thunk: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            thunk: Some(Box::new(thunk)),
        }
    }

    /// Handle for effects that cannot be interrupted
    pub fn noop() -> Self {
        Self { thunk: None }
    }

    pub fn is_noop(&self) -> bool {
        self.thunk.is_none()
    }

    pub fn cancel(mut self) {
        if let Some(thunk) = self.thunk.take() {
            thunk();
        }
    }
}

impl Default for Cancel {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for Cancel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cancel")
            .field("noop", &self.is_noop())
            .finish()
    }
}
