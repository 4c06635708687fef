//! Action channel handed to `render`.

use std::fmt;
use std::sync::Arc;

/// Callback that feeds an action back to the owning form.
///
/// Composite widgets wrap their own dispatch with [`Dispatch::map`] before
/// handing it to a child, so a child only ever produces its own action type
/// and the wrapping records which field or item it came from.
pub struct Dispatch<A> {
    sink: Arc<dyn Fn(A) + Send + Sync>,
}

impl<A> Clone for Dispatch<A> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<A> fmt::Debug for Dispatch<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch").finish_non_exhaustive()
    }
}

impl<A: 'static> Dispatch<A> {
    pub fn new(sink: impl Fn(A) + Send + Sync + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    /// A dispatch that drops every action, for static renders.
    pub fn discard() -> Self {
        Self::new(|_| {})
    }

    pub fn send(&self, action: A) {
        (self.sink)(action)
    }

    /// Builds a dispatch for a child whose actions are wrapped by `wrap`.
    pub fn map<B: 'static>(&self, wrap: impl Fn(B) -> A + Send + Sync + 'static) -> Dispatch<B> {
        let parent = self.clone();
        Dispatch::new(move |action| parent.send(wrap(action)))
    }
}
