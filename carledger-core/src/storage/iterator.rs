//! Result iterators and their scoped release

use crate::error::Result;

/// A finite, non-restartable sequence of store results
///
/// Backends may hold resources (snapshots, cursors, connections) for as long
/// as the iterator is open, so every iterator must be closed exactly once.
pub trait StateIterator: Send {
    type Item;

    /// Advance; `Ok(None)` marks the end of the sequence
    fn next(&mut self) -> Result<Option<Self::Item>>;

    /// Release the underlying resource
    fn close(&mut self) -> Result<()>;
}

/// Guard that owns an open [`StateIterator`] and closes it on every exit path
///
/// Normal completion closes explicitly (so close errors surface); early
/// returns and unwinding close from `Drop`.
pub struct ScopedIterator<T> {
    inner: Box<dyn StateIterator<Item = T>>,
    closed: bool,
}

impl<T> ScopedIterator<T> {
    /// Take ownership of an open iterator
    pub fn new(inner: Box<dyn StateIterator<Item = T>>) -> Self {
        Self {
            inner,
            closed: false,
        }
    }

    /// Drain every remaining item through `f`, then close
    ///
    /// An error from the iterator aborts the drain; the iterator is still
    /// released before the error reaches the caller.
    pub fn drain<U, F>(mut self, mut f: F) -> Result<Vec<U>>
    where
        F: FnMut(T) -> U,
    {
        let mut out = Vec::new();
        while let Some(item) = self.inner.next()? {
            out.push(f(item));
        }
        self.close()?;
        Ok(out)
    }

    /// Close now. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.inner.close()
    }

    /// Whether the iterator has been released
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<T> Drop for ScopedIterator<T> {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            if let Err(e) = self.inner.close() {
                tracing::warn!(error = %e, "failed to close store iterator");
            }
        }
    }
}
