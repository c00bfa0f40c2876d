//! Lazy single-initialization cells for member fields.
//!
//! Every derived field of a member (name, signature, child list, owner link)
//! lives in a [`LazyCell`]: empty until first read, then initialized exactly
//! once for all readers. Racing initializers are benign; the first value
//! published under the slot lock wins and later candidates are dropped, so
//! every reader observes the same value and clones of `Arc`-valued cells stay
//! identity-stable. A user write ([`LazyCell::set`]) bypasses initialization
//! and replaces whatever the cell held.

use std::sync::RwLock;

use crate::{Error::LockError, Result};

/// A thread-safe slot holding a lazily-computed value.
pub struct LazyCell<T> {
    slot: RwLock<Option<T>>,
}

impl<T: Clone> LazyCell<T> {
    /// Create an empty cell.
    #[must_use]
    pub fn new() -> Self {
        LazyCell {
            slot: RwLock::new(None),
        }
    }

    /// Create a cell already holding a value.
    ///
    /// ## Arguments
    /// * 'value' - The initial value
    #[must_use]
    pub fn with_value(value: T) -> Self {
        LazyCell {
            slot: RwLock::new(Some(value)),
        }
    }

    /// Read the cell, running `init` if it is still empty.
    ///
    /// The initializer runs outside the lock, so concurrent first readers may
    /// each compute a candidate; only the first one to take the write lock
    /// publishes, and everyone else receives the published value.
    ///
    /// ## Arguments
    /// * 'init' - Producer for the value; must be side-effect free
    ///
    /// # Errors
    /// Propagates errors from the initializer, or [`LockError`] if the slot
    /// lock is poisoned.
    pub fn get_or_try_init<F>(&self, init: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        {
            let guard = self.slot.read().map_err(|_| LockError)?;
            if let Some(value) = guard.as_ref() {
                return Ok(value.clone());
            }
        }

        let candidate = init()?;

        let mut guard = self.slot.write().map_err(|_| LockError)?;
        match guard.as_ref() {
            Some(existing) => Ok(existing.clone()),
            None => {
                *guard = Some(candidate.clone());
                Ok(candidate)
            }
        }
    }

    /// Read the cell without initializing it.
    ///
    /// # Errors
    /// Returns [`LockError`] if the slot lock is poisoned.
    pub fn get(&self) -> Result<Option<T>> {
        Ok(self.slot.read().map_err(|_| LockError)?.clone())
    }

    /// Store a value, replacing any previous or pending lazy value.
    ///
    /// ## Arguments
    /// * 'value' - The value to publish
    ///
    /// # Errors
    /// Returns [`LockError`] if the slot lock is poisoned.
    pub fn set(&self, value: T) -> Result<()> {
        *self.slot.write().map_err(|_| LockError)? = Some(value);
        Ok(())
    }

    /// Empty the cell so the next read re-initializes.
    ///
    /// # Errors
    /// Returns [`LockError`] if the slot lock is poisoned.
    pub fn clear(&self) -> Result<()> {
        *self.slot.write().map_err(|_| LockError)? = None;
        Ok(())
    }
}

impl<T: Clone> Default for LazyCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[test]
    fn initializes_once() {
        let cell = LazyCell::new();
        let runs = AtomicUsize::new(0);

        let first = cell
            .get_or_try_init(|| {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(42))
            })
            .unwrap();
        let second = cell.get_or_try_init(|| unreachable!()).unwrap();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn set_overrides_lazy_value() {
        let cell = LazyCell::new();
        assert_eq!(cell.get_or_try_init(|| Ok(1)).unwrap(), 1);

        cell.set(7).unwrap();
        assert_eq!(cell.get_or_try_init(|| Ok(1)).unwrap(), 7);
        assert_eq!(cell.get().unwrap(), Some(7));
    }

    #[test]
    fn set_before_first_read_skips_init() {
        let cell = LazyCell::new();
        cell.set("user").unwrap();
        assert_eq!(cell.get_or_try_init(|| unreachable!()).unwrap(), "user");
    }

    #[test]
    fn clear_forces_reinit() {
        let cell = LazyCell::new();
        assert_eq!(cell.get_or_try_init(|| Ok(1)).unwrap(), 1);
        cell.clear().unwrap();
        assert_eq!(cell.get().unwrap(), None);
        assert_eq!(cell.get_or_try_init(|| Ok(2)).unwrap(), 2);
    }

    #[test]
    fn failed_init_leaves_cell_empty() {
        let cell: LazyCell<u32> = LazyCell::new();
        assert!(cell
            .get_or_try_init(|| Err(crate::Error::NotSupported))
            .is_err());
        assert_eq!(cell.get().unwrap(), None);
        assert_eq!(cell.get_or_try_init(|| Ok(3)).unwrap(), 3);
    }

    #[test]
    fn concurrent_first_touch_publishes_one_value() {
        let cell = Arc::new(LazyCell::new());
        let mut handles = Vec::new();

        for i in 0..8 {
            let cell = cell.clone();
            handles.push(std::thread::spawn(move || {
                cell.get_or_try_init(|| Ok(Arc::new(i))).unwrap()
            }));
        }

        let values: Vec<Arc<i32>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for value in &values {
            assert!(Arc::ptr_eq(value, &values[0]));
        }
    }
}
