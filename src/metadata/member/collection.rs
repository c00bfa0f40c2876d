//! Ordered collections that own their elements.
//!
//! A [`MemberList`] couples an ordered sequence with ownership bookkeeping:
//! inserting an element attaches it to the collection's owner (setting the
//! element's weak parent back-reference), removing detaches it. An element
//! belongs to at most one collection at a time; attaching an already-owned
//! element fails with [`crate::Error::AlreadyOwned`]. Iteration order is
//! insertion order, which for loaded graphs is metadata rid order.

use std::sync::{Arc, RwLock, Weak};

use crate::{
    Error::{LockError, OutOfBounds},
    Result,
};

/// Hook that attaches an element to an owner, failing if it is already owned.
pub type AttachFn<O, E> = fn(&E, &Weak<O>) -> Result<()>;

/// Hook that clears an element's owner back-reference.
pub type DetachFn<E> = fn(&E) -> Result<()>;

/// An ordered, owner-tracking sequence of members.
///
/// The list holds strong references to its elements; elements hold weak
/// back-references to the owner, so no reference cycles form.
pub struct MemberList<O, E> {
    owner: Weak<O>,
    attach: AttachFn<O, E>,
    detach: DetachFn<E>,
    items: RwLock<Vec<Arc<E>>>,
}

impl<O, E> MemberList<O, E> {
    /// Create an empty list owned by `owner`.
    ///
    /// ## Arguments
    /// * 'owner'  - Weak reference to the owner of all elements
    /// * 'attach' - Hook wiring an element's owner back-reference
    /// * 'detach' - Hook clearing an element's owner back-reference
    #[must_use]
    pub fn new(owner: Weak<O>, attach: AttachFn<O, E>, detach: DetachFn<E>) -> Self {
        MemberList {
            owner,
            attach,
            detach,
            items: RwLock::new(Vec::new()),
        }
    }

    /// Append an element, attaching it to the owner.
    ///
    /// ## Arguments
    /// * 'item' - The element to append; must currently be unowned
    ///
    /// # Errors
    /// Returns [`crate::Error::AlreadyOwned`] if the element belongs to a
    /// collection, or [`LockError`] on a poisoned lock.
    pub fn push(&self, item: Arc<E>) -> Result<()> {
        let mut guard = self.items.write().map_err(|_| LockError)?;
        (self.attach)(&item, &self.owner)?;
        guard.push(item);
        Ok(())
    }

    /// Insert an element at `index`, attaching it to the owner.
    ///
    /// ## Arguments
    /// * 'index' - Position to insert at; at most `len()`
    /// * 'item'  - The element to insert; must currently be unowned
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] for an invalid index,
    /// [`crate::Error::AlreadyOwned`] if the element belongs to a collection,
    /// or [`LockError`] on a poisoned lock.
    pub fn insert(&self, index: usize, item: Arc<E>) -> Result<()> {
        let mut guard = self.items.write().map_err(|_| LockError)?;
        if index > guard.len() {
            return Err(OutOfBounds);
        }

        (self.attach)(&item, &self.owner)?;
        guard.insert(index, item);
        Ok(())
    }

    /// Remove the element at `index`, detaching it from the owner.
    ///
    /// ## Arguments
    /// * 'index' - Position of the element to remove
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] for an invalid index or [`LockError`] on a
    /// poisoned lock.
    pub fn remove(&self, index: usize) -> Result<Arc<E>> {
        let mut guard = self.items.write().map_err(|_| LockError)?;
        if index >= guard.len() {
            return Err(OutOfBounds);
        }

        let item = guard.remove(index);
        (self.detach)(&item)?;
        Ok(item)
    }

    /// Remove an element by identity, detaching it from the owner.
    ///
    /// ## Arguments
    /// * 'item' - The element to remove
    ///
    /// # Errors
    /// Returns [`LockError`] on a poisoned lock.
    pub fn remove_item(&self, item: &Arc<E>) -> Result<bool> {
        let mut guard = self.items.write().map_err(|_| LockError)?;
        let Some(index) = guard.iter().position(|e| Arc::ptr_eq(e, item)) else {
            return Ok(false);
        };

        let removed = guard.remove(index);
        (self.detach)(&removed)?;
        Ok(true)
    }

    /// Remove every element, detaching each from the owner.
    ///
    /// # Errors
    /// Returns [`LockError`] on a poisoned lock.
    pub fn clear(&self) -> Result<()> {
        let mut guard = self.items.write().map_err(|_| LockError)?;
        for item in guard.drain(..) {
            (self.detach)(&item)?;
        }
        Ok(())
    }

    /// The element at `index`, if any.
    ///
    /// ## Arguments
    /// * 'index' - Position to read
    ///
    /// # Errors
    /// Returns [`LockError`] on a poisoned lock.
    pub fn get(&self, index: usize) -> Result<Option<Arc<E>>> {
        Ok(self.items.read().map_err(|_| LockError)?.get(index).cloned())
    }

    /// Number of elements in the list.
    ///
    /// # Errors
    /// Returns [`LockError`] on a poisoned lock.
    pub fn len(&self) -> Result<usize> {
        Ok(self.items.read().map_err(|_| LockError)?.len())
    }

    /// True if the list holds no elements.
    ///
    /// # Errors
    /// Returns [`LockError`] on a poisoned lock.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// A snapshot of the elements, in order.
    ///
    /// # Errors
    /// Returns [`LockError`] on a poisoned lock.
    pub fn to_vec(&self) -> Result<Vec<Arc<E>>> {
        Ok(self.items.read().map_err(|_| LockError)?.clone())
    }

    /// Append an element whose owner back-reference is already wired, used
    /// when materializing loaded graphs.
    pub(crate) fn push_initial(&self, item: Arc<E>) -> Result<()> {
        self.items.write().map_err(|_| LockError)?.push(item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::member::LazyCell;
    use crate::Error;

    /// A minimal owned element for exercising the list mechanics
    struct Child {
        owner: LazyCell<Option<Weak<Parent>>>,
    }

    struct Parent;

    fn attach(child: &Child, owner: &Weak<Parent>) -> Result<()> {
        if child.owner.get()?.flatten().is_some() {
            return Err(Error::AlreadyOwned(crate::metadata::token::Token::new(0)));
        }
        child.owner.set(Some(owner.clone()))
    }

    fn detach(child: &Child) -> Result<()> {
        child.owner.set(None)
    }

    fn new_child() -> Arc<Child> {
        Arc::new(Child {
            owner: LazyCell::with_value(None),
        })
    }

    #[test]
    fn push_attaches_owner() {
        let parent = Arc::new(Parent);
        let list = MemberList::new(Arc::downgrade(&parent), attach, detach);

        let child = new_child();
        list.push(child.clone()).unwrap();

        assert_eq!(list.len().unwrap(), 1);
        let owner = child.owner.get().unwrap().flatten().unwrap();
        assert!(owner.upgrade().map(|p| Arc::ptr_eq(&p, &parent)).unwrap_or(false));
    }

    #[test]
    fn double_ownership_rejected() {
        let parent = Arc::new(Parent);
        let list_a = MemberList::new(Arc::downgrade(&parent), attach, detach);
        let list_b = MemberList::new(Arc::downgrade(&parent), attach, detach);

        let child = new_child();
        list_a.push(child.clone()).unwrap();

        assert!(matches!(
            list_b.push(child.clone()),
            Err(Error::AlreadyOwned(_))
        ));

        // After removal the element can move
        assert!(list_a.remove_item(&child).unwrap());
        assert!(child.owner.get().unwrap().flatten().is_none());
        list_b.push(child).unwrap();
    }

    #[test]
    fn remove_detaches_owner() {
        let parent = Arc::new(Parent);
        let list = MemberList::new(Arc::downgrade(&parent), attach, detach);

        let child = new_child();
        list.push(child.clone()).unwrap();
        let removed = list.remove(0).unwrap();

        assert!(Arc::ptr_eq(&removed, &child));
        assert!(child.owner.get().unwrap().flatten().is_none());
        assert!(list.is_empty().unwrap());
    }

    #[test]
    fn insert_preserves_order() {
        let parent = Arc::new(Parent);
        let list = MemberList::new(Arc::downgrade(&parent), attach, detach);

        let first = new_child();
        let second = new_child();
        let between = new_child();

        list.push(first.clone()).unwrap();
        list.push(second.clone()).unwrap();
        list.insert(1, between.clone()).unwrap();

        let items = list.to_vec().unwrap();
        assert!(Arc::ptr_eq(&items[0], &first));
        assert!(Arc::ptr_eq(&items[1], &between));
        assert!(Arc::ptr_eq(&items[2], &second));

        assert!(matches!(
            list.insert(9, new_child()),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn clear_detaches_everything() {
        let parent = Arc::new(Parent);
        let list = MemberList::new(Arc::downgrade(&parent), attach, detach);

        let a = new_child();
        let b = new_child();
        list.push(a.clone()).unwrap();
        list.push(b.clone()).unwrap();

        list.clear().unwrap();
        assert!(list.is_empty().unwrap());
        assert!(a.owner.get().unwrap().flatten().is_none());
        assert!(b.owner.get().unwrap().flatten().is_none());
    }
}
