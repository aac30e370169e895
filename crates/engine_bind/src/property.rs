//! Observable property cells.
//!
//! A [`Property`] is a shared handle to a value plus an ordered list of
//! observers. Writing the value pushes a notification to every observer
//! immediately, in registration order. Cloning a `Property` clones the
//! handle, not the value: all clones address the same cell.
//!
//! Observers are identified by an [`ObserverId`]. When a binding writes into a
//! cell it passes its own id as the *origin* of the write, and the cell skips
//! that observer while notifying. This is what keeps two-way bindings from
//! bouncing a value back and forth.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::BindError;

/// Values that can live in a [`Property`].
///
/// The serde bounds let every cell be read and written as JSON by name, which
/// is how scripts, the editor and snapshots talk to entities.
pub trait PropertyValue: Clone + fmt::Debug + Serialize + DeserializeOwned + 'static {}

impl<T> PropertyValue for T where T: Clone + fmt::Debug + Serialize + DeserializeOwned + 'static {}

/// Identifies one observer (usually one binding) across every cell it watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u64);

impl ObserverId {
    /// Allocates a process-unique observer id.
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Callback run when an observed cell is written.
pub type Notify = Rc<dyn Fn()>;

struct Observer {
    id: ObserverId,
    notify: Notify,
}

struct Cell<T> {
    value: RefCell<T>,
    observers: RefCell<Vec<Observer>>,
}

/// A shared, observable value cell.
pub struct Property<T> {
    inner: Rc<Cell<T>>,
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: PropertyValue> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(&*self.inner.value.borrow()).finish()
    }
}

impl<T: PropertyValue + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: PropertyValue> Property<T> {
    /// Create a new cell holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(Cell {
                value: RefCell::new(value),
                observers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Returns a copy of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Borrow the current value for the duration of `f`.
    ///
    /// `f` must not write to this same cell.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Store `value` and notify every observer.
    pub fn set(&self, value: T) {
        self.set_from(value, None);
    }

    /// Store `value` and notify every observer except `origin`.
    pub fn set_from(&self, value: T, origin: Option<ObserverId>) {
        *self.inner.value.borrow_mut() = value;
        self.notify(origin);
    }

    /// Apply `f` to the value in place, then notify.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.inner.value.borrow_mut());
        self.notify(None);
    }

    /// Push the current value to every observer without changing it.
    pub fn changed(&self) {
        self.notify(None);
    }

    fn notify(&self, origin: Option<ObserverId>) {
        // Snapshot so observers may subscribe or unsubscribe while running.
        let pending: Vec<(ObserverId, Notify)> = self
            .inner
            .observers
            .borrow()
            .iter()
            .filter(|o| Some(o.id) != origin)
            .map(|o| (o.id, Rc::clone(&o.notify)))
            .collect();

        for (id, notify) in pending {
            if self.is_observed_by(id) {
                notify();
            }
        }
    }

    /// Register `notify` under `id`. Registering the same id twice is a no-op.
    pub fn add_observer(&self, id: ObserverId, notify: Notify) {
        let mut observers = self.inner.observers.borrow_mut();
        if !observers.iter().any(|o| o.id == id) {
            observers.push(Observer { id, notify });
        }
    }

    /// Remove the observer registered under `id`, if any.
    pub fn remove_observer(&self, id: ObserverId) {
        self.inner.observers.borrow_mut().retain(|o| o.id != id);
    }

    /// Returns `true` if an observer is registered under `id`.
    #[must_use]
    pub fn is_observed_by(&self, id: ObserverId) -> bool {
        self.inner.observers.borrow().iter().any(|o| o.id == id)
    }

    /// Number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    /// Returns `true` if both handles address the same cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Create a non-owning handle to this cell.
    #[must_use]
    pub fn downgrade(&self) -> WeakProperty<T> {
        WeakProperty {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

/// A non-owning handle to a [`Property`].
///
/// Observer closures hold these so that a cell never keeps its own
/// dependents alive.
pub struct WeakProperty<T> {
    inner: Weak<Cell<T>>,
}

impl<T> Clone for WeakProperty<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T: PropertyValue> WeakProperty<T> {
    /// Upgrade to a strong handle if the cell is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Property<T>> {
        self.inner.upgrade().map(|inner| Property { inner })
    }
}

/// Type-erased view of a [`Property`].
pub trait AnyProperty {
    /// Rust type name of the stored value.
    fn type_name(&self) -> &'static str;

    /// Identity of the underlying cell; equal for all clones of one property.
    fn cell_id(&self) -> usize;

    /// Downcast support.
    fn as_any(&self) -> &dyn Any;

    /// See [`Property::add_observer`].
    fn add_observer(&self, id: ObserverId, notify: Notify);

    /// See [`Property::remove_observer`].
    fn remove_observer(&self, id: ObserverId);

    /// See [`Property::changed`].
    fn reset(&self);

    /// Render the current value as JSON.
    fn to_json(&self) -> Result<serde_json::Value, BindError>;

    /// Decode `value` and write it to the cell, notifying observers.
    fn set_json(&self, value: serde_json::Value) -> Result<(), BindError>;

    /// Clone the handle behind a box.
    fn boxed_clone(&self) -> Box<dyn AnyProperty>;
}

impl<T: PropertyValue> AnyProperty for Property<T> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn cell_id(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const () as usize
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn add_observer(&self, id: ObserverId, notify: Notify) {
        Property::add_observer(self, id, notify);
    }

    fn remove_observer(&self, id: ObserverId) {
        Property::remove_observer(self, id);
    }

    fn reset(&self) {
        self.changed();
    }

    fn to_json(&self) -> Result<serde_json::Value, BindError> {
        self.with(|value| serde_json::to_value(value))
            .map_err(|source| BindError::Encode {
                type_name: std::any::type_name::<T>(),
                source,
            })
    }

    fn set_json(&self, value: serde_json::Value) -> Result<(), BindError> {
        let decoded: T = serde_json::from_value(value).map_err(|source| BindError::Decode {
            type_name: std::any::type_name::<T>(),
            source,
        })?;
        self.set(decoded);
        Ok(())
    }

    fn boxed_clone(&self) -> Box<dyn AnyProperty> {
        Box::new(self.clone())
    }
}

impl dyn AnyProperty {
    /// Downcast to a typed property handle.
    #[must_use]
    pub fn downcast<T: PropertyValue>(&self) -> Option<Property<T>> {
        self.as_any().downcast_ref::<Property<T>>().cloned()
    }
}
