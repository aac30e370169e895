//! Push bindings between property cells.
//!
//! Every binding registers one [`ObserverId`] on each cell it watches and
//! pushes into its destination as soon as a source is written. A binding stays
//! active until [`Binding::delete`] is called; dropping the binding value
//! alone does not detach it, so owners keep bindings in a list and delete them
//! together when the owner goes away.
//!
//! Observer closures hold weak references to the cells they touch. Only the
//! binding value itself keeps strong handles, and only to detach later.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::trace;

use crate::property::{AnyProperty, Notify, ObserverId, Property, PropertyValue};

/// A live link that can be torn down.
pub trait Binding {
    /// The observer id this binding registered on its sources.
    fn id(&self) -> ObserverId;

    /// Detach from every source. Calling this more than once is harmless.
    fn delete(&self);
}

/// Wrap `f` so that it cannot re-enter itself. Cyclic chains of bindings
/// therefore stop after one lap instead of recursing forever.
fn guarded(f: impl Fn() + 'static) -> Notify {
    let running = Cell::new(false);
    Rc::new(move || {
        if running.replace(true) {
            trace!("skipping re-entrant binding update");
            return;
        }
        f();
        running.set(false);
    })
}

fn detach(id: ObserverId, sources: &[Box<dyn AnyProperty>]) {
    for source in sources {
        source.remove_observer(id);
    }
}

/// One-way binding: the destination is recomputed from its sources on every
/// source write.
pub struct PropertyBinding {
    id: ObserverId,
    sources: Vec<Box<dyn AnyProperty>>,
}

impl PropertyBinding {
    /// Mirror `source` into `dest`.
    pub fn new<T: PropertyValue>(dest: &Property<T>, source: &Property<T>) -> Self {
        Self::map(dest, source, T::clone)
    }

    /// Write `f(source)` into `dest`.
    pub fn map<T, U>(dest: &Property<T>, source: &Property<U>, f: impl Fn(&U) -> T + 'static) -> Self
    where
        T: PropertyValue,
        U: PropertyValue,
    {
        let id = ObserverId::next();
        let dest_weak = dest.downgrade();
        let source_weak = source.downgrade();
        let push = guarded(move || {
            if let (Some(dest), Some(source)) = (dest_weak.upgrade(), source_weak.upgrade()) {
                let value = source.with(&f);
                dest.set_from(value, Some(id));
            }
        });
        source.add_observer(id, Rc::clone(&push));
        push();
        Self {
            id,
            sources: vec![source.boxed_clone()],
        }
    }

    /// Write `f()` into `dest` whenever any of `sources` is written.
    ///
    /// `f` usually captures handles to the sources; those captures are
    /// released when the binding is deleted.
    pub fn computed<T: PropertyValue>(
        dest: &Property<T>,
        f: impl Fn() -> T + 'static,
        sources: &[&dyn AnyProperty],
    ) -> Self {
        let id = ObserverId::next();
        let dest_weak = dest.downgrade();
        let push = guarded(move || {
            if let Some(dest) = dest_weak.upgrade() {
                dest.set_from(f(), Some(id));
            }
        });
        for source in sources {
            source.add_observer(id, Rc::clone(&push));
        }
        push();
        Self {
            id,
            sources: sources.iter().map(|s| s.boxed_clone()).collect(),
        }
    }
}

impl Binding for PropertyBinding {
    fn id(&self) -> ObserverId {
        self.id
    }

    fn delete(&self) {
        detach(self.id, &self.sources);
    }
}

/// Two-way binding between two cells.
///
/// On creation the first property wins: `b` is written from `a`. After that a
/// write on either side is pushed to the other exactly once.
pub struct TwoWayBinding {
    id: ObserverId,
    sources: Vec<Box<dyn AnyProperty>>,
}

impl TwoWayBinding {
    /// Keep `a` and `b` equal.
    pub fn new<T: PropertyValue>(a: &Property<T>, b: &Property<T>) -> Self {
        Self::with_transforms(a, T::clone, b, T::clone)
    }

    /// Keep `a == to_a(b)` and `b == to_b(a)`.
    pub fn with_transforms<A, B>(
        a: &Property<A>,
        to_a: impl Fn(&B) -> A + 'static,
        b: &Property<B>,
        to_b: impl Fn(&A) -> B + 'static,
    ) -> Self
    where
        A: PropertyValue,
        B: PropertyValue,
    {
        let id = ObserverId::next();

        let (a_weak, b_weak) = (a.downgrade(), b.downgrade());
        let push_to_b = guarded(move || {
            if let (Some(a), Some(b)) = (a_weak.upgrade(), b_weak.upgrade()) {
                b.set_from(a.with(&to_b), Some(id));
            }
        });

        let (a_weak, b_weak) = (a.downgrade(), b.downgrade());
        let push_to_a = guarded(move || {
            if let (Some(a), Some(b)) = (a_weak.upgrade(), b_weak.upgrade()) {
                a.set_from(b.with(&to_a), Some(id));
            }
        });

        a.add_observer(id, Rc::clone(&push_to_b));
        b.add_observer(id, push_to_a);
        push_to_b();

        Self {
            id,
            sources: vec![a.boxed_clone(), b.boxed_clone()],
        }
    }
}

impl Binding for TwoWayBinding {
    fn id(&self) -> ObserverId {
        self.id
    }

    fn delete(&self) {
        detach(self.id, &self.sources);
    }
}

/// Runs a callback whenever any of its sources is written.
pub struct NotifyBinding {
    id: ObserverId,
    sources: Vec<Box<dyn AnyProperty>>,
}

impl NotifyBinding {
    /// Call `f` on every write to any of `sources`. `f` is not called at
    /// creation.
    pub fn new(f: impl Fn() + 'static, sources: &[&dyn AnyProperty]) -> Self {
        let id = ObserverId::next();
        let notify = guarded(f);
        for source in sources {
            source.add_observer(id, Rc::clone(&notify));
        }
        Self {
            id,
            sources: sources.iter().map(|s| s.boxed_clone()).collect(),
        }
    }
}

impl Binding for NotifyBinding {
    fn id(&self) -> ObserverId {
        self.id
    }

    fn delete(&self) {
        detach(self.id, &self.sources);
    }
}

/// Runs a callback with the old and new value whenever a cell changes.
pub struct ChangeBinding {
    id: ObserverId,
    sources: Vec<Box<dyn AnyProperty>>,
}

impl ChangeBinding {
    /// Call `f(old, new)` whenever `source` is written with a different value.
    ///
    /// If the value at creation differs from `T::default()`, `f` runs once
    /// immediately with the default as the old value.
    pub fn new<T>(source: &Property<T>, f: impl Fn(&T, &T) + 'static) -> Self
    where
        T: PropertyValue + PartialEq + Default,
    {
        let id = ObserverId::next();
        let initial = source.get();
        let last = Rc::new(RefCell::new(initial.clone()));
        let f = Rc::new(f);

        let source_weak = source.downgrade();
        let on_change = {
            let last = Rc::clone(&last);
            let f = Rc::clone(&f);
            guarded(move || {
                if let Some(source) = source_weak.upgrade() {
                    let new = source.get();
                    let old = last.replace(new.clone());
                    if old != new {
                        f(&old, &new);
                    }
                }
            })
        };
        source.add_observer(id, on_change);

        let default = T::default();
        if initial != default {
            f(&default, &initial);
        }

        Self {
            id,
            sources: vec![source.boxed_clone()],
        }
    }
}

impl Binding for ChangeBinding {
    fn id(&self) -> ObserverId {
        self.id
    }

    fn delete(&self) {
        detach(self.id, &self.sources);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_way_binding_pushes_on_creation_and_write() {
        let source = Property::new(3);
        let dest = Property::new(0);
        let _binding = PropertyBinding::new(&dest, &source);
        assert_eq!(dest.get(), 3);
        source.set(9);
        assert_eq!(dest.get(), 9);
    }

    #[test]
    fn test_one_way_binding_does_not_flow_backwards() {
        let source = Property::new(1);
        let dest = Property::new(0);
        let _binding = PropertyBinding::new(&dest, &source);
        dest.set(42);
        assert_eq!(source.get(), 1);
    }

    #[test]
    fn test_mapped_binding() {
        let source = Property::new(true);
        let dest = Property::new(true);
        let _binding = PropertyBinding::map(&dest, &source, |v| !v);
        assert!(!dest.get());
        source.set(false);
        assert!(dest.get());
    }

    #[test]
    fn test_computed_binding_watches_all_sources() {
        let a = Property::new(2);
        let b = Property::new(3);
        let sum = Property::new(0);
        let (ca, cb) = (a.clone(), b.clone());
        let _binding = PropertyBinding::computed(&sum, move || ca.get() + cb.get(), &[&a, &b]);
        assert_eq!(sum.get(), 5);
        a.set(10);
        assert_eq!(sum.get(), 13);
        b.set(0);
        assert_eq!(sum.get(), 10);
    }

    #[test]
    fn test_delete_detaches() {
        let source = Property::new(1);
        let dest = Property::new(0);
        let binding = PropertyBinding::new(&dest, &source);
        binding.delete();
        binding.delete();
        source.set(5);
        assert_eq!(dest.get(), 1);
        assert_eq!(source.observer_count(), 0);
    }

    #[test]
    fn test_two_way_first_property_wins_then_both_directions() {
        let a = Property::new(1);
        let b = Property::new(2);
        let binding = TwoWayBinding::new(&a, &b);
        assert_eq!(b.get(), 1);

        a.set(5);
        assert_eq!(b.get(), 5);
        b.set(8);
        assert_eq!(a.get(), 8);

        binding.delete();
        a.set(0);
        assert_eq!(b.get(), 8);
    }

    #[test]
    fn test_two_way_pushes_once_per_write() {
        let a = Property::new(0);
        let b = Property::new(0);
        let _binding = TwoWayBinding::new(&a, &b);
        let writes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&writes);
        let _watch = NotifyBinding::new(move || counter.set(counter.get() + 1), &[&b]);
        a.set(1);
        assert_eq!(writes.get(), 1);
    }

    #[test]
    fn test_two_way_with_transforms() {
        let celsius = Property::new(100.0_f32);
        let fahrenheit = Property::new(0.0_f32);
        let _binding = TwoWayBinding::with_transforms(
            &celsius,
            |f| (f - 32.0) * 5.0 / 9.0,
            &fahrenheit,
            |c| c * 9.0 / 5.0 + 32.0,
        );
        assert_eq!(fahrenheit.get(), 212.0);
        fahrenheit.set(32.0);
        assert_eq!(celsius.get(), 0.0);
    }

    #[test]
    fn test_cycle_of_one_way_bindings_terminates() {
        let a = Property::new(0);
        let b = Property::new(0);
        let _ab = PropertyBinding::map(&b, &a, |v| v + 1);
        let _ba = PropertyBinding::map(&a, &b, |v| v + 1);
        a.set(10);
        assert_eq!(b.get(), 11);
        assert_eq!(a.get(), 12);
    }

    #[test]
    fn test_change_binding_reports_old_and_new() {
        let p = Property::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let _binding = ChangeBinding::new(&p, move |old, new| log.borrow_mut().push((*old, *new)));
        p.set(1);
        p.set(1);
        p.set(4);
        assert_eq!(*seen.borrow(), vec![(0, 1), (1, 4)]);
    }

    #[test]
    fn test_change_binding_fires_initially_for_non_default() {
        let p = Property::new(true);
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        let _binding = ChangeBinding::new(&p, move |old, new| flag.set(!*old && *new));
        assert!(fired.get());
    }

    #[test]
    fn test_notify_binding_not_called_at_creation() {
        let p = Property::new(0);
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let binding = NotifyBinding::new(move || counter.set(counter.get() + 1), &[&p]);
        assert_eq!(hits.get(), 0);
        p.set(3);
        p.changed();
        assert_eq!(hits.get(), 2);
        binding.delete();
        p.set(4);
        assert_eq!(hits.get(), 2);
    }
}
