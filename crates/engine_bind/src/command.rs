//! Commands: named, invocable actions with ordered listeners.
//!
//! A [`Command`] has at most one *action* (what the command does) and any
//! number of *listeners* (what else happens when it runs). Executing runs the
//! action first, then the listeners in registration order. Commands take zero
//! arguments (`Command<()>`) or one argument (`Command<A>`).

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::de::DeserializeOwned;

use crate::binding::Binding;
use crate::error::BindError;
use crate::property::ObserverId;

type Action<A> = Rc<dyn Fn(A)>;

struct CommandCell<A> {
    action: RefCell<Option<Action<A>>>,
    listeners: RefCell<Vec<(ObserverId, Action<A>)>>,
}

/// A shared, invocable action.
pub struct Command<A = ()> {
    inner: Rc<CommandCell<A>>,
}

impl<A> Clone for Command<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A> fmt::Debug for Command<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("has_action", &self.inner.action.borrow().is_some())
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}

impl<A: Clone + 'static> Default for Command<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Clone + 'static> Command<A> {
    /// Create a command with no action and no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(CommandCell {
                action: RefCell::new(None),
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Create a command whose action is `f`.
    #[must_use]
    pub fn with_action(f: impl Fn(A) + 'static) -> Self {
        let command = Self::new();
        command.set_action(f);
        command
    }

    /// Replace the action.
    pub fn set_action(&self, f: impl Fn(A) + 'static) {
        *self.inner.action.borrow_mut() = Some(Rc::new(f));
    }

    /// Remove the action; listeners still run on execute.
    pub fn clear_action(&self) {
        *self.inner.action.borrow_mut() = None;
    }

    /// Returns `true` if an action is installed.
    #[must_use]
    pub fn has_action(&self) -> bool {
        self.inner.action.borrow().is_some()
    }

    /// Run the action, then every listener.
    pub fn execute_with(&self, arg: A) {
        let action = self.inner.action.borrow().clone();
        if let Some(action) = action {
            action(arg.clone());
        }

        let pending: Vec<(ObserverId, Action<A>)> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(id, f)| (*id, Rc::clone(f)))
            .collect();
        for (id, listener) in pending {
            if self.has_listener(id) {
                listener(arg.clone());
            }
        }
    }

    /// Register `f` to run after the action. Duplicate ids are ignored.
    pub fn add_listener(&self, id: ObserverId, f: impl Fn(A) + 'static) {
        let mut listeners = self.inner.listeners.borrow_mut();
        if !listeners.iter().any(|(existing, _)| *existing == id) {
            listeners.push((id, Rc::new(f)));
        }
    }

    /// Remove the listener registered under `id`.
    pub fn remove_listener(&self, id: ObserverId) {
        self.inner.listeners.borrow_mut().retain(|(existing, _)| *existing != id);
    }

    /// Returns `true` if a listener is registered under `id`.
    #[must_use]
    pub fn has_listener(&self, id: ObserverId) -> bool {
        self.inner.listeners.borrow().iter().any(|(existing, _)| *existing == id)
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Returns `true` if both handles address the same command.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Create a non-owning handle.
    #[must_use]
    pub fn downgrade(&self) -> WeakCommand<A> {
        WeakCommand {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl Command<()> {
    /// Create a zero-argument command from a plain closure.
    #[must_use]
    pub fn from_fn(f: impl Fn() + 'static) -> Self {
        Self::with_action(move |()| f())
    }

    /// Execute a zero-argument command.
    pub fn execute(&self) {
        self.execute_with(());
    }
}

/// A non-owning handle to a [`Command`].
pub struct WeakCommand<A> {
    inner: Weak<CommandCell<A>>,
}

impl<A> Clone for WeakCommand<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<A> WeakCommand<A> {
    /// Upgrade to a strong handle if the command is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Command<A>> {
        self.inner.upgrade().map(|inner| Command { inner })
    }
}

/// Forwards executions of a source command to a destination.
pub struct CommandBinding<A: 'static = ()> {
    id: ObserverId,
    source: WeakCommand<A>,
}

impl<A: Clone + 'static> CommandBinding<A> {
    /// Execute `dest` whenever `source` executes.
    pub fn new(source: &Command<A>, dest: &Command<A>) -> Self {
        let dest = dest.downgrade();
        Self::with_fn(source, move |arg| {
            if let Some(dest) = dest.upgrade() {
                dest.execute_with(arg);
            }
        })
    }

    /// Call `f` whenever `source` executes.
    pub fn with_fn(source: &Command<A>, f: impl Fn(A) + 'static) -> Self {
        Self::when(source, || true, f)
    }

    /// Call `f` whenever `source` executes and `enabled()` holds.
    pub fn when(
        source: &Command<A>,
        enabled: impl Fn() -> bool + 'static,
        f: impl Fn(A) + 'static,
    ) -> Self {
        let id = ObserverId::next();
        source.add_listener(id, move |arg| {
            if enabled() {
                f(arg);
            }
        });
        Self {
            id,
            source: source.downgrade(),
        }
    }
}

impl<A: Clone + 'static> Binding for CommandBinding<A> {
    fn id(&self) -> ObserverId {
        self.id
    }

    fn delete(&self) {
        if let Some(source) = self.source.upgrade() {
            source.remove_listener(self.id);
        }
    }
}

/// Type-erased view of a [`Command`].
pub trait AnyCommand {
    /// Rust type name of the argument (`"()"` for zero-argument commands).
    fn arg_type(&self) -> &'static str;

    /// Identity of the underlying command; equal for all clones.
    fn cell_id(&self) -> usize;

    /// Downcast support.
    fn as_any(&self) -> &dyn Any;

    /// Decode the argument from JSON (`null` for no argument) and execute.
    fn execute_json(&self, arg: serde_json::Value) -> Result<(), BindError>;

    /// Clone the handle behind a box.
    fn boxed_clone(&self) -> Box<dyn AnyCommand>;
}

impl<A: Clone + DeserializeOwned + 'static> AnyCommand for Command<A> {
    fn arg_type(&self) -> &'static str {
        std::any::type_name::<A>()
    }

    fn cell_id(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const () as usize
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn execute_json(&self, arg: serde_json::Value) -> Result<(), BindError> {
        let arg: A = serde_json::from_value(arg).map_err(|source| BindError::Decode {
            type_name: std::any::type_name::<A>(),
            source,
        })?;
        self.execute_with(arg);
        Ok(())
    }

    fn boxed_clone(&self) -> Box<dyn AnyCommand> {
        Box::new(self.clone())
    }
}

impl dyn AnyCommand {
    /// Downcast to a typed command handle.
    #[must_use]
    pub fn downcast<A: Clone + 'static>(&self) -> Option<Command<A>> {
        self.as_any().downcast_ref::<Command<A>>().cloned()
    }

    /// Downcast to a typed command handle, reporting the argument type the
    /// command really takes on mismatch.
    pub fn try_downcast<A: Clone + 'static>(&self) -> Result<Command<A>, BindError> {
        self.downcast::<A>().ok_or_else(|| BindError::ArgumentMismatch {
            expected: std::any::type_name::<A>(),
            found: self.arg_type(),
        })
    }
}
