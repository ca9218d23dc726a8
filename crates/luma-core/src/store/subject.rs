//! Broadcast subject holding a current value
//!
//! A `Subject` keeps the latest value and an ordered list of listeners.
//! Subscribing delivers the current value immediately, then every future one.
//! Publishing replaces the value and calls every listener, in registration
//! order, with the same `Arc`.
//!
//! Listeners run outside the lock, so a listener may read the subject (or the
//! store that owns it) without deadlocking. Delivery order matches the stored
//! value only for a single writer; concurrent `next` calls may reach listeners
//! in either order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

type Listener<T> = Arc<dyn Fn(&Arc<T>) + Send + Sync>;

struct Inner<T> {
    value: Arc<T>,
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

/// Removal hook used by `Subscription`, erasing the value type
trait Detach: Send + Sync {
    fn detach(&self, id: u64);
}

impl<T: Send + Sync> Detach for RwLock<Inner<T>> {
    fn detach(&self, id: u64) {
        let mut inner = self.write().unwrap_or_else(PoisonError::into_inner);
        inner.listeners.retain(|(listener_id, _)| *listener_id != id);
    }
}

/// Single-writer, multi-reader broadcast of a current value
pub struct Subject<T> {
    inner: Arc<RwLock<Inner<T>>>,
}

impl<T: Send + Sync + 'static> Subject<T> {
    /// Create a subject with an initial value
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                value: Arc::new(initial),
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner<T>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner<T>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Latest value
    pub fn get(&self) -> Arc<T> {
        self.read().value.clone()
    }

    /// Replace the value and notify every current listener
    pub fn next(&self, value: T) -> Arc<T> {
        let value = Arc::new(value);

        let listeners: Vec<Listener<T>> = {
            let mut inner = self.write();
            inner.value = value.clone();
            inner.listeners.iter().map(|(_, l)| l.clone()).collect()
        };

        for listener in listeners {
            listener(&value);
        }

        value
    }

    /// Register a listener. It receives the current value right away.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Arc<T>) + Send + Sync + 'static,
    {
        let listener: Listener<T> = Arc::new(listener);

        let (id, current) = {
            let mut inner = self.write();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push((id, listener.clone()));
            (id, inner.value.clone())
        };

        listener(&current);

        let weak: Weak<RwLock<Inner<T>>> = Arc::downgrade(&self.inner);
        let subject: Weak<dyn Detach> = weak;
        Subscription {
            id,
            subject,
            active: AtomicBool::new(true),
        }
    }

    /// Number of registered listeners
    pub fn subscriber_count(&self) -> usize {
        self.read().listeners.len()
    }
}

impl<T: Default + Send + Sync + 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Handle to a registered listener
///
/// Dropping the handle does not unsubscribe; call `unsubscribe`.
pub struct Subscription {
    id: u64,
    subject: Weak<dyn Detach>,
    active: AtomicBool,
}

impl Subscription {
    /// Stop receiving values. Safe to call more than once.
    pub fn unsubscribe(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            if let Some(subject) = self.subject.upgrade() {
                subject.detach(self.id);
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst) && self.subject.strong_count() > 0
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
