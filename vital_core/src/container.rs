//! Lazily-instantiated singleton container.
//!
//! A [`Container`] maps a service key to a factory. The first `resolve` of a
//! key runs its factory and memoizes the result; every later `resolve`
//! returns the same `Arc`. Factories receive the container so they can
//! resolve their own dependencies, which makes registration order irrelevant.

use crate::{Error, Result};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type Instance = Box<dyn Any + Send + Sync>;
type Factory = dyn Fn(&Container) -> Result<Instance> + Send + Sync;

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    // (container id, key) pairs currently being constructed on this thread
    static RESOLVING: RefCell<Vec<(u64, String)>> = const { RefCell::new(Vec::new()) };
}

struct Entry {
    factory: Arc<Factory>,
    instance: Arc<OnceCell<Instance>>,
}

/// Registry of lazily-built, memoized services
pub struct Container {
    id: u64,
    entries: Mutex<HashMap<String, Entry>>,
}

impl Container {
    pub fn new() -> Self {
        Self {
            id: NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Register a factory under `key`
    ///
    /// A previous registration for the same key has its factory replaced.
    /// An instance that was already built is kept, so the new factory only
    /// runs if the key has not been resolved yet.
    pub fn register<T, F>(&self, key: impl Into<String>, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        let key = key.into();
        let mut entries = self.lock();
        match entries.get_mut(&key) {
            Some(entry) => {
                entry.factory = Entry::wrap(factory);
                if entry.instance.get().is_some() {
                    tracing::warn!(
                        "Service {} re-registered after instantiation; existing instance kept",
                        key
                    );
                } else {
                    tracing::warn!("Service {} re-registered; previous factory replaced", key);
                }
            }
            None => {
                tracing::debug!("Registered service {}", key);
                entries.insert(key, Entry::new(factory));
            }
        }
    }

    /// Register a factory, failing if `key` already has one
    pub fn try_register<T, F>(&self, key: impl Into<String>, factory: F) -> Result<()>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        let key = key.into();
        let mut entries = self.lock();
        if entries.contains_key(&key) {
            return Err(Error::ServiceAlreadyRegistered(key));
        }
        tracing::debug!("Registered service {}", key);
        entries.insert(key, Entry::new(factory));
        Ok(())
    }

    /// Register an already-built singleton
    pub fn register_instance<T>(&self, key: impl Into<String>, instance: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.register(key, move |_| Ok(Arc::clone(&instance)));
    }

    /// Resolve the singleton registered under `key`
    ///
    /// The factory runs at most once per registration, even when several
    /// threads resolve the same key at the same time.
    pub fn resolve<T>(&self, key: &str) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let (factory, cell) = {
            let entries = self.lock();
            let entry = entries
                .get(key)
                .ok_or_else(|| Error::ServiceNotRegistered(key.to_string()))?;
            (Arc::clone(&entry.factory), Arc::clone(&entry.instance))
        };

        let instance = match cell.get() {
            Some(instance) => instance,
            None => {
                // Lock is released here so the factory may resolve other keys.
                let _guard = ResolutionGuard::enter(self.id, key)?;
                cell.get_or_try_init(|| {
                    tracing::debug!("Instantiating service {}", key);
                    factory(self)
                })?
            }
        };

        instance
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or_else(|| Error::ServiceTypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Whether a factory exists for `key` (it may not have been built yet)
    pub fn is_registered(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Whether `key` has been resolved at least once
    pub fn is_instantiated(&self, key: &str) -> bool {
        self.lock()
            .get(key)
            .map(|entry| entry.instance.get().is_some())
            .unwrap_or(false)
    }

    /// Registered keys, sorted
    pub fn registered_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Drop every factory and instance
    pub fn clear(&self) {
        let mut entries = self.lock();
        tracing::debug!("Clearing {} registered services", entries.len());
        entries.clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        // A panicking factory never runs under this lock, so the map is intact.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Entry {
    fn new<T, F>(factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        Self {
            factory: Self::wrap(factory),
            instance: Arc::new(OnceCell::new()),
        }
    }

    fn wrap<T, F>(factory: F) -> Arc<Factory>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        Arc::new(move |container: &Container| {
            factory(container).map(|arc| Box::new(arc) as Instance)
        })
    }
}

/// Marks a key as under construction on the current thread
struct ResolutionGuard;

impl ResolutionGuard {
    fn enter(container_id: u64, key: &str) -> Result<Self> {
        RESOLVING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.iter().any(|(id, k)| *id == container_id && k == key) {
                let mut chain: Vec<&str> = stack
                    .iter()
                    .filter(|(id, _)| *id == container_id)
                    .map(|(_, k)| k.as_str())
                    .collect();
                chain.push(key);
                return Err(Error::CircularDependency(chain.join(" -> ")));
            }
            stack.push((container_id, key.to_string()));
            Ok(ResolutionGuard)
        })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        RESOLVING.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}
