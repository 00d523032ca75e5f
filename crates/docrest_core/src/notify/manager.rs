//! Listener registry and synchronous dispatch.

use super::{ListenerError, NotifyError, PersistenceEvent, PersistenceListener};
use log::warn;
use std::sync::{Arc, PoisonError, RwLock};

type ListenerHandle<D> = Arc<dyn PersistenceListener<D>>;

/// Ordered set of listeners keyed by handle identity.
///
/// Dispatch iterates a snapshot taken under the read lock, so listeners may
/// be added or removed concurrently (including from inside a callback).
///
/// No listener code runs while the lock is held, so a poisoned lock still
/// guards a consistent list and is recovered instead of reported.
pub struct PersistenceListenerManager<D> {
    listeners: RwLock<Vec<ListenerHandle<D>>>,
}

impl<D> Default for PersistenceListenerManager<D> {
    fn default() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
        }
    }
}

impl<D> PersistenceListenerManager<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` at the end of the dispatch order.
    ///
    /// Returns `false` without changing the order when the same handle is
    /// already registered.
    pub fn add_persistence_listener(&self, listener: ListenerHandle<D>) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        if listeners
            .iter()
            .any(|existing| same_handle(existing, &listener))
        {
            return false;
        }
        listeners.push(listener);
        true
    }

    /// Unregisters `listener`; removing a non-member is a no-op.
    pub fn remove_persistence_listener<L>(&self, listener: &Arc<L>) -> bool
    where
        L: PersistenceListener<D> + ?Sized,
    {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|existing| !same_handle(existing, listener));
        listeners.len() != before
    }

    pub fn contains<L>(&self, listener: &Arc<L>) -> bool
    where
        L: PersistenceListener<D> + ?Sized,
    {
        self.snapshot()
            .iter()
            .any(|existing| same_handle(existing, listener))
    }

    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn notify_document_added(&self, document: &D) -> Result<(), NotifyError> {
        self.dispatch(PersistenceEvent::Added, |listener| {
            listener.document_added(document)
        })
    }

    pub fn notify_document_updated(&self, document: &D) -> Result<(), NotifyError> {
        self.dispatch(PersistenceEvent::Updated, |listener| {
            listener.document_updated(document)
        })
    }

    pub fn notify_document_deleted(&self, id: &str) -> Result<(), NotifyError> {
        self.dispatch(PersistenceEvent::Deleted, |listener| {
            listener.document_deleted(id)
        })
    }

    fn snapshot(&self) -> Vec<ListenerHandle<D>> {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn dispatch<F>(&self, event: PersistenceEvent, call: F) -> Result<(), NotifyError>
    where
        F: Fn(&dyn PersistenceListener<D>) -> Result<(), ListenerError>,
    {
        let listeners = self.snapshot();
        let mut first: Option<ListenerError> = None;
        let mut failed = 0;

        for (position, listener) in listeners.iter().enumerate() {
            if let Err(err) = call(listener.as_ref()) {
                warn!(
                    "event=notify_dispatch module=notify status=error kind={} position={} error={}",
                    event.as_str(),
                    position,
                    err
                );
                failed += 1;
                first.get_or_insert(err);
            }
        }

        match first {
            None => Ok(()),
            Some(first) => Err(NotifyError {
                event,
                first,
                failed,
                attempted: listeners.len(),
            }),
        }
    }
}

fn same_handle<D, L>(existing: &ListenerHandle<D>, candidate: &Arc<L>) -> bool
where
    L: PersistenceListener<D> + ?Sized,
{
    // Identity is the allocation address; vtable metadata is ignored.
    Arc::as_ptr(existing) as *const () == Arc::as_ptr(candidate) as *const ()
}

#[cfg(test)]
mod tests {
    use super::PersistenceListenerManager;
    use crate::notify::{ListenerError, PersistenceEvent, PersistenceListener};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl PersistenceListener<String> for Recorder {
        fn document_added(&self, document: &String) -> Result<(), ListenerError> {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:added:{document}", self.name));
            if self.fail {
                return Err(ListenerError::new(format!("{} rejected", self.name)));
            }
            Ok(())
        }

        fn document_deleted(&self, id: &str) -> Result<(), ListenerError> {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:deleted:{id}", self.name));
            Ok(())
        }
    }

    fn recorder(
        name: &'static str,
        log: &Arc<Mutex<Vec<String>>>,
        fail: bool,
    ) -> Arc<Recorder> {
        Arc::new(Recorder {
            name,
            log: Arc::clone(log),
            fail,
        })
    }

    #[test]
    fn dispatches_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let manager = PersistenceListenerManager::<String>::new();
        manager.add_persistence_listener(recorder("a", &log, false));
        manager.add_persistence_listener(recorder("b", &log, false));

        manager.notify_document_added(&"doc".to_string()).unwrap();
        manager.notify_document_deleted("42").unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:added:doc", "b:added:doc", "a:deleted:42", "b:deleted:42"]
        );
    }

    #[test]
    fn add_twice_then_remove_once_leaves_listener_unregistered() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let manager = PersistenceListenerManager::<String>::new();
        let listener = recorder("a", &log, false);

        assert!(manager.add_persistence_listener(listener.clone()));
        assert!(!manager.add_persistence_listener(listener.clone()));
        assert_eq!(manager.len(), 1);

        assert!(manager.remove_persistence_listener(&listener));
        assert!(!manager.contains(&listener));
        assert!(manager.is_empty());
    }

    #[test]
    fn poisoned_registry_keeps_dispatching() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let manager = PersistenceListenerManager::<String>::new();
        manager.add_persistence_listener(recorder("a", &log, false));

        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = manager.listeners.write().unwrap();
            panic!("poison the registry lock");
        }));
        assert!(poisoned.is_err());
        assert!(manager.listeners.is_poisoned());

        assert!(manager.add_persistence_listener(recorder("b", &log, false)));
        manager.notify_document_added(&"doc".to_string()).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["a:added:doc", "b:added:doc"]);
    }

    #[test]
    fn removing_unknown_listener_is_noop() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let manager = PersistenceListenerManager::<String>::new();
        manager.add_persistence_listener(recorder("a", &log, false));

        let stranger = recorder("a", &log, false);
        assert!(!manager.remove_persistence_listener(&stranger));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn failure_does_not_block_later_listeners_and_first_error_is_reported() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let manager = PersistenceListenerManager::<String>::new();
        manager.add_persistence_listener(recorder("a", &log, true));
        manager.add_persistence_listener(recorder("b", &log, true));
        manager.add_persistence_listener(recorder("c", &log, false));

        let err = manager
            .notify_document_added(&"doc".to_string())
            .expect_err("failing listeners should surface");

        assert_eq!(err.event, PersistenceEvent::Added);
        assert_eq!(err.first, ListenerError::new("a rejected"));
        assert_eq!(err.failed, 2);
        assert_eq!(err.attempted, 3);
        assert_eq!(log.lock().unwrap().len(), 3);
    }

    #[test]
    fn callbacks_may_unregister_during_dispatch() {
        struct SelfRemoving {
            manager: Arc<PersistenceListenerManager<String>>,
            me: Mutex<Option<Arc<dyn PersistenceListener<String>>>>,
        }

        impl PersistenceListener<String> for SelfRemoving {
            fn document_updated(&self, _document: &String) -> Result<(), ListenerError> {
                if let Some(me) = self.me.lock().unwrap().take() {
                    self.manager.remove_persistence_listener(&me);
                }
                Ok(())
            }
        }

        let manager = Arc::new(PersistenceListenerManager::<String>::new());
        let listener = Arc::new(SelfRemoving {
            manager: Arc::clone(&manager),
            me: Mutex::new(None),
        });
        let handle: Arc<dyn PersistenceListener<String>> = listener.clone();
        *listener.me.lock().unwrap() = Some(handle.clone());
        manager.add_persistence_listener(handle);

        manager
            .notify_document_updated(&"doc".to_string())
            .unwrap();
        assert!(manager.is_empty());
    }
}
