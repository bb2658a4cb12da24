//! UDM Context Management
//!
//! The UDM context owns the subscriber store and the SQN authority that
//! serializes vector issuance per subscriber.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ogs_dbi::AuthSubscriptionStore;

/// Per-subscriber lock registry for the SQN register
///
/// Each SUPI maps to its own mutex. Holding it across
/// read SQN -> compute vector -> commit SQN makes that sequence atomic
/// with respect to other requests for the same subscriber, while
/// requests for different subscribers never contend.
#[derive(Debug, Default)]
pub struct SqnAuthority {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SqnAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, supi: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(supi.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the registry entry once no other request holds it
    fn release(&self, supi: &str, register: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        // The map and this caller
        if Arc::strong_count(&register) == 2 {
            locks.remove(supi);
        }
        // Dropped under the map lock so the last holder always sees 2
        drop(register);
    }

    /// Run `f` while holding the SQN register of `supi`
    pub fn with_register<R>(&self, supi: &str, f: impl FnOnce() -> R) -> R {
        let register = self.register(supi);
        let result = {
            // Poisoning is ignored; the SQN commit is the last step under the lock
            let _guard = register.lock().unwrap_or_else(|e| e.into_inner());
            f()
        };
        self.release(supi, register);
        result
    }

    /// Number of subscribers with a request in flight
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// UDM context shared by all request handlers
pub struct UdmContext {
    store: Arc<dyn AuthSubscriptionStore>,
    sqn_authority: SqnAuthority,
}

impl UdmContext {
    pub fn new(store: Arc<dyn AuthSubscriptionStore>) -> Self {
        Self {
            store,
            sqn_authority: SqnAuthority::new(),
        }
    }

    pub fn store(&self) -> &dyn AuthSubscriptionStore {
        self.store.as_ref()
    }

    pub fn sqn_authority(&self) -> &SqnAuthority {
        &self.sqn_authority
    }
}

impl std::fmt::Debug for UdmContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdmContext")
            .field("sqn_authority", &self.sqn_authority)
            .finish_non_exhaustive()
    }
}
