//! Transient resource handles
//!
//! Every page image and media file the viewer presents is referenced through
//! an [`ObjectUrl`] minted by an [`ObjectUrls`] registry. The handle is not
//! `Clone`: whoever holds it owns the resource, and revoking consumes it, so
//! a handle can only be released once.
//!
//! Clone-safe: all clones of a registry share the same table of live handles.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

const URL_SCHEME: &str = "blob:page-turner/";

/// Owned reference to one binary resource registered with [`ObjectUrls`]
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Default)]
struct Registry {
    /// Live handles and the size of the resource behind each
    live: HashMap<String, usize>,
    created: usize,
    revoked: usize,
}

/// Registry of live transient handles
#[derive(Debug, Clone, Default)]
pub struct ObjectUrls {
    inner: Arc<Mutex<Registry>>,
}

impl ObjectUrls {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Mint a handle for a resource of `size` bytes
    pub fn create(&self, size: usize) -> ObjectUrl {
        let url = format!("{}{}", URL_SCHEME, uuid::Uuid::new_v4());
        let mut registry = self.registry();
        registry.live.insert(url.clone(), size);
        registry.created += 1;
        log::trace!("Created {} ({} bytes)", url, size);
        ObjectUrl(url)
    }

    /// Release a handle
    ///
    /// Returns false if the handle was not minted by this registry.
    pub fn revoke(&self, url: ObjectUrl) -> bool {
        let mut registry = self.registry();
        if registry.live.remove(&url.0).is_some() {
            registry.revoked += 1;
            log::trace!("Revoked {}", url.0);
            true
        } else {
            log::warn!("Attempted to revoke unknown handle {}", url.0);
            false
        }
    }

    /// Check whether a handle is still live
    pub fn is_live(&self, url: &ObjectUrl) -> bool {
        self.registry().live.contains_key(&url.0)
    }

    /// Number of handles currently live
    pub fn live_count(&self) -> usize {
        self.registry().live.len()
    }

    /// Total bytes behind the live handles
    pub fn live_bytes(&self) -> usize {
        self.registry().live.values().sum()
    }

    /// Number of handles ever created and revoked, in that order
    pub fn totals(&self) -> (usize, usize) {
        let registry = self.registry();
        (registry.created, registry.revoked)
    }
}
