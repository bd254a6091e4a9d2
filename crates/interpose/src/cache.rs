//! Identity cache: one artifact per (loader, surface, constructor arguments).

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use interpose_core::{CapabilitySurface, JType};
use interpose_gen::GeneratedArtifact;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::host::Loader;

/// Shared handle to a defined artifact.
pub type ArtifactHandle = Arc<GeneratedArtifact>;

/// Placeholder cell: empty while the first requester generates.
type Slot = Arc<OnceCell<ArtifactHandle>>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ArtifactKey {
    surface: CapabilitySurface,
    ctor_args: Vec<JType>,
}

struct LoaderEntry {
    loader: Weak<dyn Loader>,
    slots: HashMap<ArtifactKey, Slot>,
}

/// Loader-scoped artifact cache.
///
/// Loaders are held weakly and keyed by pointer identity; entries of dropped
/// loaders are expunged on the next access. The map lock is never held while
/// generating: requesters for the same key block on the shared [`OnceCell`]
/// instead. A failed generation hands the placeholder to the next waiter, or
/// removes it when nobody else is waiting.
#[derive(Default)]
pub struct IdentityCache {
    loaders: Mutex<HashMap<usize, LoaderEntry>>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached artifact for the key, or run `create` once for it.
    pub fn get_or_create<E>(
        &self,
        loader: &Arc<dyn Loader>,
        surface: &CapabilitySurface,
        ctor_args: &[JType],
        create: impl FnOnce() -> Result<ArtifactHandle, E>,
    ) -> Result<ArtifactHandle, E> {
        let key = ArtifactKey {
            surface: surface.clone(),
            ctor_args: ctor_args.to_vec(),
        };
        let slot = self.slot(loader, &key);

        if let Some(handle) = slot.get() {
            tracing::debug!(name = %handle.name, "artifact cache hit");
            return Ok(handle.clone());
        }

        tracing::debug!(contracts = surface.len(), "artifact cache miss");
        let created = slot.get_or_try_init(create).map(Arc::clone);
        if created.is_err() {
            self.discard(loader, &key, slot);
        }
        created
    }

    /// Cached artifact for the key, without creating one.
    pub fn get(
        &self,
        loader: &Arc<dyn Loader>,
        surface: &CapabilitySurface,
        ctor_args: &[JType],
    ) -> Option<ArtifactHandle> {
        let key = ArtifactKey {
            surface: surface.clone(),
            ctor_args: ctor_args.to_vec(),
        };
        let mut loaders = self.loaders.lock();
        expunge(&mut loaders);
        loaders
            .get(&loader_id(loader))
            .and_then(|entry| entry.slots.get(&key))
            .and_then(|slot| slot.get().cloned())
    }

    /// Number of loaders with live entries.
    pub fn loader_count(&self) -> usize {
        let mut loaders = self.loaders.lock();
        expunge(&mut loaders);
        loaders.len()
    }

    /// Number of installed artifacts across live loaders.
    pub fn len(&self) -> usize {
        let mut loaders = self.loaders.lock();
        expunge(&mut loaders);
        loaders
            .values()
            .flat_map(|entry| entry.slots.values())
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, loader: &Arc<dyn Loader>, key: &ArtifactKey) -> Slot {
        let mut loaders = self.loaders.lock();
        expunge(&mut loaders);
        let entry = loaders
            .entry(loader_id(loader))
            .or_insert_with(|| LoaderEntry {
                loader: Arc::downgrade(loader),
                slots: HashMap::new(),
            });
        entry.slots.entry(key.clone()).or_default().clone()
    }

    /// Remove a placeholder after a failed generation. Other requesters hold
    /// clones of the slot while they wait on it, and one of them takes over
    /// the init; the slot only goes once the map holds the last reference.
    fn discard(&self, loader: &Arc<dyn Loader>, key: &ArtifactKey, slot: Slot) {
        let mut loaders = self.loaders.lock();
        let Some(entry) = loaders.get_mut(&loader_id(loader)) else {
            return;
        };
        let ours = Arc::as_ptr(&slot);
        drop(slot);
        let abandoned = entry.slots.get(key).is_some_and(|current| {
            Arc::as_ptr(current) == ours
                && Arc::strong_count(current) == 1
                && current.get().is_none()
        });
        if abandoned {
            entry.slots.remove(key);
        }
        if entry.slots.is_empty() {
            loaders.remove(&loader_id(loader));
        }
    }
}

fn loader_id(loader: &Arc<dyn Loader>) -> usize {
    Arc::as_ptr(loader) as *const () as usize
}

/// Drop entries whose loader is gone. Runs under the map lock, so a new
/// loader allocated at a reclaimed address never sees the old entry.
fn expunge(loaders: &mut HashMap<usize, LoaderEntry>) {
    let before = loaders.len();
    loaders.retain(|_, entry| entry.loader.strong_count() > 0);
    let stale = before - loaders.len();
    if stale > 0 {
        tracing::debug!(stale, "expunged entries of dropped loaders");
    }
}
