//! Registry of drop zones
//!
//! Drop targets register themselves when they appear and are removed again
//! when the [`DropZoneGuard`] returned by [`DropZoneRegistry::register`] is
//! dropped, so a target that goes away on any path (including an early
//! return or a panic) never lingers in the registry.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::{Rc, Weak};
use studydash_types::DragItem;

/// Callback run when an accepted item is dropped on a zone.
/// Receives the item and the insertion index, if the gesture supplied one.
pub type DropCallback = Rc<dyn Fn(&DragItem, Option<usize>)>;

/// A drop target
#[derive(Clone)]
pub struct DropZone {
    pub id: String,
    /// Kind of target (e.g. "dashboard-grid", "widget-palette")
    pub zone_type: String,
    /// Item types this zone accepts
    pub accepts: HashSet<String>,
    on_drop: DropCallback,
}

impl DropZone {
    pub fn new<I, T, F>(id: impl Into<String>, zone_type: impl Into<String>, accepts: I, on_drop: F) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
        F: Fn(&DragItem, Option<usize>) + 'static,
    {
        Self {
            id: id.into(),
            zone_type: zone_type.into(),
            accepts: accepts.into_iter().map(Into::into).collect(),
            on_drop: Rc::new(on_drop),
        }
    }

    pub fn accepts_type(&self, item_type: &str) -> bool {
        self.accepts.contains(item_type)
    }

    /// Handle to the drop callback
    pub fn on_drop(&self) -> DropCallback {
        self.on_drop.clone()
    }
}

impl fmt::Debug for DropZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropZone")
            .field("id", &self.id)
            .field("zone_type", &self.zone_type)
            .field("accepts", &self.accepts)
            .finish_non_exhaustive()
    }
}

struct ZoneEntry {
    zone: DropZone,
    generation: u64,
}

#[derive(Default)]
struct RegistryInner {
    zones: HashMap<String, ZoneEntry>,
    next_generation: u64,
}

/// Shared, single-threaded map from zone id to drop zone.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct DropZoneRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

impl DropZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a zone, replacing any zone with the same id.
    ///
    /// The zone stays registered until the returned guard is dropped.
    #[must_use = "dropping the guard unregisters the zone immediately"]
    pub fn register(&self, zone: DropZone) -> DropZoneGuard {
        let mut inner = self.inner.borrow_mut();
        let generation = inner.next_generation;
        inner.next_generation += 1;

        let zone_id = zone.id.clone();
        if inner
            .zones
            .insert(zone_id.clone(), ZoneEntry { zone, generation })
            .is_some()
        {
            log::debug!("Drop zone {} re-registered, replacing previous entry", zone_id);
        }

        DropZoneGuard {
            registry: Rc::downgrade(&self.inner),
            zone_id,
            generation,
        }
    }

    /// Remove a zone by id. Removing an unknown zone is a no-op.
    pub fn unregister(&self, zone_id: &str) -> bool {
        self.inner.borrow_mut().zones.remove(zone_id).is_some()
    }

    pub fn lookup(&self, zone_id: &str) -> Option<DropZone> {
        self.inner.borrow().zones.get(zone_id).map(|entry| entry.zone.clone())
    }

    pub fn contains(&self, zone_id: &str) -> bool {
        self.inner.borrow().zones.contains_key(zone_id)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of all registered zones, sorted
    pub fn zone_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.borrow().zones.keys().cloned().collect();
        ids.sort();
        ids
    }
}

/// Keeps a zone registered for as long as it lives.
///
/// A guard only removes the registration it created: if the zone id was
/// registered again in the meantime, dropping the older guard leaves the
/// newer zone in place.
#[must_use = "dropping the guard unregisters the zone immediately"]
pub struct DropZoneGuard {
    registry: Weak<RefCell<RegistryInner>>,
    zone_id: String,
    generation: u64,
}

impl DropZoneGuard {
    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    /// Unregister now rather than at end of scope
    pub fn unregister(self) {}
}

impl Drop for DropZoneGuard {
    fn drop(&mut self) {
        let Some(inner) = self.registry.upgrade() else {
            return;
        };
        let mut inner = inner.borrow_mut();
        let owned = inner
            .zones
            .get(&self.zone_id)
            .is_some_and(|entry| entry.generation == self.generation);
        if owned {
            inner.zones.remove(&self.zone_id);
            log::trace!("Drop zone {} unregistered", self.zone_id);
        }
    }
}
