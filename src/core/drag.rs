//! Drag coordinator
//!
//! Tracks what is being dragged and which zone it hovers, and delivers drops
//! to the zone registered under the target id. The coordinator is platform
//! agnostic; mouse and touch input reach it through the adapters in
//! [`crate::core::gesture`].
//!
//! Every drop or cancel returns the coordinator to [`DragState::Idle`],
//! whether or not a zone accepted the item.

use super::registry::DropZoneRegistry;
use studydash_types::DragItem;

/// Current drag gesture
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        item: DragItem,
        hovered_zone: Option<String>,
    },
}

/// Why a drop was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DropRejection {
    #[error("Zone {zone_id} does not accept items of type {item_type}")]
    TypeNotAccepted { item_type: String, zone_id: String },

    #[error("Drop failed: {0}")]
    MalformedPayload(String),
}

/// Result of a drop attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The zone's callback ran
    Accepted { zone_id: String },
    Rejected(DropRejection),
    /// No zone is registered under the target id
    UnknownZone { zone_id: String },
    /// Drop arrived while no drag was active
    NotDragging,
}

impl DropOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, DropOutcome::Accepted { .. })
    }
}

type RejectionCallback = Box<dyn Fn(&DropRejection)>;

/// Single source of truth for the active drag
pub struct DragCoordinator {
    registry: DropZoneRegistry,
    state: DragState,
    on_rejected: Option<RejectionCallback>,
}

impl DragCoordinator {
    pub fn new(registry: DropZoneRegistry) -> Self {
        Self {
            registry,
            state: DragState::Idle,
            on_rejected: None,
        }
    }

    /// Set a callback to be called when a drop is rejected, e.g. to show a
    /// notification
    pub fn set_on_rejected<F>(&mut self, callback: F)
    where
        F: Fn(&DropRejection) + 'static,
    {
        self.on_rejected = Some(Box::new(callback));
    }

    pub fn registry(&self) -> &DropZoneRegistry {
        &self.registry
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn active_item(&self) -> Option<&DragItem> {
        match &self.state {
            DragState::Dragging { item, .. } => Some(item),
            DragState::Idle => None,
        }
    }

    pub fn hovered_zone(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging { hovered_zone, .. } => hovered_zone.as_deref(),
            DragState::Idle => None,
        }
    }

    /// Begin dragging `item`. A drag already in progress is replaced.
    pub fn start_drag(&mut self, item: DragItem) {
        if let DragState::Dragging { item: previous, .. } = &self.state {
            log::debug!("Drag of {} replaced by {}", previous.id, item.id);
        }
        log::trace!("Drag started: {} ({})", item.id, item.item_type);
        self.state = DragState::Dragging {
            item,
            hovered_zone: None,
        };
    }

    /// Record the zone under the pointer. Ignored when idle.
    pub fn on_hover(&mut self, zone_id: &str) {
        if let DragState::Dragging { hovered_zone, .. } = &mut self.state {
            if hovered_zone.as_deref() != Some(zone_id) {
                *hovered_zone = Some(zone_id.to_string());
            }
        }
    }

    /// Clear the hovered zone if the pointer left it
    pub fn on_leave(&mut self, zone_id: &str) {
        if let DragState::Dragging { hovered_zone, .. } = &mut self.state {
            if hovered_zone.as_deref() == Some(zone_id) {
                *hovered_zone = None;
            }
        }
    }

    /// Drop the active item on a zone
    pub fn drop(&mut self, zone_id: &str, index: Option<usize>) -> DropOutcome {
        match std::mem::take(&mut self.state) {
            DragState::Idle => {
                log::debug!("Drop on {} ignored, no active drag", zone_id);
                DropOutcome::NotDragging
            }
            DragState::Dragging { item, .. } => self.dispatch(&item, zone_id, index),
        }
    }

    /// Drop an item that arrived as a serialized transfer payload.
    ///
    /// The payload, not the locally tracked item, is authoritative, so drops
    /// originating outside this coordinator are delivered too.
    pub fn drop_payload(&mut self, zone_id: &str, payload: &str, index: Option<usize>) -> DropOutcome {
        self.state = DragState::Idle;
        match DragItem::from_payload(payload) {
            Ok(item) => self.dispatch(&item, zone_id, index),
            Err(e) => self.reject(DropRejection::MalformedPayload(e.to_string())),
        }
    }

    /// End the gesture as a failed drop with the given reason
    pub fn fail_drop(&mut self, reason: impl Into<String>) -> DropOutcome {
        self.state = DragState::Idle;
        self.reject(DropRejection::MalformedPayload(reason.into()))
    }

    /// Abandon the active drag without running any callback
    pub fn cancel_drag(&mut self) {
        if let DragState::Dragging { item, .. } = std::mem::take(&mut self.state) {
            log::trace!("Drag of {} cancelled", item.id);
        }
    }

    fn dispatch(&self, item: &DragItem, zone_id: &str, index: Option<usize>) -> DropOutcome {
        let Some(zone) = self.registry.lookup(zone_id) else {
            log::debug!("Drop of {} on unknown zone {}", item.id, zone_id);
            return DropOutcome::UnknownZone {
                zone_id: zone_id.to_string(),
            };
        };

        if !zone.accepts_type(&item.item_type) {
            return self.reject(DropRejection::TypeNotAccepted {
                item_type: item.item_type.clone(),
                zone_id: zone_id.to_string(),
            });
        }

        // The registry is not borrowed while the callback runs, so the
        // callback may register or unregister zones.
        let callback = zone.on_drop();
        callback(item, index);
        log::debug!("Dropped {} on {}", item.id, zone_id);

        DropOutcome::Accepted {
            zone_id: zone_id.to_string(),
        }
    }

    fn reject(&self, rejection: DropRejection) -> DropOutcome {
        log::warn!("{}", rejection);
        if let Some(callback) = &self.on_rejected {
            callback(&rejection);
        }
        DropOutcome::Rejected(rejection)
    }
}
