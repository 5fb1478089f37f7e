//! Pointer gesture adapters
//!
//! Mouse drags (native drag-and-drop) and touch drags deliver very different
//! events. Each adapter translates one platform's events into calls on a
//! [`DragCoordinator`], so the coordinator's state machine is the same for
//! both.

use super::drag::{DragCoordinator, DropOutcome};
use std::collections::HashMap;
use studydash_types::{ContainerRect, DragItem, DRAG_MIME_TYPE};

/// Translates platform input events into coordinator calls
pub trait PointerAdapter {
    type Event;

    /// Feed one event. Returns the drop outcome when the event ended a drag
    /// on a zone.
    fn feed(&mut self, event: Self::Event, coordinator: &mut DragCoordinator) -> Option<DropOutcome>;
}

/// Data carried by a native drag, keyed by MIME type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTransfer {
    data: HashMap<String, String>,
}

impl DataTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_data(&mut self, format: &str, data: impl Into<String>) {
        self.data.insert(format.to_string(), data.into());
    }

    pub fn get_data(&self, format: &str) -> Option<&str> {
        self.data.get(format).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Transfer carrying a serialized drag item
    pub fn with_item(item: &DragItem) -> serde_json::Result<Self> {
        let mut transfer = Self::new();
        transfer.set_data(DRAG_MIME_TYPE, item.to_payload()?);
        Ok(transfer)
    }
}

/// Native (mouse) drag-and-drop events
#[derive(Debug, Clone)]
pub enum NativeDragEvent {
    DragStart(DragItem),
    DragOver { zone_id: String },
    DragLeave { zone_id: String },
    /// The receiving side gets the item only through the transfer
    Drop {
        zone_id: String,
        transfer: DataTransfer,
        index: Option<usize>,
    },
    /// Fired on the source after every drag, dropped or not
    DragEnd,
    Escape,
}

/// Adapter for native drag-and-drop.
///
/// On drag start the item is serialized into the outgoing transfer under
/// `application/json`; on drop the item is decoded from the transfer the
/// target received.
#[derive(Debug, Default)]
pub struct NativeDragAdapter {
    outgoing: DataTransfer,
}

impl NativeDragAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transfer attached to the drag in progress
    pub fn transfer(&self) -> &DataTransfer {
        &self.outgoing
    }
}

impl PointerAdapter for NativeDragAdapter {
    type Event = NativeDragEvent;

    fn feed(&mut self, event: NativeDragEvent, coordinator: &mut DragCoordinator) -> Option<DropOutcome> {
        match event {
            NativeDragEvent::DragStart(item) => {
                self.outgoing = match DataTransfer::with_item(&item) {
                    Ok(transfer) => transfer,
                    Err(e) => {
                        log::warn!("Could not serialize drag item {}: {}", item.id, e);
                        DataTransfer::new()
                    }
                };
                coordinator.start_drag(item);
                None
            }
            NativeDragEvent::DragOver { zone_id } => {
                coordinator.on_hover(&zone_id);
                None
            }
            NativeDragEvent::DragLeave { zone_id } => {
                coordinator.on_leave(&zone_id);
                None
            }
            NativeDragEvent::Drop {
                zone_id,
                transfer,
                index,
            } => {
                self.outgoing.clear();
                let outcome = match transfer.get_data(DRAG_MIME_TYPE) {
                    Some(payload) => coordinator.drop_payload(&zone_id, payload, index),
                    None => coordinator.fail_drop(format!("no {} data in transfer", DRAG_MIME_TYPE)),
                };
                Some(outcome)
            }
            NativeDragEvent::DragEnd | NativeDragEvent::Escape => {
                self.outgoing.clear();
                coordinator.cancel_drag();
                None
            }
        }
    }
}

/// Touch events, in pixels
#[derive(Debug, Clone)]
pub enum TouchEvent {
    Start { item: DragItem, x: f64, y: f64 },
    Move { x: f64, y: f64 },
    End { x: f64, y: f64 },
    Cancel,
}

/// Adapter for touch drags.
///
/// Touch input has no drop targets of its own, so zones publish their
/// on-screen bounds here and the adapter hit-tests the finger position.
/// Releasing outside every zone cancels the drag.
#[derive(Debug, Default)]
pub struct TouchAdapter {
    /// Later entries are on top
    zones: Vec<(String, ContainerRect)>,
    touch_point: Option<(f64, f64)>,
}

impl TouchAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace the bounds of a zone
    pub fn set_zone_bounds(&mut self, zone_id: impl Into<String>, bounds: ContainerRect) {
        let zone_id = zone_id.into();
        self.zones.retain(|(id, _)| *id != zone_id);
        self.zones.push((zone_id, bounds));
    }

    pub fn remove_zone_bounds(&mut self, zone_id: &str) {
        self.zones.retain(|(id, _)| id != zone_id);
    }

    /// Topmost zone containing the point
    pub fn zone_at(&self, x: f64, y: f64) -> Option<&str> {
        self.zones
            .iter()
            .rev()
            .find(|(_, bounds)| bounds.contains(x, y))
            .map(|(id, _)| id.as_str())
    }

    /// Last known finger position of the active touch
    pub fn touch_point(&self) -> Option<(f64, f64)> {
        self.touch_point
    }

    fn hover_at(&self, x: f64, y: f64, coordinator: &mut DragCoordinator) {
        match self.zone_at(x, y) {
            Some(zone_id) => coordinator.on_hover(zone_id),
            None => {
                if let Some(previous) = coordinator.hovered_zone().map(str::to_owned) {
                    coordinator.on_leave(&previous);
                }
            }
        }
    }
}

impl PointerAdapter for TouchAdapter {
    type Event = TouchEvent;

    fn feed(&mut self, event: TouchEvent, coordinator: &mut DragCoordinator) -> Option<DropOutcome> {
        match event {
            TouchEvent::Start { item, x, y } => {
                self.touch_point = Some((x, y));
                coordinator.start_drag(item);
                self.hover_at(x, y, coordinator);
                None
            }
            TouchEvent::Move { x, y } => {
                if !coordinator.is_dragging() {
                    return None;
                }
                self.touch_point = Some((x, y));
                self.hover_at(x, y, coordinator);
                None
            }
            TouchEvent::End { x, y } => {
                self.touch_point = None;
                if !coordinator.is_dragging() {
                    return None;
                }
                match self.zone_at(x, y).map(str::to_owned) {
                    Some(zone_id) => Some(coordinator.drop(&zone_id, None)),
                    None => {
                        coordinator.cancel_drag();
                        None
                    }
                }
            }
            TouchEvent::Cancel => {
                self.touch_point = None;
                coordinator.cancel_drag();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::drag::{DragState, DropRejection};
    use crate::core::registry::{DropZone, DropZoneGuard, DropZoneRegistry};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup() -> (DragCoordinator, Rc<RefCell<Vec<String>>>, DropZoneGuard) {
        let registry = DropZoneRegistry::new();
        let dropped = Rc::new(RefCell::new(Vec::new()));
        let dropped_clone = dropped.clone();
        let guard = registry.register(DropZone::new("grid", "grid", ["widget"], move |item, _| {
            dropped_clone.borrow_mut().push(item.id.clone());
        }));
        (DragCoordinator::new(registry), dropped, guard)
    }

    #[test]
    fn test_native_drag_roundtrip() {
        let (mut coordinator, dropped, _zone) = setup();
        let mut adapter = NativeDragAdapter::new();

        adapter.feed(NativeDragEvent::DragStart(DragItem::new("w1", "widget")), &mut coordinator);
        assert!(adapter.transfer().get_data(DRAG_MIME_TYPE).is_some());

        adapter.feed(
            NativeDragEvent::DragOver {
                zone_id: "grid".to_string(),
            },
            &mut coordinator,
        );
        assert_eq!(coordinator.hovered_zone(), Some("grid"));

        let transfer = adapter.transfer().clone();
        let outcome = adapter.feed(
            NativeDragEvent::Drop {
                zone_id: "grid".to_string(),
                transfer,
                index: None,
            },
            &mut coordinator,
        );
        assert!(outcome.unwrap().is_accepted());
        assert_eq!(*dropped.borrow(), vec!["w1".to_string()]);

        // dragend after a completed drop is harmless
        adapter.feed(NativeDragEvent::DragEnd, &mut coordinator);
        assert_eq!(*coordinator.state(), DragState::Idle);
    }

    #[test]
    fn test_native_drop_without_payload_fails() {
        let (mut coordinator, dropped, _zone) = setup();
        let mut adapter = NativeDragAdapter::new();

        adapter.feed(NativeDragEvent::DragStart(DragItem::new("w1", "widget")), &mut coordinator);
        let outcome = adapter.feed(
            NativeDragEvent::Drop {
                zone_id: "grid".to_string(),
                transfer: DataTransfer::new(),
                index: None,
            },
            &mut coordinator,
        );

        assert!(matches!(
            outcome,
            Some(DropOutcome::Rejected(DropRejection::MalformedPayload(_)))
        ));
        assert!(dropped.borrow().is_empty());
        assert!(!coordinator.is_dragging());
    }

    #[test]
    fn test_native_escape_cancels() {
        let (mut coordinator, _, _zone) = setup();
        let mut adapter = NativeDragAdapter::new();

        adapter.feed(NativeDragEvent::DragStart(DragItem::new("w1", "widget")), &mut coordinator);
        adapter.feed(NativeDragEvent::Escape, &mut coordinator);

        assert!(!coordinator.is_dragging());
        assert!(adapter.transfer().is_empty());
    }

    #[test]
    fn test_touch_drop_on_zone_under_finger() {
        let (mut coordinator, dropped, _zone) = setup();
        let mut adapter = TouchAdapter::new();
        adapter.set_zone_bounds("grid", ContainerRect::new(0.0, 0.0, 100.0, 100.0));

        adapter.feed(
            TouchEvent::Start {
                item: DragItem::new("w1", "widget"),
                x: 150.0,
                y: 150.0,
            },
            &mut coordinator,
        );
        assert_eq!(coordinator.hovered_zone(), None);

        adapter.feed(TouchEvent::Move { x: 50.0, y: 50.0 }, &mut coordinator);
        assert_eq!(coordinator.hovered_zone(), Some("grid"));
        assert_eq!(adapter.touch_point(), Some((50.0, 50.0)));

        let outcome = adapter.feed(TouchEvent::End { x: 60.0, y: 40.0 }, &mut coordinator);
        assert!(outcome.unwrap().is_accepted());
        assert_eq!(*dropped.borrow(), vec!["w1".to_string()]);
    }

    #[test]
    fn test_touch_release_outside_cancels() {
        let (mut coordinator, dropped, _zone) = setup();
        let mut adapter = TouchAdapter::new();
        adapter.set_zone_bounds("grid", ContainerRect::new(0.0, 0.0, 100.0, 100.0));

        adapter.feed(
            TouchEvent::Start {
                item: DragItem::new("w1", "widget"),
                x: 10.0,
                y: 10.0,
            },
            &mut coordinator,
        );
        adapter.feed(TouchEvent::Move { x: 300.0, y: 10.0 }, &mut coordinator);
        assert_eq!(coordinator.hovered_zone(), None);

        assert!(adapter.feed(TouchEvent::End { x: 300.0, y: 10.0 }, &mut coordinator).is_none());
        assert!(!coordinator.is_dragging());
        assert!(dropped.borrow().is_empty());
    }

    #[test]
    fn test_topmost_zone_wins() {
        let mut adapter = TouchAdapter::new();
        adapter.set_zone_bounds("back", ContainerRect::new(0.0, 0.0, 200.0, 200.0));
        adapter.set_zone_bounds("front", ContainerRect::new(50.0, 50.0, 50.0, 50.0));

        assert_eq!(adapter.zone_at(60.0, 60.0), Some("front"));
        assert_eq!(adapter.zone_at(10.0, 10.0), Some("back"));

        adapter.remove_zone_bounds("front");
        assert_eq!(adapter.zone_at(60.0, 60.0), Some("back"));
    }
}
