use crate::{
    core::geo::{LatLng, LatLngBounds},
    input::events::MapEvent,
    prelude::Duration,
};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex, Weak};

/// View change applied by the map, recorded for the renderer to animate
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Zoom set directly
    Zoom { level: f64 },
    /// Fit the view to an extent
    FitExtent {
        bounds: LatLngBounds,
        center: LatLng,
        zoom: f64,
        max_zoom: f64,
        padding: f64,
        duration: Duration,
    },
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    subscribers: Vec<(u64, Sender<MapEvent>)>,
}

/// Broadcast channel for [`MapEvent`]s.
///
/// Cloning yields another handle onto the same subscriber set. Each
/// subscriber receives every event published after it subscribed.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber; it stays registered until the returned guard drops
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let id = match self.inner.lock() {
            Ok(mut inner) => {
                let id = inner.next_id;
                inner.next_id += 1;
                inner.subscribers.push((id, sender));
                id
            }
            Err(_) => {
                log::error!("event bus lock poisoned; subscription will receive nothing");
                u64::MAX
            }
        };

        Subscription {
            id,
            receiver,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Sends `event` to every live subscriber and returns how many received it
    pub fn publish(&self, event: MapEvent) -> usize {
        let Ok(mut inner) = self.inner.lock() else {
            log::error!("event bus lock poisoned; dropping {}", event.event_type());
            return 0;
        };

        // Receivers dropped without unsubscribing are pruned here
        inner
            .subscribers
            .retain(|(_, sender)| sender.send(event.clone()).is_ok());
        log::debug!(
            "published {} to {} subscribers",
            event.event_type(),
            inner.subscribers.len()
        );
        inner.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.subscribers.len())
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Scoped registration on an [`EventBus`]; dropping it unsubscribes
pub struct Subscription {
    id: u64,
    receiver: Receiver<MapEvent>,
    bus: Weak<Mutex<BusInner>>,
}

impl Subscription {
    pub fn try_recv(&self) -> Option<MapEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Every event queued so far, oldest first
    pub fn drain(&self) -> Vec<MapEvent> {
        self.receiver.try_iter().collect()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<MapEvent> {
        self.receiver.recv_timeout(timeout).ok()
    }

    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            if let Ok(mut inner) = bus.lock() {
                inner.subscribers.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("pending", &self.pending())
            .finish()
    }
}
