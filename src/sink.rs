//! Outbound events to the external consumer.
//!
//! Every emission goes through one broadcast channel, so any receiver sees
//! device-list updates and notifications interleaved in the exact order they
//! were emitted.

use futures::stream::{self, Stream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::projection::DeviceRecord;
use crate::sdk::device::NotificationType;

/// Event name for a full device-list update.
pub const DEVICE_LIST_UPDATED: &str = "deviceListUpdated";

/// Event name for a device notification.
pub const NOTIFICATION_RECEIVED: &str = "notificationReceived";

/// An event delivered to the consumer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "event", content = "payload", rename_all = "camelCase")
)]
pub enum BridgeEvent {
    /// The complete, ordered device list.
    DeviceListUpdated(Vec<DeviceRecord>),
    /// A device notification, carrying its type code.
    NotificationReceived(i32),
}

impl BridgeEvent {
    /// External event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DeviceListUpdated(_) => DEVICE_LIST_UPDATED,
            Self::NotificationReceived(_) => NOTIFICATION_RECEIVED,
        }
    }

    /// Notification kind, for notification events.
    pub fn notification_type(&self) -> Option<NotificationType> {
        match self {
            Self::NotificationReceived(code) => Some(NotificationType::from_code(*code)),
            Self::DeviceListUpdated(_) => None,
        }
    }
}

/// Callback handle for unregistering listeners.
///
/// Dropping the handle unregisters as well.
pub struct CallbackHandle {
    id: u64,
    unregister_fn: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl CallbackHandle {
    /// Create a new callback handle.
    pub(crate) fn new(id: u64, unregister_fn: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            id,
            unregister_fn: Some(Box::new(unregister_fn)),
        }
    }

    /// Unregister this callback.
    pub fn unregister(mut self) {
        if let Some(f) = self.unregister_fn.take() {
            f();
        }
    }

    /// Get the callback ID.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Chain another action to run when this handle is unregistered.
    pub(crate) fn and_then(mut self, next: impl FnOnce() + Send + Sync + 'static) -> Self {
        let first = self.unregister_fn.take();
        self.unregister_fn = Some(Box::new(move || {
            if let Some(f) = first {
                f();
            }
            next();
        }));
        self
    }
}

impl Drop for CallbackHandle {
    fn drop(&mut self) {
        if let Some(f) = self.unregister_fn.take() {
            f();
        }
    }
}

impl std::fmt::Debug for CallbackHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackHandle").field("id", &self.id).finish()
    }
}

/// Broadcasts [`BridgeEvent`]s to any number of receivers.
#[derive(Clone)]
pub struct EventSink {
    tx: broadcast::Sender<BridgeEvent>,
    callback_counter: Arc<AtomicU64>,
}

impl EventSink {
    /// Create a sink buffering up to `capacity` events per slow receiver.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            callback_counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Emit an event to every current receiver.
    pub fn emit(&self, event: BridgeEvent) {
        let name = event.name();
        match self.tx.send(event) {
            Ok(receivers) => debug!("Emitted {} to {} receivers", name, receivers),
            Err(_) => debug!("Emitted {} with no receivers", name),
        }
    }

    /// Emit a full device-list update.
    pub fn emit_device_list(&self, records: Vec<DeviceRecord>) {
        self.emit(BridgeEvent::DeviceListUpdated(records));
    }

    /// Emit a notification event.
    pub fn emit_notification(&self, notification_type: NotificationType) {
        self.emit(BridgeEvent::NotificationReceived(notification_type.code()));
    }

    /// Subscribe to all events.
    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.tx.subscribe()
    }

    /// Number of live receivers, including listener tasks.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// All events as an async stream.
    ///
    /// A receiver that falls more than the channel capacity behind skips the
    /// missed events and keeps going.
    pub fn stream(&self) -> impl Stream<Item = BridgeEvent> + Send + 'static {
        stream::unfold(self.tx.subscribe(), |mut rx| async move {
            next_event(&mut rx).await.map(|event| (event, rx))
        })
    }

    /// Register a callback for device-list updates.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn on_device_list_updated<F>(&self, callback: F) -> CallbackHandle
    where
        F: Fn(Vec<DeviceRecord>) + Send + Sync + 'static,
    {
        self.listen(move |event| {
            if let BridgeEvent::DeviceListUpdated(records) = event {
                callback(records);
            }
        })
    }

    /// Register a callback for device notifications.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn on_notification_received<F>(&self, callback: F) -> CallbackHandle
    where
        F: Fn(i32) + Send + Sync + 'static,
    {
        self.listen(move |event| {
            if let BridgeEvent::NotificationReceived(code) = event {
                callback(code);
            }
        })
    }

    fn listen<F>(&self, callback: F) -> CallbackHandle
    where
        F: Fn(BridgeEvent) + Send + Sync + 'static,
    {
        let callback_id = self.callback_counter.fetch_add(1, Ordering::SeqCst);
        let mut rx = self.tx.subscribe();

        let handle = tokio::spawn(async move {
            while let Some(event) = next_event(&mut rx).await {
                callback(event);
            }
        });

        CallbackHandle::new(callback_id, move || {
            handle.abort();
        })
    }
}

async fn next_event(rx: &mut broadcast::Receiver<BridgeEvent>) -> Option<BridgeEvent> {
    loop {
        match rx.recv().await {
            Ok(event) => return Some(event),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!("Event receiver lagged, skipped {} events", missed);
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    #[test]
    fn test_event_names() {
        assert_eq!(BridgeEvent::DeviceListUpdated(vec![]).name(), "deviceListUpdated");
        assert_eq!(BridgeEvent::NotificationReceived(1).name(), "notificationReceived");
        assert_eq!(
            BridgeEvent::NotificationReceived(7).notification_type(),
            Some(NotificationType::Checkpoint)
        );
    }

    #[test]
    fn test_emit_without_receivers_is_harmless() {
        let sink = EventSink::new(4);
        sink.emit_notification(NotificationType::Shutdown);
        assert_eq!(sink.receiver_count(), 0);
    }

    #[test]
    fn test_receiver_sees_emission_order() {
        let sink = EventSink::new(8);
        let mut rx = sink.subscribe();

        sink.emit_device_list(vec![]);
        sink.emit_notification(NotificationType::ButtonPressed);
        sink.emit_device_list(vec![]);

        assert_eq!(rx.try_recv().unwrap(), BridgeEvent::DeviceListUpdated(vec![]));
        assert_eq!(rx.try_recv().unwrap(), BridgeEvent::NotificationReceived(1));
        assert_eq!(rx.try_recv().unwrap(), BridgeEvent::DeviceListUpdated(vec![]));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_callback_handle_runs_once() {
        let count = Arc::new(AtomicU64::new(0));
        let c = count.clone();
        let handle = CallbackHandle::new(3, move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(handle.id(), 3);
        handle.unregister();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callback_handle_chain_runs_in_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let (a, b) = (order.clone(), order.clone());
        let handle = CallbackHandle::new(0, move || a.lock().push("listener"))
            .and_then(move || b.lock().push("subscription"));
        drop(handle);
        assert_eq!(*order.lock(), vec!["listener", "subscription"]);
    }

    #[tokio::test]
    async fn test_stream_yields_events() {
        let sink = EventSink::new(8);
        let mut events = Box::pin(sink.stream());

        sink.emit_notification(NotificationType::RequestRefresh);
        sink.emit_device_list(vec![]);

        assert_eq!(events.next().await, Some(BridgeEvent::NotificationReceived(8)));
        assert_eq!(events.next().await, Some(BridgeEvent::DeviceListUpdated(vec![])));
    }

    #[tokio::test]
    async fn test_lagging_stream_skips_oldest_and_resumes() {
        let sink = EventSink::new(2);
        let mut events = Box::pin(sink.stream());

        for code in [1, 2, 3, 4] {
            sink.emit_notification(NotificationType::from_code(code));
        }

        assert_eq!(events.next().await, Some(BridgeEvent::NotificationReceived(3)));
        assert_eq!(events.next().await, Some(BridgeEvent::NotificationReceived(4)));

        sink.emit_device_list(vec![]);
        assert_eq!(events.next().await, Some(BridgeEvent::DeviceListUpdated(vec![])));
    }

    #[tokio::test]
    async fn test_listeners_filter_by_kind() {
        let sink = EventSink::new(8);
        let lists = Arc::new(AtomicU64::new(0));
        let got_notification = Arc::new(AtomicBool::new(false));

        let l = lists.clone();
        let _list_handle = sink.on_device_list_updated(move |_| {
            l.fetch_add(1, Ordering::SeqCst);
        });
        let n = got_notification.clone();
        let _notification_handle = sink.on_notification_received(move |code| {
            assert_eq!(code, 2);
            n.store(true, Ordering::SeqCst);
        });

        sink.emit_device_list(vec![]);
        sink.emit_notification(NotificationType::Shutdown);

        tokio::time::timeout(Duration::from_secs(1), async {
            while lists.load(Ordering::SeqCst) < 1 || !got_notification.load(Ordering::SeqCst) {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert_eq!(lists.load(Ordering::SeqCst), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_event_wire_shape() {
        let json = serde_json::to_value(BridgeEvent::NotificationReceived(1)).unwrap();
        assert_eq!(json, serde_json::json!({ "event": "notificationReceived", "payload": 1 }));

        let json = serde_json::to_value(BridgeEvent::DeviceListUpdated(vec![])).unwrap();
        assert_eq!(json, serde_json::json!({ "event": "deviceListUpdated", "payload": [] }));
    }
}
