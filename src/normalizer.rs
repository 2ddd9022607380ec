//! Classification of SDK notifications into consumer events.
//!
//! Any notification that can change what the consumer sees triggers a full
//! snapshot rebuild and one `deviceListUpdated` emission. Device notifications
//! are forwarded as a discrete `notificationReceived` event. Nothing here ever
//! fails: unexpected input is logged and dropped.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::projection::build_snapshot;
use crate::sdk::callbacks::{NotificationHandler, SdkNotification};
use crate::sdk::client::ThermSdk;
use crate::sdk::device::NotificationType;
use crate::sink::EventSink;

/// What the normalizer does with a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Rebuild the device snapshot and emit it.
    EmitSnapshot,
    /// Emit a notification event with this type.
    EmitNotification(NotificationType),
    /// Log the notification; emit nothing.
    LogOnly,
    /// Unrecognized input; emit nothing.
    Drop,
}

/// Map a notification to its action.
pub fn classify(notification: &SdkNotification) -> Action {
    match notification {
        SdkNotification::ScanComplete
        | SdkNotification::NewDevice { .. }
        | SdkNotification::ConnectionStateChanged { .. }
        | SdkNotification::DeviceUpdated { .. }
        | SdkNotification::RevokeComplete { .. } => Action::EmitSnapshot,
        SdkNotification::NotificationReceived {
            notification_type, ..
        } => Action::EmitNotification(*notification_type),
        SdkNotification::UnexpectedDisconnection { .. } => Action::LogOnly,
        SdkNotification::Unrecognized { .. } => Action::Drop,
    }
}

/// Receives SDK notifications and turns them into [`BridgeEvent`]s.
///
/// Notifications are processed one at a time, each emitted before the next
/// is looked at, so the consumer sees events in callback order. While
/// detached, notifications are ignored.
///
/// [`BridgeEvent`]: crate::sink::BridgeEvent
pub struct EventNormalizer {
    /// SDK to read snapshots from.
    sdk: Arc<dyn ThermSdk>,
    /// Outbound events.
    sink: EventSink,
    /// Whether the subscription is active.
    attached: AtomicBool,
    /// Serializes classification and emission across SDK threads.
    lane: Mutex<()>,
    /// Number of notifications acted on.
    processed: AtomicU64,
}

impl EventNormalizer {
    /// Create a detached normalizer.
    pub fn new(sdk: Arc<dyn ThermSdk>, sink: EventSink) -> Self {
        Self {
            sdk,
            sink,
            attached: AtomicBool::new(false),
            lane: Mutex::new(()),
            processed: AtomicU64::new(0),
        }
    }

    /// Start accepting notifications.
    pub(crate) fn attach(&self) {
        self.attached.store(true, Ordering::SeqCst);
    }

    /// Stop accepting notifications.
    ///
    /// Waits for a notification already being processed to finish emitting,
    /// so nothing is emitted once this returns. Must not be called from
    /// inside [`process`](Self::process).
    pub(crate) fn detach(&self) {
        let _lane = self.lane.lock();
        self.attached.store(false, Ordering::SeqCst);
    }

    /// Check if notifications are being accepted.
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Number of notifications processed while attached.
    pub fn processed_count(&self) -> u64 {
        self.processed.load(Ordering::SeqCst)
    }

    /// Process one notification.
    ///
    /// Returns the action taken, or `None` if the normalizer is detached.
    pub fn process(&self, notification: SdkNotification) -> Option<Action> {
        let _lane = self.lane.lock();

        if !self.is_attached() {
            debug!("Detached, ignoring {}", notification.name());
            return None;
        }
        self.processed.fetch_add(1, Ordering::SeqCst);

        let action = classify(&notification);
        match action {
            Action::EmitSnapshot => {
                if let SdkNotification::RevokeComplete {
                    identifier,
                    success: false,
                } = &notification
                {
                    warn!("Revoke request for {} reported failure", identifier);
                }
                let records = build_snapshot(self.sdk.as_ref());
                debug!(
                    "{} -> emitting snapshot of {} devices",
                    notification.name(),
                    records.len()
                );
                self.sink.emit_device_list(records);
            }
            Action::EmitNotification(notification_type) => {
                debug!(
                    "Device {} sent notification {:?}",
                    notification.identifier().unwrap_or("?"),
                    notification_type
                );
                self.sink.emit_notification(notification_type);
            }
            Action::LogOnly => {
                // Not forwarded; the consumer learns of it through the next
                // connection-state change.
                warn!(
                    "Unexpected disconnection from {}",
                    notification.identifier().unwrap_or("?")
                );
            }
            Action::Drop => {
                info!("Dropping unrecognized SDK notification {}", notification.name());
            }
        }

        Some(action)
    }
}

impl NotificationHandler for EventNormalizer {
    fn handle(&self, notification: SdkNotification) {
        self.process(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::client::MockThermSdk;
    use crate::sdk::device::{ConnectionState, Device, DeviceType, Sensor, SensorUnit};
    use crate::sink::BridgeEvent;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;
    use tokio::sync::broadcast::error::TryRecvError;

    fn id(s: &str) -> String {
        s.to_string()
    }

    fn snapshot_triggers() -> Vec<SdkNotification> {
        vec![
            SdkNotification::ScanComplete,
            SdkNotification::NewDevice { identifier: id("A") },
            SdkNotification::ConnectionStateChanged {
                identifier: id("A"),
                state: ConnectionState::Connected,
            },
            SdkNotification::DeviceUpdated { identifier: id("A") },
            SdkNotification::RevokeComplete {
                identifier: id("A"),
                success: true,
            },
        ]
    }

    fn scenario_devices() -> Vec<Device> {
        let a = Device {
            connection_state: ConnectionState::Connected,
            is_connected: true,
            sensors: vec![Sensor::new(SensorUnit::Celsius, 21.5)],
            ..Device::new("A", DeviceType::ThermaQBlue)
        };
        let b = Device {
            connection_state: ConnectionState::Disconnected,
            ..Device::new("B", DeviceType::ThermaQBlue)
        };
        vec![a, b]
    }

    fn attached_normalizer(sdk: MockThermSdk) -> (EventNormalizer, EventSink) {
        let sink = EventSink::new(16);
        let normalizer = EventNormalizer::new(Arc::new(sdk), sink.clone());
        normalizer.attach();
        (normalizer, sink)
    }

    #[test]
    fn test_classification_table() {
        for notification in snapshot_triggers() {
            assert_eq!(classify(&notification), Action::EmitSnapshot);
        }
        assert_eq!(
            classify(&SdkNotification::NotificationReceived {
                identifier: id("A"),
                notification_type: NotificationType::ButtonPressed,
                payload: Bytes::new(),
            }),
            Action::EmitNotification(NotificationType::ButtonPressed)
        );
        assert_eq!(
            classify(&SdkNotification::UnexpectedDisconnection { identifier: id("A") }),
            Action::LogOnly
        );
        assert_eq!(
            classify(&SdkNotification::Unrecognized {
                name: id("onFirmwareProgress")
            }),
            Action::Drop
        );
    }

    #[test]
    fn test_each_snapshot_trigger_emits_exactly_one_list() {
        for notification in snapshot_triggers() {
            let mut sdk = MockThermSdk::new();
            sdk.expect_device_list().times(1).returning(scenario_devices);
            let (normalizer, sink) = attached_normalizer(sdk);
            let mut rx = sink.subscribe();

            normalizer.process(notification);

            match rx.try_recv() {
                Ok(BridgeEvent::DeviceListUpdated(records)) => assert_eq!(records.len(), 2),
                other => panic!("expected device list, got {:?}", other),
            }
            assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        }
    }

    #[test]
    fn test_notification_emits_code_without_snapshot() {
        let mut sdk = MockThermSdk::new();
        sdk.expect_device_list().times(0);
        let (normalizer, sink) = attached_normalizer(sdk);
        let mut rx = sink.subscribe();

        let action = normalizer.process(SdkNotification::NotificationReceived {
            identifier: id("A"),
            notification_type: NotificationType::Checkpoint,
            payload: Bytes::from_static(b"\x01\x02"),
        });

        assert_eq!(action, Some(Action::EmitNotification(NotificationType::Checkpoint)));
        assert_eq!(rx.try_recv(), Ok(BridgeEvent::NotificationReceived(7)));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_unrecognized_notification_code_is_forwarded() {
        let (normalizer, sink) = attached_normalizer(MockThermSdk::new());
        let mut rx = sink.subscribe();

        normalizer.process(SdkNotification::NotificationReceived {
            identifier: id("A"),
            notification_type: NotificationType::from_code(31),
            payload: Bytes::new(),
        });

        assert_eq!(rx.try_recv(), Ok(BridgeEvent::NotificationReceived(31)));
    }

    #[test]
    fn test_unexpected_disconnection_emits_nothing() {
        let mut sdk = MockThermSdk::new();
        sdk.expect_device_list().times(0);
        let (normalizer, sink) = attached_normalizer(sdk);
        let mut rx = sink.subscribe();

        let action = normalizer.process(SdkNotification::UnexpectedDisconnection {
            identifier: id("A"),
        });

        assert_eq!(action, Some(Action::LogOnly));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_unrecognized_notification_is_dropped() {
        let mut sdk = MockThermSdk::new();
        sdk.expect_device_list().times(0);
        let (normalizer, sink) = attached_normalizer(sdk);
        let mut rx = sink.subscribe();

        let action = normalizer.process(SdkNotification::Unrecognized {
            name: id("onFirmwareProgress"),
        });

        assert_eq!(action, Some(Action::Drop));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_detached_normalizer_ignores_everything() {
        let mut sdk = MockThermSdk::new();
        sdk.expect_device_list().times(0);
        let sink = EventSink::new(4);
        let normalizer = EventNormalizer::new(Arc::new(sdk), sink.clone());
        let mut rx = sink.subscribe();

        assert_eq!(normalizer.process(SdkNotification::ScanComplete), None);
        assert_eq!(normalizer.processed_count(), 0);
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_device_updated_scenario() {
        let mut sdk = MockThermSdk::new();
        sdk.expect_device_list().returning(scenario_devices);
        let (normalizer, sink) = attached_normalizer(sdk);
        let mut rx = sink.subscribe();

        normalizer.handle(SdkNotification::DeviceUpdated { identifier: id("A") });

        let Ok(BridgeEvent::DeviceListUpdated(records)) = rx.try_recv() else {
            panic!("expected a device list");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].identifier, "A");
        assert_eq!(records[0].unit.as_deref(), Some("°C"));
        assert_eq!(records[0].temperature, Some(21.5));
        assert_eq!(records[1].identifier, "B");
        assert_eq!(records[1].unit, None);
        assert_eq!(records[1].temperature, None);
    }

    #[test]
    fn test_events_keep_callback_order() {
        let mut sdk = MockThermSdk::new();
        sdk.expect_device_list().returning(Vec::new);
        let (normalizer, sink) = attached_normalizer(sdk);
        let mut rx = sink.subscribe();

        normalizer.process(SdkNotification::NewDevice { identifier: id("A") });
        normalizer.process(SdkNotification::NotificationReceived {
            identifier: id("A"),
            notification_type: NotificationType::ButtonPressed,
            payload: Bytes::new(),
        });
        normalizer.process(SdkNotification::ScanComplete);

        let names: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.name())
            .collect();
        assert_eq!(
            names,
            vec!["deviceListUpdated", "notificationReceived", "deviceListUpdated"]
        );
    }
}
