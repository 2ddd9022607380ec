//! The command and event surface exposed to the external consumer.
//!
//! Command names mirror the consumer-facing bridge: `startScan`,
//! `connectToDevice`, `forgetDevice` and so on. No command ever returns an
//! error. SDK failures are logged and reported as
//! [`CommandOutcome::Failed`]; an identifier with no matching device is
//! reported as [`CommandOutcome::DeviceNotFound`] without calling the SDK.

use futures::stream::Stream;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::availability::{Availability, AvailabilityProbe, BtleplugAvailability};
use crate::config::BridgeConfig;
use crate::error::{Error, SdkResult};
use crate::normalizer::EventNormalizer;
use crate::projection::{build_snapshot, DeviceRecord};
use crate::sdk::client::ThermSdk;
use crate::sdk::device::Device;
use crate::sink::{BridgeEvent, CallbackHandle, EventSink};
use crate::subscription::SubscriptionManager;

/// Result of a consumer command.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "outcome", rename_all = "camelCase")
)]
pub enum CommandOutcome {
    /// The SDK accepted the command.
    Completed,
    /// No device matched; the SDK was not called.
    DeviceNotFound {
        /// The identifier that was searched for.
        identifier: String,
    },
    /// The SDK rejected the command.
    Failed {
        /// Description of the failure.
        reason: String,
    },
}

impl CommandOutcome {
    /// Check if the command went through.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Bridges a [`ThermSdk`] to one external consumer.
///
/// Dropping the bridge releases its SDK callback registration.
pub struct ThermBridge {
    sdk: Arc<dyn ThermSdk>,
    config: BridgeConfig,
    sink: EventSink,
    subscription: Arc<SubscriptionManager>,
    availability: Arc<dyn AvailabilityProbe>,
}

impl ThermBridge {
    /// Create a bridge with the default configuration.
    pub fn new(sdk: Arc<dyn ThermSdk>) -> Self {
        Self::with_config(sdk, BridgeConfig::default())
    }

    /// Create a bridge with a specific configuration.
    pub fn with_config(sdk: Arc<dyn ThermSdk>, config: BridgeConfig) -> Self {
        let sink = EventSink::new(config.event_capacity);
        let normalizer = Arc::new(EventNormalizer::new(sdk.clone(), sink.clone()));
        let subscription = Arc::new(SubscriptionManager::new(
            sdk.clone(),
            normalizer,
            config.callback_tag.clone(),
        ));

        Self {
            sdk,
            config,
            sink,
            subscription,
            availability: Arc::new(BtleplugAvailability),
        }
    }

    /// Use a different source for availability checks.
    pub fn with_availability_probe(mut self, probe: Arc<dyn AvailabilityProbe>) -> Self {
        self.availability = probe;
        self
    }

    /// The bridge's configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The outbound event sink.
    pub fn sink(&self) -> &EventSink {
        &self.sink
    }

    // === Availability ===

    /// `checkBluetoothAvailability`.
    pub async fn check_bluetooth_availability(&self) -> Availability {
        let availability = self.availability.check().await;
        debug!(
            "Bluetooth available: {} ({})",
            availability.available, availability.message
        );
        availability
    }

    // === Subscription ===

    /// `subscribeDeviceListCallback`.
    pub fn subscribe_device_list_callback(&self) -> CommandOutcome {
        match self.subscription.subscribe() {
            Ok(_) => CommandOutcome::Completed,
            Err(e) => {
                warn!("Could not subscribe to device list: {}", e);
                CommandOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// `unsubscribeDeviceListCallback`.
    pub fn unsubscribe_device_list_callback(&self) -> CommandOutcome {
        self.subscription.unsubscribe();
        CommandOutcome::Completed
    }

    /// Check if the bridge is attached to SDK callbacks.
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_subscribed()
    }

    // === Scanning ===

    /// `startScan`, for the configured scan duration.
    pub fn start_scan(&self) -> CommandOutcome {
        info!(
            "Starting scan on {:?} for {:?}",
            self.config.transport, self.config.scan_duration
        );
        let result = self
            .sdk
            .start_scan_for_devices(self.config.transport, self.config.scan_duration);
        Self::outcome("startScanForDevices", result)
    }

    /// `stopScan`.
    pub fn stop_scan(&self) -> CommandOutcome {
        info!("Stopping scan");
        self.sdk.stop_scan_for_devices();
        CommandOutcome::Completed
    }

    // === Device list ===

    /// `getDeviceList`: the current snapshot, without emitting it.
    pub fn get_device_list(&self) -> Vec<DeviceRecord> {
        build_snapshot(self.sdk.as_ref())
    }

    /// `removeDeviceList`: forget every device the SDK knows.
    pub fn remove_device_list(&self) -> CommandOutcome {
        info!("Resetting SDK device list");
        self.sdk.reset();
        CommandOutcome::Completed
    }

    // === Device commands ===

    /// `connectToDevice`.
    pub fn connect_to_device(&self, identifier: &str) -> CommandOutcome {
        self.with_device("requestConnection", identifier, |sdk, device| {
            sdk.request_connection(device)
        })
    }

    /// `disconnectFromDevice`.
    pub fn disconnect_from_device(&self, identifier: &str) -> CommandOutcome {
        self.with_device("requestDisconnection", identifier, |sdk, device| {
            sdk.request_disconnection(device)
        })
    }

    /// `removeDevice`.
    pub fn remove_device(&self, identifier: &str) -> CommandOutcome {
        self.with_device("deleteDevice", identifier, |sdk, device| {
            sdk.delete_device(device)
        })
    }

    /// `forgetDevice`: revoke the app's access to a device.
    pub fn forget_device(&self, identifier: &str) -> CommandOutcome {
        self.with_device("revokeDeviceAccess", identifier, |sdk, device| {
            sdk.revoke_device_access(device)
        })
    }

    // === Events ===

    /// Receive every event in emission order.
    pub fn subscribe_events(&self) -> broadcast::Receiver<BridgeEvent> {
        self.sink.subscribe()
    }

    /// Every event as an async stream.
    pub fn events(&self) -> impl Stream<Item = BridgeEvent> + Send + 'static {
        self.sink.stream()
    }

    /// Listen for device-list updates and subscribe to SDK callbacks.
    ///
    /// Returns the listener handle with the outcome of the subscribe. If the
    /// SDK refused the registration the listener stays attached but hears
    /// nothing until a later subscribe succeeds.
    ///
    /// Unregistering or dropping the returned handle removes the listener and
    /// unsubscribes. Must be called from within a Tokio runtime.
    pub fn subscribe_to_device_list_updates<F>(
        &self,
        listener: F,
    ) -> (CallbackHandle, CommandOutcome)
    where
        F: Fn(Vec<DeviceRecord>) + Send + Sync + 'static,
    {
        let handle = self.sink.on_device_list_updated(listener);
        let outcome = self.subscribe_device_list_callback();

        let subscription = self.subscription.clone();
        let handle = handle.and_then(move || {
            subscription.unsubscribe();
        });
        (handle, outcome)
    }

    /// Listen for device notifications. Does not touch the SDK subscription.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe_to_connected_device_updates<F>(&self, listener: F) -> CallbackHandle
    where
        F: Fn(i32) + Send + Sync + 'static,
    {
        self.sink.on_notification_received(listener)
    }

    // === Internals ===

    fn with_device(
        &self,
        operation: &'static str,
        identifier: &str,
        command: impl FnOnce(&dyn ThermSdk, &Device) -> SdkResult<()>,
    ) -> CommandOutcome {
        let Some(device) = self
            .sdk
            .device_with_identifier_and_transport(identifier, self.config.transport)
        else {
            debug!(
                "{}: no device {} on {:?}, ignoring",
                operation, identifier, self.config.transport
            );
            return CommandOutcome::DeviceNotFound {
                identifier: identifier.to_string(),
            };
        };

        info!("{} for {}", operation, device.identifier);
        Self::outcome(operation, command(self.sdk.as_ref(), &device))
    }

    fn outcome(operation: &'static str, result: SdkResult<()>) -> CommandOutcome {
        match result {
            Ok(()) => CommandOutcome::Completed,
            Err(source) => {
                let error = Error::sdk(operation, source);
                warn!("{}", error);
                CommandOutcome::Failed {
                    reason: error.to_string(),
                }
            }
        }
    }
}
