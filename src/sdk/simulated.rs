//! In-memory SDK backed by simulated devices.
//!
//! [`SimulatedSdk`] implements [`ThermSdk`] without any radio. Commands change
//! device state and fire the same callbacks a real SDK would, through the
//! callback shape selected with [`CallbackVersion`]. Extra methods let a test
//! or demo inject discoveries, readings and device notifications.

use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{SdkError, SdkResult};
use crate::sdk::callbacks::{
    CallbacksV1Adapter, CallbacksV2Adapter, DeviceCallbacksV1, DeviceCallbacksV2,
    NotificationHandler,
};
use crate::sdk::client::{RegistrationId, ThermSdk};
use crate::sdk::device::{ConnectionState, Device, Transport};
use crate::utils::celsius_in_unit;

/// SDK error code for an unknown device.
pub const ERROR_DEVICE_NOT_FOUND: i32 = 1;
/// SDK error code for a device whose access was revoked.
pub const ERROR_DEVICE_UNREGISTERED: i32 = 2;

/// Which SDK callback interface the simulation speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallbackVersion {
    /// Legacy callbacks.
    V1,
    /// Current callbacks.
    #[default]
    V2,
}

#[derive(Clone)]
enum Registration {
    V1(Arc<dyn DeviceCallbacksV1>),
    V2(Arc<dyn DeviceCallbacksV2>),
}

/// A [`ThermSdk`] implementation with simulated devices.
pub struct SimulatedSdk {
    /// Known devices in discovery order.
    devices: RwLock<Vec<Device>>,
    /// Devices that the next scan will discover.
    discoverable: Mutex<Vec<Device>>,
    /// Active callback registrations.
    registrations: Mutex<Vec<(RegistrationId, Registration)>>,
    /// Callback interface handed to registrants.
    callback_version: CallbackVersion,
    /// Registration ID counter.
    next_registration: AtomicU64,
    /// Number of `register_callbacks` calls.
    register_calls: AtomicUsize,
    /// Number of `deregister_callbacks` calls.
    deregister_calls: AtomicUsize,
    /// Whether a scan is running.
    is_scanning: AtomicBool,
    /// Error returned by the next connection request.
    connection_failure: Mutex<Option<SdkError>>,
}

impl Default for SimulatedSdk {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSdk {
    /// Create an empty simulation speaking the current callback interface.
    pub fn new() -> Self {
        Self::with_callback_version(CallbackVersion::V2)
    }

    /// Create an empty simulation speaking a specific callback interface.
    pub fn with_callback_version(callback_version: CallbackVersion) -> Self {
        Self {
            devices: RwLock::new(Vec::new()),
            discoverable: Mutex::new(Vec::new()),
            registrations: Mutex::new(Vec::new()),
            callback_version,
            next_registration: AtomicU64::new(1),
            register_calls: AtomicUsize::new(0),
            deregister_calls: AtomicUsize::new(0),
            is_scanning: AtomicBool::new(false),
            connection_failure: Mutex::new(None),
        }
    }

    // === Injection ===

    /// Add a device as if it had just been discovered.
    pub fn add_device(&self, device: Device) {
        info!("Simulated device discovered: {}", device.identifier);
        self.devices.write().push(device.clone());
        self.dispatch(|r| match r {
            Registration::V1(cb) => cb.on_new_device(&device),
            Registration::V2(cb) => cb.on_new_device(&device),
        });
    }

    /// Queue a device to be discovered by the next scan.
    pub fn add_discoverable(&self, device: Device) {
        self.discoverable.lock().push(device);
    }

    /// Set the primary sensor reading from a Celsius value.
    ///
    /// The value is converted to the sensor's display unit. Sensors that do
    /// not measure temperature take the value as-is.
    pub fn set_reading_celsius(&self, identifier: &str, celsius: f64) {
        let updated = self.modify(identifier, |device| {
            if let Some(sensor) = device.sensors.first_mut() {
                sensor.reading = celsius_in_unit(celsius, sensor.display_unit).unwrap_or(celsius);
            }
        });
        if let Some(device) = updated {
            self.dispatch(|r| match r {
                Registration::V1(cb) => cb.on_device_updated(&device),
                Registration::V2(cb) => cb.on_device_updated(&device),
            });
        }
    }

    /// Have a device push a notification.
    pub fn push_notification(&self, identifier: &str, notification_type: i32, payload: &[u8]) {
        let Some(device) = self.find(identifier) else {
            return;
        };
        self.dispatch(|r| match r {
            Registration::V1(cb) => cb.on_notification_received(&device, notification_type),
            Registration::V2(cb) => {
                cb.on_notification_received(&device, notification_type, payload)
            }
        });
    }

    /// Drop a device's link without a disconnection request.
    pub fn drop_link(&self, identifier: &str) {
        let updated = self.modify(identifier, |device| {
            device.connection_state = ConnectionState::Disconnected;
            device.is_connected = false;
            device.is_ready = false;
        });
        if let Some(device) = updated {
            self.dispatch(|r| match r {
                Registration::V1(cb) => cb.on_unexpected_disconnection(&device),
                Registration::V2(cb) => cb.on_unexpected_disconnection(&device),
            });
        }
    }

    /// Fire a callback the bridge has no mapping for.
    ///
    /// Only the current callback interface can express this.
    pub fn fire_unrecognized(&self, callback_name: &str) {
        self.dispatch(|r| {
            if let Registration::V2(cb) = r {
                cb.on_other(callback_name);
            }
        });
    }

    /// Make the next connection request fail with `error`.
    pub fn fail_next_connection(&self, error: SdkError) {
        *self.connection_failure.lock() = Some(error);
    }

    // === Inspection ===

    /// Number of registrations currently attached.
    pub fn active_registrations(&self) -> usize {
        self.registrations.lock().len()
    }

    /// Number of times `register_callbacks` was called.
    pub fn register_calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    /// Number of times `deregister_callbacks` was called.
    pub fn deregister_calls(&self) -> usize {
        self.deregister_calls.load(Ordering::SeqCst)
    }

    /// Check if a scan is running.
    pub fn is_scanning(&self) -> bool {
        self.is_scanning.load(Ordering::SeqCst)
    }

    // === Internals ===

    fn find(&self, identifier: &str) -> Option<Device> {
        self.devices
            .read()
            .iter()
            .find(|d| d.identifier == identifier)
            .cloned()
    }

    /// Apply `f` to a device and return the updated copy.
    fn modify(&self, identifier: &str, f: impl FnOnce(&mut Device)) -> Option<Device> {
        let mut devices = self.devices.write();
        let device = devices.iter_mut().find(|d| d.identifier == identifier)?;
        f(device);
        Some(device.clone())
    }

    fn set_state(&self, identifier: &str, state: ConnectionState) -> Option<Device> {
        let device = self.modify(identifier, |device| {
            device.connection_state = state;
            device.is_connected = state.is_connected();
            device.is_ready = state.is_connected();
        })?;
        self.dispatch(|r| match r {
            Registration::V1(cb) => cb.on_connection_state_changed(&device),
            Registration::V2(cb) => cb.on_connection_state_changed(&device, state),
        });
        Some(device)
    }

    /// Invoke every registration. No lock is held while callbacks run, so
    /// handlers may call back into the SDK.
    fn dispatch(&self, f: impl Fn(&Registration)) {
        let registrations: Vec<Registration> = self
            .registrations
            .lock()
            .iter()
            .map(|(_, r)| r.clone())
            .collect();
        for registration in &registrations {
            f(registration);
        }
    }

    fn not_found(identifier: &str) -> SdkError {
        SdkError::new(ERROR_DEVICE_NOT_FOUND, format!("no device {}", identifier))
    }
}

impl ThermSdk for SimulatedSdk {
    fn device_list(&self) -> Vec<Device> {
        self.devices.read().clone()
    }

    fn register_callbacks(
        &self,
        handler: Arc<dyn NotificationHandler>,
        tag: &str,
    ) -> SdkResult<RegistrationId> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        let id = RegistrationId(self.next_registration.fetch_add(1, Ordering::SeqCst));
        let registration = match self.callback_version {
            CallbackVersion::V1 => Registration::V1(Arc::new(CallbacksV1Adapter::new(handler))),
            CallbackVersion::V2 => Registration::V2(Arc::new(CallbacksV2Adapter::new(handler))),
        };
        self.registrations.lock().push((id, registration));
        debug!("Registered callbacks {} for {}", id, tag);
        Ok(id)
    }

    fn deregister_callbacks(&self, registration: RegistrationId) {
        self.deregister_calls.fetch_add(1, Ordering::SeqCst);
        self.registrations.lock().retain(|(id, _)| *id != registration);
        debug!("Deregistered callbacks {}", registration);
    }

    fn device_with_identifier_and_transport(
        &self,
        identifier: &str,
        transport: Transport,
    ) -> Option<Device> {
        self.find(identifier).filter(|d| {
            let device_transport = if d.device_type.is_wifi() {
                Transport::Wifi
            } else {
                Transport::BluetoothLe
            };
            device_transport == transport
        })
    }

    fn request_connection(&self, device: &Device) -> SdkResult<()> {
        if let Some(error) = self.connection_failure.lock().take() {
            return Err(error);
        }
        let current = self
            .find(&device.identifier)
            .ok_or_else(|| Self::not_found(&device.identifier))?;
        if current.connection_state == ConnectionState::Unregistered {
            return Err(SdkError::new(
                ERROR_DEVICE_UNREGISTERED,
                format!("access to {} was revoked", device.identifier),
            ));
        }
        if current.connection_state.is_connected() {
            return Ok(());
        }
        self.set_state(&device.identifier, ConnectionState::Connecting);
        self.set_state(&device.identifier, ConnectionState::Connected);
        Ok(())
    }

    fn request_disconnection(&self, device: &Device) -> SdkResult<()> {
        self.find(&device.identifier)
            .ok_or_else(|| Self::not_found(&device.identifier))?;
        self.set_state(&device.identifier, ConnectionState::Disconnecting);
        self.set_state(&device.identifier, ConnectionState::Disconnected);
        Ok(())
    }

    fn delete_device(&self, device: &Device) -> SdkResult<()> {
        let mut devices = self.devices.write();
        let before = devices.len();
        devices.retain(|d| d.identifier != device.identifier);
        if devices.len() == before {
            return Err(Self::not_found(&device.identifier));
        }
        Ok(())
    }

    fn revoke_device_access(&self, device: &Device) -> SdkResult<()> {
        let updated = self
            .modify(&device.identifier, |device| {
                device.connection_state = ConnectionState::Unregistered;
                device.is_connected = false;
                device.is_ready = false;
            })
            .ok_or_else(|| Self::not_found(&device.identifier))?;
        self.dispatch(|r| {
            if let Registration::V2(cb) = r {
                cb.on_revoke_request_complete(&updated, true);
            }
        });
        Ok(())
    }

    fn start_scan_for_devices(&self, transport: Transport, duration: Duration) -> SdkResult<()> {
        info!("Simulated scan on {:?} for {:?}", transport, duration);
        self.is_scanning.store(true, Ordering::SeqCst);

        let found: Vec<Device> = self.discoverable.lock().drain(..).collect();
        let count = found.len();
        for device in found {
            self.add_device(device);
        }

        self.is_scanning.store(false, Ordering::SeqCst);
        self.dispatch(|r| match r {
            Registration::V1(cb) => cb.on_scan_complete(),
            Registration::V2(cb) => cb.on_scan_complete(count),
        });
        Ok(())
    }

    fn stop_scan_for_devices(&self) {
        self.is_scanning.store(false, Ordering::SeqCst);
    }

    fn reset(&self) {
        self.devices.write().clear();
        self.discoverable.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::callbacks::SdkNotification;
    use crate::sdk::device::{DeviceType, Sensor, SensorUnit};

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<SdkNotification>>,
    }

    impl NotificationHandler for Recorder {
        fn handle(&self, notification: SdkNotification) {
            self.seen.lock().push(notification);
        }
    }

    fn probe(id: &str) -> Device {
        let mut device = Device::new(id, DeviceType::ThermaQBlue);
        device.connection_state = ConnectionState::Available;
        device.sensors.push(Sensor::new(SensorUnit::Fahrenheit, 70.0));
        device
    }

    #[test]
    fn test_register_and_deregister() {
        let sdk = SimulatedSdk::new();
        let id = sdk
            .register_callbacks(Arc::new(Recorder::default()), "test")
            .unwrap();
        assert_eq!(sdk.active_registrations(), 1);

        sdk.deregister_callbacks(id);
        assert_eq!(sdk.active_registrations(), 0);
        assert_eq!(sdk.register_calls(), 1);
        assert_eq!(sdk.deregister_calls(), 1);
    }

    #[test]
    fn test_connection_fires_state_changes() {
        let sdk = SimulatedSdk::new();
        let recorder = Arc::new(Recorder::default());
        sdk.register_callbacks(recorder.clone(), "test").unwrap();
        sdk.add_device(probe("A"));

        sdk.request_connection(&probe("A")).unwrap();

        let seen = recorder.seen.lock();
        assert_eq!(seen.len(), 3);
        assert_eq!(
            seen[2],
            SdkNotification::ConnectionStateChanged {
                identifier: "A".to_string(),
                state: ConnectionState::Connected,
            }
        );
        drop(seen);
        assert!(sdk.device_list()[0].is_connected);
    }

    #[test]
    fn test_scan_discovers_queued_devices() {
        let sdk = SimulatedSdk::with_callback_version(CallbackVersion::V1);
        let recorder = Arc::new(Recorder::default());
        sdk.register_callbacks(recorder.clone(), "test").unwrap();
        sdk.add_discoverable(probe("A"));
        sdk.add_discoverable(probe("B"));

        sdk.start_scan_for_devices(Transport::BluetoothLe, Duration::from_secs(5))
            .unwrap();

        let ids: Vec<_> = sdk.device_list().into_iter().map(|d| d.identifier).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(recorder.seen.lock().last(), Some(&SdkNotification::ScanComplete));
        assert!(!sdk.is_scanning());
    }

    #[test]
    fn test_reading_converted_to_display_unit() {
        let sdk = SimulatedSdk::new();
        sdk.add_device(probe("A"));
        sdk.set_reading_celsius("A", 100.0);
        let reading = sdk.device_list()[0].sensors[0].reading;
        assert!((reading - 212.0).abs() < 0.001);
    }

    #[test]
    fn test_transport_lookup() {
        let sdk = SimulatedSdk::new();
        sdk.add_device(probe("A"));
        sdk.add_device(Device::new("W", DeviceType::ThermaQWifi));

        assert!(sdk
            .device_with_identifier_and_transport("A", Transport::BluetoothLe)
            .is_some());
        assert!(sdk
            .device_with_identifier_and_transport("A", Transport::Wifi)
            .is_none());
        assert!(sdk
            .device_with_identifier_and_transport("W", Transport::Wifi)
            .is_some());
    }

    #[test]
    fn test_revoked_device_refuses_connection() {
        let sdk = SimulatedSdk::new();
        sdk.add_device(probe("A"));
        sdk.revoke_device_access(&probe("A")).unwrap();

        let err = sdk.request_connection(&probe("A")).unwrap_err();
        assert_eq!(err.code, ERROR_DEVICE_UNREGISTERED);
    }

    #[test]
    fn test_injected_connection_failure() {
        let sdk = SimulatedSdk::new();
        sdk.add_device(probe("A"));
        sdk.fail_next_connection(SdkError::new(9, "radio busy"));

        assert_eq!(sdk.request_connection(&probe("A")).unwrap_err().code, 9);
        assert!(sdk.request_connection(&probe("A")).is_ok());
    }
}
