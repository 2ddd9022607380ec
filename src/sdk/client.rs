//! The device SDK as seen by the bridge.
//!
//! [`ThermSdk`] is the whole surface the bridge consumes. Components receive
//! it as an `Arc<dyn ThermSdk>` at construction rather than reaching for a
//! process-wide singleton, so tests can substitute a double.

use std::sync::Arc;
use std::time::Duration;

use crate::error::SdkResult;
use crate::sdk::callbacks::NotificationHandler;
use crate::sdk::device::{Device, Transport};

/// Token returned by the SDK for a callback registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegistrationId(pub u64);

impl std::fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Operations the bridge needs from the BlueTherm SDK.
///
/// Implementations are called from arbitrary threads and must be
/// `Send + Sync`. Callbacks registered through
/// [`register_callbacks`](ThermSdk::register_callbacks) may fire on an
/// SDK-owned thread.
#[cfg_attr(test, mockall::automock)]
pub trait ThermSdk: Send + Sync {
    /// Current device collection, in discovery order.
    fn device_list(&self) -> Vec<Device>;

    /// Attach a handler to the SDK's callbacks.
    fn register_callbacks(
        &self,
        handler: Arc<dyn NotificationHandler>,
        tag: &str,
    ) -> SdkResult<RegistrationId>;

    /// Detach a previously registered handler.
    fn deregister_callbacks(&self, registration: RegistrationId);

    /// Look up a device by identifier on a transport.
    fn device_with_identifier_and_transport(
        &self,
        identifier: &str,
        transport: Transport,
    ) -> Option<Device>;

    /// Ask the SDK to connect to a device.
    fn request_connection(&self, device: &Device) -> SdkResult<()>;

    /// Ask the SDK to disconnect from a device.
    fn request_disconnection(&self, device: &Device) -> SdkResult<()>;

    /// Remove a device from the SDK's collection.
    fn delete_device(&self, device: &Device) -> SdkResult<()>;

    /// Revoke the app's access to a device.
    fn revoke_device_access(&self, device: &Device) -> SdkResult<()>;

    /// Start scanning for devices for a fixed duration.
    fn start_scan_for_devices(&self, transport: Transport, duration: Duration) -> SdkResult<()>;

    /// Stop an ongoing scan.
    fn stop_scan_for_devices(&self);

    /// Forget every known device.
    fn reset(&self);
}
