//! Device snapshot building.
//!
//! A snapshot is the full, ordered list of projected devices. It is rebuilt
//! from the SDK every time something changes and never patched in place.

use tracing::trace;

use crate::projection::labels::{connection_state_label, device_type_label, unit_label};
use crate::sdk::client::ThermSdk;
use crate::sdk::device::Device;

/// A device as presented to the consumer.
///
/// `unit` and `temperature` are set only when the device's primary sensor
/// (slot 0) exists, is enabled and is not faulted. Other sensor slots are
/// not surfaced.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct DeviceRecord {
    /// Stable unique key across reconnects.
    pub identifier: String,
    /// Advertised device name.
    pub device_name: String,
    /// Manufacturer name.
    pub manufacturer_name: String,
    /// Serial number.
    pub serial_number: String,
    /// Model number.
    pub model_number: String,
    /// External device type label.
    pub device_type: String,
    /// External connection state label.
    pub connection_state: String,
    /// Whether the SDK considers the link up.
    pub is_connected: bool,
    /// Whether the device finished post-connection setup.
    pub is_ready: bool,
    /// Number of sensor slots the hardware supports.
    pub max_sensor_count: u32,
    /// Battery percentage or the SDK's unknown sentinel.
    pub battery_level: i32,
    /// External unit label of the primary sensor.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub unit: Option<String>,
    /// Primary sensor reading, in `unit`.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub temperature: Option<f64>,
}

impl DeviceRecord {
    /// Project a single SDK device.
    pub fn from_device(device: &Device) -> Self {
        let primary = device.primary_sensor().filter(|s| s.has_valid_reading());

        Self {
            identifier: device.identifier.clone(),
            device_name: device.device_name.clone(),
            manufacturer_name: device.manufacturer_name.clone(),
            serial_number: device.serial_number.clone(),
            model_number: device.model_number.clone(),
            device_type: device_type_label(device.device_type).to_string(),
            connection_state: connection_state_label(device.connection_state).to_string(),
            is_connected: device.is_connected,
            is_ready: device.is_ready,
            max_sensor_count: device.max_sensor_count,
            battery_level: device.battery_level,
            unit: primary.map(|s| unit_label(s.display_unit).to_string()),
            temperature: primary.map(|s| s.reading),
        }
    }

    /// Check if the record carries a primary sensor reading.
    pub fn has_reading(&self) -> bool {
        self.temperature.is_some()
    }
}

impl From<&Device> for DeviceRecord {
    fn from(device: &Device) -> Self {
        Self::from_device(device)
    }
}

/// Project a device collection, preserving its order.
pub fn project_devices(devices: &[Device]) -> Vec<DeviceRecord> {
    devices
        .iter()
        .map(|device| {
            let record = DeviceRecord::from_device(device);
            trace!(
                "Projected {} as {} ({})",
                record.identifier,
                record.device_type,
                record.connection_state
            );
            record
        })
        .collect()
}

/// Read the SDK's current device collection and project it.
///
/// Only reads from the SDK. An empty collection yields an empty snapshot.
pub fn build_snapshot(sdk: &dyn ThermSdk) -> Vec<DeviceRecord> {
    project_devices(&sdk.device_list())
}
