//! # bluetherm-bridge
//!
//! Bridges a BlueTherm LE temperature-probe SDK to a single external
//! consumer, such as an app's UI layer.
//!
//! The SDK owns Bluetooth, pairing and device state. This crate sits on top
//! of it and:
//!
//! - **Projects devices**: turns the SDK's device collection into an ordered
//!   list of [`DeviceRecord`]s with stable string labels and, when the
//!   primary sensor has a valid reading, its unit and value
//! - **Coalesces notifications**: any SDK notification that can change the
//!   device list produces one full `deviceListUpdated` event; device
//!   notifications produce a `notificationReceived` event with their code
//! - **Owns the subscription**: at most one callback registration with the
//!   SDK, with idempotent subscribe and unsubscribe
//! - **Exposes commands**: scan, connect, disconnect, remove and forget,
//!   looked up by identifier and never failing the caller
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bluetherm_bridge::{BridgeEvent, SimulatedSdk, ThermBridge};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let sdk = Arc::new(SimulatedSdk::new());
//!     let bridge = ThermBridge::new(sdk.clone());
//!
//!     let availability = bridge.check_bluetooth_availability().await;
//!     println!("Bluetooth available: {}", availability.available);
//!
//!     let mut events = bridge.subscribe_events();
//!     bridge.subscribe_device_list_callback();
//!     bridge.start_scan();
//!
//!     while let Ok(event) = events.recv().await {
//!         if let BridgeEvent::DeviceListUpdated(devices) = event {
//!             for device in devices {
//!                 println!(
//!                     "{} {} {:?}",
//!                     device.identifier, device.connection_state, device.temperature
//!                 );
//!             }
//!         }
//!     }
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): serialization for records and events

pub mod availability;
pub mod bridge;
pub mod config;
pub mod error;
pub mod normalizer;
pub mod projection;
pub mod sdk;
pub mod sink;
pub mod subscription;
pub mod utils;

// Re-exports for convenience
pub use availability::{
    Availability, AvailabilityProbe, BluetoothErrorCode, BtleplugAvailability, FixedAvailability,
};
pub use bridge::{CommandOutcome, ThermBridge};
pub use config::{BridgeConfig, DEFAULT_SCAN_DURATION};
pub use error::{Error, Result, SdkError, SdkResult};
pub use normalizer::{Action, EventNormalizer};
pub use projection::DeviceRecord;
pub use sink::{BridgeEvent, CallbackHandle, EventSink};
pub use subscription::{SubscriptionHandle, SubscriptionManager};
pub use utils::{celsius_to_fahrenheit, fahrenheit_to_celsius};

// Re-export commonly used SDK types
pub use sdk::{
    ConnectionState, Device, DeviceType, NotificationType, RegistrationId, SdkNotification,
    Sensor, SensorUnit, SimulatedSdk, ThermSdk, Transport,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        let _ = std::any::TypeId::of::<ThermBridge>();
        let _ = std::any::TypeId::of::<DeviceRecord>();
        let _ = std::any::TypeId::of::<BridgeEvent>();
        let _ = std::any::TypeId::of::<Error>();
        let _ = std::any::TypeId::of::<SimulatedSdk>();
        let _ = std::any::TypeId::of::<SubscriptionHandle>();
    }

    #[test]
    fn test_temperature_conversion() {
        assert!((celsius_to_fahrenheit(100.0) - 212.0).abs() < 0.001);
        assert!((fahrenheit_to_celsius(212.0) - 100.0).abs() < 0.001);
    }
}
