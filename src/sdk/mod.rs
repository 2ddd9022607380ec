//! Boundary with the BlueTherm device SDK.
//!
//! The SDK owns the radio, pairing and device state. This module describes
//! the data it reports, the operations the bridge calls on it, and the
//! callback shapes it fires back.

pub mod callbacks;
pub mod client;
pub mod device;
pub mod simulated;

pub use callbacks::{
    CallbacksV1Adapter, CallbacksV2Adapter, DeviceCallbacksV1, DeviceCallbacksV2,
    NotificationHandler, SdkNotification,
};
pub use client::{RegistrationId, ThermSdk};
pub use device::{
    ConnectionState, Device, DeviceType, NotificationType, Sensor, SensorUnit, Transport,
};
pub use simulated::{CallbackVersion, SimulatedSdk};
