//! Bluetooth availability checks.
//!
//! A missing adapter or disabled radio is an ordinary answer here, reported
//! as an [`Availability`] value rather than an error.

use async_trait::async_trait;
use btleplug::api::{Central, Manager as _};
use btleplug::platform::Manager;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Why Bluetooth is not usable. The codes are part of the external protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum BluetoothErrorCode {
    /// No Bluetooth hardware.
    Unavailable = 1,
    /// Bluetooth is switched off.
    Disabled = 2,
    /// Bluetooth LE is not supported or disabled.
    LeDisabled = 3,
}

impl BluetoothErrorCode {
    /// The raw error code.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

/// Result of an availability check.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Availability {
    /// Whether Bluetooth LE can be used.
    pub available: bool,
    /// Human-readable explanation.
    pub message: String,
    /// Reason code when unavailable.
    pub error_code: Option<BluetoothErrorCode>,
}

impl Availability {
    /// Bluetooth LE is usable.
    pub fn available(message: impl Into<String>) -> Self {
        Self {
            available: true,
            message: message.into(),
            error_code: None,
        }
    }

    /// Bluetooth LE is not usable.
    pub fn unavailable(code: BluetoothErrorCode, message: impl Into<String>) -> Self {
        Self {
            available: false,
            message: message.into(),
            error_code: Some(code),
        }
    }
}

/// Source of availability answers.
#[async_trait]
pub trait AvailabilityProbe: Send + Sync {
    /// Check whether Bluetooth LE can be used right now.
    async fn check(&self) -> Availability;
}

/// Checks the host's Bluetooth stack through btleplug.
#[derive(Debug, Default, Clone, Copy)]
pub struct BtleplugAvailability;

impl BtleplugAvailability {
    async fn first_adapter_info() -> Result<String> {
        let manager = Manager::new()
            .await
            .map_err(|_e| Error::BluetoothUnavailable)?;

        let adapters = manager.adapters().await.map_err(Error::Bluetooth)?;

        let adapter = adapters
            .into_iter()
            .next()
            .ok_or(Error::BluetoothUnavailable)?;

        Ok(adapter.adapter_info().await?)
    }
}

#[async_trait]
impl AvailabilityProbe for BtleplugAvailability {
    async fn check(&self) -> Availability {
        match Self::first_adapter_info().await {
            Ok(info) => {
                info!("Using Bluetooth adapter: {}", info);
                Availability::available(format!("Bluetooth LE available on {}", info))
            }
            Err(Error::BluetoothUnavailable) => {
                debug!("No Bluetooth adapter found");
                Availability::unavailable(
                    BluetoothErrorCode::Unavailable,
                    "Bluetooth is not available on this device",
                )
            }
            Err(e) => {
                debug!("Bluetooth adapter not usable: {}", e);
                Availability::unavailable(
                    BluetoothErrorCode::Disabled,
                    format!("Bluetooth is disabled: {}", e),
                )
            }
        }
    }
}

/// Always returns the same answer. Useful for hosts without a Bluetooth
/// stack and for tests.
#[derive(Debug, Clone)]
pub struct FixedAvailability(pub Availability);

#[async_trait]
impl AvailabilityProbe for FixedAvailability {
    async fn check(&self) -> Availability {
        self.0.clone()
    }
}
