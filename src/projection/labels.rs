//! Stable external labels for SDK enumerations.
//!
//! Consumers match on these strings, so they must never change, and every
//! input (including codes from SDK releases newer than this crate) must map
//! to some label. Anything without a label of its own becomes
//! [`UNKNOWN_LABEL`].

use crate::sdk::device::{ConnectionState, DeviceType, SensorUnit};

/// Fallback label for unrecognized values.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// External label for a device type.
pub fn device_type_label(device_type: DeviceType) -> &'static str {
    match device_type {
        DeviceType::BlueThermOne => "BlueTherm One",
        DeviceType::ThermaQBlue => "ThermaQ Blue",
        DeviceType::ThermapenBlue => "Thermapen Blue",
        DeviceType::ThermaQWifi => "ThermaQ WiFi",
        DeviceType::ThermaDataWifi => "ThermaData WiFi",
        DeviceType::RayTempBlue => "RayTemp Blue",
        DeviceType::Simulated => "Simulated",
        DeviceType::BlueDot => "BlueDOT",
        DeviceType::TempTestBlue => "TempTest Blue",
        DeviceType::DishTempBlue => "DishTemp Blue",
        DeviceType::Unknown | DeviceType::Unrecognized(_) => UNKNOWN_LABEL,
    }
}

/// External label for a connection state.
pub fn connection_state_label(state: ConnectionState) -> &'static str {
    match state {
        ConnectionState::Available => "Available",
        ConnectionState::Connecting => "Connecting",
        ConnectionState::Connected => "Connected",
        ConnectionState::Disconnecting => "Disconnecting",
        ConnectionState::Disconnected => "Disconnected",
        ConnectionState::Unavailable => "Unavailable",
        ConnectionState::Unsupported => "Unsupported",
        ConnectionState::Unregistered => "Unregistered",
        ConnectionState::Unknown | ConnectionState::Unrecognized(_) => UNKNOWN_LABEL,
    }
}

/// External label for a sensor unit.
pub fn unit_label(unit: SensorUnit) -> &'static str {
    match unit {
        SensorUnit::Fahrenheit => "°F",
        SensorUnit::Celsius => "°C",
        SensorUnit::Ph => "pH",
        SensorUnit::RelativeHumidity => "%rh",
        SensorUnit::Unknown | SensorUnit::Unrecognized(_) => UNKNOWN_LABEL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_connection_state_labels() {
        let labels: Vec<_> = ConnectionState::KNOWN
            .iter()
            .map(|s| connection_state_label(*s))
            .collect();
        assert_eq!(
            labels,
            vec![
                "Unknown",
                "Available",
                "Connecting",
                "Connected",
                "Disconnecting",
                "Disconnected",
                "Unavailable",
                "Unsupported",
                "Unregistered",
            ]
        );
    }

    #[test]
    fn test_unit_labels() {
        assert_eq!(unit_label(SensorUnit::Fahrenheit), "°F");
        assert_eq!(unit_label(SensorUnit::Celsius), "°C");
        assert_eq!(unit_label(SensorUnit::Ph), "pH");
        assert_eq!(unit_label(SensorUnit::RelativeHumidity), "%rh");
        assert_eq!(unit_label(SensorUnit::Unknown), "Unknown");
    }

    #[test]
    fn test_device_type_labels_are_distinct() {
        let mut labels: Vec<_> = DeviceType::KNOWN
            .iter()
            .filter(|t| **t != DeviceType::Unknown)
            .map(|t| device_type_label(*t))
            .collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), DeviceType::KNOWN.len() - 1);
        assert!(!labels.contains(&UNKNOWN_LABEL));
    }

    #[test]
    fn test_unrecognized_values_fall_back() {
        assert_eq!(device_type_label(DeviceType::Unrecognized(500)), UNKNOWN_LABEL);
        assert_eq!(
            connection_state_label(ConnectionState::Unrecognized(42)),
            UNKNOWN_LABEL
        );
        assert_eq!(unit_label(SensorUnit::Unrecognized(9)), UNKNOWN_LABEL);
    }

    proptest! {
        #[test]
        fn prop_every_device_type_code_has_a_label(code in any::<u16>()) {
            prop_assert!(!device_type_label(DeviceType::from_raw(code)).is_empty());
        }

        #[test]
        fn prop_every_connection_state_code_has_a_label(code in any::<u8>()) {
            prop_assert!(!connection_state_label(ConnectionState::from_raw(code)).is_empty());
        }

        #[test]
        fn prop_every_unit_code_has_a_label(code in any::<u8>()) {
            prop_assert!(!unit_label(SensorUnit::from_raw(code)).is_empty());
        }
    }
}
