//! Device data model as read from the BlueTherm SDK.
//!
//! These types mirror what the SDK reports. The bridge never mutates them;
//! it only reads them and projects them into [`DeviceRecord`]s.
//!
//! Every enumeration carries an `Unrecognized` variant holding the raw code,
//! so values added by newer SDK releases survive the trip into the bridge
//! instead of failing to decode.
//!
//! [`DeviceRecord`]: crate::projection::DeviceRecord

/// Product family of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceType {
    /// The SDK could not identify the product.
    #[default]
    Unknown,
    /// BlueTherm One.
    BlueThermOne,
    /// ThermaQ Blue.
    ThermaQBlue,
    /// Thermapen Blue.
    ThermapenBlue,
    /// ThermaQ WiFi.
    ThermaQWifi,
    /// ThermaData WiFi.
    ThermaDataWifi,
    /// RayTemp Blue.
    RayTempBlue,
    /// Software-simulated device.
    Simulated,
    /// BlueDOT.
    BlueDot,
    /// TempTest Blue.
    TempTestBlue,
    /// DishTemp Blue.
    DishTempBlue,
    /// A product code this crate does not know about.
    Unrecognized(u16),
}

impl DeviceType {
    /// Every named variant, in SDK code order.
    pub const KNOWN: [DeviceType; 11] = [
        Self::Unknown,
        Self::BlueThermOne,
        Self::ThermaQBlue,
        Self::ThermapenBlue,
        Self::ThermaQWifi,
        Self::ThermaDataWifi,
        Self::RayTempBlue,
        Self::Simulated,
        Self::BlueDot,
        Self::TempTestBlue,
        Self::DishTempBlue,
    ];

    /// Create from the SDK's raw product code.
    pub fn from_raw(value: u16) -> Self {
        match value {
            0 => Self::Unknown,
            1 => Self::BlueThermOne,
            2 => Self::ThermaQBlue,
            3 => Self::ThermapenBlue,
            4 => Self::ThermaQWifi,
            5 => Self::ThermaDataWifi,
            6 => Self::RayTempBlue,
            7 => Self::Simulated,
            8 => Self::BlueDot,
            9 => Self::TempTestBlue,
            10 => Self::DishTempBlue,
            other => Self::Unrecognized(other),
        }
    }

    /// Convert back to the SDK's raw product code.
    pub fn to_raw(&self) -> u16 {
        match self {
            Self::Unknown => 0,
            Self::BlueThermOne => 1,
            Self::ThermaQBlue => 2,
            Self::ThermapenBlue => 3,
            Self::ThermaQWifi => 4,
            Self::ThermaDataWifi => 5,
            Self::RayTempBlue => 6,
            Self::Simulated => 7,
            Self::BlueDot => 8,
            Self::TempTestBlue => 9,
            Self::DishTempBlue => 10,
            Self::Unrecognized(code) => *code,
        }
    }

    /// Check if the device talks over WiFi rather than Bluetooth LE.
    pub fn is_wifi(&self) -> bool {
        matches!(self, Self::ThermaQWifi | Self::ThermaDataWifi)
    }
}

/// Connection state of a device as tracked by the SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConnectionState {
    /// State not yet determined.
    #[default]
    Unknown,
    /// Advertising and ready to connect.
    Available,
    /// Currently attempting to connect.
    Connecting,
    /// Connected to the device.
    Connected,
    /// Currently disconnecting.
    Disconnecting,
    /// Not connected.
    Disconnected,
    /// Known but out of range.
    Unavailable,
    /// Not supported by this SDK build.
    Unsupported,
    /// Access has been revoked.
    Unregistered,
    /// A state code this crate does not know about.
    Unrecognized(u8),
}

impl ConnectionState {
    /// Every named variant, in SDK code order.
    pub const KNOWN: [ConnectionState; 9] = [
        Self::Unknown,
        Self::Available,
        Self::Connecting,
        Self::Connected,
        Self::Disconnecting,
        Self::Disconnected,
        Self::Unavailable,
        Self::Unsupported,
        Self::Unregistered,
    ];

    /// Create from the SDK's raw state code.
    pub fn from_raw(value: u8) -> Self {
        match value {
            0 => Self::Unknown,
            1 => Self::Available,
            2 => Self::Connecting,
            3 => Self::Connected,
            4 => Self::Disconnecting,
            5 => Self::Disconnected,
            6 => Self::Unavailable,
            7 => Self::Unsupported,
            8 => Self::Unregistered,
            other => Self::Unrecognized(other),
        }
    }

    /// Check if connected.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Check if in a transitional state.
    pub fn is_transitioning(&self) -> bool {
        matches!(self, Self::Connecting | Self::Disconnecting)
    }
}

/// Unit a sensor reading is displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SensorUnit {
    /// Degrees Fahrenheit.
    Fahrenheit,
    /// Degrees Celsius.
    Celsius,
    /// pH.
    Ph,
    /// Relative humidity percentage.
    RelativeHumidity,
    /// Unit not reported.
    #[default]
    Unknown,
    /// A unit code this crate does not know about.
    Unrecognized(u8),
}

impl SensorUnit {
    /// Every named variant.
    pub const KNOWN: [SensorUnit; 5] = [
        Self::Fahrenheit,
        Self::Celsius,
        Self::Ph,
        Self::RelativeHumidity,
        Self::Unknown,
    ];

    /// Create from the SDK's raw unit code.
    pub fn from_raw(value: u8) -> Self {
        match value {
            0 => Self::Fahrenheit,
            1 => Self::Celsius,
            2 => Self::Ph,
            3 => Self::RelativeHumidity,
            4 => Self::Unknown,
            other => Self::Unrecognized(other),
        }
    }

    /// Check if this is a temperature unit.
    pub fn is_temperature(&self) -> bool {
        matches!(self, Self::Fahrenheit | Self::Celsius)
    }
}

/// Transport a device is reached over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Transport {
    /// Bluetooth Low Energy.
    #[default]
    BluetoothLe,
    /// WiFi.
    Wifi,
}

/// Kind of notification a device pushes to the app.
///
/// The codes are part of the external protocol and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NotificationType {
    /// No notification.
    #[default]
    None,
    /// The device button was pressed.
    ButtonPressed,
    /// The device is shutting down.
    Shutdown,
    /// A settings write was rejected.
    InvalidSetting,
    /// A command was rejected.
    InvalidCommand,
    /// The link reported a communication error.
    CommunicationError,
    /// The device sent an unknown notification.
    Unknown,
    /// A checkpoint was reached.
    Checkpoint,
    /// The device asks the app to refresh its view.
    RequestRefresh,
    /// A code this crate does not know about.
    Unrecognized(i32),
}

impl NotificationType {
    /// Create from the raw notification code.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::None,
            1 => Self::ButtonPressed,
            2 => Self::Shutdown,
            3 => Self::InvalidSetting,
            4 => Self::InvalidCommand,
            5 => Self::CommunicationError,
            6 => Self::Unknown,
            7 => Self::Checkpoint,
            8 => Self::RequestRefresh,
            other => Self::Unrecognized(other),
        }
    }

    /// The raw notification code.
    pub fn code(&self) -> i32 {
        match self {
            Self::None => 0,
            Self::ButtonPressed => 1,
            Self::Shutdown => 2,
            Self::InvalidSetting => 3,
            Self::InvalidCommand => 4,
            Self::CommunicationError => 5,
            Self::Unknown => 6,
            Self::Checkpoint => 7,
            Self::RequestRefresh => 8,
            Self::Unrecognized(code) => *code,
        }
    }
}

/// A single sensor slot on a device.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sensor {
    /// Whether the sensor is switched on.
    pub enabled: bool,
    /// Whether the sensor reports a fault (open circuit, out of range).
    pub fault: bool,
    /// Unit the reading is expressed in.
    pub display_unit: SensorUnit,
    /// Current reading, in `display_unit`.
    pub reading: f64,
}

impl Sensor {
    /// Create an enabled, non-faulted sensor with a reading.
    pub fn new(display_unit: SensorUnit, reading: f64) -> Self {
        Self {
            enabled: true,
            fault: false,
            display_unit,
            reading,
        }
    }

    /// Check if the reading can be shown to a user.
    pub fn has_valid_reading(&self) -> bool {
        self.enabled && !self.fault
    }
}

/// A device as reported by the SDK.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Device {
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
    /// Product family.
    pub device_type: DeviceType,
    /// Connection state.
    pub connection_state: ConnectionState,
    /// Whether the SDK considers the link up. May briefly disagree with
    /// `connection_state`.
    pub is_connected: bool,
    /// Whether the device has finished its post-connection setup.
    pub is_ready: bool,
    /// Number of sensor slots the hardware supports.
    pub max_sensor_count: u32,
    /// Battery percentage, or [`Device::BATTERY_LEVEL_UNKNOWN`].
    pub battery_level: i32,
    /// Sensor slots, index 0 first.
    pub sensors: Vec<Sensor>,
}

impl Device {
    /// Sentinel the SDK uses when the battery level has not been read.
    pub const BATTERY_LEVEL_UNKNOWN: i32 = -1;

    /// Create a device with the given identifier and type and no sensors.
    pub fn new(identifier: impl Into<String>, device_type: DeviceType) -> Self {
        Self {
            identifier: identifier.into(),
            device_type,
            battery_level: Self::BATTERY_LEVEL_UNKNOWN,
            ..Self::default()
        }
    }

    /// Get the primary sensor (slot 0), if the device has one.
    pub fn primary_sensor(&self) -> Option<&Sensor> {
        self.sensors.first()
    }

    /// Battery percentage, if known.
    pub fn battery_percent(&self) -> Option<u8> {
        u8::try_from(self.battery_level).ok().filter(|v| *v <= 100)
    }
}
