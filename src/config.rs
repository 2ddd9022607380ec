//! Bridge configuration.

use std::time::Duration;
use uuid::Uuid;

use crate::sdk::device::Transport;

/// How long `startScan` asks the SDK to scan for.
pub const DEFAULT_SCAN_DURATION: Duration = Duration::from_secs(5);

/// Events buffered per receiver before a slow receiver starts skipping.
///
/// A scan over a crowded room produces a burst of one snapshot per discovered
/// device and state change; this leaves room for several such bursts.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Settings for a [`ThermBridge`](crate::ThermBridge).
///
/// These are fixed by the host embedding the bridge; none of them are
/// exposed to the consumer's command surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Transport used for device lookups and scans.
    pub transport: Transport,
    /// Scan duration passed to the SDK.
    pub scan_duration: Duration,
    /// Tag under which callbacks are registered with the SDK.
    pub callback_tag: String,
    /// Broadcast channel capacity.
    ///
    /// A receiver that falls more than this many events behind loses the
    /// oldest ones, `notificationReceived` events included. The loss is
    /// logged at `warn` and the receiver resumes from the oldest event still
    /// buffered. Snapshots are complete, so a missed `deviceListUpdated` is
    /// repaired by the next one; a missed notification is not.
    pub event_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            transport: Transport::BluetoothLe,
            scan_duration: DEFAULT_SCAN_DURATION,
            callback_tag: format!("bluetherm-bridge-{}", Uuid::new_v4()),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl BridgeConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different transport.
    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Use a different scan duration.
    pub fn with_scan_duration(mut self, scan_duration: Duration) -> Self {
        self.scan_duration = scan_duration;
        self
    }

    /// Register callbacks under a fixed tag.
    pub fn with_callback_tag(mut self, tag: impl Into<String>) -> Self {
        self.callback_tag = tag.into();
        self
    }

    /// Use a different event channel capacity.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.transport, Transport::BluetoothLe);
        assert_eq!(config.scan_duration, Duration::from_secs(5));
        assert_eq!(config.event_capacity, DEFAULT_EVENT_CAPACITY);
        assert!(config.callback_tag.starts_with("bluetherm-bridge-"));
    }

    #[test]
    fn test_default_tags_are_unique() {
        assert_ne!(
            BridgeConfig::default().callback_tag,
            BridgeConfig::default().callback_tag
        );
    }

    #[test]
    fn test_builders() {
        let config = BridgeConfig::new()
            .with_transport(Transport::Wifi)
            .with_scan_duration(Duration::from_secs(10))
            .with_callback_tag("kitchen")
            .with_event_capacity(8);
        assert_eq!(config.transport, Transport::Wifi);
        assert_eq!(config.scan_duration, Duration::from_secs(10));
        assert_eq!(config.callback_tag, "kitchen");
        assert_eq!(config.event_capacity, 8);
    }
}
