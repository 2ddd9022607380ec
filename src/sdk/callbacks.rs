//! SDK callback shapes and their normalization.
//!
//! BlueTherm SDK releases disagree on their callback interfaces (for example
//! `onScanComplete` gained a device count, and revoke completion only exists
//! in newer releases). Each shape gets a raw trait here plus an adapter that
//! turns its calls into a single [`SdkNotification`] stream, so the rest of
//! the crate is written once against [`NotificationHandler`].

use bytes::Bytes;
use std::sync::Arc;
use tracing::trace;

use crate::sdk::device::{ConnectionState, Device, NotificationType};

/// A raw SDK notification in normalized form.
#[derive(Debug, Clone, PartialEq)]
pub enum SdkNotification {
    /// A scan finished.
    ScanComplete,
    /// A device was discovered for the first time.
    NewDevice {
        /// Identifier of the discovered device.
        identifier: String,
    },
    /// A device changed connection state.
    ConnectionStateChanged {
        /// Identifier of the device.
        identifier: String,
        /// The new state.
        state: ConnectionState,
    },
    /// A device reading or setting changed.
    DeviceUpdated {
        /// Identifier of the device.
        identifier: String,
    },
    /// A revoke-access request finished.
    RevokeComplete {
        /// Identifier of the device.
        identifier: String,
        /// Whether the SDK reported success.
        success: bool,
    },
    /// A device pushed a notification.
    NotificationReceived {
        /// Identifier of the device.
        identifier: String,
        /// Kind of notification.
        notification_type: NotificationType,
        /// Opaque payload bytes.
        payload: Bytes,
    },
    /// A device dropped its link without being asked to.
    UnexpectedDisconnection {
        /// Identifier of the device.
        identifier: String,
    },
    /// A callback this crate has no mapping for.
    Unrecognized {
        /// Name of the SDK callback.
        name: String,
    },
}

impl SdkNotification {
    /// Short name for logging.
    pub fn name(&self) -> &str {
        match self {
            Self::ScanComplete => "scanComplete",
            Self::NewDevice { .. } => "newDevice",
            Self::ConnectionStateChanged { .. } => "connectionStateChanged",
            Self::DeviceUpdated { .. } => "deviceUpdated",
            Self::RevokeComplete { .. } => "revokeComplete",
            Self::NotificationReceived { .. } => "notificationReceived",
            Self::UnexpectedDisconnection { .. } => "unexpectedDisconnection",
            Self::Unrecognized { name } => name,
        }
    }

    /// Identifier of the device the notification is about, if any.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::NewDevice { identifier }
            | Self::ConnectionStateChanged { identifier, .. }
            | Self::DeviceUpdated { identifier }
            | Self::RevokeComplete { identifier, .. }
            | Self::NotificationReceived { identifier, .. }
            | Self::UnexpectedDisconnection { identifier } => Some(identifier),
            Self::ScanComplete | Self::Unrecognized { .. } => None,
        }
    }
}

/// Receiver of normalized SDK notifications.
///
/// Called on the SDK's callback thread.
pub trait NotificationHandler: Send + Sync {
    /// Handle a single notification.
    fn handle(&self, notification: SdkNotification);
}

/// Callback interface of current SDK releases.
pub trait DeviceCallbacksV2: Send + Sync {
    /// A scan finished having seen `devices_found` devices.
    fn on_scan_complete(&self, devices_found: usize);
    /// A new device was discovered.
    fn on_new_device(&self, device: &Device);
    /// A device changed connection state.
    fn on_connection_state_changed(&self, device: &Device, state: ConnectionState);
    /// A device reading or setting changed.
    fn on_device_updated(&self, device: &Device);
    /// A revoke-access request finished.
    fn on_revoke_request_complete(&self, device: &Device, success: bool);
    /// A device pushed a notification.
    fn on_notification_received(&self, device: &Device, notification_type: i32, payload: &[u8]);
    /// A device dropped its link without being asked to.
    fn on_unexpected_disconnection(&self, device: &Device);
    /// Any callback not covered above.
    fn on_other(&self, callback_name: &str);
}

/// Callback interface of legacy SDK releases.
///
/// No scan count, no revoke completion, and the connection state has to be
/// read from the device itself.
pub trait DeviceCallbacksV1: Send + Sync {
    /// A scan finished.
    fn on_scan_complete(&self);
    /// A new device was discovered.
    fn on_new_device(&self, device: &Device);
    /// A device changed connection state.
    fn on_connection_state_changed(&self, device: &Device);
    /// A device reading or setting changed.
    fn on_device_updated(&self, device: &Device);
    /// A device pushed a notification.
    fn on_notification_received(&self, device: &Device, notification_type: i32);
    /// A device dropped its link without being asked to.
    fn on_unexpected_disconnection(&self, device: &Device);
}

/// Adapts [`DeviceCallbacksV2`] calls to a [`NotificationHandler`].
#[derive(Clone)]
pub struct CallbacksV2Adapter {
    handler: Arc<dyn NotificationHandler>,
}

impl CallbacksV2Adapter {
    /// Wrap a handler.
    pub fn new(handler: Arc<dyn NotificationHandler>) -> Self {
        Self { handler }
    }
}

impl DeviceCallbacksV2 for CallbacksV2Adapter {
    fn on_scan_complete(&self, devices_found: usize) {
        trace!("V2 scan complete, {} devices", devices_found);
        self.handler.handle(SdkNotification::ScanComplete);
    }

    fn on_new_device(&self, device: &Device) {
        self.handler.handle(SdkNotification::NewDevice {
            identifier: device.identifier.clone(),
        });
    }

    fn on_connection_state_changed(&self, device: &Device, state: ConnectionState) {
        self.handler.handle(SdkNotification::ConnectionStateChanged {
            identifier: device.identifier.clone(),
            state,
        });
    }

    fn on_device_updated(&self, device: &Device) {
        self.handler.handle(SdkNotification::DeviceUpdated {
            identifier: device.identifier.clone(),
        });
    }

    fn on_revoke_request_complete(&self, device: &Device, success: bool) {
        self.handler.handle(SdkNotification::RevokeComplete {
            identifier: device.identifier.clone(),
            success,
        });
    }

    fn on_notification_received(&self, device: &Device, notification_type: i32, payload: &[u8]) {
        self.handler.handle(SdkNotification::NotificationReceived {
            identifier: device.identifier.clone(),
            notification_type: NotificationType::from_code(notification_type),
            payload: Bytes::copy_from_slice(payload),
        });
    }

    fn on_unexpected_disconnection(&self, device: &Device) {
        self.handler.handle(SdkNotification::UnexpectedDisconnection {
            identifier: device.identifier.clone(),
        });
    }

    fn on_other(&self, callback_name: &str) {
        self.handler.handle(SdkNotification::Unrecognized {
            name: callback_name.to_string(),
        });
    }
}

/// Adapts [`DeviceCallbacksV1`] calls to a [`NotificationHandler`].
#[derive(Clone)]
pub struct CallbacksV1Adapter {
    handler: Arc<dyn NotificationHandler>,
}

impl CallbacksV1Adapter {
    /// Wrap a handler.
    pub fn new(handler: Arc<dyn NotificationHandler>) -> Self {
        Self { handler }
    }
}

impl DeviceCallbacksV1 for CallbacksV1Adapter {
    fn on_scan_complete(&self) {
        self.handler.handle(SdkNotification::ScanComplete);
    }

    fn on_new_device(&self, device: &Device) {
        self.handler.handle(SdkNotification::NewDevice {
            identifier: device.identifier.clone(),
        });
    }

    fn on_connection_state_changed(&self, device: &Device) {
        self.handler.handle(SdkNotification::ConnectionStateChanged {
            identifier: device.identifier.clone(),
            state: device.connection_state,
        });
    }

    fn on_device_updated(&self, device: &Device) {
        self.handler.handle(SdkNotification::DeviceUpdated {
            identifier: device.identifier.clone(),
        });
    }

    fn on_notification_received(&self, device: &Device, notification_type: i32) {
        self.handler.handle(SdkNotification::NotificationReceived {
            identifier: device.identifier.clone(),
            notification_type: NotificationType::from_code(notification_type),
            payload: Bytes::new(),
        });
    }

    fn on_unexpected_disconnection(&self, device: &Device) {
        self.handler.handle(SdkNotification::UnexpectedDisconnection {
            identifier: device.identifier.clone(),
        });
    }
}
