//! Projection of SDK state into the consumer's vocabulary.

pub mod labels;
pub mod snapshot;

pub use labels::{connection_state_label, device_type_label, unit_label, UNKNOWN_LABEL};
pub use snapshot::{build_snapshot, project_devices, DeviceRecord};
