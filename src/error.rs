//! Error types for the bluetherm-bridge crate.

use thiserror::Error;

/// Error reported by the device SDK for a failed operation.
///
/// The code space belongs to the SDK; the bridge only carries it through.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("SDK error {code}: {message}")]
pub struct SdkError {
    /// SDK-defined error code.
    pub code: i32,
    /// Human-readable description from the SDK.
    pub message: String,
}

impl SdkError {
    /// Create a new SDK error.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Result type returned by fallible SDK operations.
pub type SdkResult<T> = std::result::Result<T, SdkError>;

/// The main error type for this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Bluetooth-related error from the underlying BLE library.
    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),

    /// Bluetooth is not available or is disabled on this system.
    #[error("Bluetooth not available or disabled")]
    BluetoothUnavailable,

    /// A device SDK operation failed.
    #[error("{operation} failed: {source}")]
    Sdk {
        /// Name of the SDK operation.
        operation: &'static str,
        /// The error reported by the SDK.
        #[source]
        source: SdkError,
    },
}

impl Error {
    /// Wrap an SDK error with the operation that produced it.
    pub fn sdk(operation: &'static str, source: SdkError) -> Self {
        Self::Sdk { operation, source }
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
