//! Device interface error types

use samisara_transport::TransportError;
use thiserror::Error;

/// Errors from device operations
#[derive(Error, Debug)]
pub enum DeviceError {
    /// Transport layer error
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Feature not supported by this firmware
    #[error("Feature not supported: {0}")]
    NotSupported(String),

    /// Device returned unexpected response
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl DeviceError {
    /// Whether no matching device was attached
    pub fn is_not_found(&self) -> bool {
        matches!(self, DeviceError::Transport(TransportError::DeviceNotFound(_)))
    }
}
