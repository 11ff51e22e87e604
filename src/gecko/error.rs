// Thu Jan 15 2026 - Alex

use crate::transport::TransportError;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DeviceQueryFailed,
    NoDevicesFound,
    DeviceNotFound,
    ResetFailed,
    PurgeRxFailed,
    PurgeTxFailed,
    TimeoutConfigFailed,
    CommandSendFailed,
    ReadFailed,
    InvalidReply,
    TooManyRetries,
    RegisterStreamSizeInvalid,
    CheatStreamSizeInvalid,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Error, Debug)]
pub enum GeckoError {
    #[error("Could not query attached USB devices: {0}")]
    DeviceQueryFailed(#[source] TransportError),
    #[error("No FTDI devices attached")]
    NoDevicesFound,
    #[error("USB Gecko not found: {0}")]
    DeviceNotFound(#[source] TransportError),
    #[error("Device reset failed: {0}")]
    ResetFailed(#[source] TransportError),
    #[error("Purging receive buffer failed: {0}")]
    PurgeRxFailed(#[source] TransportError),
    #[error("Purging transmit buffer failed: {0}")]
    PurgeTxFailed(#[source] TransportError),
    #[error("Configuring timeouts failed: {0}")]
    TimeoutConfigFailed(#[source] TransportError),
    #[error("Sending command failed")]
    CommandSendFailed,
    #[error("Reading from device failed")]
    ReadFailed,
    #[error("Device sent 0x{0:02X} where an acknowledgement was expected")]
    InvalidReply(u8),
    #[error("Too many retries")]
    TooManyRetries,
    #[error("Register block must be 0xA0 bytes, got 0x{0:X}")]
    RegisterStreamSizeInvalid(usize),
    #[error("Cheat stream length 0x{0:X} is not a multiple of 8")]
    CheatStreamSizeInvalid(usize),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GeckoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GeckoError::DeviceQueryFailed(_) => ErrorKind::DeviceQueryFailed,
            GeckoError::NoDevicesFound => ErrorKind::NoDevicesFound,
            GeckoError::DeviceNotFound(_) => ErrorKind::DeviceNotFound,
            GeckoError::ResetFailed(_) => ErrorKind::ResetFailed,
            GeckoError::PurgeRxFailed(_) => ErrorKind::PurgeRxFailed,
            GeckoError::PurgeTxFailed(_) => ErrorKind::PurgeTxFailed,
            GeckoError::TimeoutConfigFailed(_) => ErrorKind::TimeoutConfigFailed,
            GeckoError::CommandSendFailed => ErrorKind::CommandSendFailed,
            GeckoError::ReadFailed => ErrorKind::ReadFailed,
            GeckoError::InvalidReply(_) => ErrorKind::InvalidReply,
            GeckoError::TooManyRetries => ErrorKind::TooManyRetries,
            GeckoError::RegisterStreamSizeInvalid(_) => ErrorKind::RegisterStreamSizeInvalid,
            GeckoError::CheatStreamSizeInvalid(_) => ErrorKind::CheatStreamSizeInvalid,
            GeckoError::Io(_) => ErrorKind::Io,
        }
    }

    /// Errors raised while bringing the link up, as opposed to failures
    /// inside a command.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::DeviceQueryFailed
                | ErrorKind::NoDevicesFound
                | ErrorKind::DeviceNotFound
                | ErrorKind::ResetFailed
                | ErrorKind::PurgeRxFailed
                | ErrorKind::PurgeTxFailed
                | ErrorKind::TimeoutConfigFailed
        )
    }
}

pub type GeckoResult<T> = Result<T, GeckoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(GeckoError::TooManyRetries.kind(), ErrorKind::TooManyRetries);
        assert_eq!(GeckoError::InvalidReply(0x00).kind(), ErrorKind::InvalidReply);
        assert_eq!(
            GeckoError::ResetFailed(TransportError::NotOpen).kind(),
            ErrorKind::ResetFailed
        );
    }

    #[test]
    fn test_connection_errors() {
        assert!(GeckoError::NoDevicesFound.is_connection_error());
        assert!(!GeckoError::ReadFailed.is_connection_error());
        assert!(!GeckoError::CheatStreamSizeInvalid(3).is_connection_error());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            GeckoError::InvalidReply(0xCC).to_string(),
            "Device sent 0xCC where an acknowledgement was expected"
        );
    }
}
