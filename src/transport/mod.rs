// Thu Jan 15 2026 - Alex

pub mod ftdi;
pub mod sim;

pub use ftdi::FtdiTransport;
pub use sim::{ChunkFault, FaultKind, SimulatedGecko};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("USB error: {0}")]
    Usb(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Device is not open")]
    NotOpen,
    #[error("No device with serial {0}")]
    NotFound(String),
    #[error("Transfer timed out")]
    Timeout,
    #[error("Device fault: {0}")]
    Fault(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeDirection {
    Rx,
    Tx,
}

/// Byte-level access to the adapter.
///
/// `read` and `write` return the number of bytes actually moved. A short
/// count is not an error; only `Err` signals a failed transfer.
pub trait Transport: Send {
    fn device_count(&mut self) -> Result<u32, TransportError>;
    fn open_by_serial(&mut self, serial: &str) -> Result<(), TransportError>;
    fn reset_device(&mut self) -> Result<(), TransportError>;
    fn purge(&mut self, direction: PurgeDirection) -> Result<(), TransportError>;
    fn set_timeouts(&mut self, read_ms: u32, write_ms: u32) -> Result<(), TransportError>;
    fn set_latency_timer(&mut self, ms: u8) -> Result<(), TransportError>;
    fn set_read_chunk_size(&mut self, bytes: u32) -> Result<(), TransportError>;
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError>;
    fn close(&mut self) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn device_count(&mut self) -> Result<u32, TransportError> {
        (**self).device_count()
    }

    fn open_by_serial(&mut self, serial: &str) -> Result<(), TransportError> {
        (**self).open_by_serial(serial)
    }

    fn reset_device(&mut self) -> Result<(), TransportError> {
        (**self).reset_device()
    }

    fn purge(&mut self, direction: PurgeDirection) -> Result<(), TransportError> {
        (**self).purge(direction)
    }

    fn set_timeouts(&mut self, read_ms: u32, write_ms: u32) -> Result<(), TransportError> {
        (**self).set_timeouts(read_ms, write_ms)
    }

    fn set_latency_timer(&mut self, ms: u8) -> Result<(), TransportError> {
        (**self).set_latency_timer(ms)
    }

    fn set_read_chunk_size(&mut self, bytes: u32) -> Result<(), TransportError> {
        (**self).set_read_chunk_size(bytes)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        (**self).read(buf)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        (**self).write(data)
    }

    fn close(&mut self) -> Result<(), TransportError> {
        (**self).close()
    }
}
