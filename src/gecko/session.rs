// Thu Jan 15 2026 - Alex

use crate::config::Config;
use crate::gecko::command::GC_FAIL;
use crate::gecko::error::{GeckoError, GeckoResult};
use crate::gecko::progress::{CancelToken, ProgressObserver, ProgressReport};
use crate::memory::AddressValidator;
use crate::transport::{PurgeDirection, Transport};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Outcome of one framed read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    Ok,
    /// Fewer bytes than requested crossed the wire.
    ResultError,
    /// The transport reported a failure.
    FatalError,
}

impl CommandResult {
    pub fn is_ok(&self) -> bool {
        *self == CommandResult::Ok
    }
}

pub type SharedGecko = Arc<Mutex<Gecko>>;

/// Protocol engine for one USB Gecko adapter.
pub struct Gecko {
    pub(crate) transport: Box<dyn Transport>,
    pub(crate) validator: AddressValidator,
    pub(crate) config: Config,
    pub(crate) connected: bool,
    pub(crate) observer: Option<Box<dyn ProgressObserver>>,
    pub(crate) cancel: CancelToken,
}

impl Gecko {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self::with_config(transport, Config::default())
    }

    pub fn with_config(transport: Box<dyn Transport>, config: Config) -> Self {
        let mut validator = AddressValidator::new().with_debug(config.address_debug);
        if let Some(upper) = config.mem2_upper {
            validator.set_upper_bound(upper);
        }

        Self {
            transport,
            validator,
            config,
            connected: false,
            observer: None,
            cancel: CancelToken::new(),
        }
    }

    pub fn shared(self) -> SharedGecko {
        Arc::new(Mutex::new(self))
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn validator(&self) -> &AddressValidator {
        &self.validator
    }

    pub fn validator_mut(&mut self) -> &mut AddressValidator {
        &mut self.validator
    }

    pub fn set_observer<O: ProgressObserver + 'static>(&mut self, observer: O) {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_observer(&mut self) -> Option<Box<dyn ProgressObserver>> {
        self.observer.take()
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn cancel_dump(&self) {
        self.cancel.cancel();
    }

    pub fn connect(&mut self) -> GeckoResult<()> {
        if self.connected {
            self.disconnect();
        }

        let count = self
            .transport
            .device_count()
            .map_err(GeckoError::DeviceQueryFailed)?;
        if count == 0 {
            return Err(GeckoError::NoDevicesFound);
        }

        let serial = self.config.serial.clone();
        self.transport
            .open_by_serial(&serial)
            .map_err(GeckoError::DeviceNotFound)?;

        if let Err(e) = self.configure_link() {
            self.disconnect();
            return Err(GeckoError::TimeoutConfigFailed(e));
        }

        self.init_gecko()?;
        self.settle(self.config.firmware_settle());

        self.connected = true;
        log::info!("Connected to USB Gecko {}", serial);
        Ok(())
    }

    fn configure_link(&mut self) -> Result<(), crate::transport::TransportError> {
        self.transport
            .set_timeouts(self.config.read_timeout_ms, self.config.write_timeout_ms)?;
        self.transport.set_latency_timer(self.config.latency_ms)?;
        self.transport.set_read_chunk_size(self.config.transfer_size)
    }

    pub fn disconnect(&mut self) {
        if self.connected {
            log::info!("Disconnecting from USB Gecko");
        }
        self.connected = false;
        if let Err(e) = self.transport.close() {
            log::debug!("Closing transport failed: {}", e);
        }
    }

    pub fn reconnect(&mut self) -> bool {
        self.disconnect();
        match self.connect() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Reconnect failed: {}", e);
                false
            }
        }
    }

    /// Resets the adapter and flushes both directions.
    pub fn init_gecko(&mut self) -> GeckoResult<()> {
        if let Err(e) = self.transport.reset_device() {
            self.disconnect();
            return Err(GeckoError::ResetFailed(e));
        }
        if let Err(e) = self.transport.purge(PurgeDirection::Rx) {
            self.disconnect();
            return Err(GeckoError::PurgeRxFailed(e));
        }
        if let Err(e) = self.transport.purge(PurgeDirection::Tx) {
            self.disconnect();
            return Err(GeckoError::PurgeTxFailed(e));
        }
        Ok(())
    }

    pub fn gecko_read(&mut self, buf: &mut [u8]) -> CommandResult {
        match self.transport.read(buf) {
            Ok(n) if n == buf.len() => CommandResult::Ok,
            Ok(n) => {
                log::trace!("Short read: {} of {} bytes", n, buf.len());
                CommandResult::ResultError
            }
            Err(e) => {
                log::debug!("Read failed: {}", e);
                CommandResult::FatalError
            }
        }
    }

    pub fn gecko_write(&mut self, data: &[u8]) -> CommandResult {
        match self.transport.write(data) {
            Ok(n) if n == data.len() => CommandResult::Ok,
            Ok(n) => {
                log::trace!("Short write: {} of {} bytes", n, data.len());
                CommandResult::ResultError
            }
            Err(e) => {
                log::debug!("Write failed: {}", e);
                CommandResult::FatalError
            }
        }
    }

    /// Sends a single byte without any framing.
    pub fn raw_command(&mut self, byte: u8) -> GeckoResult<()> {
        log::debug!("Command 0x{:02X}", byte);
        self.send(&[byte])
    }

    pub(crate) fn send(&mut self, data: &[u8]) -> GeckoResult<()> {
        match self.gecko_write(data) {
            CommandResult::Ok => Ok(()),
            _ => Err(GeckoError::CommandSendFailed),
        }
    }

    pub(crate) fn read_byte(&mut self) -> GeckoResult<u8> {
        let mut buf = [0u8; 1];
        match self.gecko_read(&mut buf) {
            CommandResult::Ok => Ok(buf[0]),
            _ => Err(GeckoError::ReadFailed),
        }
    }

    /// Handshake bytes whose delivery is not checked.
    pub(crate) fn signal(&mut self, byte: u8) {
        if !self.gecko_write(&[byte]).is_ok() {
            log::debug!("Handshake byte 0x{:02X} not delivered", byte);
        }
    }

    pub fn send_fail(&mut self) {
        self.signal(GC_FAIL);
    }

    pub(crate) fn report(&mut self, report: ProgressReport) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_progress(&report);
        }
    }

    pub(crate) fn settle(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

impl Drop for Gecko {
    fn drop(&mut self) {
        if self.connected {
            self.disconnect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gecko::error::ErrorKind;
    use crate::transport::SimulatedGecko;

    fn engine(sim: &SimulatedGecko) -> Gecko {
        Gecko::with_config(sim.boxed(), Config::immediate())
    }

    #[test]
    fn test_connect_configures_link() {
        let sim = SimulatedGecko::new();
        let mut gecko = engine(&sim);
        gecko.connect().unwrap();
        assert!(gecko.is_connected());
        assert!(sim.is_open());
        assert_eq!(sim.timeouts(), (2000, 2000));
        assert_eq!(sim.latency(), 2);
        assert_eq!(sim.read_chunk_size(), 0x10000);
    }

    #[test]
    fn test_connect_without_devices() {
        let sim = SimulatedGecko::new();
        sim.set_device_count(0);
        let mut gecko = engine(&sim);
        assert_eq!(gecko.connect().unwrap_err().kind(), ErrorKind::NoDevicesFound);
        assert!(!gecko.is_connected());
    }

    #[test]
    fn test_connect_errors_are_typed() {
        let sim = SimulatedGecko::new();
        sim.set_query_failure(true);
        let mut gecko = engine(&sim);
        assert_eq!(gecko.connect().unwrap_err().kind(), ErrorKind::DeviceQueryFailed);

        sim.set_query_failure(false);
        sim.set_serial("FTDIBUS1");
        assert_eq!(gecko.connect().unwrap_err().kind(), ErrorKind::DeviceNotFound);

        sim.set_serial("GECKUSB0");
        sim.set_reset_failure(true);
        assert_eq!(gecko.connect().unwrap_err().kind(), ErrorKind::ResetFailed);
        assert!(!gecko.is_connected());
        assert!(!sim.is_open());

        sim.set_reset_failure(false);
        sim.set_timeout_failure(true);
        assert_eq!(gecko.connect().unwrap_err().kind(), ErrorKind::TimeoutConfigFailed);
        assert!(!gecko.is_connected());
        assert!(!sim.is_open());

        sim.set_timeout_failure(false);
        sim.set_purge_failure(Some(PurgeDirection::Rx));
        assert_eq!(gecko.connect().unwrap_err().kind(), ErrorKind::PurgeRxFailed);
        assert!(!gecko.is_connected());
        assert!(!sim.is_open());

        sim.set_purge_failure(Some(PurgeDirection::Tx));
        assert_eq!(gecko.connect().unwrap_err().kind(), ErrorKind::PurgeTxFailed);
        assert!(!gecko.is_connected());
        assert!(!sim.is_open());

        sim.set_purge_failure(None);
        gecko.connect().unwrap();
        assert!(sim.is_open());
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let sim = SimulatedGecko::new();
        let mut gecko = engine(&sim);
        gecko.disconnect();
        gecko.connect().unwrap();
        gecko.disconnect();
        gecko.disconnect();
        assert!(!gecko.is_connected());
        assert!(!sim.is_open());
    }

    #[test]
    fn test_reconnect_swallows_errors() {
        let sim = SimulatedGecko::new();
        let mut gecko = engine(&sim);
        assert!(gecko.reconnect());
        sim.set_device_count(0);
        assert!(!gecko.reconnect());
    }

    #[test]
    fn test_drop_closes_device() {
        let sim = SimulatedGecko::new();
        {
            let mut gecko = engine(&sim);
            gecko.connect().unwrap();
        }
        assert!(!sim.is_open());
    }

    #[test]
    fn test_framed_results() {
        let sim = SimulatedGecko::new();
        let mut gecko = engine(&sim);
        gecko.connect().unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(gecko.gecko_read(&mut buf), CommandResult::ResultError);
        assert_eq!(gecko.gecko_write(&[0x07]), CommandResult::Ok);
        gecko.disconnect();
        assert_eq!(gecko.gecko_write(&[0x07]), CommandResult::FatalError);
    }
}
