// Thu Jan 15 2026 - Alex

use crate::transport::{PurgeDirection, Transport, TransportError};
use futures_lite::future;
use nusb::transfer::{Control, ControlType, Recipient, RequestBuffer, TransferError};
use nusb::{DeviceInfo, Interface};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::task::{Context, Poll, Waker};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub const FTDI_VENDOR_ID: u16 = 0x0403;

const ENDPOINT_IN: u8 = 0x81;
const ENDPOINT_OUT: u8 = 0x02;
const MAX_PACKET: usize = 64;
const MODEM_STATUS_LEN: usize = 2;

const SIO_RESET: u8 = 0x00;
const SIO_SET_LATENCY_TIMER: u8 = 0x09;
const SIO_RESET_SIO: u16 = 0;
const SIO_RESET_PURGE_RX: u16 = 1;
const SIO_RESET_PURGE_TX: u16 = 2;
const PORT_A_INDEX: u16 = 1;
const CONTROL_TIMEOUT: Duration = Duration::from_millis(500);

/// FTDI FT245 backend talking to the chip directly through `nusb`.
pub struct FtdiTransport {
    interface: Option<Interface>,
    timer: Option<DeadlineTimer>,
    read_timeout: Duration,
    write_timeout: Duration,
    read_chunk: usize,
    pending: VecDeque<u8>,
}

impl Default for FtdiTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl FtdiTransport {
    pub fn new() -> Self {
        Self {
            interface: None,
            timer: None,
            read_timeout: Duration::from_millis(2000),
            write_timeout: Duration::from_millis(2000),
            read_chunk: 0x10000,
            pending: VecDeque::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.interface.is_some()
    }

    fn ftdi_devices() -> Result<Vec<DeviceInfo>, TransportError> {
        Ok(nusb::list_devices()?
            .filter(|info| info.vendor_id() == FTDI_VENDOR_ID)
            .collect())
    }

    fn interface(&self) -> Result<&Interface, TransportError> {
        self.interface.as_ref().ok_or(TransportError::NotOpen)
    }

    fn timer(&self) -> Result<&DeadlineTimer, TransportError> {
        self.timer.as_ref().ok_or(TransportError::NotOpen)
    }

    fn vendor_request(&self, request: u8, value: u16) -> Result<(), TransportError> {
        let control = Control {
            control_type: ControlType::Vendor,
            recipient: Recipient::Device,
            request,
            value,
            index: PORT_A_INDEX,
        };
        self.interface()?
            .control_out_blocking(control, &[], CONTROL_TIMEOUT)
            .map_err(usb_error)?;
        Ok(())
    }

    /// One bulk IN transfer with the modem status header of every
    /// max-packet frame stripped. `None` when the deadline passed first.
    fn read_frames(&self, deadline: Instant) -> Result<Option<Vec<u8>>, TransportError> {
        let request_len = self.read_chunk.div_ceil(MAX_PACKET) * MAX_PACKET;
        let timer = self.timer()?;
        let transfer = self.interface()?.bulk_in(ENDPOINT_IN, RequestBuffer::new(request_len));

        let completion = future::block_on(future::or(
            async { Some(transfer.await) },
            async {
                timer.sleep_until(deadline).await;
                None
            },
        ));

        let Some(completion) = completion else {
            return Ok(None);
        };
        let raw = completion.into_result().map_err(usb_error)?;

        let mut payload = Vec::with_capacity(raw.len());
        for frame in raw.chunks(MAX_PACKET) {
            if frame.len() > MODEM_STATUS_LEN {
                payload.extend_from_slice(&frame[MODEM_STATUS_LEN..]);
            }
        }
        Ok(Some(payload))
    }
}

impl Transport for FtdiTransport {
    fn device_count(&mut self) -> Result<u32, TransportError> {
        Ok(Self::ftdi_devices()?.len() as u32)
    }

    fn open_by_serial(&mut self, serial: &str) -> Result<(), TransportError> {
        let info = Self::ftdi_devices()?
            .into_iter()
            .find(|info| {
                info.serial_number()
                    .map(|s| s.starts_with(serial))
                    .unwrap_or(false)
            })
            .ok_or_else(|| TransportError::NotFound(serial.to_string()))?;

        log::debug!(
            "Opening FTDI device {:04X}:{:04X} serial {}",
            info.vendor_id(),
            info.product_id(),
            info.serial_number().unwrap_or("?")
        );

        let device = info.open()?;
        // ftdi_sio binds the chip on Linux.
        let interface = device.detach_and_claim_interface(0)?;
        if self.timer.is_none() {
            self.timer = Some(DeadlineTimer::spawn()?);
        }
        self.interface = Some(interface);
        self.pending.clear();
        Ok(())
    }

    fn reset_device(&mut self) -> Result<(), TransportError> {
        self.vendor_request(SIO_RESET, SIO_RESET_SIO)?;
        self.pending.clear();
        Ok(())
    }

    fn purge(&mut self, direction: PurgeDirection) -> Result<(), TransportError> {
        match direction {
            PurgeDirection::Rx => {
                self.vendor_request(SIO_RESET, SIO_RESET_PURGE_RX)?;
                self.pending.clear();
            }
            PurgeDirection::Tx => self.vendor_request(SIO_RESET, SIO_RESET_PURGE_TX)?,
        }
        Ok(())
    }

    fn set_timeouts(&mut self, read_ms: u32, write_ms: u32) -> Result<(), TransportError> {
        self.interface()?;
        self.read_timeout = Duration::from_millis(read_ms as u64);
        self.write_timeout = Duration::from_millis(write_ms as u64);
        Ok(())
    }

    fn set_latency_timer(&mut self, ms: u8) -> Result<(), TransportError> {
        self.vendor_request(SIO_SET_LATENCY_TIMER, ms as u16)
    }

    fn set_read_chunk_size(&mut self, bytes: u32) -> Result<(), TransportError> {
        self.interface()?;
        self.read_chunk = (bytes as usize).max(MAX_PACKET);
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let deadline = Instant::now() + self.read_timeout;

        while self.pending.len() < buf.len() {
            match self.read_frames(deadline)? {
                Some(payload) => self.pending.extend(payload),
                None => break,
            }
            if Instant::now() >= deadline {
                break;
            }
        }

        let count = buf.len().min(self.pending.len());
        for (dst, src) in buf.iter_mut().zip(self.pending.drain(..count)) {
            *dst = src;
        }
        if count < buf.len() {
            log::trace!("Short read: {} of {} bytes", count, buf.len());
        }
        Ok(count)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        let deadline = Instant::now() + self.write_timeout;
        let timer = self.timer()?;
        let transfer = self.interface()?.bulk_out(ENDPOINT_OUT, data.to_vec());

        let completion = future::block_on(future::or(
            async { Some(transfer.await) },
            async {
                timer.sleep_until(deadline).await;
                None
            },
        ));

        match completion {
            Some(completion) => Ok(completion.into_result().map_err(usb_error)?.actual_length()),
            None => Ok(0),
        }
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if self.interface.take().is_some() {
            log::debug!("FTDI interface released");
        }
        self.pending.clear();
        Ok(())
    }
}

fn usb_error(err: TransferError) -> TransportError {
    match err {
        TransferError::Disconnected => TransportError::Fault("device disconnected".to_string()),
        other => TransportError::Usb(other.to_string()),
    }
}

/// One worker thread shared by every transfer of a transport. Only the
/// most recently armed deadline is tracked; arming again replaces it.
struct DeadlineTimer {
    arm: Option<mpsc::Sender<(Instant, Waker)>>,
    worker: Option<JoinHandle<()>>,
}

impl DeadlineTimer {
    fn spawn() -> std::io::Result<Self> {
        let (arm, requests) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("ftdi-timer".to_string())
            .spawn(move || timer_loop(requests))?;
        Ok(Self {
            arm: Some(arm),
            worker: Some(worker),
        })
    }

    fn sleep_until(&self, at: Instant) -> Deadline<'_> {
        Deadline {
            timer: self,
            at,
            armed: false,
        }
    }

    fn arm(&self, at: Instant, waker: Waker) -> bool {
        match &self.arm {
            Some(arm) => arm.send((at, waker)).is_ok(),
            None => false,
        }
    }
}

impl Drop for DeadlineTimer {
    fn drop(&mut self) {
        self.arm.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn timer_loop(requests: mpsc::Receiver<(Instant, Waker)>) {
    let mut armed: Option<(Instant, Waker)> = None;
    loop {
        let next = match &armed {
            None => requests.recv().ok(),
            Some((at, _)) => match requests.recv_timeout(at.saturating_duration_since(Instant::now())) {
                Ok(request) => Some(request),
                Err(RecvTimeoutError::Timeout) => {
                    if let Some((_, waker)) = armed.take() {
                        waker.wake();
                    }
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => None,
            },
        };
        match next {
            Some(request) => armed = Some(request),
            None => return,
        }
    }
}

/// Resolves once `at` has passed.
struct Deadline<'a> {
    timer: &'a DeadlineTimer,
    at: Instant,
    armed: bool,
}

impl Future for Deadline<'_> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if Instant::now() >= self.at {
            return Poll::Ready(());
        }
        if !self.armed {
            let at = self.at;
            if !self.timer.arm(at, cx.waker().clone()) {
                return Poll::Ready(());
            }
            self.armed = true;
        }
        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_transport_reports_not_open() {
        let mut transport = FtdiTransport::new();
        assert!(!transport.is_open());
        assert!(matches!(transport.reset_device(), Err(TransportError::NotOpen)));
        assert!(matches!(transport.write(&[0x50]), Err(TransportError::NotOpen)));
        assert!(transport.close().is_ok());
    }

    #[test]
    fn test_deadline_resolves() {
        let timer = DeadlineTimer::spawn().unwrap();
        let start = Instant::now();
        future::block_on(timer.sleep_until(start + Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));

        let again = Instant::now();
        future::block_on(timer.sleep_until(again + Duration::from_millis(10)));
        assert!(again.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_abandoned_deadline_is_replaced() {
        let timer = DeadlineTimer::spawn().unwrap();
        let far = Instant::now() + Duration::from_secs(30);
        assert!(future::block_on(future::poll_once(timer.sleep_until(far))).is_none());

        let start = Instant::now();
        future::block_on(timer.sleep_until(start + Duration::from_millis(20)));
        assert!(start.elapsed() < Duration::from_secs(5));
        drop(timer);
    }

    #[test]
    fn test_unopened_transport_has_no_timer() {
        let transport = FtdiTransport::new();
        assert!(transport.timer.is_none());
        assert!(matches!(transport.timer(), Err(TransportError::NotOpen)));
    }
}
