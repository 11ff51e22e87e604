// Fri Jan 16 2026 - Alex

use crate::gecko::command::*;
use crate::gecko::transfer::{ACK_ATTEMPTS, READ_PACKET_SIZE, UPLOAD_PACKET_SIZE};
use crate::transport::{PurgeDirection, Transport, TransportError};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

const PAGE_SIZE: u32 = 0x1_0000;
const SHORT_REGISTER_BLOCK: usize = 0xA0;
const LONG_REGISTER_BLOCK: usize = 0x120;
const DEFAULT_SERIAL: &str = "GECKUSB0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Only half of the chunk crosses the wire.
    Short,
    /// The transfer call itself fails.
    Fatal,
    /// The chunk arrives but the firmware answers with a non-ACK byte.
    BadAck,
}

/// Makes the first `attempts` transfers of chunk `chunk` misbehave. Chunk 0
/// also covers the register block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkFault {
    pub chunk: u32,
    pub attempts: u32,
    pub kind: FaultKind,
}

impl ChunkFault {
    pub fn new(chunk: u32, attempts: u32, kind: FaultKind) -> Self {
        Self { chunk, attempts, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointRecord {
    pub opcode: u8,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookRecord {
    pub opcode: u8,
    pub language: u8,
    pub patches: u8,
}

#[derive(Debug)]
enum Mode {
    Idle,
    AwaitRange { upload: bool, buf: Vec<u8> },
    Dumping { start: u32, end: u32, chunk: u32 },
    UploadData { start: u32, end: u32, chunk: u32 },
    UploadAck { start: u32, end: u32, chunk: u32, data: Option<Vec<u8>> },
    AwaitCheatLength { buf: Vec<u8> },
    CheatData { len: usize, data: Vec<u8> },
    CheatChunkDone { len: usize, data: Vec<u8>, chunk_start: usize },
    AwaitPoke { opcode: u8, buf: Vec<u8> },
    AwaitBreakpoint { opcode: u8, need: usize, buf: Vec<u8> },
    AwaitRegisters,
    AwaitHookArgs { opcode: u8, buf: Vec<u8> },
}

struct State {
    open: bool,
    device_count: u32,
    serial: String,
    fail_query: bool,
    fail_reset: bool,
    fail_purge: Option<PurgeDirection>,
    fail_timeouts: bool,
    memory: HashMap<u32, Vec<u8>>,
    status: WiiStatus,
    version: u8,
    registers: Vec<u8>,
    cheats: Vec<u8>,
    cheats_executed: bool,
    breakpoint: Option<BreakpointRecord>,
    hook: Option<HookRecord>,
    steps: u32,
    command_reply: Option<u8>,
    faults: Vec<ChunkFault>,
    dropped_status_replies: u32,
    fail_next_read: bool,
    mode: Mode,
    outbound: VecDeque<u8>,
    writes: Vec<Vec<u8>>,
    timeouts: (u32, u32),
    latency: u8,
    read_chunk_size: u32,
}

impl State {
    fn new() -> Self {
        Self {
            open: false,
            device_count: 1,
            serial: DEFAULT_SERIAL.to_string(),
            fail_query: false,
            fail_reset: false,
            fail_purge: None,
            fail_timeouts: false,
            memory: HashMap::new(),
            status: WiiStatus::Running,
            version: GC_NEW_VERSION,
            registers: vec![0u8; LONG_REGISTER_BLOCK],
            cheats: Vec::new(),
            cheats_executed: false,
            breakpoint: None,
            hook: None,
            steps: 0,
            command_reply: None,
            faults: Vec::new(),
            dropped_status_replies: 0,
            fail_next_read: false,
            mode: Mode::Idle,
            outbound: VecDeque::new(),
            writes: Vec::new(),
            timeouts: (0, 0),
            latency: 0,
            read_chunk_size: 0,
        }
    }

    fn read_memory(&self, address: u32, len: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(len);
        let mut cursor = address;
        while out.len() < len {
            let page = cursor / PAGE_SIZE;
            let offset = (cursor % PAGE_SIZE) as usize;
            let take = (PAGE_SIZE as usize - offset).min(len - out.len());
            match self.memory.get(&page) {
                Some(bytes) => out.extend_from_slice(&bytes[offset..offset + take]),
                None => out.resize(out.len() + take, 0),
            }
            cursor = cursor.wrapping_add(take as u32);
        }
        out
    }

    fn write_memory(&mut self, address: u32, data: &[u8]) {
        let mut cursor = address;
        let mut written = 0;
        while written < data.len() {
            let page = cursor / PAGE_SIZE;
            let offset = (cursor % PAGE_SIZE) as usize;
            let take = (PAGE_SIZE as usize - offset).min(data.len() - written);
            let bytes = self
                .memory
                .entry(page)
                .or_insert_with(|| vec![0u8; PAGE_SIZE as usize]);
            bytes[offset..offset + take].copy_from_slice(&data[written..written + take]);
            written += take;
            cursor = cursor.wrapping_add(take as u32);
        }
    }

    fn take_fault(&mut self, chunk: u32) -> Option<FaultKind> {
        let fault = self
            .faults
            .iter_mut()
            .find(|fault| fault.chunk == chunk && fault.attempts > 0)?;
        fault.attempts -= 1;
        Some(fault.kind)
    }

    fn reply_to_command(&mut self) {
        match self.command_reply {
            Some(byte) => self.outbound.extend(std::iter::repeat(byte).take(ACK_ATTEMPTS as usize)),
            None => self.outbound.push_back(GC_ACK),
        }
    }

    fn register_block_len(&self) -> usize {
        if self.version >= GC_NEW_VERSION {
            LONG_REGISTER_BLOCK
        } else {
            SHORT_REGISTER_BLOCK
        }
    }

    fn queue_dump_chunk(&mut self, start: u32, end: u32, chunk: u32) {
        let offset = chunk * READ_PACKET_SIZE;
        let len = READ_PACKET_SIZE.min(end - start - offset) as usize;
        let data = self.read_memory(start + offset, len);
        match self.take_fault(chunk) {
            Some(FaultKind::Short) => self.outbound.extend(&data[..len / 2]),
            Some(FaultKind::Fatal) => self.fail_next_read = true,
            _ => self.outbound.extend(&data),
        }
    }

    fn handle_write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        self.writes.push(data.to_vec());

        match std::mem::replace(&mut self.mode, Mode::Idle) {
            Mode::UploadData { start, end, chunk } => self.upload_chunk(start, end, chunk, data),
            Mode::UploadAck { start, end, chunk, data: pending } if data.len() == 1 => {
                match data[0] {
                    GC_ACK => {
                        if let Some(bytes) = pending {
                            self.write_memory(start + chunk * UPLOAD_PACKET_SIZE, &bytes);
                        }
                        let next = chunk + 1;
                        if next * UPLOAD_PACKET_SIZE < end - start {
                            self.mode = Mode::UploadData { start, end, chunk: next };
                        }
                    }
                    GC_RETRY => self.mode = Mode::UploadData { start, end, chunk },
                    _ => {}
                }
                Ok(1)
            }
            Mode::CheatData { len, data: received } => self.cheat_chunk(len, received, data),
            Mode::CheatChunkDone { len, data: received, chunk_start } => {
                if data.len() == 1 && data[0] == GC_RETRY {
                    let mut received = received;
                    received.truncate(chunk_start);
                    self.mode = Mode::CheatData { len, data: received };
                    Ok(1)
                } else if data.len() == 1 && data[0] == GC_FAIL {
                    Ok(1)
                } else if received.len() < len {
                    self.cheat_chunk(len, received, data)
                } else {
                    self.feed(data)
                }
            }
            Mode::AwaitRegisters => self.register_block(data),
            mode => {
                self.mode = mode;
                self.feed(data)
            }
        }
    }

    fn upload_chunk(&mut self, start: u32, end: u32, chunk: u32, data: &[u8]) -> Result<usize, TransportError> {
        match self.take_fault(chunk) {
            Some(FaultKind::Short) => {
                self.mode = Mode::UploadAck { start, end, chunk, data: None };
                Ok(data.len() / 2)
            }
            Some(FaultKind::Fatal) => {
                self.mode = Mode::UploadAck { start, end, chunk, data: None };
                Err(TransportError::Fault("simulated write failure".to_string()))
            }
            _ => {
                self.mode = Mode::UploadAck { start, end, chunk, data: Some(data.to_vec()) };
                Ok(data.len())
            }
        }
    }

    fn cheat_chunk(&mut self, len: usize, mut received: Vec<u8>, data: &[u8]) -> Result<usize, TransportError> {
        let chunk_start = received.len();
        let chunk = (chunk_start / UPLOAD_PACKET_SIZE as usize) as u32;
        let result = match self.take_fault(chunk) {
            Some(FaultKind::Short) => Ok(data.len() / 2),
            Some(FaultKind::Fatal) => Err(TransportError::Fault("simulated write failure".to_string())),
            Some(FaultKind::BadAck) => {
                received.extend_from_slice(data);
                self.outbound.push_back(0x00);
                Ok(data.len())
            }
            None => {
                received.extend_from_slice(data);
                self.outbound.push_back(GC_ACK);
                Ok(data.len())
            }
        };
        if received.len() >= len {
            self.cheats = received.clone();
        }
        self.mode = Mode::CheatChunkDone { len, data: received, chunk_start };
        result
    }

    fn register_block(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        if data.len() == 1 && data[0] == GC_FAIL {
            return Ok(1);
        }
        if data.len() == 1 && data[0] == GC_RETRY {
            self.mode = Mode::AwaitRegisters;
            return Ok(1);
        }
        match self.take_fault(0) {
            Some(FaultKind::Short) => {
                self.mode = Mode::AwaitRegisters;
                Ok(data.len() / 2)
            }
            Some(FaultKind::Fatal) => Err(TransportError::Fault("simulated write failure".to_string())),
            _ => {
                let len = data.len().min(self.registers.len());
                self.registers[..len].copy_from_slice(&data[..len]);
                Ok(data.len())
            }
        }
    }

    fn feed(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        for &byte in data {
            self.feed_byte(byte);
        }
        Ok(data.len())
    }

    fn feed_byte(&mut self, byte: u8) {
        match std::mem::replace(&mut self.mode, Mode::Idle) {
            Mode::Idle => self.command(byte),
            Mode::AwaitRange { upload, mut buf } => {
                buf.push(byte);
                if buf.len() < 8 {
                    self.mode = Mode::AwaitRange { upload, buf };
                    return;
                }
                let start = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
                let end = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]);
                if end <= start {
                    return;
                }
                if upload {
                    self.mode = Mode::UploadData { start, end, chunk: 0 };
                } else {
                    self.queue_dump_chunk(start, end, 0);
                    self.mode = Mode::Dumping { start, end, chunk: 0 };
                }
            }
            Mode::Dumping { start, end, chunk } => match byte {
                GC_ACK => {
                    let next = chunk + 1;
                    if next * READ_PACKET_SIZE < end - start {
                        self.queue_dump_chunk(start, end, next);
                        self.mode = Mode::Dumping { start, end, chunk: next };
                    }
                }
                GC_RETRY => {
                    self.outbound.clear();
                    self.queue_dump_chunk(start, end, chunk);
                    self.mode = Mode::Dumping { start, end, chunk };
                }
                GC_FAIL => self.outbound.clear(),
                _ => self.mode = Mode::Dumping { start, end, chunk },
            },
            Mode::AwaitCheatLength { mut buf } => {
                buf.push(byte);
                if buf.len() < 4 {
                    self.mode = Mode::AwaitCheatLength { buf };
                    return;
                }
                let len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
                if len > 0 {
                    self.mode = Mode::CheatData { len, data: Vec::with_capacity(len) };
                }
            }
            Mode::AwaitPoke { opcode, mut buf } => {
                buf.push(byte);
                if buf.len() < 8 {
                    self.mode = Mode::AwaitPoke { opcode, buf };
                    return;
                }
                let address = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
                let value = [buf[4], buf[5], buf[6], buf[7]];
                match opcode {
                    CMD_POKE8 => self.write_memory(address, &value[3..]),
                    CMD_POKE16 => self.write_memory(address, &value[2..]),
                    _ => self.write_memory(address, &value),
                }
            }
            Mode::AwaitBreakpoint { opcode, need, mut buf } => {
                buf.push(byte);
                if buf.len() < need {
                    self.mode = Mode::AwaitBreakpoint { opcode, need, buf };
                    return;
                }
                self.breakpoint = Some(BreakpointRecord { opcode, payload: buf });
            }
            Mode::AwaitHookArgs { opcode, mut buf } => {
                buf.push(byte);
                if buf.len() < 2 {
                    self.mode = Mode::AwaitHookArgs { opcode, buf };
                    return;
                }
                self.hook = Some(HookRecord { opcode, language: buf[0], patches: buf[1] });
                self.status = WiiStatus::Running;
            }
            mode => {
                self.mode = mode;
                log::trace!("sim: stray byte 0x{:02X}", byte);
            }
        }
    }

    fn command(&mut self, opcode: u8) {
        match opcode {
            CMD_READ_MEM => {
                self.reply_to_command();
                self.mode = Mode::AwaitRange { upload: false, buf: Vec::new() };
            }
            CMD_UPLOAD => {
                self.reply_to_command();
                self.mode = Mode::AwaitRange { upload: true, buf: Vec::new() };
            }
            CMD_SEND_CHEATS => {
                self.reply_to_command();
                self.mode = Mode::AwaitCheatLength { buf: Vec::new() };
            }
            CMD_SEND_REGS => {
                self.reply_to_command();
                self.mode = Mode::AwaitRegisters;
            }
            CMD_GET_REGS => {
                let len = self.register_block_len();
                self.registers.resize(LONG_REGISTER_BLOCK, 0);
                let block: Vec<u8> = self.registers[..len].to_vec();
                self.outbound.extend(block);
            }
            CMD_POKE8 | CMD_POKE16 | CMD_POKE32 => {
                self.mode = Mode::AwaitPoke { opcode, buf: Vec::new() };
            }
            CMD_BREAKPOINT | CMD_BREAKPOINT_EXEC => {
                self.mode = Mode::AwaitBreakpoint { opcode, need: 4, buf: Vec::new() };
            }
            CMD_BREAKPOINT_EXACT => {
                self.mode = Mode::AwaitBreakpoint { opcode, need: 8, buf: Vec::new() };
            }
            CMD_CANCEL_BP => self.breakpoint = None,
            CMD_PAUSE => self.status = WiiStatus::Paused,
            CMD_UNFREEZE => self.status = WiiStatus::Running,
            CMD_STATUS => {
                if self.dropped_status_replies > 0 {
                    self.dropped_status_replies -= 1;
                } else {
                    self.outbound.push_back(self.status.to_byte());
                }
            }
            CMD_VERSION => self.outbound.push_back(self.version),
            CMD_CHEAT_EXEC => self.cheats_executed = true,
            0x42..=0x45 if self.status == WiiStatus::Loader => {
                self.mode = Mode::AwaitHookArgs { opcode, buf: Vec::new() };
            }
            CMD_STEP => self.steps += 1,
            GC_ACK | GC_RETRY | GC_FAIL | GC_DONE => {}
            other => log::trace!("sim: ignoring opcode 0x{:02X}", other),
        }
    }
}

/// In-process stand-in for the adapter and the console-side firmware.
///
/// Clones share the same device, so a test can hand one clone to the engine
/// and inspect the other afterwards.
#[derive(Clone)]
pub struct SimulatedGecko {
    state: Arc<Mutex<State>>,
}

impl Default for SimulatedGecko {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedGecko {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::new())),
        }
    }

    pub fn boxed(&self) -> Box<dyn Transport> {
        Box::new(self.clone())
    }

    pub fn load_memory(&self, address: u32, data: &[u8]) {
        self.state.lock().write_memory(address, data);
    }

    pub fn memory(&self, address: u32, len: usize) -> Vec<u8> {
        self.state.lock().read_memory(address, len)
    }

    pub fn write_u32(&self, address: u32, value: u32) {
        self.load_memory(address, &value.to_be_bytes());
    }

    pub fn read_u32(&self, address: u32) -> u32 {
        let bytes = self.memory(address, 4);
        u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    pub fn set_status(&self, status: WiiStatus) {
        self.state.lock().status = status;
    }

    pub fn status(&self) -> WiiStatus {
        self.state.lock().status
    }

    pub fn set_version(&self, version: u8) {
        self.state.lock().version = version;
    }

    pub fn set_registers(&self, registers: &[u8]) {
        let mut state = self.state.lock();
        state.registers = registers.to_vec();
        state.registers.resize(LONG_REGISTER_BLOCK, 0);
    }

    pub fn registers(&self) -> Vec<u8> {
        self.state.lock().registers.clone()
    }

    pub fn inject_fault(&self, fault: ChunkFault) {
        self.state.lock().faults.push(fault);
    }

    /// Replaces the ACK that opens dump, upload, cheat and register
    /// transfers.
    pub fn set_command_reply(&self, reply: Option<u8>) {
        self.state.lock().command_reply = reply;
    }

    pub fn drop_status_replies(&self, count: u32) {
        self.state.lock().dropped_status_replies = count;
    }

    pub fn set_device_count(&self, count: u32) {
        self.state.lock().device_count = count;
    }

    pub fn set_serial(&self, serial: &str) {
        self.state.lock().serial = serial.to_string();
    }

    pub fn set_query_failure(&self, fail: bool) {
        self.state.lock().fail_query = fail;
    }

    pub fn set_reset_failure(&self, fail: bool) {
        self.state.lock().fail_reset = fail;
    }

    /// Makes every purge of `direction` fail. `None` clears it.
    pub fn set_purge_failure(&self, direction: Option<PurgeDirection>) {
        self.state.lock().fail_purge = direction;
    }

    pub fn set_timeout_failure(&self, fail: bool) {
        self.state.lock().fail_timeouts = fail;
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state.lock().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.state.lock().writes.clear();
    }

    pub fn cheats(&self) -> Vec<u8> {
        self.state.lock().cheats.clone()
    }

    pub fn cheats_executed(&self) -> bool {
        self.state.lock().cheats_executed
    }

    pub fn breakpoint(&self) -> Option<BreakpointRecord> {
        self.state.lock().breakpoint.clone()
    }

    pub fn hook(&self) -> Option<HookRecord> {
        self.state.lock().hook
    }

    pub fn steps(&self) -> u32 {
        self.state.lock().steps
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }

    pub fn timeouts(&self) -> (u32, u32) {
        self.state.lock().timeouts
    }

    pub fn latency(&self) -> u8 {
        self.state.lock().latency
    }

    pub fn read_chunk_size(&self) -> u32 {
        self.state.lock().read_chunk_size
    }

    /// Fills MEM1 and the video interface registers with a small test
    /// picture. Used by `--simulate`.
    pub fn seed_demo(&self) {
        let mut state = self.state.lock();
        for (i, word) in (0x8000_0000u32..0x8000_0100).step_by(4).enumerate() {
            state.write_memory(word, &(0x8000_0000u32 + i as u32 * 4).to_be_bytes());
        }
        state.write_memory(0x8000_0000, b"RSBE01");

        let mut regs = [0u8; 0x80];
        let height: u32 = 16;
        regs[0] = (height >> 5) as u8;
        regs[1] = ((height << 3) & 0xFF) as u8;
        regs[0x49] = 2;
        regs[0x1D] = 0x00;
        regs[0x1E] = 0x10;
        regs[0x1F] = 0x00;
        state.write_memory(0xCC00_2000, &regs);

        let pixels: Vec<u8> = (0..16 * 16)
            .flat_map(|i| [(i % 256) as u8, 0x80])
            .collect();
        state.write_memory(0x8000_1000, &pixels);
    }
}

impl Transport for SimulatedGecko {
    fn device_count(&mut self) -> Result<u32, TransportError> {
        let state = self.state.lock();
        if state.fail_query {
            return Err(TransportError::Fault("simulated query failure".to_string()));
        }
        Ok(state.device_count)
    }

    fn open_by_serial(&mut self, serial: &str) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if state.device_count == 0 || !state.serial.starts_with(serial) {
            return Err(TransportError::NotFound(serial.to_string()));
        }
        state.open = true;
        Ok(())
    }

    fn reset_device(&mut self) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if !state.open {
            return Err(TransportError::NotOpen);
        }
        if state.fail_reset {
            return Err(TransportError::Fault("simulated reset failure".to_string()));
        }
        state.mode = Mode::Idle;
        state.outbound.clear();
        state.fail_next_read = false;
        Ok(())
    }

    fn purge(&mut self, direction: PurgeDirection) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if !state.open {
            return Err(TransportError::NotOpen);
        }
        if state.fail_purge == Some(direction) {
            return Err(TransportError::Fault(format!("simulated {:?} purge failure", direction)));
        }
        if direction == PurgeDirection::Rx {
            state.outbound.clear();
        }
        Ok(())
    }

    fn set_timeouts(&mut self, read_ms: u32, write_ms: u32) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if state.fail_timeouts {
            return Err(TransportError::Fault("simulated timeout setup failure".to_string()));
        }
        state.timeouts = (read_ms, write_ms);
        Ok(())
    }

    fn set_latency_timer(&mut self, ms: u8) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if state.fail_timeouts {
            return Err(TransportError::Fault("simulated latency setup failure".to_string()));
        }
        state.latency = ms;
        Ok(())
    }

    fn set_read_chunk_size(&mut self, bytes: u32) -> Result<(), TransportError> {
        self.state.lock().read_chunk_size = bytes;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut state = self.state.lock();
        if !state.open {
            return Err(TransportError::NotOpen);
        }
        if state.fail_next_read {
            state.fail_next_read = false;
            return Err(TransportError::Fault("simulated read failure".to_string()));
        }
        let count = buf.len().min(state.outbound.len());
        for (dst, src) in buf.iter_mut().zip(state.outbound.drain(..count)) {
            *dst = src;
        }
        Ok(count)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        let mut state = self.state.lock();
        if !state.open {
            return Err(TransportError::NotOpen);
        }
        state.handle_write(data)
    }

    fn close(&mut self) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.open = false;
        state.mode = Mode::Idle;
        state.outbound.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opened() -> SimulatedGecko {
        let mut sim = SimulatedGecko::new();
        sim.open_by_serial("GECKUSB0").unwrap();
        sim
    }

    #[test]
    fn test_sparse_memory_crosses_pages() {
        let sim = SimulatedGecko::new();
        sim.load_memory(0x8000_FFFE, &[1, 2, 3, 4]);
        assert_eq!(sim.memory(0x8000_FFFE, 4), vec![1, 2, 3, 4]);
        assert_eq!(sim.memory(0x8100_0000, 2), vec![0, 0]);
    }

    #[test]
    fn test_status_reply() {
        let mut sim = opened();
        sim.set_status(WiiStatus::Paused);
        sim.write(&[CMD_STATUS]).unwrap();
        let mut buf = [0u8; 1];
        assert_eq!(sim.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 1);
        assert_eq!(sim.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_poke_widths() {
        let mut sim = opened();
        sim.write(&[CMD_POKE32]).unwrap();
        sim.write(&[0x80, 0, 0x10, 0, 0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
        sim.write(&[CMD_POKE8]).unwrap();
        sim.write(&[0x80, 0, 0x10, 0x04, 0, 0, 0, 0x42]).unwrap();
        assert_eq!(sim.read_u32(0x8000_1000), 0xDEAD_BEEF);
        assert_eq!(sim.memory(0x8000_1004, 2), vec![0x42, 0]);
    }

    #[test]
    fn test_closed_device_rejects_io() {
        let mut sim = SimulatedGecko::new();
        let mut buf = [0u8; 1];
        assert!(matches!(sim.read(&mut buf), Err(TransportError::NotOpen)));
        assert!(matches!(sim.open_by_serial("OTHER"), Err(TransportError::NotFound(_))));
    }

    #[test]
    fn test_purge_rx_drops_pending_reply() {
        let mut sim = opened();
        sim.write(&[CMD_VERSION]).unwrap();
        sim.purge(PurgeDirection::Rx).unwrap();
        let mut buf = [0u8; 1];
        assert_eq!(sim.read(&mut buf).unwrap(), 0);
    }
}
