// Fri Jan 16 2026 - Alex

use crate::gecko::command::{GC_ACK, GC_FAIL, GC_RETRY};
use crate::gecko::error::{GeckoError, GeckoResult};
use crate::gecko::progress::{ProgressReport, TransferDirection};
use crate::gecko::session::{CommandResult, Gecko};
use crate::utils::BinaryUtils;

pub const READ_PACKET_SIZE: u32 = 0xF800;
pub const UPLOAD_PACKET_SIZE: u32 = 0xF80;
pub const ACK_ATTEMPTS: u32 = 10;
pub const MAX_RETRIES: u32 = 3;

/// How a transfer of `length` bytes splits into packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    pub length: u32,
    pub packet_size: u32,
    pub full_chunks: u32,
    pub last_chunk: u32,
    pub total_chunks: u32,
}

impl ChunkPlan {
    pub fn new(length: u32, packet_size: u32) -> Self {
        let full_chunks = length / packet_size;
        let last_chunk = length % packet_size;
        Self {
            length,
            packet_size,
            full_chunks,
            last_chunk,
            total_chunks: full_chunks + u32::from(last_chunk > 0),
        }
    }

    pub fn for_range(start: u32, end: u32, packet_size: u32) -> Self {
        Self::new(end.saturating_sub(start), packet_size)
    }

    pub fn chunk_len(&self, chunk: u32) -> u32 {
        if chunk < self.full_chunks {
            self.packet_size
        } else if chunk == self.full_chunks {
            self.last_chunk
        } else {
            0
        }
    }

    pub fn offset(&self, chunk: u32) -> u32 {
        chunk * self.packet_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferSummary {
    pub transferred: u32,
    pub cancelled: bool,
}

/// Who confirms each outgoing chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChunkAck {
    /// The host sends ACK after a chunk went out whole (memory upload).
    Host,
    /// The firmware answers every chunk with one byte (cheat upload).
    Device,
}

impl Gecko {
    /// Reads single bytes until the firmware acknowledges.
    pub(crate) fn wait_for_ack(&mut self, attempts: u32) -> GeckoResult<()> {
        for attempt in 1..=attempts {
            let reply = self.read_byte()?;
            if reply == GC_ACK {
                return Ok(());
            }
            log::debug!("Expected ACK, got 0x{:02X} (attempt {}/{})", reply, attempt, attempts);
            if attempt == attempts {
                return Err(GeckoError::InvalidReply(reply));
            }
        }
        Err(GeckoError::InvalidReply(0))
    }

    /// Opens a dump or upload: reset, opcode, ACK, then `start` and `end`.
    pub(crate) fn open_transfer(&mut self, opcode: u8, start: u32, end: u32) -> GeckoResult<()> {
        self.init_gecko()?;
        self.raw_command(opcode)?;
        self.wait_for_ack(ACK_ATTEMPTS)?;
        self.send(&BinaryUtils::pack_pair_be(start, end))?;
        log::debug!("Transfer 0x{:08X}..0x{:08X} opened", start, end);
        Ok(())
    }

    fn progress(&mut self, plan: &ChunkPlan, chunk: u32, okay: bool, direction: TransferDirection) {
        self.report(ProgressReport {
            current_chunk: chunk,
            total_chunks: plan.total_chunks,
            transferred: plan.offset(chunk),
            length: plan.length,
            okay,
            direction,
        });
    }

    fn final_progress(&mut self, plan: &ChunkPlan, direction: TransferDirection) {
        self.report(ProgressReport {
            current_chunk: plan.total_chunks,
            total_chunks: plan.total_chunks,
            transferred: plan.length,
            length: plan.length,
            okay: true,
            direction,
        });
    }

    /// Drives the receive side of an opened dump. `deliver` gets the offset
    /// of each chunk from `start` and its bytes.
    pub(crate) fn receive_chunks(
        &mut self,
        plan: &ChunkPlan,
        deliver: &mut dyn FnMut(u32, &[u8]) -> GeckoResult<()>,
    ) -> GeckoResult<TransferSummary> {
        let mut buffer = vec![0u8; plan.packet_size as usize];
        let mut summary = TransferSummary::default();
        let mut chunk = 0;
        let mut retry = 0;

        while chunk < plan.total_chunks {
            self.progress(plan, chunk, retry == 0, TransferDirection::Dump);

            let len = plan.chunk_len(chunk) as usize;
            match self.gecko_read(&mut buffer[..len]) {
                CommandResult::Ok => {}
                CommandResult::ResultError => {
                    retry += 1;
                    if retry >= MAX_RETRIES {
                        log::warn!("Chunk {} failed {} times, giving up", chunk, retry);
                        self.signal(GC_FAIL);
                        return Err(GeckoError::TooManyRetries);
                    }
                    log::warn!("Chunk {} came up short, retrying", chunk);
                    self.signal(GC_RETRY);
                    continue;
                }
                CommandResult::FatalError => {
                    self.signal(GC_FAIL);
                    return Err(GeckoError::ReadFailed);
                }
            }

            log::trace!("Chunk {}/{} received", chunk + 1, plan.total_chunks);
            if let Err(e) = deliver(plan.offset(chunk), &buffer[..len]) {
                self.signal(GC_FAIL);
                return Err(e);
            }
            summary.transferred += len as u32;
            retry = 0;
            chunk += 1;

            if self.cancel.is_cancelled() {
                log::warn!("Dump cancelled after {} of {} chunks", chunk, plan.total_chunks);
                self.signal(GC_FAIL);
                summary.cancelled = true;
                break;
            }
            self.signal(GC_ACK);
        }

        self.final_progress(plan, TransferDirection::Dump);
        Ok(summary)
    }

    /// Drives the send side of an opened upload or cheat transfer.
    /// `next_chunk` fills the buffer for each new chunk once; retries resend
    /// the same bytes.
    pub(crate) fn send_chunks(
        &mut self,
        plan: &ChunkPlan,
        ack: ChunkAck,
        next_chunk: &mut dyn FnMut(&mut [u8]) -> GeckoResult<()>,
    ) -> GeckoResult<TransferSummary> {
        let mut buffer = vec![0u8; plan.packet_size as usize];
        let mut summary = TransferSummary::default();
        let mut chunk = 0;
        let mut retry = 0;
        let mut loaded = None;

        while chunk < plan.total_chunks {
            self.progress(plan, chunk, retry == 0, TransferDirection::Upload);

            let len = plan.chunk_len(chunk) as usize;
            if loaded != Some(chunk) {
                if let Err(e) = next_chunk(&mut buffer[..len]) {
                    self.signal(GC_FAIL);
                    return Err(e);
                }
                loaded = Some(chunk);
            }

            let mut outcome = self.gecko_write(&buffer[..len]);
            if outcome.is_ok() && ack == ChunkAck::Device {
                outcome = match self.read_byte() {
                    Ok(GC_ACK) => CommandResult::Ok,
                    Ok(reply) => {
                        log::debug!("Chunk {} answered with 0x{:02X}", chunk, reply);
                        CommandResult::ResultError
                    }
                    Err(_) => CommandResult::ResultError,
                };
            }

            match outcome {
                CommandResult::Ok => {}
                CommandResult::ResultError => {
                    retry += 1;
                    if retry >= MAX_RETRIES {
                        log::warn!("Chunk {} failed {} times, giving up", chunk, retry);
                        self.signal(GC_FAIL);
                        return Err(GeckoError::TooManyRetries);
                    }
                    log::warn!("Chunk {} not accepted, retrying", chunk);
                    self.signal(GC_RETRY);
                    continue;
                }
                CommandResult::FatalError => {
                    self.signal(GC_FAIL);
                    return Err(match ack {
                        ChunkAck::Host => GeckoError::CommandSendFailed,
                        ChunkAck::Device => GeckoError::ReadFailed,
                    });
                }
            }

            log::trace!("Chunk {}/{} sent", chunk + 1, plan.total_chunks);
            summary.transferred += len as u32;
            retry = 0;
            chunk += 1;
            if ack == ChunkAck::Host {
                self.signal(GC_ACK);
            }
        }

        self.final_progress(plan, TransferDirection::Upload);
        Ok(summary)
    }
}
