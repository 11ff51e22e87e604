// Fri Jan 16 2026 - Alex

use crate::gecko::command::{CMD_POKE16, CMD_POKE32, CMD_POKE8, CMD_READ_MEM, CMD_UPLOAD};
use crate::gecko::error::{GeckoError, GeckoResult};
use crate::gecko::session::Gecko;
use crate::gecko::transfer::{ChunkAck, ChunkPlan, TransferSummary, READ_PACKET_SIZE, UPLOAD_PACKET_SIZE};
use crate::memory::DumpBuffer;
use crate::utils::BinaryUtils;
use std::io::{self, Cursor, Read, Write};

impl Gecko {
    /// Applies the region rules to a dump request. `None` means nothing
    /// should be read.
    fn dump_window(&self, start: u32, end: u32) -> Option<(u32, u32)> {
        if end <= start {
            return None;
        }
        if !self.validator.is_valid(start) {
            log::debug!("Dump start 0x{:08X} is not in a known region", start);
            return None;
        }
        if !self.validator.is_valid_range(start, end) {
            if let Some(region) = self.validator.region_of(start) {
                log::debug!(
                    "Dump end 0x{:08X} truncated to 0x{:08X} ({})",
                    end,
                    region.high(),
                    region.kind()
                );
                return Some((start, region.high()));
            }
        }
        Some((start, end))
    }

    fn dump_with(
        &mut self,
        start: u32,
        end: u32,
        deliver: &mut dyn FnMut(u32, u32, &[u8]) -> GeckoResult<()>,
    ) -> GeckoResult<TransferSummary> {
        let Some((start, end)) = self.dump_window(start, end) else {
            return Ok(TransferSummary::default());
        };

        let plan = ChunkPlan::for_range(start, end, READ_PACKET_SIZE);
        self.cancel.reset();
        self.open_transfer(CMD_READ_MEM, start, end)?;
        self.receive_chunks(&plan, &mut |offset, data| deliver(start, offset, data))
    }

    /// Dumps `[start, end)` into every sink in order.
    pub fn dump_to(&mut self, start: u32, end: u32, sinks: &mut [&mut dyn Write]) -> GeckoResult<TransferSummary> {
        self.dump_with(start, end, &mut |_, _, data| {
            for sink in sinks.iter_mut() {
                sink.write_all(data)?;
            }
            Ok(())
        })
    }

    pub fn dump_to_writer<W: Write>(&mut self, start: u32, end: u32, writer: &mut W) -> GeckoResult<TransferSummary> {
        self.dump_with(start, end, &mut |_, _, data| {
            writer.write_all(data)?;
            Ok(())
        })
    }

    pub fn dump_to_vec(&mut self, start: u32, end: u32) -> GeckoResult<Vec<u8>> {
        let mut out = Vec::new();
        self.dump_to_writer(start, end, &mut out)?;
        Ok(out)
    }

    /// Fills the whole window of `dump`.
    pub fn dump_into(&mut self, dump: &mut DumpBuffer) -> GeckoResult<TransferSummary> {
        self.dump_range_into(dump.start(), dump.end(), dump)
    }

    /// Fills the part of `dump` covering `[start, end)`. `read_completed`
    /// only moves over data contiguous with what is already filled, so a
    /// window past an unfilled gap leaves it where it is.
    pub fn dump_range_into(&mut self, start: u32, end: u32, dump: &mut DumpBuffer) -> GeckoResult<TransferSummary> {
        if start < dump.start() || end > dump.end() {
            return Err(GeckoError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "0x{:08X}..0x{:08X} is outside the dump window {}",
                    start,
                    end,
                    dump.range()
                ),
            )));
        }

        let base = dump.start();
        self.dump_with(start, end, &mut |start, offset, data| {
            dump.store_chunk((start - base + offset) as usize, data)
                .map_err(|e| GeckoError::Io(io::Error::other(e)))?;
            let chunk_start = start + offset;
            if chunk_start <= dump.read_completed() {
                dump.advance_read_completed(chunk_start + data.len() as u32);
            }
            Ok(())
        })
    }

    /// Reads one big-endian word. Invalid addresses, and the last word of
    /// the address space, read as 0 without touching the device.
    pub fn peek(&mut self, address: u32) -> GeckoResult<u32> {
        if !self.validator.is_valid(address) {
            return Ok(0);
        }
        let aligned = address & !3;
        let Some(end) = aligned.checked_add(4) else {
            log::debug!("Peek at 0x{:08X} runs past the address space", address);
            return Ok(0);
        };

        let observer = self.observer.take();
        let result = self.dump_to_vec(aligned, end);
        self.observer = observer;

        let bytes = result?;
        Ok(BinaryUtils::read_u32_be(&bytes, 0).unwrap_or(0))
    }

    fn poke_with(&mut self, opcode: u8, address: u32, value: u32) -> GeckoResult<()> {
        self.raw_command(opcode)?;
        self.send(&BinaryUtils::pack_pair_be(address, value))
    }

    pub fn poke(&mut self, address: u32, value: u32) -> GeckoResult<()> {
        self.poke_with(CMD_POKE32, address & !3, value)
    }

    pub fn poke16(&mut self, address: u32, value: u16) -> GeckoResult<()> {
        self.poke_with(CMD_POKE16, address & !1, value as u32)
    }

    pub fn poke8(&mut self, address: u32, value: u8) -> GeckoResult<()> {
        self.poke_with(CMD_POKE8, address, value as u32)
    }

    /// Writes `end - start` bytes taken from `source` to console memory.
    pub fn upload<R: Read>(&mut self, start: u32, end: u32, source: &mut R) -> GeckoResult<TransferSummary> {
        if end <= start {
            return Ok(TransferSummary::default());
        }

        let plan = ChunkPlan::for_range(start, end, UPLOAD_PACKET_SIZE);
        self.open_transfer(CMD_UPLOAD, start, end)?;
        self.send_chunks(&plan, ChunkAck::Host, &mut |buf| {
            source.read_exact(buf)?;
            Ok(())
        })
    }

    pub fn upload_bytes(&mut self, start: u32, data: &[u8]) -> GeckoResult<TransferSummary> {
        let end = start.checked_add(data.len() as u32).ok_or_else(|| {
            GeckoError::Io(io::Error::new(io::ErrorKind::InvalidInput, "upload wraps past 0xFFFFFFFF"))
        })?;
        self.upload(start, end, &mut Cursor::new(data))
    }
}
