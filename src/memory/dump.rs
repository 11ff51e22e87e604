// Wed Jan 14 2026 - Alex

use crate::memory::{Address, MemoryError, MemoryRange};
use crate::utils::BinaryUtils;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;

const COMPRESSED_ENTRY_NAME: &str = "mem";

/// Host-side copy of a contiguous window of console memory.
///
/// The window is `[start, end)`. While a dump is running the engine fills
/// it chunk by chunk and moves `read_completed` forward, so a caller polling
/// from another thread can see how far the transfer has got.
#[derive(Debug, Clone)]
pub struct DumpBuffer {
    start: u32,
    end: u32,
    mem: Vec<u8>,
    read_completed: u32,
}

impl DumpBuffer {
    pub fn new(start: u32, end: u32) -> Result<Self, MemoryError> {
        if end < start {
            return Err(MemoryError::InvalidRange(start, end));
        }
        Ok(Self {
            start,
            end,
            mem: vec![0u8; (end - start) as usize],
            read_completed: start,
        })
    }

    pub fn from_range(range: MemoryRange) -> Self {
        Self {
            start: range.start().as_u32(),
            end: range.end().as_u32(),
            mem: vec![0u8; range.size() as usize],
            read_completed: range.start().as_u32(),
        }
    }

    pub fn from_bytes(start: u32, bytes: Vec<u8>) -> Result<Self, MemoryError> {
        let end = start
            .checked_add(bytes.len() as u32)
            .ok_or(MemoryError::InvalidRange(start, u32::MAX))?;
        Ok(Self {
            start,
            end,
            read_completed: end,
            mem: bytes,
        })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn len(&self) -> usize {
        self.mem.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mem.is_empty()
    }

    pub fn range(&self) -> MemoryRange {
        MemoryRange::new(Address::new(self.start), Address::new(self.end))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.mem
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.mem
    }

    pub fn read_completed(&self) -> u32 {
        self.read_completed
    }

    pub fn completed_bytes(&self) -> &[u8] {
        &self.mem[..(self.read_completed - self.start) as usize]
    }

    pub fn contains(&self, address: u32) -> bool {
        address >= self.start && address < self.end
    }

    pub(crate) fn offset_of(&self, address: u32) -> Option<usize> {
        if self.contains(address) {
            Some((address - self.start) as usize)
        } else {
            None
        }
    }

    pub(crate) fn store_chunk(&mut self, offset: usize, data: &[u8]) -> Result<(), MemoryError> {
        let end = offset + data.len();
        if end > self.mem.len() {
            return Err(MemoryError::OutOfBounds(self.start.wrapping_add(end as u32)));
        }
        self.mem[offset..end].copy_from_slice(data);
        Ok(())
    }

    pub(crate) fn advance_read_completed(&mut self, address: u32) {
        let address = address.min(self.end);
        if address > self.read_completed {
            self.read_completed = address;
        }
    }

    /// Reads a big-endian value of `width` bytes (1, 2 or 4). Reads that do
    /// not fit inside the window return 0.
    pub fn read_address(&self, address: u32, width: u32) -> u32 {
        if address < self.start || width == 0 || self.end < width || address > self.end - width {
            return 0;
        }
        let offset = (address - self.start) as usize;
        match width {
            4 => BinaryUtils::read_u32_be(&self.mem, offset).unwrap_or(0),
            2 => BinaryUtils::read_u16_be(&self.mem, offset).map(u32::from).unwrap_or(0),
            _ => BinaryUtils::read_u8(&self.mem, offset).map(u32::from).unwrap_or(0),
        }
    }

    pub fn read_u32(&self, address: u32) -> u32 {
        self.read_address(address, 4)
    }

    pub fn read_u16(&self, address: u32) -> u16 {
        self.read_address(address, 2) as u16
    }

    pub fn read_u8(&self, address: u32) -> u8 {
        self.read_address(address, 1) as u8
    }

    pub fn slice(&self, address: u32, len: usize) -> Option<&[u8]> {
        let offset = self.offset_of(address)?;
        self.mem.get(offset..offset + len)
    }

    pub fn write_to_disk<P: AsRef<Path>>(&self, path: P) -> Result<(), MemoryError> {
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(&self.mem)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_compressed_to_disk<P: AsRef<Path>>(&self, path: P) -> Result<(), MemoryError> {
        let mut zip = zip::ZipWriter::new(File::create(path)?);
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        zip.start_file(COMPRESSED_ENTRY_NAME, options)?;
        zip.write_all(&self.mem)?;
        zip.finish()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn sample() -> DumpBuffer {
        DumpBuffer::from_bytes(0x8000_0000, vec![0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0])
            .unwrap()
    }

    #[test]
    fn test_new_rejects_inverted_range() {
        assert!(DumpBuffer::new(0x8000_0010, 0x8000_0000).is_err());
        let dump = DumpBuffer::new(0x8000_0000, 0x8000_0100).unwrap();
        assert_eq!(dump.len(), 0x100);
        assert_eq!(dump.read_completed(), 0x8000_0000);
    }

    #[test]
    fn test_big_endian_accessors() {
        let dump = sample();
        assert_eq!(dump.read_u32(0x8000_0000), 0x1234_5678);
        assert_eq!(dump.read_u32(0x8000_0004), 0x9ABC_DEF0);
        assert_eq!(dump.read_u16(0x8000_0002), 0x5678);
        assert_eq!(dump.read_u8(0x8000_0005), 0xBC);
    }

    #[test]
    fn test_out_of_window_reads_return_zero() {
        let dump = sample();
        assert_eq!(dump.read_u32(0x7FFF_FFFC), 0);
        assert_eq!(dump.read_u32(0x8000_0005), 0);
        assert_eq!(dump.read_u16(0x8000_0007), 0);
        assert_eq!(dump.read_u8(0x8000_0007), 0xF0);
        assert_eq!(dump.read_u8(0x8000_0008), 0);
    }

    #[test]
    fn test_read_completed_is_monotonic() {
        let mut dump = DumpBuffer::new(0x8000_0000, 0x8000_0100).unwrap();
        dump.advance_read_completed(0x8000_0080);
        dump.advance_read_completed(0x8000_0040);
        assert_eq!(dump.read_completed(), 0x8000_0080);
        dump.advance_read_completed(0x9000_0000);
        assert_eq!(dump.read_completed(), 0x8000_0100);
        assert_eq!(dump.completed_bytes().len(), 0x100);
    }

    #[test]
    fn test_store_chunk_bounds() {
        let mut dump = DumpBuffer::new(0x8000_0000, 0x8000_0008).unwrap();
        dump.store_chunk(4, &[1, 2, 3, 4]).unwrap();
        assert_eq!(dump.read_u32(0x8000_0004), 0x0102_0304);
        assert!(dump.store_chunk(6, &[1, 2, 3, 4]).is_err());
    }

    #[test]
    fn test_write_to_disk_is_raw() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump0.dmp");
        sample().write_to_disk(&path).unwrap();
        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, sample().bytes());
    }

    #[test]
    fn test_write_compressed_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump0.zip");
        sample().write_compressed_to_disk(&path).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let mut entry = archive.by_name("mem").unwrap();
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, sample().bytes());
    }
}
