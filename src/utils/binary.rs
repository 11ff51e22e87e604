// Tue Jan 13 2026 - Alex

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Fixed-width byte order helpers. The console is big-endian and the wire
/// protocol follows it, so everything goes through these rather than
/// relying on host layout.
pub struct BinaryUtils;

impl BinaryUtils {
    pub fn read_u8(data: &[u8], offset: usize) -> Option<u8> {
        data.get(offset).copied()
    }

    pub fn read_u16_be(data: &[u8], offset: usize) -> Option<u16> {
        if offset + 2 > data.len() {
            return None;
        }
        Some(u16::from_be_bytes([data[offset], data[offset + 1]]))
    }

    pub fn read_u32_be(data: &[u8], offset: usize) -> Option<u32> {
        if offset + 4 > data.len() {
            return None;
        }
        Some(u32::from_be_bytes([
            data[offset], data[offset + 1], data[offset + 2], data[offset + 3]
        ]))
    }

    pub fn read_u64_be(data: &[u8], offset: usize) -> Option<u64> {
        if offset + 8 > data.len() {
            return None;
        }
        Some(u64::from_be_bytes([
            data[offset], data[offset + 1], data[offset + 2], data[offset + 3],
            data[offset + 4], data[offset + 5], data[offset + 6], data[offset + 7]
        ]))
    }

    pub fn write_u32_be(data: &mut [u8], offset: usize, value: u32) -> bool {
        if offset + 4 > data.len() {
            return false;
        }
        data[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
        true
    }

    /// `[high word][low word]` as eight big-endian bytes. Used for address
    /// ranges, pokes and precise breakpoints.
    pub fn pack_pair_be(high: u32, low: u32) -> [u8; 8] {
        (((high as u64) << 32) | low as u64).to_be_bytes()
    }

    pub fn hex_dump(data: &[u8], base: u32) -> String {
        let mut result = String::new();

        for (i, chunk) in data.chunks(16).enumerate() {
            let addr = base.wrapping_add((i * 16) as u32);
            result.push_str(&format!("{:08X}  ", addr));

            for (j, &byte) in chunk.iter().enumerate() {
                if j == 8 {
                    result.push(' ');
                }
                result.push_str(&format!("{:02X} ", byte));
            }

            for _ in chunk.len()..16 {
                result.push_str("   ");
            }
            if chunk.len() <= 8 {
                result.push(' ');
            }

            result.push_str(" |");
            for &byte in chunk {
                let c = if (0x20..0x7f).contains(&byte) { byte as char } else { '.' };
                result.push(c);
            }
            result.push_str("|\n");
        }

        result
    }

    pub fn load_file<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<u8>> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(data)
    }

    pub fn save_file<P: AsRef<Path>>(path: P, data: &[u8]) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(data)?;
        writer.flush()
    }
}

pub fn hex_dump(data: &[u8], base: u32) -> String {
    BinaryUtils::hex_dump(data, base)
}
