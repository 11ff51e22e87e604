// Tue Jan 13 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Invalid memory range 0x{0:08X}..0x{1:08X}")]
    InvalidRange(u32, u32),
    #[error("Out of bounds: address 0x{0:08X} not in dump window")]
    OutOfBounds(u32),
}
