// Tue Jan 13 2026 - Alex

use crate::memory::{Address, MemoryRange};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressType {
    UncachedMem1,
    UncachedMem2,
    CachedMem1,
    CachedMem2,
    HardwareRegs,
    EfbBuffer,
    XfbBuffer,
    Unknown,
}

impl AddressType {
    pub fn name(&self) -> &'static str {
        match self {
            AddressType::UncachedMem1 => "MEM1 (uncached)",
            AddressType::UncachedMem2 => "MEM2 (uncached)",
            AddressType::CachedMem1 => "MEM1 (cached)",
            AddressType::CachedMem2 => "MEM2 (cached)",
            AddressType::HardwareRegs => "hardware registers",
            AddressType::EfbBuffer => "embedded framebuffer",
            AddressType::XfbBuffer => "external framebuffer",
            AddressType::Unknown => "unknown",
        }
    }

    pub fn is_ram(&self) -> bool {
        matches!(
            self,
            AddressType::UncachedMem1
                | AddressType::UncachedMem2
                | AddressType::CachedMem1
                | AddressType::CachedMem2
        )
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    kind: AddressType,
    id: u8,
    range: MemoryRange,
}

impl AddressRange {
    pub fn new(kind: AddressType, low: u32, high: u32) -> Self {
        Self::with_id(kind, (low >> 24) as u8, low, high)
    }

    pub fn with_id(kind: AddressType, id: u8, low: u32, high: u32) -> Self {
        Self {
            kind,
            id,
            range: MemoryRange::new(Address::new(low), Address::new(high)),
        }
    }

    pub fn kind(&self) -> AddressType {
        self.kind
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn low(&self) -> u32 {
        self.range.start().as_u32()
    }

    pub fn high(&self) -> u32 {
        self.range.end().as_u32()
    }

    pub fn range(&self) -> &MemoryRange {
        &self.range
    }

    pub fn contains(&self, address: u32) -> bool {
        self.range.contains(Address::new(address))
    }

    pub fn size(&self) -> u32 {
        self.range.size()
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.range, self.kind)
    }
}
