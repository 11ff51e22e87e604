// Wed Jan 14 2026 - Alex

use crate::memory::{AddressRange, AddressType};

pub const MEM1_UNCACHED_BASE: u32 = 0x8000_0000;
pub const MEM2_UNCACHED_BASE: u32 = 0x9000_0000;
pub const MEM2_DEFAULT_UPPER: u32 = 0x9340_0000;

const MEM2_SLOT: usize = 1;

/// Classifies console addresses into the fixed hardware regions.
///
/// Lookup is a linear scan in declaration order and the first containing
/// range wins, so the table must never contain ambiguous overlaps.
#[derive(Debug, Clone)]
pub struct AddressValidator {
    ranges: [AddressRange; 7],
    debug: bool,
}

impl Default for AddressValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressValidator {
    pub fn new() -> Self {
        Self {
            ranges: [
                AddressRange::new(AddressType::UncachedMem1, MEM1_UNCACHED_BASE, 0x8180_0000),
                AddressRange::new(AddressType::UncachedMem2, MEM2_UNCACHED_BASE, MEM2_DEFAULT_UPPER),
                AddressRange::new(AddressType::CachedMem1, 0xC000_0000, 0xC180_0000),
                AddressRange::new(AddressType::CachedMem2, 0xD000_0000, 0xD340_0000),
                AddressRange::new(AddressType::EfbBuffer, 0xC800_0000, 0xCC00_0000),
                AddressRange::new(AddressType::XfbBuffer, 0xCC00_0000, 0xCC00_8000),
                AddressRange::new(AddressType::HardwareRegs, 0xCD00_0000, 0xCD00_8000),
            ],
            debug: false,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn ranges(&self) -> &[AddressRange] {
        &self.ranges
    }

    pub fn range(&self, id: usize) -> Option<&AddressRange> {
        self.ranges.get(id)
    }

    pub fn range_id(&self, address: u32) -> Option<usize> {
        self.ranges.iter().position(|range| range.contains(address))
    }

    pub fn classify(&self, address: u32) -> AddressType {
        self.range_id(address)
            .map(|id| self.ranges[id].kind())
            .unwrap_or(AddressType::Unknown)
    }

    pub fn region_of(&self, address: u32) -> Option<&AddressRange> {
        self.range_id(address).map(|id| &self.ranges[id])
    }

    pub fn is_valid_with(&self, address: u32, debug: bool) -> bool {
        debug || self.range_id(address).is_some()
    }

    pub fn is_valid(&self, address: u32) -> bool {
        self.is_valid_with(address, self.debug)
    }

    /// `high` is exclusive, so the last byte of the window is `high - 1`.
    pub fn is_valid_range_with(&self, low: u32, high: u32, debug: bool) -> bool {
        if debug {
            return true;
        }
        self.range_id(low) == self.range_id(high.wrapping_sub(1))
    }

    pub fn is_valid_range(&self, low: u32, high: u32) -> bool {
        self.is_valid_range_with(low, high, self.debug)
    }

    pub fn set_upper_bound(&mut self, upper: u32) {
        log::debug!("MEM2 upper bound set to 0x{:08X}", upper);
        self.ranges[MEM2_SLOT] =
            AddressRange::new(AddressType::UncachedMem2, MEM2_UNCACHED_BASE, upper);
    }

    pub fn mem2_upper(&self) -> u32 {
        self.ranges[MEM2_SLOT].high()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_regions() {
        let v = AddressValidator::new();
        assert_eq!(v.classify(0x8000_0000), AddressType::UncachedMem1);
        assert_eq!(v.classify(0x817F_FFFF), AddressType::UncachedMem1);
        assert_eq!(v.classify(0x9000_1234), AddressType::UncachedMem2);
        assert_eq!(v.classify(0xC000_0100), AddressType::CachedMem1);
        assert_eq!(v.classify(0xD1FF_FFFF), AddressType::CachedMem2);
        assert_eq!(v.classify(0xC900_0000), AddressType::EfbBuffer);
        assert_eq!(v.classify(0xCC00_2000), AddressType::XfbBuffer);
        assert_eq!(v.classify(0xCD00_6C00), AddressType::HardwareRegs);
    }

    #[test]
    fn test_classify_unknown_and_bounds() {
        let v = AddressValidator::new();
        assert_eq!(v.classify(0x0000_0000), AddressType::Unknown);
        assert_eq!(v.classify(0x8180_0000), AddressType::Unknown);
        assert_eq!(v.classify(0x9340_0000), AddressType::Unknown);
        assert_eq!(v.classify(0xCC00_8000), AddressType::Unknown);
        assert_eq!(v.classify(0xFFFF_FFFF), AddressType::Unknown);
    }

    #[test]
    fn test_is_valid_agrees_with_classify() {
        let v = AddressValidator::new();
        let samples = [
            0u32, 0x7FFF_FFFC, 0x8000_0000, 0x8123_4567, 0x8180_0000, 0x9000_0000,
            0x933F_FFFF, 0x9340_0000, 0xC000_0000, 0xC7FF_FFFF, 0xC800_0000, 0xCBFF_FFFF,
            0xCC00_0000, 0xCC00_7FFF, 0xCC00_8000, 0xCD00_0000, 0xCD00_8000, 0xD000_0000,
            0xD33F_FFFF, 0xFFFF_FFFF,
        ];
        for addr in samples {
            assert_eq!(
                v.is_valid_with(addr, false),
                v.classify(addr) != AddressType::Unknown,
                "mismatch at 0x{:08X}",
                addr
            );
        }
    }

    #[test]
    fn test_debug_override() {
        let v = AddressValidator::new().with_debug(true);
        assert!(v.is_valid(0x0000_1000));
        assert!(v.is_valid_range(0x8000_0000, 0x9000_0010));
        assert!(!v.is_valid_with(0x0000_1000, false));
    }

    #[test]
    fn test_valid_range_same_region() {
        let v = AddressValidator::new();
        assert!(v.is_valid_range(0x8000_0000, 0x8180_0000));
        assert!(v.is_valid_range(0x8000_0000, 0x8000_0004));
        assert!(v.is_valid_range(0xCC00_2000, 0xCC00_2080));
        assert!(!v.is_valid_range(0x817F_FFF0, 0x8180_0010));
        assert!(!v.is_valid_range(0xCBFF_FFF0, 0xCC00_0010));
    }

    #[test]
    fn test_regions_do_not_overlap() {
        let v = AddressValidator::new();
        for (i, a) in v.ranges().iter().enumerate() {
            for b in &v.ranges()[i + 1..] {
                assert!(!a.range().overlaps(b.range()), "{} overlaps {}", a, b);
            }
        }
    }

    #[test]
    fn test_set_upper_bound() {
        let mut v = AddressValidator::new();
        assert!(!v.is_valid(0x9350_0000));
        v.set_upper_bound(0x9400_0000);
        assert_eq!(v.mem2_upper(), 0x9400_0000);
        assert_eq!(v.classify(0x9350_0000), AddressType::UncachedMem2);
        assert_eq!(v.range_id(0x9350_0000), Some(1));
    }
}
