// Sun Jan 18 2026 - Alex

use crate::gecko::error::GeckoResult;
use crate::gecko::session::Gecko;
use std::fmt;
use std::str::FromStr;

/// A base address followed by offsets, each applied after one dereference.
///
/// `80001234+10-4` reads the word at 0x80001234, adds 0x10, reads the word at
/// that address and subtracts 4. Brackets and spaces in the text form are
/// cosmetic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PointerChain {
    pub base: u32,
    pub offsets: Vec<u32>,
}

impl PointerChain {
    pub fn new(base: u32) -> Self {
        Self {
            base,
            offsets: Vec::new(),
        }
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offsets.push(offset);
        self
    }

    pub fn with_negative_offset(mut self, offset: u32) -> Self {
        self.offsets.push(offset.wrapping_neg());
        self
    }

    pub fn depth(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_pointer(&self) -> bool {
        !self.offsets.is_empty()
    }
}

fn parse_term(term: &str) -> Result<u32, String> {
    let digits: String = term
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '(' | ')' | '{' | '}' | ' '))
        .collect();

    if digits.is_empty() {
        return Ok(0);
    }
    if digits.len() > 8 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("'{}' is not a 32-bit hex value", term.trim()));
    }
    u32::from_str_radix(&digits, 16).map_err(|e| e.to_string())
}

impl FromStr for PointerChain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut values = Vec::new();

        for plus_term in s.split('+').filter(|t| !t.is_empty()) {
            let mut minus_terms = plus_term.split('-');
            let first = minus_terms.next().unwrap_or("");
            values.push(parse_term(first)?);
            for term in minus_terms {
                values.push(parse_term(term)?.wrapping_neg());
            }
        }

        let mut values = values.into_iter();
        let base = values
            .next()
            .ok_or_else(|| "empty pointer expression".to_string())?;
        Ok(Self {
            base,
            offsets: values.collect(),
        })
    }
}

impl fmt::Display for PointerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = format!("{:08X}", self.base);
        for &offset in &self.offsets {
            text = if offset > 0x8000_0000 {
                format!("[{}]-{:X}", text, offset.wrapping_neg())
            } else {
                format!("[{}]+{:X}", text, offset)
            };
        }
        f.write_str(&text)
    }
}

impl Gecko {
    /// Follows `chain` on the console. `None` when any address along the way,
    /// including the final one, falls outside the known regions.
    pub fn resolve_pointer(&mut self, chain: &PointerChain) -> GeckoResult<Option<u32>> {
        let mut address = chain.base;

        for &offset in &chain.offsets {
            if !self.validator.is_valid(address) {
                log::debug!("Pointer chain {} broke at 0x{:08X}", chain, address);
                return Ok(None);
            }
            address = self.peek(address & !3)?.wrapping_add(offset);
        }

        if self.validator.is_valid(address) {
            Ok(Some(address))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::transport::SimulatedGecko;

    fn connected(sim: &SimulatedGecko) -> Gecko {
        let mut gecko = Gecko::with_config(sim.boxed(), Config::immediate());
        gecko.connect().unwrap();
        gecko
    }

    #[test]
    fn test_parse_plain_address() {
        let chain: PointerChain = "80001234".parse().unwrap();
        assert_eq!(chain, PointerChain::new(0x8000_1234));
        assert!(!chain.is_pointer());
    }

    #[test]
    fn test_parse_offsets() {
        let chain: PointerChain = "[[80001234]+10]-4".parse().unwrap();
        assert_eq!(chain.base, 0x8000_1234);
        assert_eq!(chain.offsets, vec![0x10, 0xFFFF_FFFC]);

        let chain: PointerChain = "80001234+10-4".parse().unwrap();
        assert_eq!(chain.offsets, vec![0x10, 0xFFFF_FFFC]);

        let chain: PointerChain = "80001234-0".parse().unwrap();
        assert_eq!(chain.offsets, vec![0]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<PointerChain>().is_err());
        assert!("8000123G".parse::<PointerChain>().is_err());
        assert!("180001234".parse::<PointerChain>().is_err());
    }

    #[test]
    fn test_display_nests_brackets() {
        let chain = PointerChain::new(0x8000_1234)
            .with_offset(0x10)
            .with_negative_offset(4);
        assert_eq!(chain.to_string(), "[[80001234]+10]-4");
        assert_eq!(PointerChain::new(0x8000_0010).to_string(), "80000010");

        let reparsed: PointerChain = chain.to_string().parse().unwrap();
        assert_eq!(reparsed, chain);
    }

    #[test]
    fn test_resolve_pointer() {
        let sim = SimulatedGecko::new();
        sim.write_u32(0x8000_1000, 0x8000_2000);
        sim.write_u32(0x8000_2010, 0x8000_3008);
        let mut gecko = connected(&sim);

        let chain: PointerChain = "80001000+10-8".parse().unwrap();
        assert_eq!(gecko.resolve_pointer(&chain).unwrap(), Some(0x8000_3000));

        let plain = PointerChain::new(0x8000_1000);
        assert_eq!(gecko.resolve_pointer(&plain).unwrap(), Some(0x8000_1000));
    }

    #[test]
    fn test_resolve_pointer_unaligned_base() {
        let sim = SimulatedGecko::new();
        sim.write_u32(0x8000_1000, 0x8000_2000);
        let mut gecko = connected(&sim);

        let chain = PointerChain::new(0x8000_1002).with_offset(4);
        assert_eq!(gecko.resolve_pointer(&chain).unwrap(), Some(0x8000_2004));
    }

    #[test]
    fn test_resolve_pointer_broken_chain() {
        let sim = SimulatedGecko::new();
        sim.write_u32(0x8000_1000, 0);
        let mut gecko = connected(&sim);

        let chain = PointerChain::new(0x8000_1000).with_offset(4).with_offset(8);
        assert_eq!(gecko.resolve_pointer(&chain).unwrap(), None);

        let chain = PointerChain::new(0x1000_0000).with_offset(4);
        assert_eq!(gecko.resolve_pointer(&chain).unwrap(), None);
    }
}
