// Fri Jan 16 2026 - Alex

use crate::gecko::command::*;
use crate::gecko::error::GeckoResult;
use crate::gecko::session::Gecko;
use crate::utils::BinaryUtils;

impl Gecko {
    /// Arms a data breakpoint. With `exact` set and a handler that supports
    /// it, only accesses to `address` itself trigger; otherwise the whole
    /// 8-byte block does.
    pub fn set_breakpoint(&mut self, address: u32, kind: BreakpointKind, exact: bool) -> GeckoResult<()> {
        if kind == BreakpointKind::Execute {
            return self.set_execute_breakpoint(address);
        }

        self.init_gecko()?;
        let low = (address & !7) | kind.tag();

        let precise = exact && self.version_request()? >= GC_NEW_VERSION;
        if precise {
            log::debug!("Precise {} breakpoint at 0x{:08X}", kind, address);
            self.raw_command(CMD_BREAKPOINT_EXACT)?;
            self.send(&BinaryUtils::pack_pair_be(low, address))
        } else {
            log::debug!("{} breakpoint at 0x{:08X}", kind, low & !7);
            self.raw_command(CMD_BREAKPOINT)?;
            self.send(&low.to_be_bytes())
        }
    }

    pub fn breakpoint_read(&mut self, address: u32) -> GeckoResult<()> {
        self.set_breakpoint(address, BreakpointKind::Read, true)
    }

    pub fn breakpoint_write(&mut self, address: u32) -> GeckoResult<()> {
        self.set_breakpoint(address, BreakpointKind::Write, true)
    }

    pub fn breakpoint_read_write(&mut self, address: u32) -> GeckoResult<()> {
        self.set_breakpoint(address, BreakpointKind::ReadWrite, true)
    }

    /// Instruction breakpoints are always word exact.
    pub fn set_execute_breakpoint(&mut self, address: u32) -> GeckoResult<()> {
        self.init_gecko()?;
        let target = (address & !3) | BreakpointKind::Execute.tag();
        self.raw_command(CMD_BREAKPOINT_EXEC)?;
        self.send(&target.to_be_bytes())
    }

    // Current handlers ignore this.
    pub fn cancel_breakpoint(&mut self) -> GeckoResult<()> {
        self.raw_command(CMD_CANCEL_BP)
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

    fn payload_writes(sim: &SimulatedGecko) -> Vec<Vec<u8>> {
        sim.writes()
            .into_iter()
            .filter(|w| w.as_slice() != [CMD_VERSION])
            .collect()
    }

    #[test]
    fn test_classic_write_breakpoint() {
        let sim = SimulatedGecko::new();
        let mut gecko = connected(&sim);
        sim.clear_writes();

        gecko.set_breakpoint(0x8000_1004, BreakpointKind::Write, false).unwrap();
        assert_eq!(
            payload_writes(&sim),
            vec![vec![0x09], vec![0x80, 0x00, 0x10, 0x06]]
        );
        assert!(!sim.writes().contains(&vec![CMD_VERSION]));
    }

    #[test]
    fn test_precise_read_breakpoint() {
        let sim = SimulatedGecko::new();
        let mut gecko = connected(&sim);
        sim.clear_writes();

        gecko.breakpoint_read(0x8000_1004).unwrap();
        assert_eq!(
            payload_writes(&sim),
            vec![vec![0x89], vec![0x80, 0x00, 0x10, 0x05, 0x80, 0x00, 0x10, 0x04]]
        );
        let record = sim.breakpoint().unwrap();
        assert_eq!(record.opcode, CMD_BREAKPOINT_EXACT);
    }

    #[test]
    fn test_exact_falls_back_on_old_handler() {
        let sim = SimulatedGecko::new();
        sim.set_version(0x00);
        let mut gecko = connected(&sim);
        sim.clear_writes();

        gecko.breakpoint_read_write(0x8000_100F).unwrap();
        assert_eq!(
            payload_writes(&sim),
            vec![vec![0x09], vec![0x80, 0x00, 0x10, 0x0F]]
        );
    }

    #[test]
    fn test_execute_breakpoint() {
        let sim = SimulatedGecko::new();
        let mut gecko = connected(&sim);
        sim.clear_writes();

        gecko.set_execute_breakpoint(0x8000_2002).unwrap();
        assert_eq!(sim.writes(), vec![vec![0x10], vec![0x80, 0x00, 0x20, 0x03]]);

        gecko.set_breakpoint(0x8000_3000, BreakpointKind::Execute, true).unwrap();
        assert_eq!(sim.breakpoint().unwrap().payload, vec![0x80, 0x00, 0x30, 0x03]);
    }

    #[test]
    fn test_cancel_breakpoint() {
        let sim = SimulatedGecko::new();
        let mut gecko = connected(&sim);
        gecko.breakpoint_write(0x8000_0010).unwrap();
        assert!(sim.breakpoint().is_some());
        gecko.cancel_breakpoint().unwrap();
        assert!(sim.breakpoint().is_none());
    }
}
