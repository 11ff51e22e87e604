// Fri Jan 16 2026 - Alex

use crate::gecko::command::*;
use crate::gecko::error::{GeckoError, GeckoResult};
use crate::gecko::session::{CommandResult, Gecko};
use crate::gecko::transfer::MAX_RETRIES;
use std::io::{Read, Write};

/// General purpose and special registers only.
pub const REGISTER_BLOCK_SIZE: usize = 0xA0;
/// Newer handlers append the floating point registers.
pub const REGISTER_BLOCK_SIZE_FP: usize = 0x120;

const REGISTER_ACK_ATTEMPTS: u32 = 3;

impl Gecko {
    /// Copies the register block of a stopped console into `sink` and
    /// returns its size.
    pub fn get_registers<W: Write>(&mut self, sink: &mut W) -> GeckoResult<usize> {
        let size = if self.version_request()? >= GC_NEW_VERSION {
            REGISTER_BLOCK_SIZE_FP
        } else {
            REGISTER_BLOCK_SIZE
        };

        self.raw_command(CMD_GET_REGS)?;
        let mut buffer = vec![0u8; size];
        if !self.gecko_read(&mut buffer).is_ok() {
            return Err(GeckoError::ReadFailed);
        }

        sink.write_all(&buffer)?;
        Ok(size)
    }

    pub fn send_registers<R: Read>(&mut self, source: &mut R) -> GeckoResult<()> {
        let mut buffer = Vec::with_capacity(REGISTER_BLOCK_SIZE);
        source.read_to_end(&mut buffer)?;
        if buffer.len() != REGISTER_BLOCK_SIZE {
            return Err(GeckoError::RegisterStreamSizeInvalid(buffer.len()));
        }

        self.init_gecko()?;
        self.raw_command(CMD_SEND_REGS)?;
        self.wait_for_ack(REGISTER_ACK_ATTEMPTS).map_err(|e| match e {
            GeckoError::InvalidReply(_) => GeckoError::ReadFailed,
            other => other,
        })?;

        let mut retry = 0;
        loop {
            match self.gecko_write(&buffer) {
                CommandResult::Ok => return Ok(()),
                CommandResult::ResultError => {
                    retry += 1;
                    if retry >= MAX_RETRIES {
                        self.signal(GC_FAIL);
                        return Err(GeckoError::CommandSendFailed);
                    }
                    log::warn!("Register block not accepted, retrying");
                    self.signal(GC_RETRY);
                }
                CommandResult::FatalError => {
                    self.signal(GC_FAIL);
                    return Err(GeckoError::CommandSendFailed);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::gecko::error::ErrorKind;
    use crate::transport::{ChunkFault, FaultKind, SimulatedGecko};
    use std::io::Cursor;

    fn connected(sim: &SimulatedGecko) -> Gecko {
        let mut gecko = Gecko::with_config(sim.boxed(), Config::immediate());
        gecko.connect().unwrap();
        gecko
    }

    fn block(len: usize) -> Vec<u8> {
        (0..len).map(|i| i as u8).collect()
    }

    #[test]
    fn test_get_registers_version_gated() {
        let sim = SimulatedGecko::new();
        sim.set_registers(&block(REGISTER_BLOCK_SIZE_FP));
        let mut gecko = connected(&sim);

        let mut out = Vec::new();
        assert_eq!(gecko.get_registers(&mut out).unwrap(), 0x120);
        assert_eq!(out, block(0x120));

        sim.set_version(0x00);
        let mut out = Vec::new();
        assert_eq!(gecko.get_registers(&mut out).unwrap(), 0xA0);
        assert_eq!(out, block(0xA0));
    }

    #[test]
    fn test_send_registers_size_checked() {
        let sim = SimulatedGecko::new();
        let mut gecko = connected(&sim);
        sim.clear_writes();

        let err = gecko.send_registers(&mut Cursor::new(vec![0u8; 0x9F])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RegisterStreamSizeInvalid);
        assert!(sim.writes().is_empty());
    }

    #[test]
    fn test_send_registers_round_trip() {
        let sim = SimulatedGecko::new();
        sim.inject_fault(ChunkFault::new(0, 1, FaultKind::Short));
        let mut gecko = connected(&sim);

        let regs: Vec<u8> = (0..0xA0).map(|i| 0xFF - i as u8).collect();
        gecko.send_registers(&mut Cursor::new(regs.clone())).unwrap();
        assert_eq!(&sim.registers()[..0xA0], &regs[..]);
        assert!(sim.writes().contains(&vec![GC_RETRY]));
    }

    #[test]
    fn test_send_registers_gives_up() {
        let sim = SimulatedGecko::new();
        sim.inject_fault(ChunkFault::new(0, 3, FaultKind::Short));
        let mut gecko = connected(&sim);

        let err = gecko.send_registers(&mut Cursor::new(vec![0u8; 0xA0])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CommandSendFailed);
        assert_eq!(sim.writes().last().unwrap(), &vec![GC_FAIL]);
    }

    #[test]
    fn test_send_registers_without_ack() {
        let sim = SimulatedGecko::new();
        sim.set_command_reply(Some(GC_RETRY));
        let mut gecko = connected(&sim);

        let err = gecko.send_registers(&mut Cursor::new(vec![0u8; 0xA0])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReadFailed);
    }
}
