// Fri Jan 16 2026 - Alex

use crate::gecko::command::*;
use crate::gecko::error::GeckoResult;
use crate::gecko::session::Gecko;

const VERSION_READ_ATTEMPTS: u32 = 3;
const SAFE_RESUME_ATTEMPTS: u32 = 10;

impl Gecko {
    pub fn status(&mut self) -> GeckoResult<WiiStatus> {
        self.settle(self.config.status_settle());
        self.init_gecko()?;
        self.raw_command(CMD_STATUS)?;
        let reply = self.read_byte()?;
        let status = WiiStatus::from_byte(reply);
        log::debug!("Console status: {}", status);
        Ok(status)
    }

    /// Firmware revision, or 0 when the handler does not answer with a
    /// known version.
    pub fn version_request(&mut self) -> GeckoResult<u8> {
        self.init_gecko()?;
        self.raw_command(CMD_VERSION)?;

        for _ in 0..VERSION_READ_ATTEMPTS {
            if let Ok(version) = self.read_byte() {
                if is_allowed_version(version) {
                    log::debug!("Handler version 0x{:02X}", version);
                    return Ok(version);
                }
            }
        }
        Ok(0)
    }

    pub fn pause(&mut self) -> GeckoResult<()> {
        self.raw_command(CMD_PAUSE)
    }

    pub fn resume(&mut self) -> GeckoResult<()> {
        self.raw_command(CMD_UNFREEZE)
    }

    /// Pauses until the console stops reporting `Running`.
    pub fn safe_pause(&mut self) -> GeckoResult<()> {
        while self.status()? == WiiStatus::Running {
            self.pause()?;
            self.settle(self.config.retry_delay());
        }
        Ok(())
    }

    /// Resumes until the console reports `Running`, giving up after a fixed
    /// number of attempts. Returns whether it is running.
    pub fn safe_resume(&mut self) -> GeckoResult<bool> {
        let mut running = matches!(self.status(), Ok(WiiStatus::Running));
        let mut failures = 0;

        while !running && failures < SAFE_RESUME_ATTEMPTS {
            self.resume()?;
            self.settle(self.config.retry_delay());
            running = match self.status() {
                Ok(status) => status == WiiStatus::Running,
                Err(e) => {
                    log::debug!("Status query during resume failed: {}", e);
                    false
                }
            };
            failures += 1;
        }

        if !running {
            log::warn!("Console still not running after {} resume attempts", failures);
        }
        Ok(running)
    }

    /// Advances a paused console by one instruction.
    pub fn step(&mut self) -> GeckoResult<()> {
        self.init_gecko()?;
        self.raw_command(CMD_STEP)
    }

    pub fn breakpoint_hit(&mut self) -> bool {
        matches!(self.read_byte(), Ok(GC_BP_HIT))
    }

    pub fn hook(
        &mut self,
        pause: bool,
        language: WiiLanguage,
        patches: WiiPatches,
        hook_type: WiiHookType,
    ) -> GeckoResult<()> {
        self.init_gecko()?;
        self.raw_command(hook_type.opcode(pause))?;
        self.raw_command(language.wire_byte())?;
        self.raw_command(patches.wire_byte())
    }

    pub fn hook_default(&mut self) -> GeckoResult<()> {
        self.hook(false, WiiLanguage::NoOverride, WiiPatches::NoPatches, WiiHookType::VI)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::gecko::error::ErrorKind;
    use crate::transport::SimulatedGecko;

    fn connected(sim: &SimulatedGecko) -> Gecko {
        let mut gecko = Gecko::with_config(sim.boxed(), Config::immediate());
        gecko.connect().unwrap();
        gecko
    }

    #[test]
    fn test_status_values() {
        let sim = SimulatedGecko::new();
        let mut gecko = connected(&sim);
        for status in [WiiStatus::Running, WiiStatus::Paused, WiiStatus::Breakpoint, WiiStatus::Loader] {
            sim.set_status(status);
            assert_eq!(gecko.status().unwrap(), status);
        }
    }

    #[test]
    fn test_status_without_reply() {
        let sim = SimulatedGecko::new();
        let mut gecko = connected(&sim);
        sim.drop_status_replies(1);
        assert_eq!(gecko.status().unwrap_err().kind(), ErrorKind::ReadFailed);
    }

    #[test]
    fn test_version_request() {
        let sim = SimulatedGecko::new();
        let mut gecko = connected(&sim);
        assert_eq!(gecko.version_request().unwrap(), 0x80);
        sim.set_version(0x12);
        assert_eq!(gecko.version_request().unwrap(), 0);
    }

    #[test]
    fn test_safe_pause_and_resume() {
        let sim = SimulatedGecko::new();
        let mut gecko = connected(&sim);

        gecko.safe_pause().unwrap();
        assert_eq!(sim.status(), WiiStatus::Paused);

        assert!(gecko.safe_resume().unwrap());
        assert_eq!(sim.status(), WiiStatus::Running);
    }

    #[test]
    fn test_safe_resume_counts_status_errors() {
        let sim = SimulatedGecko::new();
        sim.set_status(WiiStatus::Paused);
        let mut gecko = connected(&sim);
        sim.drop_status_replies(100);

        assert!(!gecko.safe_resume().unwrap());
        let resumes = sim.writes().iter().filter(|w| w.as_slice() == [CMD_UNFREEZE]).count();
        assert_eq!(resumes, 10);
    }

    #[test]
    fn test_step_and_breakpoint_hit() {
        let sim = SimulatedGecko::new();
        sim.set_status(WiiStatus::Breakpoint);
        let mut gecko = connected(&sim);
        gecko.step().unwrap();
        assert_eq!(sim.steps(), 1);
        assert!(!gecko.breakpoint_hit());
    }

    #[test]
    fn test_send_fail_and_raw_command() {
        let sim = SimulatedGecko::new();
        let mut gecko = connected(&sim);
        sim.clear_writes();
        gecko.send_fail();
        gecko.raw_command(CMD_CHEAT_EXEC).unwrap();
        assert_eq!(sim.writes(), vec![vec![GC_FAIL], vec![CMD_CHEAT_EXEC]]);
    }

    #[test]
    fn test_hook_bytes() {
        let sim = SimulatedGecko::new();
        sim.set_status(WiiStatus::Loader);
        let mut gecko = connected(&sim);
        sim.clear_writes();

        gecko
            .hook(true, WiiLanguage::German, WiiPatches::PAL60, WiiHookType::WiiRemote)
            .unwrap();
        assert_eq!(sim.writes(), vec![vec![0x44], vec![2], vec![1]]);

        let hook = sim.hook().unwrap();
        assert_eq!(hook.opcode, 0x44);
        assert_eq!(hook.language, 2);
        assert_eq!(hook.patches, 1);
        assert_eq!(sim.status(), WiiStatus::Running);
    }

    #[test]
    fn test_hook_default() {
        let sim = SimulatedGecko::new();
        sim.set_status(WiiStatus::Loader);
        let mut gecko = connected(&sim);
        sim.clear_writes();
        gecko.hook_default().unwrap();
        assert_eq!(sim.writes(), vec![vec![0x42], vec![0xCD], vec![0]]);
    }
}
