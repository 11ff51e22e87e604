// Thu Jan 15 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const CMD_POKE8: u8 = 0x01;
pub const CMD_POKE16: u8 = 0x02;
pub const CMD_POKE32: u8 = 0x03;
pub const CMD_READ_MEM: u8 = 0x04;
pub const CMD_PAUSE: u8 = 0x06;
pub const CMD_UNFREEZE: u8 = 0x07;
pub const CMD_BREAKPOINT: u8 = 0x09;
pub const CMD_BREAKPOINT_EXEC: u8 = 0x10;
pub const CMD_SEND_REGS: u8 = 0x2F;
pub const CMD_GET_REGS: u8 = 0x30;
pub const CMD_CANCEL_BP: u8 = 0x38;
pub const CMD_SEND_CHEATS: u8 = 0x40;
pub const CMD_UPLOAD: u8 = 0x41;
pub const CMD_HOOK: u8 = 0x42;
pub const CMD_HOOK_PAUSE: u8 = 0x43;
pub const CMD_STEP: u8 = 0x44;
pub const CMD_STATUS: u8 = 0x50;
pub const CMD_CHEAT_EXEC: u8 = 0x60;
pub const CMD_BREAKPOINT_EXACT: u8 = 0x89;
pub const CMD_VERSION: u8 = 0x99;

pub const GC_BP_HIT: u8 = 0x11;
pub const GC_ACK: u8 = 0xAA;
pub const GC_RETRY: u8 = 0xBB;
pub const GC_FAIL: u8 = 0xCC;
pub const GC_DONE: u8 = 0xFF;

/// First firmware revision with precise breakpoints and the long register
/// block.
pub const GC_NEW_VERSION: u8 = 0x80;
pub const ALLOWED_VERSIONS: [u8; 1] = [GC_NEW_VERSION];

pub const LANGUAGE_NO_OVERRIDE: u8 = 0xCD;

pub fn is_allowed_version(version: u8) -> bool {
    ALLOWED_VERSIONS.contains(&version)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WiiStatus {
    Running,
    Paused,
    Breakpoint,
    Loader,
    Unknown,
}

impl WiiStatus {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => WiiStatus::Running,
            1 => WiiStatus::Paused,
            2 => WiiStatus::Breakpoint,
            3 => WiiStatus::Loader,
            _ => WiiStatus::Unknown,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            WiiStatus::Running => 0,
            WiiStatus::Paused => 1,
            WiiStatus::Breakpoint => 2,
            WiiStatus::Loader => 3,
            WiiStatus::Unknown => 0xFF,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WiiStatus::Running => "running",
            WiiStatus::Paused => "paused",
            WiiStatus::Breakpoint => "breakpoint",
            WiiStatus::Loader => "loader",
            WiiStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for WiiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BreakpointKind {
    Execute,
    Read,
    Write,
    ReadWrite,
}

impl BreakpointKind {
    /// Low bits OR-ed into the aligned address.
    pub fn tag(&self) -> u32 {
        match self {
            BreakpointKind::Execute => 3,
            BreakpointKind::Read => 5,
            BreakpointKind::Write => 6,
            BreakpointKind::ReadWrite => 7,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BreakpointKind::Execute => "execute",
            BreakpointKind::Read => "read",
            BreakpointKind::Write => "write",
            BreakpointKind::ReadWrite => "read-write",
        }
    }
}

impl fmt::Display for BreakpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for BreakpointKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "execute" | "exec" | "x" => Ok(BreakpointKind::Execute),
            "read" | "r" => Ok(BreakpointKind::Read),
            "write" | "w" => Ok(BreakpointKind::Write),
            "read-write" | "readwrite" | "rw" => Ok(BreakpointKind::ReadWrite),
            other => Err(format!("unknown breakpoint kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WiiLanguage {
    NoOverride,
    Japanese,
    English,
    German,
    French,
    Spanish,
    Italian,
    Dutch,
    ChineseSimplified,
    ChineseTraditional,
    Korean,
}

impl WiiLanguage {
    pub const ALL: [WiiLanguage; 11] = [
        WiiLanguage::NoOverride,
        WiiLanguage::Japanese,
        WiiLanguage::English,
        WiiLanguage::German,
        WiiLanguage::French,
        WiiLanguage::Spanish,
        WiiLanguage::Italian,
        WiiLanguage::Dutch,
        WiiLanguage::ChineseSimplified,
        WiiLanguage::ChineseTraditional,
        WiiLanguage::Korean,
    ];

    /// Byte sent after the hook opcode. The firmware numbers languages from
    /// zero starting at Japanese.
    pub fn wire_byte(&self) -> u8 {
        match self {
            WiiLanguage::NoOverride => LANGUAGE_NO_OVERRIDE,
            other => (*other as u8) - 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WiiLanguage::NoOverride => "none",
            WiiLanguage::Japanese => "japanese",
            WiiLanguage::English => "english",
            WiiLanguage::German => "german",
            WiiLanguage::French => "french",
            WiiLanguage::Spanish => "spanish",
            WiiLanguage::Italian => "italian",
            WiiLanguage::Dutch => "dutch",
            WiiLanguage::ChineseSimplified => "chinese-simplified",
            WiiLanguage::ChineseTraditional => "chinese-traditional",
            WiiLanguage::Korean => "korean",
        }
    }
}

impl FromStr for WiiLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.name() == wanted)
            .ok_or_else(|| format!("unknown language '{}'", s))
    }
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WiiPatches {
    NoPatches,
    PAL60,
    VIDTV,
    PAL60VIDTV,
    NTSC,
    NTSCVIDTV,
    PAL50,
    PAL50VIDTV,
}

impl WiiPatches {
    pub const ALL: [WiiPatches; 8] = [
        WiiPatches::NoPatches,
        WiiPatches::PAL60,
        WiiPatches::VIDTV,
        WiiPatches::PAL60VIDTV,
        WiiPatches::NTSC,
        WiiPatches::NTSCVIDTV,
        WiiPatches::PAL50,
        WiiPatches::PAL50VIDTV,
    ];

    pub fn wire_byte(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            WiiPatches::NoPatches => "none",
            WiiPatches::PAL60 => "pal60",
            WiiPatches::VIDTV => "vidtv",
            WiiPatches::PAL60VIDTV => "pal60-vidtv",
            WiiPatches::NTSC => "ntsc",
            WiiPatches::NTSCVIDTV => "ntsc-vidtv",
            WiiPatches::PAL50 => "pal50",
            WiiPatches::PAL50VIDTV => "pal50-vidtv",
        }
    }
}

impl FromStr for WiiPatches {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|patch| patch.name() == wanted)
            .ok_or_else(|| format!("unknown patch set '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WiiHookType {
    VI,
    WiiRemote,
    GamecubePad,
}

impl WiiHookType {
    pub fn wire_offset(&self) -> u8 {
        *self as u8
    }

    pub fn opcode(&self, pause: bool) -> u8 {
        let base = if pause { CMD_HOOK_PAUSE } else { CMD_HOOK };
        base + self.wire_offset()
    }
}

impl FromStr for WiiHookType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vi" => Ok(WiiHookType::VI),
            "wiimote" | "wii-remote" | "remote" => Ok(WiiHookType::WiiRemote),
            "gcpad" | "gamecube-pad" | "pad" => Ok(WiiHookType::GamecubePad),
            other => Err(format!("unknown hook type '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_bytes() {
        assert_eq!(WiiStatus::from_byte(0), WiiStatus::Running);
        assert_eq!(WiiStatus::from_byte(3), WiiStatus::Loader);
        assert_eq!(WiiStatus::from_byte(9), WiiStatus::Unknown);
        for status in [WiiStatus::Running, WiiStatus::Paused, WiiStatus::Breakpoint, WiiStatus::Loader] {
            assert_eq!(WiiStatus::from_byte(status.to_byte()), status);
        }
    }

    #[test]
    fn test_breakpoint_tags() {
        assert_eq!(BreakpointKind::Execute.tag(), 3);
        assert_eq!(BreakpointKind::Read.tag(), 5);
        assert_eq!(BreakpointKind::Write.tag(), 6);
        assert_eq!(BreakpointKind::ReadWrite.tag(), 7);
        assert_eq!("rw".parse::<BreakpointKind>(), Ok(BreakpointKind::ReadWrite));
    }

    #[test]
    fn test_language_wire_bytes() {
        assert_eq!(WiiLanguage::NoOverride.wire_byte(), 0xCD);
        assert_eq!(WiiLanguage::Japanese.wire_byte(), 0);
        assert_eq!(WiiLanguage::Korean.wire_byte(), 9);
        assert_eq!("english".parse::<WiiLanguage>(), Ok(WiiLanguage::English));
    }

    #[test]
    fn test_hook_opcodes() {
        assert_eq!(WiiHookType::VI.opcode(false), 0x42);
        assert_eq!(WiiHookType::GamecubePad.opcode(false), 0x44);
        assert_eq!(WiiHookType::WiiRemote.opcode(true), 0x44);
        assert_eq!(WiiPatches::PAL50VIDTV.wire_byte(), 7);
    }

    #[test]
    fn test_allowed_versions() {
        assert!(is_allowed_version(0x80));
        assert!(!is_allowed_version(0x00));
        assert!(!is_allowed_version(0x81));
    }
}
