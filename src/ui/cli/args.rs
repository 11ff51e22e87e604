// Thu Jan 15 2026 - Alex

use crate::gecko::{BreakpointKind, PointerChain, WiiHookType, WiiLanguage, WiiPatches};
use crate::memory::Address;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

fn parse_address(s: &str) -> Result<u32, String> {
    Address::parse(s)
        .map(u32::from)
        .ok_or_else(|| format!("'{}' is not a hex address", s))
}

#[derive(Parser, Debug)]
#[command(name = "geckolink")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Live memory access for GameCube and Wii consoles over USB Gecko", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: String,

    /// Raise the log level; repeat for more detail.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Append log records to a file instead of stderr.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true)]
    pub no_color: bool,

    /// JSON session settings.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Talk to a simulated console instead of real hardware.
    #[arg(long, global = true)]
    pub simulate: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show whether the console is running, paused or at a breakpoint
    Status,
    /// Show the handler revision
    Version,
    Peek(PeekArgs),
    Poke(PokeArgs),
    Dump(DumpArgs),
    Upload(UploadArgs),
    Pause,
    Resume,
    /// Execute one instruction on a stopped console
    Step,
    Breakpoint(BreakpointArgs),
    Registers(RegistersArgs),
    Cheats(CheatsArgs),
    Hook(HookArgs),
    Screenshot(ScreenshotArgs),
    Pointer(PointerArgs),
}

#[derive(Parser, Debug)]
pub struct PeekArgs {
    #[arg(value_parser = parse_address)]
    pub address: u32,

    /// Number of consecutive words to read.
    #[arg(short = 'n', long, default_value = "1")]
    pub count: u32,
}

#[derive(Parser, Debug)]
pub struct PokeArgs {
    #[arg(value_parser = parse_address)]
    pub address: u32,

    #[arg(value_parser = parse_address)]
    pub value: u32,

    #[arg(short, long, default_value = "32")]
    pub width: u8,
}

#[derive(Parser, Debug)]
pub struct DumpArgs {
    #[arg(value_parser = parse_address)]
    pub start: u32,

    #[arg(value_parser = parse_address)]
    pub end: u32,

    #[arg(short, long, default_value = "dump.bin")]
    pub output: PathBuf,

    /// Store the dump in a zip archive.
    #[arg(long)]
    pub compress: bool,

    /// Print a hex listing instead of writing a file.
    #[arg(long)]
    pub hex: bool,
}

#[derive(Parser, Debug)]
pub struct UploadArgs {
    #[arg(value_parser = parse_address)]
    pub address: u32,

    pub input: PathBuf,
}

#[derive(Parser, Debug)]
pub struct BreakpointArgs {
    #[arg(value_parser = parse_address)]
    pub address: Option<u32>,

    #[arg(short, long, default_value = "write")]
    pub kind: BreakpointKind,

    /// Trigger on the exact address only, when the handler supports it.
    #[arg(long)]
    pub exact: bool,

    /// Clear the current breakpoint instead of setting one.
    #[arg(long)]
    pub cancel: bool,

    /// Poll for the breakpoint to trigger this many times after arming.
    #[arg(long, default_value = "0")]
    pub wait: u32,
}

#[derive(Parser, Debug)]
pub struct RegistersArgs {
    /// Save the block to a file instead of printing it.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Load a previously saved block back into the console.
    #[arg(short, long, conflicts_with = "output")]
    pub send: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct CheatsArgs {
    /// Code list, as text or a binary GCT file.
    pub input: Option<PathBuf>,

    /// Ask the handler to run the code list.
    #[arg(short, long)]
    pub execute: bool,
}

#[derive(Parser, Debug)]
pub struct HookArgs {
    /// Leave the game paused once the handler is installed.
    #[arg(long)]
    pub pause: bool,

    #[arg(long, default_value = "none")]
    pub language: WiiLanguage,

    #[arg(long, default_value = "none")]
    pub patches: WiiPatches,

    #[arg(long = "type", default_value = "vi")]
    pub hook_type: WiiHookType,
}

#[derive(Parser, Debug)]
pub struct ScreenshotArgs {
    #[arg(default_value = "screenshot.png")]
    pub output: PathBuf,
}

#[derive(Parser, Debug)]
pub struct PointerArgs {
    /// Expression such as 80001234+10-4.
    pub expression: PointerChain,
}

impl PokeArgs {
    pub fn validate(&self) -> Result<(), String> {
        let limit = match self.width {
            8 => 0xFF,
            16 => 0xFFFF,
            32 => u32::MAX,
            other => return Err(format!("Unsupported poke width {}, expected 8, 16 or 32", other)),
        };
        if self.value > limit {
            return Err(format!("Value 0x{:X} does not fit in {} bits", self.value, self.width));
        }
        Ok(())
    }
}

impl DumpArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.end <= self.start {
            return Err(format!(
                "End 0x{:08X} must be above start 0x{:08X}",
                self.end, self.start
            ));
        }
        Ok(())
    }
}

impl BreakpointArgs {
    pub fn validate(&self) -> Result<(), String> {
        if !self.cancel && self.address.is_none() {
            return Err("An address is required unless --cancel is given".to_string());
        }
        Ok(())
    }
}

impl CheatsArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.input.is_none() && !self.execute {
            return Err("Nothing to do: give a code file, --execute, or both".to_string());
        }
        Ok(())
    }
}
