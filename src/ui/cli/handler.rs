// Thu Jan 15 2026 - Alex

use super::args::{
    Args, BreakpointArgs, CheatsArgs, Command, DumpArgs, HookArgs, PeekArgs, PointerArgs, PokeArgs,
    RegistersArgs, ScreenshotArgs, UploadArgs,
};
use crate::config::Config;
use crate::gecko::{parse_cheat_text, Gecko, GeckoResult, TransferDirection};
use crate::memory::DumpBuffer;
use crate::transport::{FtdiTransport, SimulatedGecko, Transport};
use crate::ui::print_warning;
use crate::ui::progress::ProgressManager;
use crate::utils::binary::hex_dump;
use crate::utils::logging::{init_from_env, scoped_timer, LoggingUtils};
use crate::utils::{format_bytes, format_duration, measure_time, BinaryUtils};
use anyhow::Context;
use colored::Colorize;
use std::fs::File;

pub struct CommandHandler {
    progress: ProgressManager,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self {
            progress: ProgressManager::new(),
        }
    }

    pub fn execute(mut self, args: Args) -> anyhow::Result<()> {
        self.setup_logging(&args)?;
        if args.quiet {
            self.progress = ProgressManager::hidden();
        }

        let mut gecko = self.open_session(&args)?;

        let result = match args.command {
            Command::Status => self.handle_status(&mut gecko),
            Command::Version => self.handle_version(&mut gecko),
            Command::Peek(peek_args) => self.handle_peek(&mut gecko, peek_args),
            Command::Poke(poke_args) => self.handle_poke(&mut gecko, poke_args),
            Command::Dump(dump_args) => self.handle_dump(&mut gecko, dump_args),
            Command::Upload(upload_args) => self.handle_upload(&mut gecko, upload_args),
            Command::Pause => self.handle_pause(&mut gecko),
            Command::Resume => self.handle_resume(&mut gecko),
            Command::Step => self.handle_step(&mut gecko),
            Command::Breakpoint(bp_args) => self.handle_breakpoint(&mut gecko, bp_args),
            Command::Registers(reg_args) => self.handle_registers(&mut gecko, reg_args),
            Command::Cheats(cheat_args) => self.handle_cheats(&mut gecko, cheat_args),
            Command::Hook(hook_args) => self.handle_hook(&mut gecko, hook_args),
            Command::Screenshot(shot_args) => self.handle_screenshot(&mut gecko, shot_args),
            Command::Pointer(pointer_args) => self.handle_pointer(&mut gecko, pointer_args),
        };

        gecko.disconnect();
        result
    }

    fn setup_logging(&self, args: &Args) -> anyhow::Result<()> {
        if args.no_color {
            colored::control::set_override(false);
        }

        let level = if args.quiet {
            log::LevelFilter::Error
        } else if args.verbose > 0 {
            LoggingUtils::level_from_verbosity(args.verbose as usize + 1)
        } else {
            LoggingUtils::level_from_str(&args.log_level)
        };

        if let Some(path) = &args.log_file {
            LoggingUtils::init_logger_with_file(level, path)
                .with_context(|| format!("Failed to open log file {:?}", path))?;
        } else if std::env::var_os("RUST_LOG").is_some() {
            init_from_env();
        } else {
            LoggingUtils::init_logger(level, !args.no_color);
        }
        Ok(())
    }

    fn open_session(&self, args: &Args) -> anyhow::Result<Gecko> {
        let config = match &args.config {
            Some(path) => Config::load(path).with_context(|| format!("Failed to load config {:?}", path))?,
            None => Config::default(),
        };

        let transport: Box<dyn Transport> = if args.simulate {
            let sim = SimulatedGecko::new();
            sim.seed_demo();
            log::info!("Using simulated console");
            sim.boxed()
        } else {
            Box::new(FtdiTransport::new())
        };

        let mut gecko = Gecko::with_config(transport, config);
        gecko.connect().context("Could not connect to the USB Gecko")?;
        Ok(gecko)
    }

    fn with_bar<T>(
        &self,
        gecko: &mut Gecko,
        direction: TransferDirection,
        what: &str,
        run: impl FnOnce(&mut Gecko) -> GeckoResult<T>,
    ) -> GeckoResult<T> {
        gecko.set_observer(self.progress.create_transfer_bar(direction, what));
        let result = run(gecko);
        gecko.clear_observer();
        result
    }

    fn handle_status(&self, gecko: &mut Gecko) -> anyhow::Result<()> {
        let status = gecko.status()?;
        println!("{} {}", "Status:".cyan(), status.to_string().bold());
        Ok(())
    }

    fn handle_version(&self, gecko: &mut Gecko) -> anyhow::Result<()> {
        match gecko.version_request()? {
            0 => println!("{} {}", "Handler:".cyan(), "unknown revision".yellow()),
            version => println!("{} 0x{:02X}", "Handler:".cyan(), version),
        }
        Ok(())
    }

    fn handle_peek(&self, gecko: &mut Gecko, args: PeekArgs) -> anyhow::Result<()> {
        for i in 0..args.count.max(1) {
            let address = args.address.wrapping_add(i * 4) & !3;
            if !gecko.validator().is_valid(address) {
                println!("{}: {}", format!("0x{:08X}", address).cyan(), "????????".red());
                continue;
            }
            let value = gecko.peek(address)?;
            println!("{}: {:08X}", format!("0x{:08X}", address).cyan(), value);
        }
        Ok(())
    }

    fn handle_poke(&self, gecko: &mut Gecko, args: PokeArgs) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;

        match args.width {
            8 => gecko.poke8(args.address, args.value as u8)?,
            16 => gecko.poke16(args.address, args.value as u16)?,
            _ => gecko.poke(args.address, args.value)?,
        }
        println!(
            "{}",
            format!("Wrote 0x{:X} to 0x{:08X} ({} bit)", args.value, args.address, args.width).green()
        );
        Ok(())
    }

    fn handle_dump(&self, gecko: &mut Gecko, args: DumpArgs) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;

        if args.hex {
            let data = gecko.dump_to_vec(args.start, args.end)?;
            print!("{}", hex_dump(&data, args.start));
            return Ok(());
        }

        let mut dump = DumpBuffer::new(args.start, args.end)?;
        let what = format!("0x{:08X}..0x{:08X}", args.start, args.end);
        let (result, elapsed) = measure_time(|| {
            self.with_bar(gecko, TransferDirection::Dump, &what, |g| g.dump_into(&mut dump))
        });
        let summary = result?;

        if summary.cancelled {
            print_warning("Dump cancelled, saving the part that arrived");
        }
        if args.compress {
            dump.write_compressed_to_disk(&args.output)
        } else {
            dump.write_to_disk(&args.output)
        }
        .with_context(|| format!("Failed to write {:?}", args.output))?;

        println!(
            "{}",
            format!(
                "Read {} in {}, saved to {:?}",
                format_bytes(summary.transferred as u64),
                format_duration(elapsed),
                args.output
            )
            .green()
        );
        Ok(())
    }

    fn handle_upload(&self, gecko: &mut Gecko, args: UploadArgs) -> anyhow::Result<()> {
        let data = BinaryUtils::load_file(&args.input).with_context(|| format!("Failed to read {:?}", args.input))?;
        let what = format!("{} to 0x{:08X}", format_bytes(data.len() as u64), args.address);
        let _timer = scoped_timer("upload");
        let summary = self.with_bar(gecko, TransferDirection::Upload, &what, |g| {
            g.upload_bytes(args.address, &data)
        })?;

        println!("{}", format!("Uploaded {}", format_bytes(summary.transferred as u64)).green());
        Ok(())
    }

    fn handle_pause(&self, gecko: &mut Gecko) -> anyhow::Result<()> {
        gecko.safe_pause()?;
        println!("{}", "Console paused".green());
        Ok(())
    }

    fn handle_resume(&self, gecko: &mut Gecko) -> anyhow::Result<()> {
        if gecko.safe_resume()? {
            println!("{}", "Console running".green());
        } else {
            print_warning("Console did not resume");
        }
        Ok(())
    }

    fn handle_step(&self, gecko: &mut Gecko) -> anyhow::Result<()> {
        gecko.step()?;
        println!("{}", "Stepped one instruction".green());
        Ok(())
    }

    fn handle_breakpoint(&self, gecko: &mut Gecko, args: BreakpointArgs) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;

        let address = match (args.cancel, args.address) {
            (false, Some(address)) => address,
            _ => {
                gecko.cancel_breakpoint()?;
                println!("{}", "Breakpoint cleared".green());
                return Ok(());
            }
        };

        gecko.set_breakpoint(address, args.kind, args.exact)?;
        println!(
            "{}",
            format!("{} breakpoint set at 0x{:08X}", args.kind, address).green()
        );

        for _ in 0..args.wait {
            if gecko.breakpoint_hit() {
                println!("{}", "Breakpoint hit".bold());
                return Ok(());
            }
        }
        if args.wait > 0 {
            print_warning("Breakpoint not hit yet");
        }
        Ok(())
    }

    fn handle_registers(&self, gecko: &mut Gecko, args: RegistersArgs) -> anyhow::Result<()> {
        if let Some(path) = args.send {
            let mut file = File::open(&path).with_context(|| format!("Failed to open {:?}", path))?;
            gecko.send_registers(&mut file)?;
            println!("{}", "Registers sent".green());
            return Ok(());
        }

        let mut block = Vec::new();
        let size = gecko.get_registers(&mut block)?;
        match args.output {
            Some(path) => {
                BinaryUtils::save_file(&path, &block).with_context(|| format!("Failed to write {:?}", path))?;
                println!("{}", format!("Saved {} register bytes to {:?}", size, path).green());
            }
            None => print!("{}", hex_dump(&block, 0)),
        }
        Ok(())
    }

    fn handle_cheats(&self, gecko: &mut Gecko, args: CheatsArgs) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;

        if let Some(path) = &args.input {
            let raw = BinaryUtils::load_file(path).with_context(|| format!("Failed to read {:?}", path))?;
            let parsed = std::str::from_utf8(&raw).ok().and_then(parse_cheat_text);
            let codes = parsed.unwrap_or(raw);

            let what = format!("{} code lines", codes.len() / 8);
            self.with_bar(gecko, TransferDirection::Upload, &what, |g| g.send_cheat_bytes(&codes))?;
            println!("{}", "Codes sent".green());
        }

        if args.execute {
            gecko.execute_cheats()?;
            println!("{}", "Codes enabled".green());
        }
        Ok(())
    }

    fn handle_hook(&self, gecko: &mut Gecko, args: HookArgs) -> anyhow::Result<()> {
        gecko.hook(args.pause, args.language, args.patches, args.hook_type)?;
        println!(
            "{}",
            format!(
                "Hooked (language {}, patches {})",
                args.language.name(),
                args.patches.name()
            )
            .green()
        );
        Ok(())
    }

    fn handle_screenshot(&self, gecko: &mut Gecko, args: ScreenshotArgs) -> anyhow::Result<()> {
        let image = {
            let _timer = scoped_timer("screenshot");
            gecko.capture_screenshot()?
        };
        if image.width() == 0 || image.height() == 0 {
            anyhow::bail!("Video interface reports an empty frame");
        }
        image
            .save(&args.output)
            .with_context(|| format!("Failed to save {:?}", args.output))?;
        println!(
            "{}",
            format!("Saved {}x{} frame to {:?}", image.width(), image.height(), args.output).green()
        );
        Ok(())
    }

    fn handle_pointer(&self, gecko: &mut Gecko, args: PointerArgs) -> anyhow::Result<()> {
        let chain = args.expression;
        match gecko.resolve_pointer(&chain)? {
            Some(address) => {
                let value = gecko.peek(address)?;
                println!("{} P->{:08X} = {:08X}", chain.to_string().cyan(), address, value);
            }
            None => println!("{} P->{}", chain.to_string().cyan(), "????????".red()),
        }
        Ok(())
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
