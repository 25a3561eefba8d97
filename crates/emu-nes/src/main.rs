//! NES emulator binary.
//!
//! Loads an iNES image, reports its layout, then runs the CPU headless for
//! a fixed number of cycles and prints the final register state. Exits with
//! status 1 if the ROM cannot be loaded or the CPU halts.

use std::io;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use emu_core::Cpu;
use mos_6502::IndirectJump;
use nes_cartridge::format_size;
use tracing::info;
use tracing_subscriber::EnvFilter;

use emu_nes::{Nes, NesConfig, NesError, NesRegion};

/// One second of NTSC CPU time.
const DEFAULT_CYCLES: u64 = 1_789_773;

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

struct CliArgs {
    rom_path: Option<PathBuf>,
    cycles: u64,
    trace: bool,
    cross_page_jmp: bool,
    pal: bool,
}

impl CliArgs {
    /// Machine configuration for `rom_data` with the options given.
    fn config(&self, rom_data: Vec<u8>) -> NesConfig {
        let mut config = NesConfig::new(rom_data);
        if self.cross_page_jmp {
            config.indirect_jump = IndirectJump::CrossPage;
        }
        if self.pal {
            config.region = NesRegion::Pal;
        }
        config
    }
}

fn usage() {
    eprintln!("Usage: emu-nes --rom <file> [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --rom <file>        iNES ROM file (.nes)");
    eprintln!("  --cycles <n>        CPU cycles to run [default: {DEFAULT_CYCLES}]");
    eprintln!("  --trace             Print each instruction before it executes");
    eprintln!("  --cross-page-jmp    Fetch JMP ($xxFF) high byte from the next page");
    eprintln!("  --pal               PAL timing (312 lines, 3.2 PPU dots per CPU cycle)");
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut cli = CliArgs {
        rom_path: None,
        cycles: DEFAULT_CYCLES,
        trace: false,
        cross_page_jmp: false,
        pal: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rom" => {
                i += 1;
                cli.rom_path = args.get(i).map(PathBuf::from);
            }
            "--cycles" => {
                i += 1;
                let value = args.get(i).context("--cycles needs a value")?;
                cli.cycles = value
                    .parse()
                    .with_context(|| format!("invalid cycle count: {value}"))?;
            }
            "--trace" => cli.trace = true,
            "--cross-page-jmp" => cli.cross_page_jmp = true,
            "--pal" => cli.pal = true,
            "--help" | "-h" => {
                usage();
                process::exit(0);
            }
            other => {
                usage();
                anyhow::bail!("unknown argument: {other}");
            }
        }
        i += 1;
    }

    Ok(cli)
}

// ---------------------------------------------------------------------------
// Running
// ---------------------------------------------------------------------------

fn run(nes: &mut Nes, cycles: u64, trace: bool) -> Result<(), NesError> {
    if trace {
        while nes.cycles() < cycles {
            println!("{}", nes.next_instruction());
            nes.step()?;
        }
    } else {
        let summary = nes.run_until(cycles)?;
        info!(
            "ran {} instructions, stopped at cycle {}",
            summary.instructions, summary.cycles
        );
    }
    Ok(())
}

fn print_registers(nes: &Nes) {
    let r = nes.cpu().registers();
    println!(
        "PC=${:04X} A=${:02X} X=${:02X} Y=${:02X} S=${:02X} P=${:02X} cycles={}",
        r.pc,
        r.a,
        r.x,
        r.y,
        r.s,
        r.p.0,
        nes.cycles()
    );
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli = parse_args(&args)?;
    let Some(rom_path) = cli.rom_path.as_deref() else {
        usage();
        anyhow::bail!("no ROM file specified");
    };

    let rom_data = std::fs::read(rom_path)
        .with_context(|| format!("failed to read ROM file {}", rom_path.display()))?;
    let config = cli.config(rom_data);
    let mut nes =
        Nes::new(&config).with_context(|| format!("failed to load {}", rom_path.display()))?;

    let rom = nes.rom_info();
    println!("PRG ROM: {}", format_size(rom.prg_rom));
    println!("CHR ROM: {}", format_size(rom.chr_rom));
    println!("mapper: {:X}", rom.mapper);

    let outcome = run(&mut nes, cli.cycles, cli.trace);
    print_registers(&nes);
    outcome.context("emulation stopped")
}
