//! Shell

use std::path::PathBuf;

use argh::FromArgs;

use crate::emulator::Emulator;
use crate::error::CResult;
use crate::logger::init_logger;
use crate::rom::Rom;
use crate::savestate::SaveState;

/// Space Invaders emulator
#[derive(FromArgs)]
pub struct Args {
    /// verbose mode
    #[argh(switch, short = 'v')]
    pub verbose: bool,

    /// subcommand
    #[argh(subcommand)]
    pub nested: SubCommands,
}

/// Subcommands
#[derive(FromArgs)]
#[argh(subcommand)]
pub enum SubCommands {
    /// Play command
    Play(PlayCommand),
    /// Disassemble command
    Disassemble(DisassembleCommand),
    /// List command
    List(ListCommand),
    /// Version command
    Version(VersionCommand),
}

/// play ROM image
#[derive(FromArgs)]
#[argh(subcommand, name = "play")]
pub struct PlayCommand {
    /// ROM path (flat image, or directory of split parts)
    #[argh(positional)]
    pub file: PathBuf,

    /// trace output file ('-' for stdout)
    #[argh(option, short = 't')]
    pub trace: Option<String>,

    /// frame limit (omit to run until halt)
    #[argh(option, short = 'f')]
    pub frames: Option<u64>,

    /// savestate file, loaded at start and written on exit
    #[argh(option, short = 's')]
    pub state: Option<String>,

    /// dump the screen as text on exit
    #[argh(switch, short = 'd')]
    pub dump_screen: bool,
}

/// disassemble ROM image
#[derive(FromArgs)]
#[argh(subcommand, name = "disassemble")]
pub struct DisassembleCommand {
    /// ROM path
    #[argh(positional)]
    pub file: PathBuf,

    /// output file (omit argument for stdout)
    #[argh(option, short = 'o')]
    pub output: Option<String>,
}

/// list ROM images
#[derive(FromArgs)]
#[argh(subcommand, name = "list")]
pub struct ListCommand {}

/// show version
#[derive(FromArgs)]
#[argh(subcommand, name = "version")]
pub struct VersionCommand {}

/// Start shell
pub fn start_shell() -> CResult {
    let args: Args = argh::from_env();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    init_logger(level)?;

    match args.nested {
        SubCommands::Play(command) => play(command),
        SubCommands::Disassemble(command) => disassemble(command),
        SubCommands::List(_) => list(),
        SubCommands::Version(_) => version(),
    }
}

fn play(command: PlayCommand) -> CResult {
    let rom = Rom::load_from_path(&command.file)?;
    info!("playing {}", rom.get_title());

    let mut emulator = Emulator::new();
    emulator.load_game(&rom)?;

    if let Some(ref trace) = command.trace {
        emulator.set_tracefile(trace);
    }

    if let Some(ref state_path) = command.state {
        match SaveState::read_from_file(state_path) {
            Ok(state) => {
                info!("restoring state from {}", state_path);
                emulator.cpu.load_savestate(state);
            }
            Err(error) => info!("starting fresh: {}", error),
        }
    }

    emulator.run_loop(command.frames)?;

    if let Some(ref state_path) = command.state {
        info!("saving state to {}", state_path);
        SaveState::save_from_cpu(&emulator.cpu).write_to_file(state_path)?;
    }

    if command.dump_screen {
        emulator.cpu.convert();
        println!("{:?}", emulator.cpu.peripherals.screen);
    }

    Ok(())
}

fn disassemble(command: DisassembleCommand) -> CResult {
    let rom = Rom::load_from_path(&command.file)?;

    match command.output {
        Some(ref output) => rom.write_disassembly_to_file(output),
        None => rom.write_disassembly_to_file("-"),
    }
}

fn list() -> CResult {
    for name in Rom::list_from_roms_directory() {
        println!("{}", name);
    }

    Ok(())
}

fn version() -> CResult {
    println!("invaders {}", env!("CARGO_PKG_VERSION"));

    Ok(())
}
