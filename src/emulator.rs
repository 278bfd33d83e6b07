//! Cabinet emulator
//!
//! Paces the CPU at the nominal 2 MHz clock, 60 frames per second, and
//! fires the two half-frame video interrupts the ROM relies on.

use std::fs::OpenOptions;
use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use super::cpu::CPU;
use super::error::CResult;
use super::memory::MEMORY_SIZE;
use super::opcodes;
use super::rom::Rom;

/// CPU clock rate in cycles per second
pub const CLOCK_RATE: u32 = 2_000_000;
/// Display refresh rate in frames per second
pub const FRAME_RATE: u32 = 60;
/// Cycles per frame
pub const CYCLES_PER_FRAME: u32 = CLOCK_RATE / FRAME_RATE;

const CYCLES_PER_HALF_FRAME: u32 = CYCLES_PER_FRAME / 2;
const CONVERT_FRAME_LIMIT: u64 = 5;

/// Mid-frame interrupt index (RST 1)
const HALF_FRAME_INTERRUPT: u8 = 1;
/// End-of-frame interrupt index (RST 2)
const FULL_FRAME_INTERRUPT: u8 = 2;

/// Cabinet emulator
#[derive(Default)]
pub struct Emulator {
    /// CPU handle
    pub cpu: CPU,
}

/// Emulation state
#[derive(Debug)]
pub enum EmulationState {
    /// Normal
    Normal,
    /// Halted
    Halted,
}

/// Tracefile handle
#[derive(Debug)]
pub enum TracefileHandle {
    /// File
    File(std::fs::File),
    /// Stdout
    Stdout,
}

/// Emulator context
pub struct EmulatorContext {
    tracefile_handle: Option<TracefileHandle>,
    frame_count: u64,
    frame_start: Instant,
}

impl Default for EmulatorContext {
    fn default() -> Self {
        Self {
            tracefile_handle: None,
            frame_count: 0,
            frame_start: Instant::now(),
        }
    }
}

impl EmulatorContext {
    /// Create new emulator context
    pub fn new() -> Self {
        Default::default()
    }
}

impl Emulator {
    /// Create new emulator
    pub fn new() -> Self {
        Emulator { cpu: CPU::new() }
    }

    /// Set CPU tracefile.
    ///
    /// # Arguments
    ///
    /// * `tracefile` - Tracefile
    ///
    pub fn set_tracefile(&mut self, tracefile: &str) {
        self.cpu.tracefile(tracefile);
    }

    /// Load game
    ///
    /// # Arguments
    ///
    /// * `rom` - ROM image
    ///
    pub fn load_game(&mut self, rom: &Rom) -> CResult {
        self.cpu.load_rom(rom)
    }

    /// Run one 60 Hz frame.
    ///
    /// Two interrupt bursts per frame: RST 1 after the first half of the
    /// frame budget, RST 2 after the second. The framebuffer conversion
    /// runs every 5th frame.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Emulator context
    ///
    pub fn step_frame(&mut self, ctx: &mut EmulatorContext) -> EmulationState {
        self.run_cycles(CYCLES_PER_HALF_FRAME, ctx);
        self.cpu.trigger_interrupt(HALF_FRAME_INTERRUPT);
        self.run_cycles(CYCLES_PER_HALF_FRAME, ctx);
        self.cpu.trigger_interrupt(FULL_FRAME_INTERRUPT);

        ctx.frame_count += 1;
        if ctx.frame_count % CONVERT_FRAME_LIMIT == 0 {
            self.cpu.convert();
        }

        if self.cpu.halted {
            EmulationState::Halted
        } else {
            EmulationState::Normal
        }
    }

    /// Run loop
    ///
    /// # Arguments
    ///
    /// * `max_frames` - Frame limit (run forever when `None`)
    ///
    pub fn run_loop(&mut self, max_frames: Option<u64>) -> CResult {
        let mut ctx = EmulatorContext::new();

        // Get tracefile
        ctx.tracefile_handle = match self.cpu.tracefile {
            Some(ref path) if path == "-" => Some(TracefileHandle::Stdout),
            Some(ref path) => Some(TracefileHandle::File(
                OpenOptions::new().write(true).create(true).open(path)?,
            )),
            None => None,
        };

        loop {
            match self.step_frame(&mut ctx) {
                EmulationState::Halted => {
                    info!("machine halted after {} frames", ctx.frame_count);
                    break;
                }
                EmulationState::Normal => {}
            }

            if let Some(max) = max_frames {
                if ctx.frame_count >= max {
                    break;
                }
            }

            self.pace(&mut ctx);
        }

        Ok(())
    }

    fn run_cycles(&mut self, count: u32, ctx: &mut EmulatorContext) {
        let mut cycles = 0;

        while cycles < count {
            if self.cpu.halted {
                break;
            }

            if ctx.tracefile_handle.is_some() {
                let pc = self.cpu.registers.pc;
                let window = usize::min(3, MEMORY_SIZE - pc as usize);
                let stream = self.cpu.peripherals.memory.read_data_at_offset(pc, window);
                let (assembly, _) = opcodes::disassemble(stream, 0);

                trace_exec!(
                    ctx.tracefile_handle,
                    "[{:08X}] {:04X}  {}",
                    self.cpu.instruction_count,
                    pc,
                    assembly
                );
            }

            cycles += self.cpu.step();
        }
    }

    /// Sleep away the rest of the frame budget
    fn pace(&self, ctx: &mut EmulatorContext) {
        let frame_time = Duration::from_secs(1) / FRAME_RATE;
        let elapsed = ctx.frame_start.elapsed();

        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }

        ctx.frame_start = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_interrupt_schedule() {
        // DI at 0, then spin: the latched interrupts never fire but are
        // visible after each half frame.
        let mut emulator = Emulator::new();
        let rom = Rom::load_from_bytes("Test", "", &[0xF3]).unwrap();
        emulator.load_game(&rom).unwrap();

        let mut ctx = EmulatorContext::new();
        emulator.step_frame(&mut ctx);

        assert_eq!(emulator.cpu.pending_interrupt, Some(FULL_FRAME_INTERRUPT));
        assert!(emulator.cpu.instruction_count as u64 >= u64::from(CYCLES_PER_FRAME) / 18);
    }

    #[test]
    fn test_halt_stops_frame() {
        let mut emulator = Emulator::new();
        let rom = Rom::load_from_bytes("Test", "", &[0x76]).unwrap();
        emulator.load_game(&rom).unwrap();

        let mut ctx = EmulatorContext::new();
        match emulator.step_frame(&mut ctx) {
            EmulationState::Halted => {}
            state => panic!("unexpected state: {:?}", state),
        }
    }

    #[test]
    fn test_run_loop_with_frame_limit() {
        let mut emulator = Emulator::new();
        let rom = Rom::load_from_bytes("Test", "", &[]).unwrap();
        emulator.load_game(&rom).unwrap();

        emulator.run_loop(Some(2)).unwrap();
        assert!(emulator.cpu.instruction_count > 0);
    }
}
