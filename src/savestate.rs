//! Machine save state

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use bincode::{deserialize, serialize};

use super::cpu::CPU;
use super::error::CResult;
use super::input::InputState;
use super::memory::Memory;
use super::registers::{Flags, Registers};
use super::shift::ShiftRegister;
use super::types::I8Byte;

/// No savestate at the given path
#[derive(Debug)]
pub struct MissingStateError(String);

impl Error for MissingStateError {}

impl fmt::Display for MissingStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no savestate at {}", self.0)
    }
}

/// Machine save state
///
/// The framebuffer is derived from VRAM and is not part of the state: it is
/// rebuilt on restore.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct SaveState {
    /// Memory
    pub memory: Memory,
    /// Registers
    pub registers: Registers,
    /// Flags
    pub flags: Flags,
    /// Input latch
    pub input: InputState,
    /// Shift register
    pub shift: ShiftRegister,
    /// Interrupt enable flag
    pub interrupt_enable: bool,
    /// Pending interrupt index
    pub pending_interrupt: Option<I8Byte>,
    /// Halted state
    pub halted: bool,
    /// Instruction count
    pub instruction_count: usize,
}

impl SaveState {
    /// Create save state from CPU
    ///
    /// # Arguments
    ///
    /// * `cpu` - CPU
    ///
    pub fn save_from_cpu(cpu: &CPU) -> SaveState {
        SaveState {
            memory: cpu.peripherals.memory.clone(),
            registers: cpu.registers.clone(),
            flags: cpu.flags.clone(),
            input: cpu.peripherals.input.clone(),
            shift: cpu.peripherals.shift.clone(),
            interrupt_enable: cpu.interrupt_enable,
            pending_interrupt: cpu.pending_interrupt,
            halted: cpu.halted,
            instruction_count: cpu.instruction_count,
        }
    }

    /// Serialize the state into a file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to file
    ///
    pub fn write_to_file(&self, path: &str) -> CResult {
        let encoded = serialize(self)?;
        fs::write(path, &encoded)?;

        debug!("savestate written to {} ({} bytes)", path, encoded.len());
        Ok(())
    }

    /// Deserialize a state from a file.
    ///
    /// Fails with [`MissingStateError`] when nothing exists at `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to file
    ///
    pub fn read_from_file(path: &str) -> CResult<SaveState> {
        if !Path::new(path).exists() {
            return Err(Box::new(MissingStateError(path.to_string())));
        }

        let encoded = fs::read(path)?;
        Ok(deserialize(&encoded)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_savestate_roundtrip() {
        use tempdir::TempDir;

        let mut cpu = CPU::new();
        cpu.registers.a = 0x42;
        cpu.registers.sp = 0x2400;
        cpu.registers.pc = 0x1234;
        cpu.flags.cy = true;
        cpu.peripherals.memory.write_byte(0x2000, 0x99);
        cpu.interrupt_enable = false;
        cpu.instruction_count = 77;

        let tmpdir = TempDir::new("test-savestate").unwrap();
        let tmppath = tmpdir.path().join("machine.sav");
        let state = SaveState::save_from_cpu(&cpu);
        state.write_to_file(tmppath.to_str().unwrap()).unwrap();

        let mut other = CPU::new();
        let state = SaveState::read_from_file(tmppath.to_str().unwrap()).unwrap();
        other.load_savestate(state);

        assert_eq!(other.registers.a, 0x42);
        assert_eq!(other.registers.sp, 0x2400);
        assert_eq!(other.registers.pc, 0x1234);
        assert!(other.flags.cy);
        assert_eq!(other.peripherals.memory.read_byte(0x2000), 0x99);
        assert!(!other.interrupt_enable);
        assert_eq!(other.instruction_count, 77);
    }

    #[test]
    fn test_read_missing_savestate() {
        let result = SaveState::read_from_file("does-not-exist.sav");
        assert!(result.is_err());
    }
}
