//! Space Invaders core module

#![warn(missing_docs)]

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

#[macro_use]
mod macros;

pub mod cpu;
pub mod emulator;
pub mod error;
pub mod input;
pub mod logger;
pub mod memory;
pub mod opcodes;
pub mod peripherals;
pub mod registers;
pub mod rom;
pub mod savestate;
pub mod screen;
pub mod shell;
pub mod shift;
pub mod types;

pub use crate::shell::start_shell;
