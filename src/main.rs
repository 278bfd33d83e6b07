//! Space Invaders emulator

use std::process;

use invaders::start_shell;

fn main() {
    if let Err(error) = start_shell() {
        eprintln!("error: {}", error);
        process::exit(1);
    }
}
