//! Input port latch
//!
//! Keys:
//!     C     - coin
//!     1     - player 1 start
//!     SPACE - shoot
//!     LEFT / RIGHT - move
//!

use std::fmt;

use super::types::I8Byte;

/// Coin key bit
pub const COIN_KEY: I8Byte = 0x01;
/// Player 1 start key bit
pub const START1_KEY: I8Byte = 0x02;
/// Shoot key bit
pub const SHOOT_KEY: I8Byte = 0x10;
/// Move left key bit
pub const LEFT_KEY: I8Byte = 0x20;
/// Move right key bit
pub const RIGHT_KEY: I8Byte = 0x40;

/// Bit 3 is tied high on the cabinet
const PORT1_IDLE: I8Byte = 0x08;

/// Input state struct
#[derive(Clone, Serialize, Deserialize)]
pub struct InputState {
    port1: I8Byte,
}

impl Default for InputState {
    fn default() -> Self {
        InputState { port1: PORT1_IDLE }
    }
}

impl InputState {
    /// Create new input state
    pub fn new() -> Self {
        Default::default()
    }

    /// Latch keys down
    ///
    /// # Arguments
    ///
    /// * `keys` - Key bitmask
    ///
    pub fn key_down(&mut self, keys: I8Byte) {
        self.port1 |= keys;
    }

    /// Release keys
    ///
    /// # Arguments
    ///
    /// * `keys` - Key bitmask
    ///
    pub fn key_up(&mut self, keys: I8Byte) {
        self.port1 &= !keys;
    }

    /// Read the latched key bits
    pub fn read(&self) -> I8Byte {
        self.port1
    }

    /// Reset input state
    pub fn reset(&mut self) {
        self.port1 = PORT1_IDLE;
    }

    /// Load from save
    ///
    /// # Arguments
    ///
    /// * `input` - Input state
    ///
    pub fn load_from_save(&mut self, input: InputState) {
        self.port1 = input.port1;
    }
}

impl fmt::Debug for InputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    P1: {:02X}", self.port1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_bit() {
        let input = InputState::new();
        assert_eq!(input.read(), 0x08);
    }

    #[test]
    fn test_key_edges() {
        let mut input = InputState::new();

        input.key_down(COIN_KEY | SHOOT_KEY);
        assert_eq!(input.read(), 0x08 | COIN_KEY | SHOOT_KEY);

        input.key_up(COIN_KEY);
        assert_eq!(input.read(), 0x08 | SHOOT_KEY);

        input.key_up(SHOOT_KEY);
        assert_eq!(input.read(), 0x08);
    }
}
