//! Result and error support
//!
//! Machine-level diagnostics (undefined opcodes, unexpected ports, bad
//! interrupt indexes) are logged and execution continues. Hard failures,
//! such as ROM or savestate I/O, surface as boxed errors through this
//! alias.

use std::error::Error;

/// Crate-wide result alias, boxing any error type
pub type CResult<T = ()> = Result<T, Box<dyn Error>>;
