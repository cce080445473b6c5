//! vhdfix shared - Common code for the library and the CLI
//!
//! This crate contains the error taxonomy and constants
//! used by both the conversion library (vhdfix) and the binary.

pub mod constants;
pub mod errors;

pub use errors::{Stage, VhdfixError, VhdfixResult};
