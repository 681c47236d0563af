//! # Shared Types Crate
//!
//! Chain primitives shared across subsystems: the proof-of-work block header,
//! the hash type and cumulative-work arithmetic.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Wire-level chain types are defined here.
//! - **No Subsystem Logic**: Only data and pure arithmetic live in this crate.

pub mod entities;
pub mod pow;

pub use entities::*;
pub use pow::*;
