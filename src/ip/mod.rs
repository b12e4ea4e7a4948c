//! IP address ranges and CIDR blocks.
//!
//! This module holds the family-generic value types the reducer works on:
//! the [`Address`] width trait, inclusive [`AddressRange`]s and aligned
//! [`PrefixBlock`]s.

pub mod address;
pub mod range;

// Re-export commonly used types
pub use address::{Address, AddressFamily};
pub use range::{AddressRange, MinimalSplit, PrefixBlock};
