//! Command implementations for the `cropscan` binary.

pub mod analyze;
pub mod config;
pub mod crops;
pub mod interactive;
