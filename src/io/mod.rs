//! File output for simulation records.

pub mod export;
