//! File output for forecast runs.

pub mod export;
