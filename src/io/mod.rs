//! File export for design outcomes.

pub mod export;
